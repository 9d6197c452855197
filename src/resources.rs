//! Configuration artifacts shipped inside the binary.
//!
//! The collaborators want real files on disk, so the embedded copies are
//! written to a private temporary directory that lives as long as the
//! [`Resources`] value.

use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;
use tracing::debug;

use crate::error::{PreflightError, Result};

pub const DEFAULT_PRESET: &str = "Preflight HEVC HQ";

const EXIFTOOL_CONFIG: &str = include_str!("../assets/exiftool.config");

const PRESETS: &[(&str, &str)] = &[
    (
        "Preflight HEVC HQ",
        include_str!("../assets/handbrake_presets/Preflight HEVC HQ.json"),
    ),
    (
        "Preflight HEVC Fast",
        include_str!("../assets/handbrake_presets/Preflight HEVC Fast.json"),
    ),
];

pub struct Resources {
    root: PathBuf,
    _dir: Option<TempDir>,
}

impl Resources {
    /// Materialize the bundled artifacts into a fresh temporary directory.
    pub fn bundled() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("video-preflight-")
            .tempdir()?;
        let root = dir.path().to_path_buf();
        write_bundle(&root)?;
        debug!(root = %root.display(), "wrote bundled resources");
        Ok(Self {
            root,
            _dir: Some(dir),
        })
    }

    /// Materialize the bundled artifacts into `root`, which the caller owns.
    pub fn in_dir(root: &Path) -> Result<Self> {
        write_bundle(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            _dir: None,
        })
    }

    pub fn exiftool_config(&self) -> PathBuf {
        self.root.join("exiftool.config")
    }

    pub fn preset_path(&self, name: &str) -> Result<PathBuf> {
        if !PRESETS.iter().any(|(preset, _)| *preset == name) {
            return Err(PreflightError::UnknownPreset(
                name.to_string(),
                preset_names().join(", "),
            ));
        }
        Ok(self.presets_dir().join(format!("{name}.json")))
    }

    fn presets_dir(&self) -> PathBuf {
        self.root.join("handbrake_presets")
    }
}

pub fn preset_names() -> Vec<&'static str> {
    PRESETS.iter().map(|(name, _)| *name).collect()
}

fn write_bundle(root: &Path) -> Result<()> {
    fs::write(root.join("exiftool.config"), EXIFTOOL_CONFIG)?;
    let presets = root.join("handbrake_presets");
    fs::create_dir_all(&presets)?;
    for (name, contents) in PRESETS {
        fs::write(presets.join(format!("{name}.json")), contents)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_presets_name_themselves() {
        for (name, contents) in PRESETS {
            let json: serde_json::Value = serde_json::from_str(contents).unwrap();
            assert_eq!(json["PresetList"][0]["PresetName"], *name);
        }
    }

    #[test]
    fn exiftool_config_prefers_keys() {
        let keys = EXIFTOOL_CONFIG
            .find("QuickTime::Keys{PREFERRED} = 3")
            .unwrap();
        assert!(EXIFTOOL_CONFIG.contains("QuickTime::ItemList{PREFERRED} = 2"));
        assert!(EXIFTOOL_CONFIG.contains("QuickTime::UserData{PREFERRED} = 1"));
        assert!(EXIFTOOL_CONFIG.find("require Image::ExifTool::QuickTime").unwrap() < keys);
        assert!(EXIFTOOL_CONFIG.trim_end().ends_with("1;  # end"));
    }

    #[test]
    fn materializes_config_and_presets() {
        let resources = Resources::bundled().unwrap();
        assert!(resources.exiftool_config().is_file());
        let preset = resources.preset_path(DEFAULT_PRESET).unwrap();
        assert!(preset.is_file());
        assert!(preset.ends_with("handbrake_presets/Preflight HEVC HQ.json"));
    }

    #[test]
    fn unknown_preset_lists_bundled_names() {
        let resources = Resources::bundled().unwrap();
        let err = resources.preset_path("Nope").unwrap_err().to_string();
        assert!(err.contains("Preflight HEVC HQ"));
        assert!(err.contains("Preflight HEVC Fast"));
    }
}
