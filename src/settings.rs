use serde::Deserialize;
use std::path::Path;

use crate::compress::{CompressionSettings, Rotation};
use crate::error::Result;
use crate::tools::ToolPaths;

/// Per-user defaults read from a JSON file. CLI arguments override values in
/// the file; anything unset falls back to the built-in defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub quality: Option<f64>,
    pub rotate_clockwise: Option<Rotation>,
    pub remove_audio: Option<bool>,
    pub copy_tags: Option<bool>,
    pub preset: Option<String>,
    #[serde(default)]
    pub tools: ToolPaths,
}

/// Compression options as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CompressionOverrides {
    pub quality: Option<f64>,
    pub rotation: Option<Rotation>,
    /// `Some(false)` keeps audio even when the file says to remove it.
    pub remove_audio: Option<bool>,
    pub preset: Option<String>,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&contents)?)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn compression(&self, overrides: &CompressionOverrides) -> CompressionSettings {
        let defaults = CompressionSettings::default();
        CompressionSettings {
            quality: overrides
                .quality
                .or(self.quality)
                .unwrap_or(defaults.quality),
            rotation: overrides
                .rotation
                .or(self.rotate_clockwise)
                .unwrap_or(defaults.rotation),
            remove_audio: overrides
                .remove_audio
                .or(self.remove_audio)
                .unwrap_or(defaults.remove_audio),
            preset: overrides
                .preset
                .clone()
                .or_else(|| self.preset.clone())
                .unwrap_or(defaults.preset),
        }
    }

    /// Tag copying is on unless switched off on the command line or in the file.
    pub fn copy_tags(&self, flag: Option<bool>) -> bool {
        flag.or(self.copy_tags).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::DEFAULT_QUALITY;
    use crate::resources::DEFAULT_PRESET;

    #[test]
    fn defaults_without_file() {
        let settings = Settings::load(None).unwrap();
        let compression = settings.compression(&CompressionOverrides::default());
        assert_eq!(compression.quality, DEFAULT_QUALITY);
        assert_eq!(compression.rotation, Rotation::None);
        assert!(!compression.remove_audio);
        assert_eq!(compression.preset, DEFAULT_PRESET);
        assert!(settings.copy_tags(None));
    }

    #[test]
    fn cli_overrides_file() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "quality": 20,
                "rotate_clockwise": 90,
                "copy_tags": false,
                "preset": "Preflight HEVC Fast",
                "tools": { "exiftool": "/opt/bin/exiftool" }
            }"#,
        )
        .unwrap();

        let from_file = settings.compression(&CompressionOverrides::default());
        assert_eq!(from_file.quality, 20.0);
        assert_eq!(from_file.rotation, Rotation::Clockwise90);
        assert_eq!(from_file.preset, "Preflight HEVC Fast");
        assert!(!settings.copy_tags(None));
        assert!(settings.copy_tags(Some(true)));

        let overridden = settings.compression(&CompressionOverrides {
            quality: Some(18.0),
            rotation: Some(Rotation::None),
            remove_audio: Some(true),
            preset: None,
        });
        assert_eq!(overridden.quality, 18.0);
        assert_eq!(overridden.rotation, Rotation::None);
        assert!(overridden.remove_audio);
    }

    #[test]
    fn cli_can_keep_audio_the_file_removes() {
        let settings: Settings = serde_json::from_str(r#"{"remove_audio": true}"#).unwrap();

        assert!(settings.compression(&CompressionOverrides::default()).remove_audio);
        let kept = settings.compression(&CompressionOverrides {
            remove_audio: Some(false),
            ..Default::default()
        });
        assert!(!kept.remove_audio);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_rotation() {
        assert!(serde_json::from_str::<Settings>(r#"{"qualty": 20}"#).is_err());
        assert!(serde_json::from_str::<Settings>(r#"{"rotate_clockwise": 45}"#).is_err());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preflight.json");
        std::fs::write(&path, r#"{"remove_audio": true}"#).unwrap();
        let settings = Settings::load(Some(&path)).unwrap();
        assert!(settings.compression(&CompressionOverrides::default()).remove_audio);
    }
}
