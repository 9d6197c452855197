use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info, warn};

use crate::error::{PreflightError, Result};
use crate::remux::ContainerFormat;
use crate::resources::DEFAULT_PRESET;
use crate::tools::{Tool, Toolchain};
use crate::util::{ensure_absent, ensure_exists, output_produced, path_to_str};

pub const DEFAULT_QUALITY: f64 = 22.0;

/// Clockwise rotation applied by the transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "u16")]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = PreflightError;

    fn try_from(degrees: u16) -> Result<Self> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Clockwise90),
            180 => Ok(Rotation::Clockwise180),
            270 => Ok(Rotation::Clockwise270),
            other => Err(PreflightError::InvalidRotation(other.to_string())),
        }
    }
}

impl FromStr for Rotation {
    type Err = PreflightError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u16>()
            .map_err(|_| PreflightError::InvalidRotation(s.to_string()))
            .and_then(Rotation::try_from)
    }
}

/// User-tunable encode settings, shared by `compress` and `run`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionSettings {
    /// x265 constant quality factor; lower is higher quality.
    pub quality: f64,
    pub rotation: Rotation,
    pub remove_audio: bool,
    pub preset: String,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            rotation: Rotation::None,
            remove_audio: false,
            preset: DEFAULT_PRESET.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompressionRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub settings: CompressionSettings,
    /// Audio track to bake in instead of the source's own.
    pub replacement_audio: Option<PathBuf>,
}

/// Compress `request.source` into `request.destination`.
///
/// HandBrakeCLI exits with code 0 even when the job fails to initialize, so
/// the only success signal is a non-empty output file after the call.
pub fn compress(tools: Toolchain<'_>, request: &CompressionRequest) -> Result<PathBuf> {
    let destination = &request.destination;
    ensure_absent(destination, "Destination file")?;
    ensure_exists(&request.source)?;
    if let Some(audio) = &request.replacement_audio {
        ensure_exists(audio)?;
    }

    println!(
        "ℹ️ Compressing {} ...",
        request.source.file_name().unwrap_or_default().to_string_lossy()
    );

    let (tool, args) = match &request.replacement_audio {
        Some(audio) => (
            Tool::Ffmpeg,
            audio_swap_args(&request.source, audio, destination)?,
        ),
        None => {
            let preset_file = tools.resources.preset_path(&request.settings.preset)?;
            (
                Tool::HandBrake,
                handbrake_args(request, &preset_file)?,
            )
        }
    };

    let reported_ok = tools.runner.invoke(tool, &args)?;
    debug!(%tool, reported_ok, "transcoder returned");

    if tool == Tool::Ffmpeg && !reported_ok {
        return Err(PreflightError::ToolFailed {
            tool,
            args: args.join(" "),
        });
    }
    if !output_produced(destination) {
        warn!(%tool, reported_ok, destination = %destination.display(), "no output produced");
        return Err(PreflightError::NoOutput {
            step: "Compression",
            path: destination.clone(),
        });
    }

    info!(destination = %destination.display(), "compressed");
    println!(
        "✅ Done compressing to {}",
        destination.file_name().unwrap_or_default().to_string_lossy()
    );
    Ok(destination.clone())
}

fn handbrake_args(request: &CompressionRequest, preset_file: &Path) -> Result<Vec<String>> {
    let settings = &request.settings;
    let mut args = vec![
        "--input".to_string(),
        path_to_str(&request.source)?,
        "--preset-import-file".to_string(),
        path_to_str(preset_file)?,
        "--preset".to_string(),
        settings.preset.clone(),
        "--quality".to_string(),
        settings.quality.to_string(),
        format!("--rotate=angle={}:hflip=0", settings.rotation.degrees()),
    ];
    if settings.remove_audio {
        args.extend(["--audio".to_string(), "none".to_string()]);
    }
    args.extend(["--output".to_string(), path_to_str(&request.destination)?]);
    Ok(args)
}

/// Keep the source video untouched and swap in the replacement audio.
///
/// The intermediate has no recognizable extension, so the container is named
/// explicitly.
fn audio_swap_args(source: &Path, audio: &Path, destination: &Path) -> Result<Vec<String>> {
    Ok(vec![
        "-i".to_string(),
        path_to_str(source)?,
        "-i".to_string(),
        path_to_str(audio)?,
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-shortest".to_string(),
        "-f".to_string(),
        ContainerFormat::Mp4.ffmpeg_name().to_string(),
        path_to_str(destination)?,
    ])
}
