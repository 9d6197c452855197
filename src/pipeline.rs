//! The preflight pipeline: optional audio replacement, compression, tag copy.
//!
//! Control only moves forward. Any failed step ends the run, and nothing is
//! retried, rolled back or cleaned up.

use std::path::{Path, PathBuf};
use tracing::{info, info_span};

use crate::compress::{CompressionRequest, CompressionSettings, compress};
use crate::error::{PreflightError, Result};
use crate::tags::copy_tags;
use crate::tools::{Tool, Toolchain};
use crate::util::{ensure_absent, with_name_suffix};

pub const REPLACED_AUDIO_SUFFIX: &str = "-replaced-audio";

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub compression: CompressionSettings,
    pub replace_audio: Option<PathBuf>,
    pub copy_tags: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            compression: CompressionSettings::default(),
            replace_audio: None,
            copy_tags: true,
        }
    }
}

impl PipelineOptions {
    /// Collaborators a run with these options will call.
    pub fn required_tools(&self) -> Vec<Tool> {
        let mut tools = vec![Tool::HandBrake];
        if self.replace_audio.is_some() {
            tools.push(Tool::Ffmpeg);
        }
        if self.copy_tags {
            tools.push(Tool::ExifTool);
        }
        tools
    }
}

/// Final output of the pipeline: same base name, `.mp4` extension.
pub fn destination_for(source: &Path) -> PathBuf {
    source.with_extension("mp4")
}

/// Run the preflight pipeline on a camera clip and return the compressed file.
///
/// Geotag the source first. To denoise or otherwise edit the audio, export the
/// new track and pass it as `options.replace_audio`.
pub fn run(tools: Toolchain<'_>, source: &Path, options: &PipelineOptions) -> Result<PathBuf> {
    let _span = info_span!("pipeline", source = %source.display()).entered();
    println!("ℹ️ Running preflight pipeline ...");

    let destination = destination_for(source);
    // Refuse before building any intermediate that would block a rerun.
    ensure_absent(&destination, "Destination file")?;
    let mut current = source.to_path_buf();

    if let Some(audio) = &options.replace_audio {
        let intermediate = with_name_suffix(source, REPLACED_AUDIO_SUFFIX);
        info!(audio = %audio.display(), intermediate = %intermediate.display(), "replacing audio");
        compress(
            tools,
            &CompressionRequest {
                source: current.clone(),
                destination: intermediate.clone(),
                settings: options.compression.clone(),
                replacement_audio: Some(audio.clone()),
            },
        )?;
        if options.copy_tags {
            copy_tags(tools, source, &intermediate)?;
        }
        current = intermediate;
    }

    compress(
        tools,
        &CompressionRequest {
            source: current.clone(),
            destination: destination.clone(),
            settings: options.compression.clone(),
            replacement_audio: None,
        },
    )?;

    if options.copy_tags {
        copy_tags(tools, &current, &destination)?;
    }

    info!(destination = %destination.display(), "pipeline complete");
    println!("✅ Preflight complete! Output: {}", destination.display());
    Ok(destination)
}

/// Standalone audio replacement. Always fails; `run --replace-audio` is the
/// supported path.
pub fn replace_audio(_source: &Path, _audio: &Path, _destination: &Path) -> Result<PathBuf> {
    Err(PreflightError::NotImplemented("Replacing audio"))
}
