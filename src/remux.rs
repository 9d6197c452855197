use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PreflightError, Result};
use crate::tools::{Tool, Toolchain, run_checked};
use crate::util::{ensure_absent, ensure_exists, output_produced, path_to_str};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Mov,
    Mp4,
}

impl ContainerFormat {
    /// Muxer name passed to ffmpeg's `-f`.
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            ContainerFormat::Mov => "mov",
            ContainerFormat::Mp4 => "mp4",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ContainerFormat::Mov => "mov",
            ContainerFormat::Mp4 => "mp4",
        }
    }
}

/// Rewrap `source` into `format` next to it, swapping the extension.
pub fn remux_to_container(
    tools: Toolchain<'_>,
    source: &Path,
    format: ContainerFormat,
) -> Result<PathBuf> {
    let destination = source.with_extension(format.extension());
    remux(tools, source, &destination, format)
}

/// Copy the audio and video streams of `source` into `destination` without
/// re-encoding.
///
/// Not part of the preflight pipeline; `.mov` and `.mp4` may hold metadata
/// differently and this makes it easy to compare.
pub fn remux(
    tools: Toolchain<'_>,
    source: &Path,
    destination: &Path,
    format: ContainerFormat,
) -> Result<PathBuf> {
    ensure_absent(destination, "Destination file")?;
    ensure_exists(source)?;

    println!("ℹ️ Writing {} container ...", format.ffmpeg_name());
    run_checked(
        tools.runner,
        Tool::Ffmpeg,
        &remux_args(source, destination, format)?,
    )?;

    if !output_produced(destination) {
        return Err(PreflightError::NoOutput {
            step: "Remux",
            path: destination.to_path_buf(),
        });
    }
    info!(destination = %destination.display(), format = format.ffmpeg_name(), "remuxed");
    println!("✅ Wrote {}", destination.display());
    Ok(destination.to_path_buf())
}

fn remux_args(source: &Path, destination: &Path, format: ContainerFormat) -> Result<Vec<String>> {
    Ok(vec![
        "-i".to_string(),
        path_to_str(source)?,
        "-acodec".to_string(),
        "copy".to_string(),
        "-vcodec".to_string(),
        "copy".to_string(),
        "-f".to_string(),
        format.ffmpeg_name().to_string(),
        path_to_str(destination)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_copy_with_explicit_format() {
        let args = remux_args(
            Path::new("clip.mp4"),
            Path::new("clip.mov"),
            ContainerFormat::Mov,
        )
        .unwrap();
        assert_eq!(
            args,
            [
                "-i", "clip.mp4", "-acodec", "copy", "-vcodec", "copy", "-f", "mov", "clip.mov",
            ]
        );
    }
}
