use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use video_preflight::{compress::Rotation, settings::CompressionOverrides};

/// Video preflight tools: compress camera clips and keep their tags for photo library import
#[derive(Parser, Debug)]
#[command(name = "video-preflight", author, version, about)]
pub struct Cli {
    /// JSON file with default options and tool paths. CLI arguments override values in the file.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide output from exiftool, HandBrakeCLI and ffmpeg
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace the audio track of a clip (not yet implemented)
    ReplaceAudio {
        source: PathBuf,
        new_audio: PathBuf,
        destination: PathBuf,
    },

    /// Copy tags from source and write them to destination as QuickTime tags
    ///
    /// Uses ExifTool under the hood. Apple Photos doesn't recognize EXIF or XMP
    /// metadata in videos.
    CopyTags { source: PathBuf, destination: PathBuf },

    /// Compress a video with a bundled x265 preset
    ///
    /// Uses x265's constant quality setting; see HandBrake's recommended
    /// quality settings for x265: https://handbrake.fr/docs/en/latest/workflow/adjust-quality.html
    Compress {
        source: PathBuf,
        destination: PathBuf,
        #[command(flatten)]
        compression: CompressionArgs,
    },

    /// Write a video to a QuickTime .mov container without re-compressing
    ///
    /// Auxiliary command, not part of the preflight pipeline. Defaults to the
    /// source path with a .mov extension.
    WriteMovContainer {
        source: PathBuf,
        destination: Option<PathBuf>,
    },

    /// Run the preflight pipeline on a source file
    ///
    /// Geotag the source file first. To denoise or alter the audio, write out a
    /// new audio track and pass it with --replace-audio.
    Run {
        source: PathBuf,

        /// Audio track to use instead of the source's own
        #[arg(long, value_name = "AUDIO_FILE")]
        replace_audio: Option<PathBuf>,

        #[command(flatten)]
        compression: CompressionArgs,

        /// Copy tags from the source onto the output (default)
        #[arg(long, overrides_with = "no_copy_tags")]
        copy_tags: bool,

        /// Leave the output without the source's tags
        #[arg(long, overrides_with = "copy_tags")]
        no_copy_tags: bool,
    },

    /// Check that exiftool, HandBrakeCLI and ffmpeg are available
    CheckTools,
}

#[derive(Args, Debug, Clone)]
pub struct CompressionArgs {
    /// x265 quality factor, lower is higher quality [default: 22]
    #[arg(long)]
    pub quality: Option<f64>,

    /// Rotate video clockwise: 0, 90, 180 or 270 [default: 0]
    #[arg(long, value_parser = parse_rotation, value_name = "DEGREES")]
    pub rotate_clockwise: Option<Rotation>,

    /// Remove audio track from output
    #[arg(long, overrides_with = "keep_audio")]
    pub remove_audio: bool,

    /// Keep the audio track, even if the settings file removes it
    #[arg(long, overrides_with = "remove_audio")]
    pub keep_audio: bool,

    /// Bundled HandBrake preset to encode with
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,
}

impl CompressionArgs {
    pub fn overrides(&self) -> CompressionOverrides {
        CompressionOverrides {
            quality: self.quality,
            rotation: self.rotate_clockwise,
            remove_audio: match (self.remove_audio, self.keep_audio) {
                (_, true) => Some(false),
                (true, false) => Some(true),
                (false, false) => None,
            },
            preset: self.preset.clone(),
        }
    }
}

/// `--copy-tags` / `--no-copy-tags`, or `None` if neither was given.
pub fn copy_tags_flag(copy_tags: bool, no_copy_tags: bool) -> Option<bool> {
    match (copy_tags, no_copy_tags) {
        (_, true) => Some(false),
        (true, false) => Some(true),
        (false, false) => None,
    }
}

fn parse_rotation(s: &str) -> Result<Rotation, String> {
    s.parse().map_err(|e: video_preflight::PreflightError| e.to_string())
}
