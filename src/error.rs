use std::path::PathBuf;
use thiserror::Error;

use crate::tools::Tool;

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("`{0}` command not found. Please ensure it is installed and in your PATH.")]
    MissingTool(String),
    #[error("Input file {} does not exist.", .0.display())]
    MissingInput(PathBuf),
    #[error("{description} {} already exists, exiting...", .path.display())]
    DestinationExists {
        description: &'static str,
        path: PathBuf,
    },
    #[error(
        ".MOV files come from a camera! Did you mean to specify {} as the source? Not copying.",
        .0.display()
    )]
    SuspiciousDestination(PathBuf),
    #[error("Failed to run `{tool}`: {args}")]
    ToolFailed { tool: Tool, args: String },
    #[error("{step} step failed: {} was not produced.", .path.display())]
    NoOutput { step: &'static str, path: PathBuf },
    #[error("{0} is not yet implemented.")]
    NotImplemented(&'static str),
    #[error("Unknown preset '{0}'. Bundled presets: {1}")]
    UnknownPreset(String, String),
    #[error("Invalid path (not UTF-8): {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("invalid rotation '{0}', expected one of 0, 90, 180, 270")]
    InvalidRotation(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = PreflightError> = std::result::Result<T, E>;
