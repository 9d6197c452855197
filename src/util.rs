use std::path::{Path, PathBuf};

use crate::error::{PreflightError, Result};

/// Helper to convert a Path to an owned String, returning an error if not valid UTF-8.
pub fn path_to_str(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| PreflightError::InvalidPath(path.to_path_buf()))
}

pub fn ensure_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PreflightError::MissingInput(path.to_path_buf()));
    }
    Ok(())
}

/// Refuse to let a step clobber an existing file.
pub fn ensure_absent(path: &Path, description: &'static str) -> Result<()> {
    if path.exists() {
        return Err(PreflightError::DestinationExists {
            description,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Whether a step left a usable output behind: the file exists and is non-empty.
pub fn output_produced(path: &Path) -> bool {
    path.metadata()
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// `clip.MOV` -> `clip.MOV-<suffix>`, next to the original.
pub fn with_name_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}
