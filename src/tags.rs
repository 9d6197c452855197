use std::{ffi::OsStr, path::Path};
use tracing::info;

use crate::error::{PreflightError, Result};
use crate::tools::{Tool, Toolchain, run_checked};
use crate::util::{ensure_exists, path_to_str};

/// Extension of clips straight off the camera. Never a valid tag-copy target.
pub const CAMERA_NATIVE_EXTENSION: &str = "MOV";

/// These tags bloat the video but don't help much.
const TAGS_TO_SKIP: [&str; 2] = ["PreviewImage", "ThumbnailImage"];

/// Copy tags from `source` onto `destination` in place.
///
/// Apple Photos ignores EXIF and XMP in videos, so everything is rewritten as
/// QuickTime tags, and the lens model is duplicated into the language-tagged
/// key that Photos actually reads.
pub fn copy_tags(tools: Toolchain<'_>, source: &Path, destination: &Path) -> Result<()> {
    if destination.extension() == Some(OsStr::new(CAMERA_NATIVE_EXTENSION)) {
        return Err(PreflightError::SuspiciousDestination(
            destination.to_path_buf(),
        ));
    }
    ensure_exists(source)?;
    ensure_exists(destination)?;

    println!("ℹ️ Copying tags ...");
    let config = path_to_str(&tools.resources.exiftool_config())?;

    run_checked(
        tools.runner,
        Tool::ExifTool,
        &with_config(&config, bulk_copy_args(source, destination)?),
    )?;
    run_checked(
        tools.runner,
        Tool::ExifTool,
        &with_config(&config, lens_model_args(destination)?),
    )?;

    info!(source = %source.display(), destination = %destination.display(), "tags copied");
    println!("✅ Done copying tags.");
    Ok(())
}

fn with_config(config: &str, args: Vec<String>) -> Vec<String> {
    let mut full = vec!["-config".to_string(), config.to_string()];
    full.extend(args);
    full
}

/// Clear every tag on the destination, then repopulate from the source.
///
/// No tag list is given, so each copied tag lands in its preferred group as
/// set by the bundled config rather than in the group it was read from.
fn bulk_copy_args(source: &Path, destination: &Path) -> Result<Vec<String>> {
    let mut args = vec![
        "-all=".to_string(),
        "-tagsFromFile".to_string(),
        path_to_str(source)?,
    ];
    args.extend(TAGS_TO_SKIP.iter().map(|tag| format!("--{tag}")));
    args.push("-overwrite_original".to_string());
    args.push(path_to_str(destination)?);
    Ok(args)
}

fn lens_model_args(destination: &Path) -> Result<Vec<String>> {
    Ok(vec![
        "-overwrite_original".to_string(),
        "-LensModel-eng-US<LensModel".to_string(),
        path_to_str(destination)?,
    ])
}
