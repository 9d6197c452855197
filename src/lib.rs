//! Preflight for camera clips: compress with HandBrakeCLI, carry tags over with
//! ExifTool, and optionally rewrap with ffmpeg.

pub mod compress;
pub mod error;
pub mod pipeline;
pub mod remux;
pub mod resources;
pub mod settings;
pub mod tags;
pub mod tools;
pub mod util;

pub use error::{PreflightError, Result};
