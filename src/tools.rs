use regex::Regex;
use serde::Deserialize;
use std::{
    fmt,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};
use tracing::debug;

use crate::error::{PreflightError, Result};
use crate::resources::Resources;

/// External programs the preflight pipeline delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Tag editor.
    ExifTool,
    /// Transcoder. Its exit status cannot be trusted.
    HandBrake,
    /// Remuxer.
    Ffmpeg,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::ExifTool, Tool::HandBrake, Tool::Ffmpeg];

    pub fn executable(self) -> &'static str {
        match self {
            Tool::ExifTool => "exiftool",
            Tool::HandBrake => "HandBrakeCLI",
            Tool::Ffmpeg => "ffmpeg",
        }
    }

    fn version_arg(self) -> &'static str {
        match self {
            Tool::ExifTool => "-ver",
            Tool::HandBrake => "--version",
            Tool::Ffmpeg => "-version",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

/// Explicit executable locations, taking precedence over `PATH` lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolPaths {
    pub exiftool: Option<PathBuf>,
    #[serde(rename = "HandBrakeCLI", alias = "handbrake")]
    pub handbrake: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
}

impl ToolPaths {
    pub fn get(&self, tool: Tool) -> Option<&Path> {
        match tool {
            Tool::ExifTool => self.exiftool.as_deref(),
            Tool::HandBrake => self.handbrake.as_deref(),
            Tool::Ffmpeg => self.ffmpeg.as_deref(),
        }
    }
}

/// Runs collaborator processes on behalf of the pipeline steps.
pub trait ToolRunner {
    /// Resolve the executable for `tool`, failing with `MissingTool` if absent.
    fn locate(&self, tool: Tool) -> Result<PathBuf>;

    /// Run `tool` to completion and return whether it *reported* success.
    ///
    /// Only a failure to spawn is an error; whether the reported status means
    /// anything is up to the caller.
    fn invoke(&self, tool: Tool, args: &[String]) -> Result<bool>;
}

pub struct SystemRunner {
    paths: ToolPaths,
    quiet: bool,
}

impl SystemRunner {
    pub fn new(paths: ToolPaths, quiet: bool) -> Self {
        Self { paths, quiet }
    }
}

impl ToolRunner for SystemRunner {
    fn locate(&self, tool: Tool) -> Result<PathBuf> {
        if let Some(path) = self.paths.get(tool) {
            return if is_executable(path) {
                Ok(path.to_path_buf())
            } else {
                Err(PreflightError::MissingTool(path.display().to_string()))
            };
        }
        which::which(tool.executable())
            .map_err(|_| PreflightError::MissingTool(tool.executable().to_string()))
    }

    fn invoke(&self, tool: Tool, args: &[String]) -> Result<bool> {
        let path = self.locate(tool)?;
        let mut command = Command::new(&path);
        command.args(args);

        if self.quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        debug!(%tool, path = %path.display(), args = %args.join(" "), "invoking");
        let status = command.status()?;
        debug!(%tool, %status, "finished");
        Ok(status.success())
    }
}

/// Everything a step needs to call out to a collaborator.
#[derive(Clone, Copy)]
pub struct Toolchain<'a> {
    pub runner: &'a dyn ToolRunner,
    pub resources: &'a Resources,
}

/// Fail before any work starts if a required collaborator is missing.
pub fn ensure_tools(runner: &dyn ToolRunner, tools: &[Tool]) -> Result<()> {
    for &tool in tools {
        let path = runner.locate(tool)?;
        debug!(%tool, path = %path.display(), "found");
    }
    Ok(())
}

/// Invoke a collaborator whose exit status is trustworthy.
pub fn run_checked(runner: &dyn ToolRunner, tool: Tool, args: &[String]) -> Result<()> {
    if !runner.invoke(tool, args)? {
        return Err(PreflightError::ToolFailed {
            tool,
            args: args.join(" "),
        });
    }
    Ok(())
}

#[derive(Debug)]
pub struct ToolStatus {
    pub tool: Tool,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub error: Option<String>,
}

pub fn check_tools(runner: &dyn ToolRunner) -> Vec<ToolStatus> {
    Tool::ALL
        .into_iter()
        .map(|tool| match runner.locate(tool) {
            Ok(path) => {
                let version = Command::new(&path)
                    .arg(tool.version_arg())
                    .stdin(Stdio::null())
                    .output()
                    .ok()
                    .and_then(|output| parse_version(&String::from_utf8_lossy(&output.stdout)));
                ToolStatus {
                    tool,
                    path: Some(path),
                    version,
                    error: None,
                }
            }
            Err(e) => ToolStatus {
                tool,
                path: None,
                version: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

/// First dotted version number in a tool's version banner.
fn parse_version(output: &str) -> Option<String> {
    let re = Regex::new(r"(\d+(?:\.\d+)+)").ok()?;
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// A configured path must be a regular file `exec` will accept.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
