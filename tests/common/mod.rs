//! Shared fixtures: a recording stand-in for the external tools and a scratch
//! directory with the bundled resources written out.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};
use video_preflight::{
    PreflightError, Result,
    resources::Resources,
    tools::{Tool, ToolRunner, Toolchain},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub tool: Tool,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn has_pair(&self, flag: &str, value: &str) -> bool {
        self.args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    pub fn last_arg(&self) -> &str {
        self.args.last().map(String::as_str).unwrap_or_default()
    }
}

/// Records every call instead of spawning anything. Transcoder and remuxer
/// calls write their output file unless told otherwise.
#[derive(Default)]
pub struct StubRunner {
    calls: RefCell<Vec<Invocation>>,
    /// Tools that `locate` pretends are not installed.
    missing: Vec<Tool>,
    /// Tools that report a non-zero exit.
    failing: Vec<Tool>,
    /// Tools that exit without writing their output.
    silent: Vec<Tool>,
}

impl StubRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// `tools` are not installed.
    pub fn missing(tools: &[Tool]) -> Self {
        Self {
            missing: tools.to_vec(),
            ..Self::default()
        }
    }

    /// `tools` report a non-zero exit.
    pub fn failing(tools: &[Tool]) -> Self {
        Self {
            failing: tools.to_vec(),
            ..Self::default()
        }
    }

    /// `tools` exit cleanly without writing their output.
    pub fn silent(tools: &[Tool]) -> Self {
        Self {
            silent: tools.to_vec(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn tools_called(&self) -> Vec<Tool> {
        self.calls.borrow().iter().map(|c| c.tool).collect()
    }
}

impl ToolRunner for StubRunner {
    fn locate(&self, tool: Tool) -> Result<PathBuf> {
        if self.missing.contains(&tool) {
            return Err(PreflightError::MissingTool(tool.executable().to_string()));
        }
        Ok(Path::new("/stub/bin").join(tool.executable()))
    }

    fn invoke(&self, tool: Tool, args: &[String]) -> Result<bool> {
        self.locate(tool)?;
        self.calls.borrow_mut().push(Invocation {
            tool,
            args: args.to_vec(),
        });

        if !self.silent.contains(&tool) {
            let output = match tool {
                Tool::HandBrake => args
                    .windows(2)
                    .find(|w| w[0] == "--output")
                    .map(|w| PathBuf::from(&w[1])),
                Tool::Ffmpeg => args.last().map(PathBuf::from),
                Tool::ExifTool => None,
            };
            if let Some(output) = output {
                fs::write(output, b"stub media")?;
            }
        }

        Ok(!self.failing.contains(&tool))
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub resources: Resources,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempdir().unwrap();
        let res = dir.path().join("resources");
        fs::create_dir(&res).unwrap();
        let resources = Resources::in_dir(&res).unwrap();
        Self { dir, resources }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Create a non-empty file in the scratch directory.
    pub fn touch(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, b"original media").unwrap();
        path
    }

    pub fn toolchain<'a>(&'a self, runner: &'a StubRunner) -> Toolchain<'a> {
        Toolchain {
            runner,
            resources: &self.resources,
        }
    }
}

pub fn s(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}
