//! The VCS executor boundary.
//!
//! The core never reimplements git; it describes each primitive as a
//! [`GitInvocation`] and hands it to a [`GitRunner`]. Production code uses
//! [`SystemGit`], which shells out to the system `git` and therefore picks up
//! SSH keys, credential helpers and `~/.gitconfig` like any other git call.
//! Tests substitute a scripted runner.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use log::debug;

use crate::error::Result;
use crate::process::{self, CommandResult};

/// One `git` argument vector, optionally scoped to a working directory.
///
/// Arguments added with [`secret_arg`](Self::secret_arg) are passed to the
/// subprocess verbatim but appear only in their redacted form in
/// [`Display`](fmt::Display) output, which is what logs and errors use.
#[derive(Debug, Clone, Default)]
pub struct GitInvocation {
    dir: Option<PathBuf>,
    args: Vec<OsString>,
    shown: Vec<String>,
}

impl GitInvocation {
    /// An invocation run from the current process directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// An invocation run as `git -C <dir> ...`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        let arg = arg.as_ref();
        self.shown.push(arg.to_string_lossy().into_owned());
        self.args.push(arg.to_os_string());
        self
    }

    /// Add an argument whose real value must never be displayed.
    pub fn secret_arg(mut self, value: impl Into<String>, shown: impl Into<String>) -> Self {
        self.args.push(OsString::from(value.into()));
        self.shown.push(shown.into());
        self
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments as they appear in logs, with secrets redacted.
    pub fn shown_args(&self) -> &[String] {
        &self.shown
    }

    /// The git subcommand (`clone`, `fetch`, `push`, ...), if any.
    pub fn subcommand(&self) -> Option<&str> {
        self.shown.first().map(String::as_str)
    }
}

impl fmt::Display for GitInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git")?;
        if let Some(dir) = &self.dir {
            write!(f, " -C {}", dir.display())?;
        }
        for arg in &self.shown {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Trait for executing git primitives - allows mocking in tests
pub trait GitRunner: Send + Sync {
    /// Run one invocation to completion.
    ///
    /// A non-zero exit status is reported through
    /// [`CommandResult::exit_code`], not as an error; only failing to run the
    /// command at all (or exceeding the deadline) is an `Err`.
    fn run(&self, invocation: &GitInvocation) -> Result<CommandResult>;
}

/// Runs invocations with the system `git` binary.
#[derive(Debug, Clone, Default)]
pub struct SystemGit {
    timeout: Option<Duration>,
    envs: Vec<(OsString, OsString)>,
}

impl SystemGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill any git command still running after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set an extra environment variable on every git command.
    pub fn with_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

impl GitRunner for SystemGit {
    fn run(&self, invocation: &GitInvocation) -> Result<CommandResult> {
        let mut command = Command::new("git");
        if let Some(dir) = invocation.dir() {
            command.arg("-C").arg(dir);
        }
        command.args(invocation.args());
        // Fail instead of prompting when credentials are missing or rejected.
        command.env("GIT_TERMINAL_PROMPT", "0");
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        let display = invocation.to_string();
        debug!("Running: {}", display);
        let result = process::run(command, &display, self.timeout)?;
        debug!("'{}' exited with {}", display, result.exit_code);
        Ok(result)
    }
}
