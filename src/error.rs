//! # Error Handling
//!
//! This module defines the centralized error type for `cache-clone`. It uses
//! `thiserror` to describe every way a clone or push can fail, carrying enough
//! context (the failing command, its captured stderr, the paths involved) for
//! an operator to diagnose the problem from the message alone.
//!
//! ## Key Components
//!
//! - **`Error`**: every failure the library can report. None of them are
//!   retried internally; the caller decides whether to abort the process or
//!   propagate further.
//! - **`PushHop`**: which leg of the two-hop push failed.
//! - **`Result<T>`**: alias for `std::result::Result<T, Error>`.
//!
//! Command lines stored in errors are always the redacted form produced by
//! [`GitInvocation`](crate::git::GitInvocation), and stderr captured from
//! network-touching commands has credential tokens masked before it lands here.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The leg of the two-hop push that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushHop {
    /// Working tree to bare mirror.
    LocalToMirror,
    /// Bare mirror to the true remote.
    MirrorToRemote,
}

impl fmt::Display for PushHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushHop::LocalToMirror => write!(f, "local -> mirror"),
            PushHop::MirrorToRemote => write!(f, "mirror -> remote"),
        }
    }
}

/// Main error type for cache-clone operations
#[derive(Error, Debug)]
pub enum Error {
    /// The remote URL could not be decomposed into a host and a path.
    #[error("Malformed remote URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// The secret store could not produce a username/token pair.
    #[error("Credential fetch failed for secret '{secret_id}': {message}")]
    CredentialFetch { secret_id: String, message: String },

    /// Creating the bare mirror failed. The mirror directory may be left
    /// partially written and must be inspected manually.
    #[error("Mirror creation failed at {}: {command} - {stderr}", path.display())]
    MirrorCreate {
        path: PathBuf,
        command: String,
        stderr: String,
    },

    /// Refreshing an existing bare mirror failed.
    #[error("Mirror update failed at {}: {command} - {stderr}", path.display())]
    MirrorUpdate {
        path: PathBuf,
        command: String,
        stderr: String,
    },

    /// A push was requested but no bare mirror exists for the remote.
    #[error("No mirror found at {}\n  hint: run 'cache-clone clone' for this remote first", path.display())]
    MirrorMissing { path: PathBuf },

    /// The clone target directory already exists.
    #[error("Local path already exists: {}\n  hint: choose a new --local directory or remove the existing one", path.display())]
    LocalPathConflict { path: PathBuf },

    /// Cloning the working tree from the mirror failed.
    #[error("Local clone into {} failed: {command} - {stderr}", path.display())]
    LocalClone {
        path: PathBuf,
        command: String,
        stderr: String,
    },

    /// The working tree has uncommitted or untracked changes, or its status
    /// could not be read.
    #[error("Unable to push dirty repo {}: {details}\n  hint: commit or clean your changes before pushing", path.display())]
    DirtyWorkingTree { path: PathBuf, details: String },

    /// The working tree is on a detached HEAD or its branch could not be
    /// determined.
    #[error("Unable to determine the current branch of {}\n  hint: check out a branch before pushing (detached HEAD is not supported)", path.display())]
    UnknownBranch { path: PathBuf },

    /// One of the two push hops failed.
    #[error("Push failed ({hop}) for branch '{branch}': {command} - {stderr}")]
    Push {
        hop: PushHop,
        branch: String,
        command: String,
        stderr: String,
    },

    /// A subprocess could not be started at all.
    #[error("Failed to run '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A subprocess exceeded its deadline and was killed.
    #[error("Command timed out after {}s and was killed: {command}", timeout.as_secs())]
    CommandTimeout { command: String, timeout: Duration },

    /// The advisory lock guarding a mirror could not be acquired.
    #[error("Mirror lock error at {}: {message}", path.display())]
    Lock { path: PathBuf, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
