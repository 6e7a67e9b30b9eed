//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `cache-clone` command-line tool. Each subcommand is defined in its own file
//! to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! Arguments shared by `clone` and `push` (where the mirror, the working tree
//! and the remote are) live here, along with the secret store selection.

pub mod clone;
pub mod completions;
pub mod push;
pub mod version;

use anyhow::{Context, Result};
use cache_clone::config::Settings;
use cache_clone::credential::{
    fetch_credential, AwsCliSecretStore, Credential, FileSecretStore, SecretRequest, SecretStore,
};
use cache_clone::defaults::{default_mirror_root, DEFAULT_LOCK_TIMEOUT};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Where the mirror, the working tree and the remote are
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Mirror root directory holding one bare mirror per remote.
    ///
    /// Defaults to the system's cache directory (e.g. `~/.cache/cache-clone`
    /// on Linux). Can also be set with the `CACHE_CLONE_MIRROR` environment
    /// variable.
    #[arg(short, long, value_name = "DIR", env = "CACHE_CLONE_MIRROR")]
    pub mirror: Option<PathBuf>,

    /// Local working tree directory
    #[arg(short, long, value_name = "DIR")]
    pub local: PathBuf,

    /// Remote repository URL (http or https)
    #[arg(short, long, value_name = "URL")]
    pub remote: String,

    /// Kill any git command still running after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seconds to wait for another process holding the mirror lock
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_LOCK_TIMEOUT.as_secs())]
    pub lock_timeout: u64,
}

impl TargetArgs {
    /// Build the library settings, making the mirror root absolute.
    pub fn settings(&self) -> Result<Settings> {
        let root = self.mirror.clone().unwrap_or_else(default_mirror_root);
        let root = std::path::absolute(&root)
            .with_context(|| format!("Invalid mirror root: {}", root.display()))?;
        Ok(Settings::new(root)
            .with_command_timeout(self.timeout.map(Duration::from_secs))
            .with_lock_timeout(Duration::from_secs(self.lock_timeout)))
    }
}

/// Backend holding the credential secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecretStoreKind {
    /// AWS Secrets Manager, through the `aws` CLI
    Aws,
    /// A local JSON file; the secret id is its path
    File,
}

/// Fetch the credential described by `request` from the selected store.
pub fn fetch(
    kind: SecretStoreKind,
    request: &SecretRequest,
    timeout: Option<Duration>,
) -> Result<Credential> {
    let store: Box<dyn SecretStore> = match kind {
        SecretStoreKind::Aws => Box::new(AwsCliSecretStore::new().with_timeout(timeout)),
        SecretStoreKind::File => Box::new(FileSecretStore),
    };
    Ok(fetch_credential(store.as_ref(), request)?)
}
