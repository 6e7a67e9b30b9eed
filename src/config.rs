//! # Runtime settings
//!
//! [`Settings`] is the single configuration value handed to a
//! [`MirrorCache`](crate::cache::MirrorCache). The CLI builds it from flags
//! and environment variables; library users construct it directly. Nothing in
//! the crate reads configuration from global state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::defaults::DEFAULT_LOCK_TIMEOUT;

/// Settings shared by the clone and push operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding one bare mirror per remote.
    pub mirror_root: PathBuf,
    /// Deadline applied to each git command. `None` waits indefinitely.
    pub command_timeout: Option<Duration>,
    /// How long to wait for another process holding the mirror lock.
    pub lock_timeout: Duration,
}

impl Settings {
    pub fn new(mirror_root: impl Into<PathBuf>) -> Self {
        Self {
            mirror_root: mirror_root.into(),
            command_timeout: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn mirror_root(&self) -> &Path {
        &self.mirror_root
    }
}
