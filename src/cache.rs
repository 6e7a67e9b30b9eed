//! # The mirror cache
//!
//! [`MirrorCache`] ties the pieces together: a [`Settings`] value naming the
//! mirror root and deadlines, and a [`GitRunner`] that executes every VCS
//! primitive. The clone and push orchestrations are implemented on it in
//! [`crate::clone`] and [`crate::push`].
//!
//! Production code uses [`MirrorCache::new`], which runs the system `git`.
//! Tests inject a scripted runner through [`MirrorCache::with_runner`].

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::Result;
use crate::git::{GitRunner, SystemGit};
use crate::lock::MirrorLock;
use crate::mirror;

/// Entry point for clone and push operations against a mirror root.
pub struct MirrorCache {
    git: Box<dyn GitRunner>,
    settings: Settings,
}

impl MirrorCache {
    /// Creates a cache backed by the system `git`, honouring the configured
    /// command timeout.
    pub fn new(settings: Settings) -> Self {
        let git = SystemGit::new().with_timeout(settings.command_timeout);
        Self::with_runner(Box::new(git), settings)
    }

    /// Creates a cache with a custom [`GitRunner`].
    pub fn with_runner(git: Box<dyn GitRunner>, settings: Settings) -> Self {
        Self { git, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Where the mirror for `remote` lives under this cache's root.
    pub fn mirror_path(&self, remote: &str) -> Result<PathBuf> {
        mirror::resolve(self.settings.mirror_root(), remote)
    }

    pub(crate) fn git(&self) -> &dyn GitRunner {
        self.git.as_ref()
    }

    pub(crate) fn lock(&self, mirror_path: &Path) -> Result<MirrorLock> {
        MirrorLock::acquire(mirror_path, self.settings.lock_timeout)
    }
}
