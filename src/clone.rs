//! The clone operation: refresh the mirror, then clone a working tree from it.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::cache::MirrorCache;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::git::GitInvocation;
use crate::mirror::{MirrorRecord, SyncAction};
use crate::remote::RemoteDescriptor;

/// What a successful clone did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneReport {
    pub mirror_path: PathBuf,
    pub local_path: PathBuf,
    /// Whether the mirror was created or refreshed on the way.
    pub action: SyncAction,
}

impl MirrorCache {
    /// Clone `remote` into `local` through the mirror.
    ///
    /// The mirror is created on first use and fetched on every later use, so
    /// a clone is never served from a mirror older than this invocation. The
    /// local directory must not exist yet; that is checked before any git
    /// command runs. A mirror created or updated before a failing local clone
    /// is kept.
    pub fn clone_repository(
        &self,
        remote: &str,
        local: &Path,
        credential: &Credential,
    ) -> Result<CloneReport> {
        let descriptor = RemoteDescriptor::parse(remote)?;

        if fs::symlink_metadata(local).is_ok() {
            return Err(Error::LocalPathConflict {
                path: local.to_path_buf(),
            });
        }

        let mut record = MirrorRecord::resolve(self.settings().mirror_root(), &descriptor);
        let _lock = self.lock(record.path())?;
        let action = record.sync(self.git(), &descriptor, Some(credential))?;

        if let Some(parent) = local.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        info!("Cloning {} into {}", descriptor.url(), local.display());
        let clone = GitInvocation::new()
            .arg("clone")
            .arg(record.path())
            .arg(local);
        let result = self.git().run(&clone)?;
        if !result.success() {
            return Err(Error::LocalClone {
                path: local.to_path_buf(),
                command: clone.to_string(),
                stderr: result.stderr.trim().to_string(),
            });
        }

        Ok(CloneReport {
            mirror_path: record.path().to_path_buf(),
            local_path: local.to_path_buf(),
            action,
        })
    }
}
