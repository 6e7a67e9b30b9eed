//! The push operation: local working tree to mirror, then mirror to remote.
//!
//! A working tree cloned through the cache has the mirror as its `origin`, so
//! the first hop is an ordinary `git push`. The second hop sends only the
//! branch that was just pushed from the mirror to the true remote. Nothing
//! is retried: a failure after the first hop leaves the mirror ahead of the
//! remote until the next successful push.

use std::path::{Path, PathBuf};

use log::info;

use crate::cache::MirrorCache;
use crate::credential::Credential;
use crate::error::{Error, PushHop, Result};
use crate::git::GitInvocation;
use crate::mirror::MirrorRecord;
use crate::remote::RemoteDescriptor;

/// What a successful push did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub branch: String,
    pub mirror_path: PathBuf,
}

impl MirrorCache {
    /// Push the current branch of `local` through the mirror to `remote`.
    ///
    /// Without a credential the plain remote URL is used and git's own
    /// credential helpers handle authentication.
    pub fn push_repository(
        &self,
        remote: &str,
        local: &Path,
        credential: Option<&Credential>,
    ) -> Result<PushReport> {
        let descriptor = RemoteDescriptor::parse(remote)?;
        let mut record = MirrorRecord::resolve(self.settings().mirror_root(), &descriptor);
        // Taking the lock creates directories under the mirror root.
        if !record.path().is_dir() {
            return Err(Error::MirrorMissing {
                path: record.path().to_path_buf(),
            });
        }
        let _lock = self.lock(record.path())?;

        self.ensure_clean(local)?;
        let branch = self.current_branch(local)?;

        if !record.check_present(self.git())? {
            return Err(Error::MirrorMissing {
                path: record.path().to_path_buf(),
            });
        }

        info!("Pushing branch '{}' from {} to the mirror", branch, local.display());
        let to_mirror = GitInvocation::in_dir(local)
            .arg("push")
            .arg("--set-upstream")
            .arg("origin")
            .arg(&branch);
        let result = self.git().run(&to_mirror)?;
        if !result.success() {
            return Err(Error::Push {
                hop: PushHop::LocalToMirror,
                branch,
                command: to_mirror.to_string(),
                stderr: result.stderr.trim().to_string(),
            });
        }

        info!("Pushing branch '{}' from the mirror to {}", branch, descriptor.url());
        let to_remote = GitInvocation::in_dir(record.path())
            .arg("push")
            .secret_arg(
                descriptor.connection_url(credential),
                descriptor.redacted_url(credential),
            )
            .arg(format!("refs/heads/{branch}:refs/heads/{branch}"));
        let result = self.git().run(&to_remote)?;
        if !result.success() {
            return Err(Error::Push {
                hop: PushHop::MirrorToRemote,
                branch,
                command: to_remote.to_string(),
                stderr: descriptor.redact(result.stderr.trim(), credential),
            });
        }

        Ok(PushReport {
            branch,
            mirror_path: record.path().to_path_buf(),
        })
    }

    fn ensure_clean(&self, local: &Path) -> Result<()> {
        let status = GitInvocation::in_dir(local).arg("status").arg("--short");
        let result = self.git().run(&status)?;
        if !result.success() {
            return Err(Error::DirtyWorkingTree {
                path: local.to_path_buf(),
                details: format!("'{}' failed: {}", status, result.stderr.trim()),
            });
        }
        if !result.stdout.trim().is_empty() {
            return Err(Error::DirtyWorkingTree {
                path: local.to_path_buf(),
                details: result.stdout.trim_end().to_string(),
            });
        }
        Ok(())
    }

    fn current_branch(&self, local: &Path) -> Result<String> {
        let query = GitInvocation::in_dir(local)
            .arg("branch")
            .arg("--show-current");
        let result = self.git().run(&query)?;
        let branch = result.stdout.trim();
        if !result.success() || branch.is_empty() {
            return Err(Error::UnknownBranch {
                path: local.to_path_buf(),
            });
        }
        Ok(branch.to_string())
    }
}
