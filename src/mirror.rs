//! # Bare mirrors on disk
//!
//! Every distinct remote maps to exactly one bare mirror at
//! `<mirror_root>/<host>/<path>`. That layout is the persisted state of the
//! whole tool, so [`resolve`] is a pure function of its inputs.
//!
//! A [`MirrorRecord`] tracks what one invocation has learned about a mirror:
//!
//! ```text
//! Unknown --check--> Absent --create--> Present { refreshed: true }
//!    |
//!    +-----check--> Present { refreshed: false } --fetch--> Present { refreshed: true }
//! ```
//!
//! Creation and update are mutually exclusive within a record: [`MirrorRecord::sync`]
//! checks once and then performs exactly one of them.
//!
//! Updates never prune. A branch pushed to the mirror whose second hop to the
//! remote failed stays in the mirror. A branch the mirror holds ahead of the
//! remote is reset to the remote's tip by the forced refspec, and the next
//! push sends it again from the working tree.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::git::{GitInvocation, GitRunner};
use crate::remote::RemoteDescriptor;

/// Resolve the mirror path for `remote` under `mirror_root`.
pub fn resolve(mirror_root: &Path, remote: &str) -> Result<PathBuf> {
    let descriptor = RemoteDescriptor::parse(remote)?;
    Ok(mirror_path_for(mirror_root, &descriptor))
}

/// Mirror path for an already parsed remote.
pub fn mirror_path_for(mirror_root: &Path, remote: &RemoteDescriptor) -> PathBuf {
    let mut path = mirror_root.join(remote.host());
    for segment in remote.path().split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

/// What the current invocation knows about a mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorState {
    /// Not checked yet.
    Unknown,
    /// Checked and found missing, ambiguous or corrupt.
    Absent,
    /// A valid bare repository. `refreshed` is set once it has been created or
    /// fetched during this invocation.
    Present { refreshed: bool },
}

/// Classified answer of the bare-repository check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BareCheck {
    Bare,
    Missing { exit_code: i32 },
    /// The check succeeded but did not answer `true` for the mirror path
    /// itself, e.g. because the path lies inside another repository.
    Ambiguous { output: String },
}

/// Which branch of the state machine [`MirrorRecord::sync`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Created,
    Updated,
    AlreadyFresh,
}

/// One mirror and what this invocation has learned about it.
#[derive(Debug, Clone)]
pub struct MirrorRecord {
    path: PathBuf,
    state: MirrorState,
}

impl MirrorRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: MirrorState::Unknown,
        }
    }

    pub fn resolve(mirror_root: &Path, remote: &RemoteDescriptor) -> Self {
        Self::new(mirror_path_for(mirror_root, remote))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> MirrorState {
        self.state
    }

    /// Ask git whether the mirror path holds a bare repository.
    ///
    /// Git searches parent directories for a repository, so a path nested
    /// inside another mirror would answer `true` for that mirror. The check
    /// therefore also asks for the repository's git dir and only accepts the
    /// mirror path itself.
    ///
    /// This always runs the check and does not touch the record's state.
    pub fn inspect(&self, git: &dyn GitRunner) -> Result<BareCheck> {
        let invocation = GitInvocation::in_dir(&self.path)
            .arg("rev-parse")
            .arg("--is-bare-repository")
            .arg("--absolute-git-dir");
        let result = git.run(&invocation)?;

        if !result.success() {
            return Ok(BareCheck::Missing {
                exit_code: result.exit_code,
            });
        }

        let mut lines = result.stdout.lines().map(|line| line.trim_end_matches('\r'));
        let (Some("true"), Some(git_dir), None) = (lines.next(), lines.next(), lines.next())
        else {
            return Ok(BareCheck::Ambiguous {
                output: result.stdout.trim().to_string(),
            });
        };

        // Git prints the canonical path of the repository it found.
        let expected = fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        if Path::new(git_dir) == expected {
            Ok(BareCheck::Bare)
        } else {
            Ok(BareCheck::Ambiguous {
                output: format!("enclosing repository {git_dir}"),
            })
        }
    }

    /// Whether the mirror is present. The answer is memoized for the lifetime
    /// of the record.
    pub fn check_present(&mut self, git: &dyn GitRunner) -> Result<bool> {
        match self.state {
            MirrorState::Present { .. } => return Ok(true),
            MirrorState::Absent => return Ok(false),
            MirrorState::Unknown => {}
        }

        debug!("Checking if mirror exists at {}", self.path.display());
        let present = match self.inspect(git)? {
            BareCheck::Bare => true,
            BareCheck::Missing { exit_code } => {
                debug!(
                    "No bare repository at {} (exit code {})",
                    self.path.display(),
                    exit_code
                );
                false
            }
            BareCheck::Ambiguous { output } => {
                warn!(
                    "Unexpected answer '{}' checking {}, treating the mirror as absent",
                    output,
                    self.path.display()
                );
                false
            }
        };

        self.state = if present {
            MirrorState::Present { refreshed: false }
        } else {
            MirrorState::Absent
        };
        Ok(present)
    }

    /// Create the mirror with a full `clone --mirror` of `remote`.
    ///
    /// The authenticated URL exists only for the clone command; afterwards the
    /// mirror's `origin` is reset to the plain URL so no credential stays in
    /// its config. A failed clone is not cleaned up.
    pub fn ensure_created(
        &mut self,
        git: &dyn GitRunner,
        remote: &RemoteDescriptor,
        credential: Option<&Credential>,
    ) -> Result<()> {
        if let MirrorState::Present { .. } = self.state {
            debug!("Mirror already present at {}", self.path.display());
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        info!("Creating mirror of {} at {}", remote.url(), self.path.display());
        let clone = GitInvocation::new()
            .arg("clone")
            .arg("--mirror")
            .secret_arg(
                remote.connection_url(credential),
                remote.redacted_url(credential),
            )
            .arg(&self.path);
        let result = git.run(&clone)?;
        if !result.success() {
            return Err(Error::MirrorCreate {
                path: self.path.clone(),
                command: clone.to_string(),
                stderr: remote.redact(result.stderr.trim(), credential),
            });
        }

        if credential.is_some() {
            let scrub = GitInvocation::in_dir(&self.path)
                .arg("remote")
                .arg("set-url")
                .arg("origin")
                .arg(remote.url());
            let result = git.run(&scrub)?;
            if !result.success() {
                return Err(Error::MirrorCreate {
                    path: self.path.clone(),
                    command: scrub.to_string(),
                    stderr: result.stderr.trim().to_string(),
                });
            }
        }

        self.state = MirrorState::Present { refreshed: true };
        Ok(())
    }

    /// Fetch every ref of `remote` into the mirror. A no-op when the mirror
    /// was already refreshed by this record.
    ///
    /// Refs the remote lacks are kept, so a branch that reached the mirror
    /// but not the remote survives until the next push.
    pub fn ensure_updated(
        &mut self,
        git: &dyn GitRunner,
        remote: &RemoteDescriptor,
        credential: Option<&Credential>,
    ) -> Result<()> {
        match self.state {
            MirrorState::Present { refreshed: true } => {
                debug!("Mirror at {} is already fresh", self.path.display());
                return Ok(());
            }
            MirrorState::Present { refreshed: false } => {}
            MirrorState::Unknown | MirrorState::Absent => {
                return Err(Error::MirrorMissing {
                    path: self.path.clone(),
                })
            }
        }

        info!("Updating mirror at {}", self.path.display());
        let fetch = GitInvocation::in_dir(&self.path)
            .arg("fetch")
            .secret_arg(
                remote.connection_url(credential),
                remote.redacted_url(credential),
            )
            .arg("+refs/*:refs/*");
        let result = git.run(&fetch)?;
        if !result.success() {
            return Err(Error::MirrorUpdate {
                path: self.path.clone(),
                command: fetch.to_string(),
                stderr: remote.redact(result.stderr.trim(), credential),
            });
        }

        self.state = MirrorState::Present { refreshed: true };
        Ok(())
    }

    /// Check, then create or update the mirror.
    pub fn sync(
        &mut self,
        git: &dyn GitRunner,
        remote: &RemoteDescriptor,
        credential: Option<&Credential>,
    ) -> Result<SyncAction> {
        if self.state == (MirrorState::Present { refreshed: true }) {
            return Ok(SyncAction::AlreadyFresh);
        }

        if self.check_present(git)? {
            self.ensure_updated(git, remote, credential)?;
            Ok(SyncAction::Updated)
        } else {
            self.ensure_created(git, remote, credential)?;
            Ok(SyncAction::Created)
        }
    }
}
