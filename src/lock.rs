//! Advisory locking of a mirror across processes.
//!
//! Concurrent build agents sharing a mirror root would otherwise race to
//! create the same mirror or interleave fetches and pushes against it. Each
//! mirror gets a sibling `<mirror>.lock` file; holding an exclusive `flock`
//! on it serializes every operation on that mirror. The lock is released when
//! the [`MirrorLock`] is dropped, so every exit path, including `?`, unlocks.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use log::{debug, info, warn};

use crate::error::{Error, Result};

const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// An exclusive advisory lock on one mirror.
#[derive(Debug)]
pub struct MirrorLock {
    file: File,
    path: PathBuf,
}

impl MirrorLock {
    /// Path of the lock file guarding `mirror_path`.
    pub fn lock_path(mirror_path: &Path) -> PathBuf {
        let mut path = mirror_path.as_os_str().to_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    /// Take the lock for `mirror_path`, waiting up to `timeout` for another
    /// holder to release it.
    pub fn acquire(mirror_path: &Path, timeout: Duration) -> Result<Self> {
        let path = Self::lock_path(mirror_path);
        let lock_error = |message: String| Error::Lock {
            path: path.clone(),
            message,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| lock_error(format!("unable to create lock directory: {e}")))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| lock_error(format!("unable to open lock file: {e}")))?;

        let start = Instant::now();
        let mut waiting = false;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!("Acquired mirror lock {}", path.display());
                    return Ok(Self { file, path });
                }
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    if start.elapsed() >= timeout {
                        return Err(lock_error(format!(
                            "timed out after {}s waiting for another process to release it",
                            timeout.as_secs()
                        )));
                    }
                    if !waiting {
                        info!(
                            "Waiting for another process to release {}",
                            path.display()
                        );
                        waiting = true;
                    }
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => return Err(lock_error(e.to_string())),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for MirrorLock {
    fn drop(&mut self) {
        match FileExt::unlock(&self.file) {
            Ok(()) => debug!("Released mirror lock {}", self.path.display()),
            Err(e) => warn!("Failed to release mirror lock {}: {}", self.path.display(), e),
        }
    }
}
