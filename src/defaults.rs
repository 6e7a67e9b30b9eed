//! Default values for cache-clone settings.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

/// How long to wait for another process to release a mirror lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(300);

/// Returns the default mirror root directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/cache-clone` (XDG Base Directory)
/// - macOS: `~/Library/Caches/cache-clone`
/// - Windows: `{FOLDERID_LocalAppData}\cache-clone`
///
/// Falls back to `.cache-clone/cache-clone` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--mirror` CLI flag or the
/// `CACHE_CLONE_MIRROR` environment variable.
pub fn default_mirror_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache-clone"))
        .join("cache-clone")
}
