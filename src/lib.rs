//! # cache-clone
//!
//! This library keeps a local cache of bare repository mirrors so that
//! repeated clones of the same remote are served from disk instead of the
//! network. It is used by the `cache-clone` command-line tool, typically on
//! build agents that clone the same repositories over and over.
//!
//! ## Quick Example
//!
//! ```
//! use cache_clone::mirror;
//! use std::path::Path;
//!
//! let path = mirror::resolve(
//!     Path::new("/home/x/mirror"),
//!     "https://my.git.host/scm/group/project.git",
//! )
//! .unwrap();
//! assert_eq!(
//!     path,
//!     Path::new("/home/x/mirror/my.git.host/scm/group/project.git")
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Remotes (`remote`)**: Decomposes an HTTP(S) remote URL into the host and
//!   path that name its mirror, and builds authenticated connection URLs on
//!   demand.
//! - **Mirrors (`mirror`)**: Maps a remote to its bare mirror under the mirror
//!   root and drives the check / create / update state machine.
//! - **Credentials (`credential`)**: Fetches a username and token from a secret
//!   store. Only SHA-256 digests of them are ever logged.
//! - **Git (`git`, `process`)**: Every VCS primitive is a `git` subprocess run
//!   through the `GitRunner` seam, with an optional deadline.
//! - **Locking (`lock`)**: An advisory file lock per mirror serializes
//!   concurrent processes sharing a mirror root.
//!
//! ## Execution Flow
//!
//! [`cache::MirrorCache`] exposes the two operations:
//!
//! 1.  **Clone** (`clone_repository`): lock the mirror, create it with
//!     `clone --mirror` or refresh it with `fetch`, then clone a working tree
//!     from it.
//! 2.  **Push** (`push_repository`): check the working tree is clean, push its
//!     current branch to the mirror, then push that branch from the mirror to
//!     the remote.

pub mod cache;
pub mod clone;
pub mod config;
pub mod credential;
pub mod defaults;
pub mod error;
pub mod git;
pub mod lock;
pub mod mirror;
pub mod process;
pub mod push;
pub mod remote;

#[cfg(test)]
mod remote_proptest;
