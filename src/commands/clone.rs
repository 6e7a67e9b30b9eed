//! # Clone Command Implementation
//!
//! Fetches the credential, brings the mirror up to date (creating it on first
//! use) and clones a working tree from it.

use anyhow::Result;
use cache_clone::cache::MirrorCache;
use cache_clone::credential::SecretRequest;
use cache_clone::mirror::SyncAction;
use clap::Args;

use super::{SecretStoreKind, TargetArgs};

/// Clone a repository through its mirror
#[derive(Args, Debug)]
pub struct CloneArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Identifier of the secret holding the remote credential
    #[arg(short = 's', long, value_name = "ID", alias = "secretID")]
    pub secret_id: String,

    /// Field of the secret document holding the username
    #[arg(short = 'u', long, value_name = "KEY", alias = "userKey")]
    pub user_key: String,

    /// Field of the secret document holding the token
    #[arg(short = 't', long, value_name = "KEY", alias = "tokenKey")]
    pub token_key: String,

    /// Where the secret is stored
    #[arg(long, value_enum, default_value_t = SecretStoreKind::Aws)]
    pub secret_store: SecretStoreKind,
}

/// Execute the clone command
pub fn execute(args: CloneArgs) -> Result<()> {
    let settings = args.target.settings()?;
    let request = SecretRequest {
        secret_id: args.secret_id,
        username_key: args.user_key,
        token_key: args.token_key,
    };
    let credential = super::fetch(args.secret_store, &request, settings.command_timeout)?;

    let cache = MirrorCache::new(settings);
    let report = cache.clone_repository(&args.target.remote, &args.target.local, &credential)?;

    let mirror = match report.action {
        SyncAction::Created => "created",
        SyncAction::Updated => "updated",
        SyncAction::AlreadyFresh => "reused",
    };
    println!(
        "Cloned {} into {} (mirror {} at {})",
        args.target.remote,
        report.local_path.display(),
        mirror,
        report.mirror_path.display()
    );
    Ok(())
}
