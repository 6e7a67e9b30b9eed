//! # Push Command Implementation
//!
//! Pushes the current branch of a clean working tree to its mirror and from
//! the mirror to the remote. The secret options are optional here: without
//! them git's own credential helpers authenticate the second hop.

use anyhow::Result;
use cache_clone::cache::MirrorCache;
use cache_clone::credential::SecretRequest;
use clap::Args;

use super::{SecretStoreKind, TargetArgs};

/// Push the current branch through the mirror
#[derive(Args, Debug)]
pub struct PushArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Identifier of the secret holding the remote credential
    #[arg(
        short = 's',
        long,
        value_name = "ID",
        alias = "secretID",
        requires_all = ["user_key", "token_key"]
    )]
    pub secret_id: Option<String>,

    /// Field of the secret document holding the username
    #[arg(short = 'u', long, value_name = "KEY", alias = "userKey", requires = "secret_id")]
    pub user_key: Option<String>,

    /// Field of the secret document holding the token
    #[arg(short = 't', long, value_name = "KEY", alias = "tokenKey", requires = "secret_id")]
    pub token_key: Option<String>,

    /// Where the secret is stored
    #[arg(long, value_enum, default_value_t = SecretStoreKind::Aws)]
    pub secret_store: SecretStoreKind,
}

/// Execute the push command
pub fn execute(args: PushArgs) -> Result<()> {
    let settings = args.target.settings()?;

    let credential = match (args.secret_id, args.user_key, args.token_key) {
        (Some(secret_id), Some(username_key), Some(token_key)) => {
            let request = SecretRequest {
                secret_id,
                username_key,
                token_key,
            };
            Some(super::fetch(
                args.secret_store,
                &request,
                settings.command_timeout,
            )?)
        }
        _ => None,
    };

    let cache = MirrorCache::new(settings);
    let report =
        cache.push_repository(&args.target.remote, &args.target.local, credential.as_ref())?;

    println!(
        "Pushed branch '{}' from {} to {}",
        report.branch,
        args.target.local.display(),
        args.target.remote
    );
    Ok(())
}
