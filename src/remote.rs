//! # Remote URL decomposition
//!
//! A remote such as `https://my.git.host/scm/group/project.git` is split into
//! its host (`my.git.host`) and repository path (`scm/group/project.git`).
//! Those two components determine where the bare mirror lives on disk, so the
//! decomposition must be strict: a URL without a scheme or host is rejected
//! outright rather than coerced into something that merely looks plausible.
//!
//! Credentials are never stored in a [`RemoteDescriptor`]. The authenticated
//! connection string is built on demand by [`RemoteDescriptor::connection_url`]
//! immediately before the one git command that needs it.

use url::Url;

use crate::credential::Credential;
use crate::error::{Error, Result};

const REDACTED: &str = "***";

/// A parsed HTTP(S) remote, reduced to what the mirror cache needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    host: String,
    path: String,
    url: Url,
}

impl RemoteDescriptor {
    /// Parse and validate a remote URL.
    ///
    /// The host keeps an explicit port (`host:8443`), and the path loses its
    /// leading and trailing slashes. Any userinfo present in `remote` is
    /// dropped.
    pub fn parse(remote: &str) -> Result<Self> {
        let mut url = Url::parse(remote).map_err(|e| malformed(remote, e.to_string()))?;

        match url.scheme() {
            "https" | "http" => {}
            other => {
                return Err(malformed(
                    remote,
                    format!("unsupported scheme '{other}', only http(s) remotes are supported"),
                ))
            }
        }

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            },
            _ => return Err(malformed(remote, "unable to determine host")),
        };

        let path = url.path().trim_matches('/').to_string();
        if path.is_empty() {
            return Err(malformed(remote, "unable to determine repository path"));
        }

        url = with_userinfo(url, "", None);

        Ok(Self { host, path, url })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Repository path without leading or trailing slashes.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The remote URL without any credentials.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// The URL git should connect to. With a credential, the username and
    /// token are embedded as userinfo.
    pub fn connection_url(&self, credential: Option<&Credential>) -> String {
        match credential {
            Some(credential) => with_userinfo(
                self.url.clone(),
                credential.username(),
                Some(credential.token()),
            )
            .to_string(),
            None => self.url.to_string(),
        }
    }

    /// The form of [`connection_url`](Self::connection_url) that is safe to
    /// log.
    pub fn redacted_url(&self, credential: Option<&Credential>) -> String {
        match credential {
            Some(_) => with_userinfo(self.url.clone(), REDACTED, None).to_string(),
            None => self.url.to_string(),
        }
    }

    /// Mask every occurrence of the credential's token in `text`, both raw and
    /// in the percent-encoded form it takes inside a connection URL.
    pub fn redact(&self, text: &str, credential: Option<&Credential>) -> String {
        let Some(credential) = credential else {
            return text.to_string();
        };
        if credential.token().is_empty() {
            return text.to_string();
        }

        let authenticated = with_userinfo(
            self.url.clone(),
            credential.username(),
            Some(credential.token()),
        );
        let mut redacted = text.replace(credential.token(), REDACTED);
        if let Some(encoded) = authenticated.password() {
            if !encoded.is_empty() {
                redacted = redacted.replace(encoded, REDACTED);
            }
        }
        redacted
    }
}

/// Decompose a remote URL into `(host, path)`.
///
/// Fails with [`Error::MalformedUrl`] when either component is missing; no
/// partial result is ever returned.
pub fn decompose(remote: &str) -> Result<(String, String)> {
    let descriptor = RemoteDescriptor::parse(remote)?;
    Ok((descriptor.host, descriptor.path))
}

fn malformed(url: &str, reason: impl Into<String>) -> Error {
    Error::MalformedUrl {
        url: url.to_string(),
        reason: reason.into(),
    }
}

// Setting userinfo only fails for URLs without a host, which `parse` rejects.
fn with_userinfo(mut url: Url, username: &str, password: Option<&str>) -> Url {
    let _ = url.set_username(username);
    let _ = url.set_password(password);
    url
}
