//! # Remote credentials
//!
//! Credentials come from a structured secret document (a JSON object) held in
//! a secret store. Two configured field keys select the username and token
//! from that document.
//!
//! ## Stores
//!
//! - **`AwsCliSecretStore`**: reads an AWS Secrets Manager secret through the
//!   `aws` CLI, so the ambient AWS configuration (profiles, SSO, instance
//!   roles) applies unchanged.
//! - **`FileSecretStore`**: treats the secret identifier as the path of a
//!   JSON file. Useful on hosts without AWS access and in tests.
//!
//! ## Troubleshooting without leaking
//!
//! Every [`Credential`] carries SHA-256 digests of the secret document, the
//! username and the token. Those digests are what gets logged, so two hosts
//! can compare whether they see the same secret without either printing it.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use log::debug;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::process;

/// Lowercase hex SHA-256 of `value`.
pub fn sha256_hex(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}

/// One-way digests used only for logging and troubleshooting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDigests {
    /// Digest of the whole secret document, when the credential came from one.
    pub document: Option<String>,
    pub username: String,
    pub token: String,
}

/// A username/token pair for an HTTPS remote.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    token: String,
    digests: CredentialDigests,
}

impl Credential {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self::build(username.into(), token.into(), None)
    }

    /// Extract a credential from a JSON secret document.
    ///
    /// The document must be a JSON object whose `username_key` and
    /// `token_key` fields are non-empty strings.
    pub fn from_document(
        document: &str,
        secret_id: &str,
        username_key: &str,
        token_key: &str,
    ) -> Result<Self> {
        let fields: HashMap<String, Value> =
            serde_json::from_str(document).map_err(|e| Error::CredentialFetch {
                secret_id: secret_id.to_string(),
                message: format!("secret document is not a JSON object: {e}"),
            })?;

        let field = |key: &str| -> Result<String> {
            match fields.get(key).and_then(Value::as_str) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(Error::CredentialFetch {
                    secret_id: secret_id.to_string(),
                    message: format!("field '{key}' is missing, empty or not a string"),
                }),
            }
        };

        let username = field(username_key)?;
        let token = field(token_key)?;
        Ok(Self::build(username, token, Some(sha256_hex(document))))
    }

    fn build(username: String, token: String, document: Option<String>) -> Self {
        let digests = CredentialDigests {
            document,
            username: sha256_hex(&username),
            token: sha256_hex(&token),
        };
        Self {
            username,
            token,
            digests,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn digests(&self) -> &CredentialDigests {
        &self.digests
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username_sha256", &self.digests.username)
            .field("token_sha256", &self.digests.token)
            .finish()
    }
}

/// Where to find a credential: the secret and the two field keys inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRequest {
    pub secret_id: String,
    pub username_key: String,
    pub token_key: String,
}

/// A source of secret documents.
pub trait SecretStore {
    /// Return the raw secret document stored under `secret_id`.
    fn fetch_document(&self, secret_id: &str) -> Result<String>;
}

/// Reads secrets from AWS Secrets Manager via the `aws` CLI.
#[derive(Debug, Clone)]
pub struct AwsCliSecretStore {
    program: String,
    timeout: Option<Duration>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetSecretValueOutput {
    secret_string: Option<String>,
}

impl AwsCliSecretStore {
    pub fn new() -> Self {
        Self {
            program: "aws".to_string(),
            timeout: None,
        }
    }

    /// Use a different executable in place of `aws`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for AwsCliSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for AwsCliSecretStore {
    fn fetch_document(&self, secret_id: &str) -> Result<String> {
        let fail = |message: String| Error::CredentialFetch {
            secret_id: secret_id.to_string(),
            message,
        };

        let mut command = Command::new(&self.program);
        command.args([
            "secretsmanager",
            "get-secret-value",
            "--secret-id",
            secret_id,
            "--output",
            "json",
        ]);
        let display = format!(
            "{} secretsmanager get-secret-value --secret-id {}",
            self.program, secret_id
        );

        debug!("Getting the secret document from AWS Secrets Manager");
        let result = process::run(command, &display, self.timeout)?;
        if !result.success() {
            return Err(fail(format!(
                "'{}' exited with {}: {}",
                display,
                result.exit_code,
                result.stderr.trim()
            )));
        }

        let output: GetSecretValueOutput = serde_json::from_str(&result.stdout)
            .map_err(|e| fail(format!("unexpected get-secret-value output: {e}")))?;
        output
            .secret_string
            .ok_or_else(|| fail("secret has no SecretString (binary secrets are not supported)".to_string()))
    }
}

/// Reads secret documents from local JSON files; the secret id is the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSecretStore;

impl SecretStore for FileSecretStore {
    fn fetch_document(&self, secret_id: &str) -> Result<String> {
        fs::read_to_string(Path::new(secret_id)).map_err(|e| Error::CredentialFetch {
            secret_id: secret_id.to_string(),
            message: format!("unable to read secret file: {e}"),
        })
    }
}

/// Fetch a secret document and extract the credential it describes.
pub fn fetch_credential(store: &dyn SecretStore, request: &SecretRequest) -> Result<Credential> {
    let document = store.fetch_document(&request.secret_id)?;
    debug!("Unmarshalling credentials from secret '{}'", request.secret_id);
    let credential = Credential::from_document(
        &document,
        &request.secret_id,
        &request.username_key,
        &request.token_key,
    )?;

    let digests = credential.digests();
    if let Some(document) = &digests.document {
        debug!("Secret JSON document (sha256): {}", document);
    }
    debug!("Username (sha256): {}", digests.username);
    debug!("Token (sha256): {}", digests.token);
    Ok(credential)
}
