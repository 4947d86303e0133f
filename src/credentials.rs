//! Hosting API token resolution.
//!
//! ```text
//! CredentialProvider (trait)
//!     |
//!     +-- EnvTokenProvider      GITHUB_TOKEN
//!     +-- TokenFileProvider     GITHUB_TOKEN_PATH or <checkout>/promote-token.txt
//!     +-- SecretStoreProvider   AWS Secrets Manager, GITHUB_TOKEN_SECRET_NAME
//!
//! CredentialChain tries providers in order and returns the first non-empty token.
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use secrecy::SecretString;

use crate::config::{CredentialSource, CredentialsConfig};
use crate::error::{PromoteError, Result};

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const TOKEN_PATH_ENV: &str = "GITHUB_TOKEN_PATH";
pub const SECRET_NAME_ENV: &str = "GITHUB_TOKEN_SECRET_NAME";
pub const DEFAULT_TOKEN_FILE: &str = "promote-token.txt";

/// A source of hosting API tokens.
pub trait CredentialProvider {
    /// Returns `Ok(None)` when this source has no token to offer.
    fn token(&self) -> Result<Option<SecretString>>;

    fn name(&self) -> &'static str;
}

fn non_empty(raw: &str) -> Option<SecretString> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(SecretString::from(trimmed.to_string()))
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

/// Token from an environment variable.
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        EnvTokenProvider { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(TOKEN_ENV)
    }
}

impl CredentialProvider for EnvTokenProvider {
    fn token(&self) -> Result<Option<SecretString>> {
        Ok(std::env::var(&self.var).ok().as_deref().and_then(non_empty))
    }

    fn name(&self) -> &'static str {
        "environment"
    }
}

/// Token read from a file.
pub struct TokenFileProvider {
    path: PathBuf,
}

impl TokenFileProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        TokenFileProvider {
            path: expand_home(path.as_ref()),
        }
    }

    /// `GITHUB_TOKEN_PATH`, falling back to `promote-token.txt`
    pub fn from_env() -> Self {
        let path = std::env::var(TOKEN_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string());
        Self::new(path)
    }

    /// Resolve a relative path against `base` instead of the working directory
    pub fn relative_to(mut self, base: &Path) -> Self {
        if self.path.is_relative() {
            self.path = base.join(&self.path);
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialProvider for TokenFileProvider {
    fn token(&self) -> Result<Option<SecretString>> {
        if !self.path.is_file() {
            tracing::debug!(path = %self.path.display(), "token file not found");
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            PromoteError::credentials(format!(
                "Cannot read token file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(non_empty(&contents))
    }

    fn name(&self) -> &'static str {
        "token file"
    }
}

/// Token stored as an AWS Secrets Manager secret, read through the `aws` CLI.
pub struct SecretStoreProvider {
    secret_id: Option<String>,
}

impl SecretStoreProvider {
    pub fn new(secret_id: impl Into<String>) -> Self {
        SecretStoreProvider {
            secret_id: Some(secret_id.into()),
        }
    }

    /// Secret named by `GITHUB_TOKEN_SECRET_NAME`, if set
    pub fn from_env() -> Self {
        SecretStoreProvider {
            secret_id: std::env::var(SECRET_NAME_ENV)
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }
}

impl CredentialProvider for SecretStoreProvider {
    fn token(&self) -> Result<Option<SecretString>> {
        let Some(secret_id) = &self.secret_id else {
            return Ok(None);
        };

        tracing::info!(secret_id = %secret_id, "reading token from secrets manager");
        let output = Command::new("aws")
            .args([
                "secretsmanager",
                "get-secret-value",
                "--secret-id",
                secret_id,
                "--query",
                "SecretString",
                "--output",
                "text",
            ])
            .output()
            .map_err(|e| PromoteError::credentials(format!("Cannot run aws CLI: {}", e)))?;

        if !output.status.success() {
            return Err(PromoteError::credentials(format!(
                "Secret '{}' lookup failed: {}",
                secret_id,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(non_empty(&String::from_utf8_lossy(&output.stdout)))
    }

    fn name(&self) -> &'static str {
        "secret store"
    }
}

/// Ordered list of providers; the first non-empty token wins.
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        CredentialChain { providers }
    }

    /// Providers selected by the `credentials` config table.
    ///
    /// Relative token paths are taken relative to `checkout`.
    pub fn from_config(config: &CredentialsConfig, checkout: &Path) -> Self {
        let file = || -> Box<dyn CredentialProvider> {
            let provider = match &config.token_path {
                Some(path) => TokenFileProvider::new(path),
                None => TokenFileProvider::from_env(),
            };
            Box::new(provider.relative_to(checkout))
        };
        let secret = || -> Box<dyn CredentialProvider> {
            match &config.secret_name {
                Some(name) => Box::new(SecretStoreProvider::new(name.clone())),
                None => Box::new(SecretStoreProvider::from_env()),
            }
        };

        let env = || -> Box<dyn CredentialProvider> { Box::new(EnvTokenProvider::default()) };

        let providers = match config.source {
            Some(CredentialSource::Env) => vec![env()],
            Some(CredentialSource::File) => vec![file()],
            Some(CredentialSource::SecretStore) => vec![secret()],
            None => vec![env(), file(), secret()],
        };
        Self::new(providers)
    }

    pub fn resolve(&self) -> Result<SecretString> {
        for provider in &self.providers {
            if let Some(token) = provider.token()? {
                tracing::info!(source = provider.name(), "resolved hosting token");
                return Ok(token);
            }
        }

        let tried: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        Err(PromoteError::credentials(format!(
            "No token found (tried: {}). Set {}, {} or {}",
            tried.join(", "),
            TOKEN_ENV,
            TOKEN_PATH_ENV,
            SECRET_NAME_ENV
        )))
    }
}
