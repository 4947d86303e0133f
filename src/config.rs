use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::ReleaseChannel;
use crate::error::{PromoteError, Result};

/// Config file names looked up in the checkout, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["release_config.json", "release_config.toml"];

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Represents the complete release configuration.
///
/// Maps stage names to promotion targets and names the hosting repository.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Repository URL (`https://github.com/owner/name`) or `owner/name`
    pub repository: String,

    #[serde(default)]
    pub release_map: BTreeMap<String, StageConfig>,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// One promotion target.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StageConfig {
    pub source: String,
    pub destination: String,

    /// Releases at this stage are release candidates
    #[serde(default)]
    pub prerelease: bool,

    /// Stage whose latest release candidate this stage finalizes
    #[serde(default)]
    pub promotes_from: Option<String>,
}

impl StageConfig {
    pub fn channel(&self) -> ReleaseChannel {
        ReleaseChannel::for_stage(self.prerelease)
    }

    pub fn finalizes(&self) -> bool {
        self.promotes_from.is_some()
    }
}

/// Which credential source to use for the hosting token.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    Env,
    File,
    SecretStore,
}

/// Credential lookup settings.
///
/// With no `source` the environment, token file and secret store are tried in
/// that order.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub source: Option<CredentialSource>,

    /// Token file, overriding `GITHUB_TOKEN_PATH`
    #[serde(default)]
    pub token_path: Option<PathBuf>,

    /// Secret id, overriding `GITHUB_TOKEN_SECRET_NAME`
    #[serde(default)]
    pub secret_name: Option<String>,
}

fn default_remote() -> String {
    DEFAULT_REMOTE.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn repository_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:https?://[^/]+/|git@[^:]+:)?([^/\s:]+/[^/\s]+?)(?:\.git)?/?$")
            .expect("static regex")
    })
}

impl Config {
    /// Look up a stage by name
    pub fn stage(&self, name: &str) -> Result<&StageConfig> {
        self.release_map
            .get(name)
            .ok_or_else(|| PromoteError::UnknownStage(name.to_string()))
    }

    /// `owner/name` of the hosting repository
    pub fn repository_slug(&self) -> Result<String> {
        repository_pattern()
            .captures(self.repository.trim())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                PromoteError::config(format!(
                    "Cannot derive owner/name from repository '{}'",
                    self.repository
                ))
            })
    }

    /// Check stage references and branch names
    pub fn validate(&self) -> Result<()> {
        self.repository_slug()?;

        if self.release_map.is_empty() {
            return Err(PromoteError::config("release_map has no stages"));
        }

        for (name, stage) in &self.release_map {
            if stage.source.trim().is_empty() || stage.destination.trim().is_empty() {
                return Err(PromoteError::config(format!(
                    "Stage '{}' needs both a source and a destination branch",
                    name
                )));
            }
            if stage.source == stage.destination {
                return Err(PromoteError::config(format!(
                    "Stage '{}' promotes '{}' onto itself",
                    name, stage.source
                )));
            }
            if let Some(prior) = &stage.promotes_from {
                if prior == name {
                    return Err(PromoteError::config(format!(
                        "Stage '{}' cannot finalize its own releases",
                        name
                    )));
                }
                if !self.release_map.contains_key(prior) {
                    return Err(PromoteError::config(format!(
                        "Stage '{}' promotes from unknown stage '{}'",
                        name, prior
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Parse a config document; `.toml` files are TOML, anything else JSON.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config: Config = if is_toml {
        toml::from_str(contents)
            .map_err(|e| PromoteError::config(format!("{}: {}", path.display(), e)))?
    } else {
        serde_json::from_str(contents)
            .map_err(|e| PromoteError::config(format!("{}: {}", path.display(), e)))?
    };

    config.validate()?;
    Ok(config)
}

/// Loads the release configuration.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release_config.json` in the checkout
/// 3. `release_config.toml` in the checkout
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `checkout` - Root of the local repository
///
/// # Returns
/// * `Ok(Config)` - Loaded and validated configuration
/// * `Err` - If no file is found, or it cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>, checkout: &Path) -> Result<Config> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => CONFIG_FILE_NAMES
            .iter()
            .map(|name| checkout.join(name))
            .find(|candidate| candidate.exists())
            .ok_or_else(|| {
                PromoteError::config(format!(
                    "No {} found in {}",
                    CONFIG_FILE_NAMES.join(" or "),
                    checkout.display()
                ))
            })?,
    };

    tracing::debug!(path = %path.display(), "loading release config");
    let contents = fs::read_to_string(&path)?;
    parse_config(&contents, &path)
}
