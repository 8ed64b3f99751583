//! Configuration management for Megaverse
//!
//! Settings are layered: built-in defaults, then an optional
//! `megaverse.toml`, then environment variables. The CLI applies its own
//! flags on top.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{MegaverseError, Result};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "megaverse.toml";

/// Environment variable holding the candidate identity
pub const CANDIDATE_ID_ENV: &str = "CROSSMINT_CANDIDATE_ID";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "MEGAVERSE_BASE_URL";

/// Process-level Megaverse configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MegaverseConfig {
    /// Root of the challenge REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Candidate identity embedded in every request
    #[serde(default)]
    pub candidate_id: Option<String>,

    /// Rate-limit retry settings
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Exponential backoff settings for rate-limited requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first try before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubled on each subsequent retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

// Default value providers
fn default_base_url() -> String {
    "https://challenge.crossmint.io/api".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl MegaverseConfig {
    /// Load configuration from a TOML file, or defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| {
                MegaverseError::Config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Load from file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::load_or_default(path)?;
        config.apply_env();
        Ok(config)
    }

    /// Overlay `CROSSMINT_CANDIDATE_ID` and `MEGAVERSE_BASE_URL` when set
    pub fn apply_env(&mut self) {
        if let Ok(candidate_id) = std::env::var(CANDIDATE_ID_ENV) {
            self.candidate_id = Some(candidate_id);
        }
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            self.base_url = base_url;
        }
    }

    /// Write the default configuration to `path`
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(&Self::default()).map_err(|e| {
            MegaverseError::Config(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Candidate identity, required before any remote call
    pub fn candidate_id(&self) -> Result<&str> {
        match self.candidate_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(MegaverseError::Config(format!(
                "No candidate id configured. Set {} in env.",
                CANDIDATE_ID_ENV
            ))),
        }
    }

    /// Check everything startup depends on
    pub fn validate(&self) -> Result<()> {
        self.candidate_id()?;
        if self.base_url.trim().is_empty() {
            return Err(MegaverseError::Config("Base URL is empty".to_string()));
        }
        Ok(())
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for MegaverseConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            candidate_id: None,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = MegaverseConfig::default();
        assert_eq!(config.base_url, "https://challenge.crossmint.io/api");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay(), Duration::from_millis(1000));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = MegaverseConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, MegaverseConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "candidate_id = \"abc-123\"\n\n[retry]\nbase_delay_ms = 250\n",
        )
        .unwrap();

        let config = MegaverseConfig::load_or_default(&path).unwrap();
        assert_eq!(config.candidate_id().unwrap(), "abc-123");
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.retry.max_retries, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "retry = 12").unwrap();

        assert!(matches!(
            MegaverseConfig::load_or_default(&path),
            Err(MegaverseError::Config(_))
        ));
    }

    #[test]
    fn test_write_default_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        MegaverseConfig::write_default(&path).unwrap();

        let loaded = MegaverseConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded, MegaverseConfig::default());
    }

    #[test]
    fn test_blank_candidate_id_rejected() {
        let config = MegaverseConfig {
            candidate_id: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.candidate_id(), Err(MegaverseError::Config(_))));
    }
}
