//! Configuration for Passbook vaults.
//!
//! TOML-deserializable structs with serde defaults, so a missing file or a
//! partial one degrades to a working local-only vault under the platform
//! data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::remote::retry::RetryConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Where the local store lives.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Sync service settings. Present = hybrid mode; absent = local-only.
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

/// Database configuration for SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the vault directory.
    pub path: PathBuf,
}

impl DatabaseConfig {
    /// Path to the vault database file.
    pub fn vault_db(&self) -> PathBuf {
        self.path.join("vault.db")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("passbook"),
        }
    }
}

/// Sync service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the hosted password service.
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry policy for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_timeout_secs() -> u64 {
    10
}

impl VaultConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            CoreError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|err| {
            CoreError::Config(format!("failed to parse {}: {err}", path.display()))
        })
    }

    /// True when a sync service is configured.
    pub fn is_hybrid(&self) -> bool {
        self.remote.is_some()
    }

    /// Key identifying this configuration in the shared-instance registry:
    /// one live vault per local path + remote target.
    pub fn cache_key(&self) -> String {
        match &self.remote {
            Some(remote) => format!("{}+{}", self.database.path.display(), remote.base_url),
            None => self.database.path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_local_only() {
        let config = VaultConfig::default();
        assert!(!config.is_hybrid());
        assert!(config.database.vault_db().ends_with("passbook/vault.db"));
    }

    #[test]
    fn test_parse_full_config() {
        let config: VaultConfig = toml::from_str(
            r#"
            [database]
            path = "/tmp/passbook-test"

            [remote]
            base_url = "https://sync.example.com/api"
            timeout_secs = 5

            [remote.retry]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert!(config.is_hybrid());
        let remote = config.remote.as_ref().unwrap();
        assert_eq!(remote.timeout_secs, 5);
        assert_eq!(remote.retry.max_attempts, 5);
        // Unspecified retry fields keep their defaults.
        assert_eq!(remote.retry.base_backoff_ms, 1000);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: VaultConfig = toml::from_str(
            r#"
            [remote]
            base_url = "https://sync.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.remote.as_ref().unwrap().timeout_secs, 10);
        assert_eq!(config.remote.as_ref().unwrap().retry.max_attempts, 3);
        assert_eq!(config.database.path, DatabaseConfig::default().path);
    }

    #[test]
    fn test_cache_keys_distinguish_configs() {
        let local = VaultConfig::default();
        let hybrid = VaultConfig {
            remote: Some(RemoteConfig {
                base_url: "https://sync.example.com".to_string(),
                timeout_secs: 10,
                retry: RetryConfig::default(),
            }),
            ..Default::default()
        };
        assert_ne!(local.cache_key(), hybrid.cache_key());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = VaultConfig::load("/nonexistent/passbook.toml").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
