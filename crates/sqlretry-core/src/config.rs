use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{Backoff, CatalogClassifier, RetryPolicy, TransientErrorCatalog};

/// Which built-in transient-code table to start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogName {
    #[default]
    SqlServer,
    Sqlite,
    /// No codes; only timeouts are retried.
    None,
}

impl CatalogName {
    pub fn catalog(self) -> TransientErrorCatalog {
        match self {
            CatalogName::SqlServer => TransientErrorCatalog::sql_server(),
            CatalogName::Sqlite => TransientErrorCatalog::sqlite(),
            CatalogName::None => TransientErrorCatalog::empty(),
        }
    }
}

/// Invalid values in the `[retry]` section.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("retry.max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("retry.backoff_base must be at least 1")]
    ZeroBackoffBase,
}

/// Retry policy parameters (`[retry]` in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum number of attempts per call (including the first).
    pub max_attempts: u32,
    /// Exponential base: delay after attempt n is `backoff_unit_ms * base^n`.
    pub backoff_base: u32,
    /// Backoff unit in milliseconds (1000 = seconds).
    pub backoff_unit_ms: u64,
    /// Optional upper bound on any single delay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
    /// Built-in code table.
    pub catalog: CatalogName,
    /// Codes treated as transient in addition to the table.
    pub extra_transient_codes: Vec<i32>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: crate::retry::DEFAULT_MAX_ATTEMPTS,
            backoff_base: 2,
            backoff_unit_ms: 1000,
            max_delay_ms: None,
            catalog: CatalogName::default(),
            extra_transient_codes: Vec::new(),
        }
    }
}

impl RetrySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.backoff_base == 0 {
            return Err(ConfigError::ZeroBackoffBase);
        }
        Ok(())
    }

    pub fn catalog(&self) -> TransientErrorCatalog {
        self.catalog
            .catalog()
            .with_codes(self.extra_transient_codes.iter().copied())
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::Exponential {
            base: self.backoff_base,
            unit: Duration::from_millis(self.backoff_unit_ms),
            max_delay: self.max_delay_ms.map(Duration::from_millis),
        }
    }

    /// Build the policy described by these settings.
    pub fn policy(&self) -> Result<RetryPolicy<CatalogClassifier>, ConfigError> {
        self.validate()?;
        Ok(RetryPolicy::new(CatalogClassifier::new(self.catalog()))
            .with_max_attempts(self.max_attempts)
            .with_backoff(self.backoff()))
    }
}

/// Connection pool parameters (`[database]` in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self { max_connections: 8 }
    }
}

/// Global configuration loaded from `~/.config/sqlretry/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlRetryConfig {
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub database: DatabaseSettings,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sqlretry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SqlRetryConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SqlRetryConfig::default();
        let toml = to_toml_string(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Render configuration as it would be written to disk.
pub fn to_toml_string(cfg: &SqlRetryConfig) -> Result<String> {
    Ok(toml::to_string_pretty(cfg)?)
}

/// Load and validate configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<SqlRetryConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: SqlRetryConfig = toml::from_str(&data)?;
    cfg.retry.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = SqlRetryConfig::default();
        assert_eq!(cfg.retry.max_attempts, 4);
        assert_eq!(cfg.retry.backoff_base, 2);
        assert_eq!(cfg.retry.backoff_unit_ms, 1000);
        assert_eq!(cfg.retry.catalog, CatalogName::SqlServer);
        assert_eq!(cfg.database.max_connections, 8);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = SqlRetryConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SqlRetryConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: SqlRetryConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, SqlRetryConfig::default());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            [retry]
            max_attempts = 6
            backoff_base = 3
            backoff_unit_ms = 100
            max_delay_ms = 5000
            catalog = "sqlite"
            extra_transient_codes = [1, 99]

            [database]
            max_connections = 2
        "#;
        let cfg: SqlRetryConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.retry.max_attempts, 6);
        assert_eq!(cfg.retry.catalog, CatalogName::Sqlite);
        assert_eq!(cfg.database.max_connections, 2);

        let catalog = cfg.retry.catalog();
        assert!(catalog.contains(5));
        assert!(catalog.contains(99));

        let policy = cfg.retry.policy().unwrap();
        assert_eq!(policy.max_attempts(), 6);
        assert_eq!(policy.next_delay(1), Duration::from_millis(300));
        assert_eq!(policy.next_delay(2), Duration::from_millis(900));
        assert_eq!(policy.next_delay(5), Duration::from_millis(5000));
    }

    #[test]
    fn partial_retry_section_keeps_other_defaults() {
        let cfg: SqlRetryConfig = toml::from_str("[retry]\nmax_attempts = 2\n").unwrap();
        assert_eq!(cfg.retry.max_attempts, 2);
        assert_eq!(cfg.retry.backoff_base, 2);
        assert_eq!(cfg.retry.catalog, CatalogName::SqlServer);
    }

    #[test]
    fn invalid_values_rejected() {
        let mut s = RetrySettings::default();
        s.max_attempts = 0;
        assert_eq!(s.policy().unwrap_err(), ConfigError::ZeroAttempts);
        let mut s = RetrySettings::default();
        s.backoff_base = 0;
        assert_eq!(s.validate(), Err(ConfigError::ZeroBackoffBase));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[retry]\ncatalog = \"none\"\n").unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.retry.catalog, CatalogName::None);
        assert!(cfg.retry.catalog().is_empty());

        fs::write(&path, "[retry]\nmax_attempts = 0\n").unwrap();
        assert!(load_from_path(&path).is_err());
    }
}
