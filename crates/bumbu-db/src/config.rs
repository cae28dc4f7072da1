//! # Store Configuration
//!
//! Settings for one shop terminal.
//!
//! ## Load Order (later overrides earlier)
//! 1. Built-in defaults
//! 2. `bumbu.toml` in the platform config dir, or the path given to [`StoreConfig::load`]
//! 3. `BUMBU_*` environment variables
//!
//! | Variable                 | Key                    | Default                   |
//! |--------------------------|------------------------|---------------------------|
//! | `BUMBU_DB_PATH`          | `database_path`        | `<app data dir>/bumbu.db` |
//! | `BUMBU_STORE_NAME`       | `store_name`           | `Toko Bumbu`              |
//! | `BUMBU_INVOICE_ATTEMPTS` | `max_invoice_attempts` | `5`                       |
//! | `BUMBU_TOP_PRODUCTS`     | `top_products`         | `10`                      |
//!
//! Keys missing from the file keep their defaults. Unparseable environment
//! values are logged and ignored.

use std::path::PathBuf;
use std::str::FromStr;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ledger::{LedgerConfig, DEFAULT_MAX_INVOICE_ATTEMPTS};
use crate::pool::DbConfig;

pub const ENV_DB_PATH: &str = "BUMBU_DB_PATH";
pub const ENV_STORE_NAME: &str = "BUMBU_STORE_NAME";
pub const ENV_INVOICE_ATTEMPTS: &str = "BUMBU_INVOICE_ATTEMPTS";
pub const ENV_TOP_PRODUCTS: &str = "BUMBU_TOP_PRODUCTS";

const DEFAULT_STORE_NAME: &str = "Toko Bumbu";
const DEFAULT_TOP_PRODUCTS: u32 = 10;
const DB_FILE_NAME: &str = "bumbu.db";
const CONFIG_FILE_NAME: &str = "bumbu.toml";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config could not be written: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("No config path available")]
    NoPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Store Config
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    /// Printed on receipts.
    pub store_name: String,
    pub max_invoice_attempts: u32,
    /// Rows in the top products / categories of a sales report.
    pub top_products: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: default_database_path(),
            store_name: DEFAULT_STORE_NAME.to_string(),
            max_invoice_attempts: DEFAULT_MAX_INVOICE_ATTEMPTS,
            top_products: DEFAULT_TOP_PRODUCTS,
        }
    }
}

impl StoreConfig {
    /// Defaults, then the config file if it exists, then the process
    /// environment.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// [`StoreConfig::load`] with the environment read through `lookup`.
    pub fn load_with(
        config_path: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        let mut config = StoreConfig::default();

        if let Some(path) = config_path.or_else(default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Loads config, or falls back to defaults plus the environment when the
    /// file cannot be read.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load store config, using defaults");
            Self::from_env()
        })
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns per variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = StoreConfig::default();
        config.apply_overrides(lookup);
        config
    }

    /// Writes the config as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Store config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_invoice_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_invoice_attempts must be at least 1".to_string(),
            ));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_path is empty".to_string()));
        }
        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
    }

    pub fn ledger(&self) -> LedgerConfig {
        LedgerConfig {
            max_invoice_attempts: self.max_invoice_attempts,
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = non_blank(lookup(ENV_DB_PATH)) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(name) = non_blank(lookup(ENV_STORE_NAME)) {
            self.store_name = name;
        }
        if let Some(attempts) = parse_var::<u32>(ENV_INVOICE_ATTEMPTS, lookup(ENV_INVOICE_ATTEMPTS)) {
            if attempts == 0 {
                warn!(var = ENV_INVOICE_ATTEMPTS, "Must be at least 1, ignoring");
            } else {
                self.max_invoice_attempts = attempts;
            }
        }
        if let Some(top) = parse_var::<u32>(ENV_TOP_PRODUCTS, lookup(ENV_TOP_PRODUCTS)) {
            self.top_products = top;
        }

        debug!(
            database_path = %self.database_path.display(),
            store_name = %self.store_name,
            max_invoice_attempts = self.max_invoice_attempts,
            top_products = self.top_products,
            "Store configuration loaded"
        );
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("id", "bumbu", "bumbu-pos")
}

/// `<platform data dir>/bumbu.db`, or `./bumbu.db` when the platform has no
/// home directory.
pub fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
}

/// `<platform config dir>/bumbu.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(var: &str, value: Option<String>) -> Option<T> {
    let raw = non_blank(value)?;
    match raw.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(var = var, value = %raw, "Invalid value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[]));

        assert_eq!(config.store_name, "Toko Bumbu");
        assert_eq!(config.max_invoice_attempts, 5);
        assert_eq!(config.top_products, 10);
        assert!(config.database_path.ends_with("bumbu.db"));
        assert_eq!(config.ledger(), LedgerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/toko.db"),
            (ENV_STORE_NAME, "Bumbu Bu Sri"),
            (ENV_INVOICE_ATTEMPTS, "8"),
            (ENV_TOP_PRODUCTS, " 3 "),
        ]));

        assert_eq!(config.database_path, PathBuf::from("/tmp/toko.db"));
        assert_eq!(config.store_name, "Bumbu Bu Sri");
        assert_eq!(config.ledger().max_invoice_attempts, 8);
        assert_eq!(config.top_products, 3);
        assert_eq!(config.db_config().database_path, PathBuf::from("/tmp/toko.db"));
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let config = StoreConfig::from_lookup(lookup(&[
            (ENV_STORE_NAME, "   "),
            (ENV_INVOICE_ATTEMPTS, "0"),
            (ENV_TOP_PRODUCTS, "many"),
        ]));

        assert_eq!(config.store_name, "Toko Bumbu");
        assert_eq!(config.max_invoice_attempts, 5);
        assert_eq!(config.top_products, 10);
    }

    #[test]
    fn test_file_layer_under_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bumbu.toml");
        std::fs::write(
            &path,
            "store_name = \"Bumbu Bu Sri\"\ntop_products = 3\ndatabase_path = \"/srv/toko.db\"\n",
        )
        .unwrap();

        let config =
            StoreConfig::load_with(Some(path), lookup(&[(ENV_TOP_PRODUCTS, "7")])).unwrap();

        assert_eq!(config.store_name, "Bumbu Bu Sri");
        assert_eq!(config.database_path, PathBuf::from("/srv/toko.db"));
        assert_eq!(config.top_products, 7);
        assert_eq!(config.max_invoice_attempts, 5);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            StoreConfig::load_with(Some(dir.path().join("absent.toml")), lookup(&[])).unwrap();

        assert_eq!(config, StoreConfig::from_lookup(lookup(&[])));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("bumbu.toml");
        let config = StoreConfig {
            database_path: PathBuf::from("/srv/toko.db"),
            store_name: "Toko Rempah".to_string(),
            max_invoice_attempts: 9,
            top_products: 4,
        };

        config.save(Some(path.clone())).unwrap();
        assert!(path.exists());

        let loaded = StoreConfig::load_with(Some(path), lookup(&[])).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_bad_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bumbu.toml");

        std::fs::write(&path, "store_name = [unclosed").unwrap();
        let err = StoreConfig::load_with(Some(path.clone()), lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let fallback = StoreConfig::load_or_default(Some(path.clone()));
        assert_eq!(fallback, StoreConfig::from_env());

        std::fs::write(&path, "max_invoice_attempts = 0\n").unwrap();
        let err = StoreConfig::load_with(Some(path), lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
