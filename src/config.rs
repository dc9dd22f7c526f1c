//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// App configuration, sourced from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the local libSQL database file.
    pub db_path: PathBuf,
    /// Path to the JSON file backing the secure store.
    pub secure_store_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/agrilink.db"),
            secure_store_path: PathBuf::from("./data/secure.json"),
        }
    }
}

impl AppConfig {
    /// Read config from `AGRILINK_DB_PATH` / `AGRILINK_SECURE_PATH`,
    /// falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            db_path: env_path("AGRILINK_DB_PATH", defaults.db_path)?,
            secure_store_path: env_path("AGRILINK_SECURE_PATH", defaults.secure_store_path)?,
        })
    }
}

fn env_path(key: &str, default: PathBuf) -> Result<PathBuf, ConfigError> {
    match std::env::var(key) {
        Ok(v) if v.trim().is_empty() => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "path is empty".into(),
        }),
        Ok(v) => Ok(PathBuf::from(v)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_env_unset() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./data/agrilink.db"));
        assert_eq!(config.secure_store_path, PathBuf::from("./data/secure.json"));
    }

    #[test]
    fn empty_path_rejected() {
        assert!(env_path("X", PathBuf::from("./x")).is_ok());
        // Simulate an explicitly empty value.
        std::env::set_var("AGRILINK_TEST_EMPTY", "  ");
        let err = env_path("AGRILINK_TEST_EMPTY", PathBuf::from("./x")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        std::env::remove_var("AGRILINK_TEST_EMPTY");
    }
}
