//! Startup configuration, read once from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{Error, Result};
use crate::utils::parse_duration;

pub const FMP_API_KEY: &str = "FMP_API_KEY";
pub const REQUESTS_PER_MINUTE: &str = "SD_REQUESTS_PER_MINUTE";
pub const MAX_AGE: &str = "SD_MAX_AGE";
pub const MIN_BACKOFF: &str = "SD_MIN_BACKOFF";
pub const DB_PATH: &str = "SD_DB_PATH";
pub const REPLICA_PATH: &str = "SD_REPLICA_PATH";
pub const BACKUP_INTERVAL: &str = "SD_BACKUP_INTERVAL";

const DEFAULT_REQUESTS_PER_MINUTE: f64 = 300.0;
const DEFAULT_MAX_AGE: &str = "60m";
const DEFAULT_MIN_BACKOFF: &str = "5s";
const DEFAULT_DB_PATH: &str = "./data/stockdice.sqlite";
const DEFAULT_REPLICA_FILE: &str = "stockdice_backup.sqlite";
const DEFAULT_BACKUP_INTERVAL: &str = "10m";

#[derive(Clone, Debug, PartialEq)]
pub struct StockdiceConfig {
    /// Only needed to refresh; rolling works from the local store alone.
    pub fmp_api_key: Option<String>,
    pub requests_per_minute: f64,
    pub max_age: Duration,
    pub min_backoff: Duration,
    pub db_path: PathBuf,
    pub replica_path: PathBuf,
    pub backup_interval: Duration,
}

impl StockdiceConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let requests_per_minute = match get(REQUESTS_PER_MINUTE) {
            Some(raw) => {
                let value: f64 = raw.trim().parse().map_err(|_| {
                    Error::InvalidConfigValue(format!("{}='{}' is not a number", REQUESTS_PER_MINUTE, raw))
                })?;
                if !value.is_finite() || value <= 0.0 {
                    return Err(Error::InvalidConfigValue(format!(
                        "{} must be positive, got {}",
                        REQUESTS_PER_MINUTE, raw
                    )));
                }
                value
            }
            None => DEFAULT_REQUESTS_PER_MINUTE,
        };

        let duration = |key: &str, default: &str| -> Result<Duration> {
            let raw = get(key).unwrap_or_else(|| default.to_string());
            parse_duration(&raw)
                .map_err(|_| Error::InvalidConfigValue(format!("{}='{}' is not a duration", key, raw)))
        };

        let db_path = PathBuf::from(get(DB_PATH).unwrap_or_else(|| DEFAULT_DB_PATH.to_string()));
        let replica_path = match get(REPLICA_PATH) {
            Some(path) => PathBuf::from(path),
            None => default_replica_path(&db_path),
        };

        Ok(Self {
            fmp_api_key: get(FMP_API_KEY).map(|key| key.trim().to_string()),
            requests_per_minute,
            max_age: duration(MAX_AGE, DEFAULT_MAX_AGE)?,
            min_backoff: duration(MIN_BACKOFF, DEFAULT_MIN_BACKOFF)?,
            db_path,
            replica_path,
            backup_interval: duration(BACKUP_INTERVAL, DEFAULT_BACKUP_INTERVAL)?,
        })
    }

    /// The provider API key, required by every refresh.
    pub fn require_fmp_api_key(&self) -> Result<&str> {
        self.fmp_api_key
            .as_deref()
            .ok_or_else(|| Error::MissingConfigKey(FMP_API_KEY.to_string()))
    }
}

fn default_replica_path(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_REPLICA_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<StockdiceConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StockdiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.fmp_api_key, None);
        assert_eq!(config.requests_per_minute, 300.0);
        assert_eq!(config.max_age, Duration::from_secs(3600));
        assert_eq!(config.min_backoff, Duration::from_secs(5));
        assert_eq!(config.db_path, PathBuf::from("./data/stockdice.sqlite"));
        assert_eq!(config.replica_path, PathBuf::from("./data/stockdice_backup.sqlite"));
        assert_eq!(config.backup_interval, Duration::from_secs(600));
        assert!(matches!(
            config.require_fmp_api_key(),
            Err(Error::MissingConfigKey(key)) if key == FMP_API_KEY
        ));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            (FMP_API_KEY, " abc "),
            (REQUESTS_PER_MINUTE, "750"),
            (MAX_AGE, "1d"),
            (DB_PATH, "/var/lib/stockdice/db.sqlite"),
        ])
        .unwrap();
        assert_eq!(config.require_fmp_api_key().unwrap(), "abc");
        assert_eq!(config.requests_per_minute, 750.0);
        assert_eq!(config.max_age, Duration::from_secs(86400));
        assert_eq!(
            config.replica_path,
            PathBuf::from("/var/lib/stockdice/stockdice_backup.sqlite")
        );
    }

    #[test]
    fn test_malformed_values_are_configuration_errors() {
        assert!(config(&[(MAX_AGE, "an hour")]).unwrap_err().is_configuration());
        assert!(config(&[(REQUESTS_PER_MINUTE, "0")]).unwrap_err().is_configuration());
        assert!(config(&[(REQUESTS_PER_MINUTE, "fast")]).unwrap_err().is_configuration());
    }
}
