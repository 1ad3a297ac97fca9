use std::net::SocketAddr;

use anyhow::Context;
use stockdice_core::StockdiceConfig;

pub const LISTEN_ADDR: &str = "SD_LISTEN_ADDR";
pub const REFRESH_ENABLED: &str = "SD_REFRESH_ENABLED";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Server settings layered over the shared [`StockdiceConfig`].
#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Run the background refresh loop. Requires `FMP_API_KEY`.
    pub refresh_enabled: bool,
    pub core: StockdiceConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let raw_addr = get(LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = raw_addr
            .trim()
            .parse()
            .with_context(|| format!("{}='{}' is not a socket address", LISTEN_ADDR, raw_addr))?;

        let refresh_enabled = match get(REFRESH_ENABLED) {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("{}='{}' is not a boolean", REFRESH_ENABLED, raw))?,
            None => true,
        };

        Ok(Self {
            listen_addr,
            refresh_enabled,
            core: StockdiceConfig::from_lookup(&lookup)?,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert!(config.refresh_enabled);
        assert_eq!(config.core.fmp_api_key, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (LISTEN_ADDR, "127.0.0.1:9000"),
            (REFRESH_ENABLED, "off"),
            ("SD_MAX_AGE", "2h"),
        ])
        .unwrap();
        assert_eq!(config.listen_addr.port(), 9000);
        assert!(!config.refresh_enabled);
        assert_eq!(config.core.max_age, std::time::Duration::from_secs(7200));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[(LISTEN_ADDR, "not-an-address")]).is_err());
        assert!(config_from(&[(REFRESH_ENABLED, "maybe")]).is_err());
        assert!(config_from(&[("SD_BACKUP_INTERVAL", "10 minutes")]).is_err());
    }
}
