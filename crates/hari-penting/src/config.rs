use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;

pub const DEFAULT_CALENDAR_URL: &str = "https://tanggalan.com/";
pub const DEFAULT_ENCYCLOPEDIA_URL: &str =
    "https://id.wikipedia.org/wiki/Daftar_hari_penting_di_Indonesia";
pub const DEFAULT_DB_PATH: &str = "hari_penting.db";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8056";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_DB: &str = "HARI_PENTING_DB";
const ENV_FETCH_TIMEOUT: &str = "HARI_PENTING_FETCH_TIMEOUT_SECS";
const ENV_DAILY_AT: &str = "HARI_PENTING_DAILY_AT";
const ENV_CALENDAR_URL: &str = "HARI_PENTING_CALENDAR_URL";
const ENV_ENCYCLOPEDIA_URL: &str = "HARI_PENTING_ENCYCLOPEDIA_URL";
const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds greater than 0, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} must be a time of day as HH:MM, got '{value}'")]
    InvalidTime { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub fetch_timeout: Duration,
    pub daily_at: NaiveTime,
    pub calendar_url: String,
    pub encyclopedia_url: String,
    pub bind_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            daily_at: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
            calendar_url: DEFAULT_CALENDAR_URL.to_string(),
            encyclopedia_url: DEFAULT_ENCYCLOPEDIA_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

fn non_empty(var: &'static str, value: String) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Empty { var });
    }
    Ok(value.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(value) = lookup(ENV_DB) {
            config.db_path = PathBuf::from(non_empty(ENV_DB, value)?);
        }
        if let Some(value) = lookup(ENV_FETCH_TIMEOUT) {
            let secs = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidTimeout {
                    var: ENV_FETCH_TIMEOUT,
                    value: value.clone(),
                })?;
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = lookup(ENV_DAILY_AT) {
            config.daily_at = NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
                ConfigError::InvalidTime {
                    var: ENV_DAILY_AT,
                    value: value.clone(),
                }
            })?;
        }
        if let Some(value) = lookup(ENV_CALENDAR_URL) {
            config.calendar_url = non_empty(ENV_CALENDAR_URL, value)?;
        }
        if let Some(value) = lookup(ENV_ENCYCLOPEDIA_URL) {
            config.encyclopedia_url = non_empty(ENV_ENCYCLOPEDIA_URL, value)?;
        }
        if let Some(value) = lookup(ENV_BIND_ADDRESS) {
            config.bind_address = non_empty(ENV_BIND_ADDRESS, value)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.daily_at, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("HARI_PENTING_DB", "/var/lib/hari/store.db"),
            ("HARI_PENTING_FETCH_TIMEOUT_SECS", "90"),
            ("HARI_PENTING_DAILY_AT", "06:30"),
            ("BIND_ADDRESS", "0.0.0.0:9000"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/hari/store.db"));
        assert_eq!(config.fetch_timeout, Duration::from_secs(90));
        assert_eq!(config.daily_at, NaiveTime::from_hms_opt(6, 30, 0).unwrap());
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.calendar_url, DEFAULT_CALENDAR_URL);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("HARI_PENTING_FETCH_TIMEOUT_SECS", "0")])),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("HARI_PENTING_DAILY_AT", "7am")])),
            Err(ConfigError::InvalidTime { .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("HARI_PENTING_DB", "  ")])),
            Err(ConfigError::Empty { .. })
        ));
    }
}
