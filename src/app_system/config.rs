use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontConfig {
    pub api_url: String,
    /// Where the logged-in session is persisted. `None` keeps it in memory.
    pub session_file: Option<PathBuf>,
    pub request_timeout: Duration,
    pub channel_buffer: usize,
    pub auto_sync: bool,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: None,
            request_timeout: Duration::from_millis(10_000),
            channel_buffer: 32,
            auto_sync: true,
        }
    }
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let request_timeout = match read("STOREFRONT_REQUEST_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(parse_number("STOREFRONT_REQUEST_TIMEOUT_MS", raw)?),
            None => defaults.request_timeout,
        };
        let channel_buffer = match read("STOREFRONT_CHANNEL_BUFFER") {
            Some(raw) => match parse_number::<usize>("STOREFRONT_CHANNEL_BUFFER", raw.clone())? {
                0 => {
                    return Err(ConfigError::InvalidValue {
                        key: "STOREFRONT_CHANNEL_BUFFER",
                        value: raw,
                    })
                }
                n => n,
            },
            None => defaults.channel_buffer,
        };
        let auto_sync = match read("STOREFRONT_AUTO_SYNC") {
            Some(raw) => parse_flag("STOREFRONT_AUTO_SYNC", raw)?,
            None => defaults.auto_sync,
        };

        Ok(Self {
            api_url: read("STOREFRONT_API_URL").unwrap_or(defaults.api_url),
            session_file: read("STOREFRONT_SESSION_FILE").map(PathBuf::from),
            request_timeout,
            channel_buffer,
            auto_sync,
        })
    }
}

fn parse_number<T: FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.parse()
        .map_err(|_| ConfigError::InvalidValue { key, value: raw })
}

fn parse_flag(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StorefrontConfig::default());
        assert_eq!(config.api_url, "http://localhost:8000/api");
    }

    #[test]
    fn reads_every_key() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("STOREFRONT_API_URL", "https://shop.example/api"),
            ("STOREFRONT_SESSION_FILE", "/tmp/session.json"),
            ("STOREFRONT_REQUEST_TIMEOUT_MS", "2500"),
            ("STOREFRONT_CHANNEL_BUFFER", "8"),
            ("STOREFRONT_AUTO_SYNC", "off"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://shop.example/api");
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/session.json")));
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.channel_buffer, 8);
        assert!(!config.auto_sync);
    }

    #[test]
    fn rejects_bad_numbers_and_flags() {
        assert_eq!(
            StorefrontConfig::from_lookup(lookup(&[("STOREFRONT_REQUEST_TIMEOUT_MS", "soon")])),
            Err(ConfigError::InvalidValue {
                key: "STOREFRONT_REQUEST_TIMEOUT_MS",
                value: "soon".to_string()
            })
        );
        let zero_buffer = lookup(&[("STOREFRONT_CHANNEL_BUFFER", "0")]);
        assert!(StorefrontConfig::from_lookup(zero_buffer).is_err());
        let bad_flag = lookup(&[("STOREFRONT_AUTO_SYNC", "maybe")]);
        assert!(StorefrontConfig::from_lookup(bad_flag).is_err());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config =
            StorefrontConfig::from_lookup(lookup(&[("STOREFRONT_API_URL", "  ")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
