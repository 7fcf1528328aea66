use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
pub const FRED_API_KEY_VAR: &str = "FRED_API_KEY";

/// Process settings, read once at startup.
/// The FRED key is deliberately absent: it is looked up on every fetch.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub fred_base_url: String,
    pub fred_timeout: Duration,
    pub sweep_interval: Duration,
    /// Overrides the per-indicator TTL when set.
    pub cache_ttl: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1314,
            fred_base_url: DEFAULT_FRED_BASE_URL.to_string(),
            fred_timeout: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(60),
            cache_ttl: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            host: non_empty("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_or("SERVER_PORT", non_empty("SERVER_PORT"), defaults.port),
            fred_base_url: non_empty("FRED_BASE_URL").unwrap_or(defaults.fred_base_url),
            fred_timeout: Duration::from_secs(parse_or(
                "FRED_TIMEOUT_SECS",
                non_empty("FRED_TIMEOUT_SECS"),
                defaults.fred_timeout.as_secs(),
            )),
            sweep_interval: Duration::from_secs(
                parse_or(
                    "CACHE_SWEEP_SECS",
                    non_empty("CACHE_SWEEP_SECS"),
                    defaults.sweep_interval.as_secs(),
                )
                .max(1),
            ),
            cache_ttl: non_empty("CACHE_TTL_SECS").and_then(|raw| match raw.parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    warn!(variable = "CACHE_TTL_SECS", value = %raw, "Ignoring unparseable value");
                    None
                }
            }),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr + Copy>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %value, "Unparseable value, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = settings_from(&[]);
        assert_eq!(settings.bind_addr(), "127.0.0.1:1314");
        assert_eq!(settings.fred_base_url, DEFAULT_FRED_BASE_URL);
        assert_eq!(settings.sweep_interval, Duration::from_secs(60));
        assert!(settings.cache_ttl.is_none());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let settings = settings_from(&[
            ("SERVER_HOST", "0.0.0.0"),
            ("SERVER_PORT", "not-a-port"),
            ("CACHE_TTL_SECS", "3600"),
            ("CACHE_SWEEP_SECS", "0"),
        ]);
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 1314);
        assert_eq!(settings.cache_ttl, Some(Duration::from_secs(3600)));
        assert_eq!(settings.sweep_interval, Duration::from_secs(1));
    }
}
