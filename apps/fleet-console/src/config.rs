// [[FLEET]]/apps/fleet-console/src/config.rs
// Purpose: Process configuration read from the environment, with defaults.
// Architecture: Application Boot
// Dependencies: std::env

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub bind: String,
    pub port: u16,
    /// Where the locale preference is persisted.
    pub preferences_file: PathBuf,
    /// Delay of every simulated backend call.
    pub simulated_latency: Duration,
    pub request_timeout: Duration,
    /// Number of generated monitoring log entries.
    pub log_count: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            preferences_file: PathBuf::from("./data/preferences.json"),
            simulated_latency: Duration::from_millis(800),
            request_timeout: Duration::from_millis(5000),
            log_count: 50,
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            bind: lookup("CONSOLE_BIND").unwrap_or(defaults.bind),
            port: parsed(&lookup, "CONSOLE_PORT", defaults.port),
            preferences_file: lookup("CONSOLE_LOCALE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.preferences_file),
            simulated_latency: Duration::from_millis(parsed(
                &lookup,
                "CONSOLE_SIMULATED_LATENCY_MS",
                defaults.simulated_latency.as_millis() as u64,
            )),
            request_timeout: Duration::from_millis(parsed(
                &lookup,
                "CONSOLE_REQUEST_TIMEOUT_MS",
                defaults.request_timeout.as_millis() as u64,
            )),
            log_count: parsed(&lookup, "CONSOLE_LOG_COUNT", defaults.log_count),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{}='{}' is not valid, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_and_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CONSOLE_PORT", "8088"),
            ("CONSOLE_SIMULATED_LATENCY_MS", "10"),
            ("CONSOLE_LOG_COUNT", "lots"),
        ]
        .into_iter()
        .collect();
        let config = ConsoleConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.port, 8088);
        assert_eq!(config.simulated_latency, Duration::from_millis(10));
        assert_eq!(config.log_count, 50);
        assert_eq!(config.request_timeout, Duration::from_millis(5000));
        assert_eq!(config.addr(), "0.0.0.0:8088");
    }
}
