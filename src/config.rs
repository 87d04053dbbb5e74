use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ROUTES_CSV: &str = "data/rutas.csv";
const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub port: u16,
    pub routes_csv: PathBuf,
    pub location_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            port: DEFAULT_PORT,
            routes_csv: PathBuf::from(DEFAULT_ROUTES_CSV),
            location_timeout: Duration::from_secs(DEFAULT_LOCATION_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Reads `.env` if there is one, then the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            api_url: lookup("API_URL").unwrap_or(defaults.api_url),
            port: parsed(&lookup, "PORT", defaults.port),
            routes_csv: lookup("ROUTES_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.routes_csv),
            location_timeout: Duration::from_secs(parsed(
                &lookup,
                "LOCATION_TIMEOUT_SECS",
                DEFAULT_LOCATION_TIMEOUT_SECS,
            )),
        }
    }
}

fn parsed<T: FromStr + Copy>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn reads_values_and_skips_garbage() {
        let env = HashMap::from([
            ("API_URL", "http://rutas.example:8080"),
            ("PORT", "not-a-port"),
            ("ROUTES_CSV", "/srv/rutas.csv"),
            ("LOCATION_TIMEOUT_SECS", " 5 "),
        ]);
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_url, "http://rutas.example:8080");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.routes_csv, PathBuf::from("/srv/rutas.csv"));
        assert_eq!(config.location_timeout, Duration::from_secs(5));
    }
}
