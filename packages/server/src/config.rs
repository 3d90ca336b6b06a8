//! Server configuration read from the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use locator_database::sqlite::DEFAULT_DB_PATH;
use locator_location::RecomputeMode;
use strum_macros::{AsRefStr, Display, EnumString};

/// Which [`LocationStore`](locator_location::LocationStore) backs the
/// server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StoreKind {
    /// `SQLite` file at [`ServerConfig::database_path`].
    #[default]
    Sqlite,
    /// Process-local map; contents are lost on exit.
    Memory,
}

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Store backend (`LOCATOR_STORE`).
    pub store: StoreKind,
    /// `SQLite` file location (`DATABASE_PATH`).
    pub database_path: PathBuf,
    /// Rating recomputation mode (`RATING_RECOMPUTE`).
    pub recompute: RecomputeMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            store: StoreKind::default(),
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            recompute: RecomputeMode::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Unset variables take their
    /// defaults; unparsable ones are logged and also take their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_or(&lookup, "PORT", defaults.port),
            store: parse_or(&lookup, "LOCATOR_STORE", defaults.store),
            database_path: lookup("DATABASE_PATH").map_or(defaults.database_path, PathBuf::from),
            recompute: parse_or(&lookup, "RATING_RECOMPUTE", defaults.recompute),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };

    raw.trim().parse().unwrap_or_else(|_| {
        log::warn!("Ignoring invalid {key}={raw:?}; using {default}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]), ServerConfig::default());
        assert_eq!(config(&[]).database_path, PathBuf::from("data/locations.db"));
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "3000"),
            ("LOCATOR_STORE", "Memory"),
            ("DATABASE_PATH", "/tmp/loc.db"),
            ("RATING_RECOMPUTE", "synchronous"),
        ]);

        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.database_path, PathBuf::from("/tmp/loc.db"));
        assert_eq!(config.recompute, RecomputeMode::Synchronous);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config(&[
            ("PORT", "eighty"),
            ("LOCATOR_STORE", "mongo"),
            ("RATING_RECOMPUTE", "later"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.recompute, RecomputeMode::Detached);
    }
}
