//! Application configuration loaded from environment variables.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use common::MitraId;
use thiserror::Error;

use crate::auth::Credentials;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        })
    }
}

/// Server configuration.
///
/// Reads from environment variables:
/// - `HOST`, `PORT`: bind address (default `0.0.0.0:3000`)
/// - `APP_ENV`: `development`, `production` or `test` (default `development`)
/// - `LOG_LEVEL`: tracing filter when `RUST_LOG` is unset (default `info`)
/// - `DEBUG`: enables query analysis, timings and `/debug`
/// - `ADMIN_USER`, `ADMIN_PASSWORD`: admin credentials, required
/// - `MITRA_USER`, `MITRA_PASSWORD`: mitra credentials (default `mitra_admin`/`password`)
/// - `MITRA_ID`: binds the mitra account to one mitra profile
/// - `DATABASE_PATH`: SQLite file or `:memory:` (default `data.db`)
/// - `SLOW_QUERY_MS`: slow query threshold (default `100`)
/// - `MEMORY_MONITOR_INTERVAL_SECS`: memory sampling period (default `60`)
/// - `STATIC_DIR`: front-end directory (default `public`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub debug: bool,
    pub admin: Credentials,
    pub mitra: Credentials,
    pub mitra_id: Option<MitraId>,
    pub database_path: String,
    pub slow_query_threshold: Duration,
    pub memory_monitor_interval: Duration,
    pub static_dir: PathBuf,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let debug = match var("DEBUG") {
            None => false,
            Some(value) => parse_bool("DEBUG", &value)?,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", var("PORT"), 3000)?,
            environment: match var("APP_ENV") {
                None => Environment::Development,
                Some(value) => value.parse().map_err(|()| ConfigError::Invalid {
                    name: "APP_ENV",
                    value,
                })?,
            },
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            debug,
            admin: Credentials::new(required("ADMIN_USER")?, required("ADMIN_PASSWORD")?),
            mitra: Credentials::new(
                var("MITRA_USER").unwrap_or_else(|| "mitra_admin".to_string()),
                var("MITRA_PASSWORD").unwrap_or_else(|| "password".to_string()),
            ),
            mitra_id: var("MITRA_ID")
                .map(|value| parse_or("MITRA_ID", Some(value), 0).map(MitraId::new))
                .transpose()?,
            database_path: var("DATABASE_PATH").unwrap_or_else(|| "data.db".to_string()),
            slow_query_threshold: Duration::from_millis(parse_or(
                "SLOW_QUERY_MS",
                var("SLOW_QUERY_MS"),
                100,
            )?),
            memory_monitor_interval: Duration::from_secs(parse_or(
                "MEMORY_MONITOR_INTERVAL_SECS",
                var("MEMORY_MONITOR_INTERVAL_SECS"),
                60,
            )?),
            static_dir: PathBuf::from(var("STATIC_DIR").unwrap_or_else(|| "public".to_string())),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The tracing filter used when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &str {
        if self.debug { "debug" } else { &self.log_level }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_or<T: FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serial_test::serial;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const ADMIN: [(&str, &str); 2] = [("ADMIN_USER", "admin"), ("ADMIN_PASSWORD", "secret")];

    #[test]
    fn test_default_values() {
        let config = Config::from_lookup(lookup(&ADMIN)).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.log_filter(), "info");
        assert_eq!(config.mitra, Credentials::new("mitra_admin", "password"));
        assert_eq!(config.mitra_id, None);
        assert_eq!(config.database_path, "data.db");
        assert_eq!(config.slow_query_threshold, Duration::from_millis(100));
        assert_eq!(config.memory_monitor_interval, Duration::from_secs(60));
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert!(!config.debug);
    }

    #[test]
    fn test_admin_credentials_are_required() {
        let err = Config::from_lookup(lookup(&[("ADMIN_USER", "admin")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ADMIN_PASSWORD"));
    }

    #[test]
    fn test_debug_forces_debug_logging() {
        let mut vars = ADMIN.to_vec();
        vars.extend([("DEBUG", "true"), ("LOG_LEVEL", "warn")]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert!(config.debug);
        assert_eq!(config.log_filter(), "debug");
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let mut vars = ADMIN.to_vec();
        vars.push(("PORT", "eighty"));
        assert_eq!(
            Config::from_lookup(lookup(&vars)).unwrap_err(),
            ConfigError::Invalid {
                name: "PORT",
                value: "eighty".into()
            }
        );

        let mut vars = ADMIN.to_vec();
        vars.push(("APP_ENV", "staging"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_mitra_binding() {
        let mut vars = ADMIN.to_vec();
        vars.extend([("MITRA_ID", "7"), ("APP_ENV", "production")]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.mitra_id, Some(MitraId::new(7)));
        assert!(config.is_production());
    }

    #[test]
    #[serial]
    fn test_from_process_env() {
        // SAFETY: serialized with every other test touching the environment.
        unsafe {
            std::env::set_var("ADMIN_USER", "root");
            std::env::set_var("ADMIN_PASSWORD", "hunter2");
            std::env::set_var("PORT", "8080");
        }
        let config = Config::from_env().unwrap();
        unsafe {
            std::env::remove_var("ADMIN_USER");
            std::env::remove_var("ADMIN_PASSWORD");
            std::env::remove_var("PORT");
        }
        assert_eq!(config.admin, Credentials::new("root", "hunter2"));
        assert_eq!(config.port, 8080);
    }
}
