//! Centralized configuration (environment variables + defaults).

use crate::dialect::DialectKind;
use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

/// Connection settings for the configured database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub dialect: DialectKind,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Overrides the discrete fields when set.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Reads settings through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_dialect = lookup("DB_DIALECT");
        let (dialect, recognized) = DialectKind::parse(raw_dialect.as_deref());
        if !recognized {
            tracing::warn!(
                value = raw_dialect.as_deref().unwrap_or(""),
                "DB_DIALECT is missing or unrecognized; falling back to mysql"
            );
        }

        Ok(Self {
            dialect,
            host: lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&lookup, "DB_PORT", dialect.default_port())?,
            user: lookup("DB_USER").unwrap_or_else(|| "root".to_string()),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            database: lookup("DB_NAME").unwrap_or_else(|| "test".to_string()),
            url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5u32)?.max(1),
        })
    }
}

/// Engine and server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// `None` disables the per-request deadline.
    pub query_timeout: Option<Duration>,
    pub schema_cache: bool,
    pub max_page_size: u64,
    pub bind_addr: String,
    pub views_file: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_ms: u64 = parse_or(&lookup, "QUERY_TIMEOUT_MS", 30_000)?;
        let max_page_size: u64 = parse_or(&lookup, "MAX_PAGE_SIZE", 1000)?;
        if max_page_size == 0 {
            return Err(ConfigError::InvalidEnv {
                name: "MAX_PAGE_SIZE",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            query_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            schema_cache: parse_flag(&lookup, "SCHEMA_CACHE", true)?,
            max_page_size,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            views_file: lookup("VIEWS_FILE").unwrap_or_else(|| "views.json".to_string()),
        })
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnv {
            name,
            value: v.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_flag<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(v) = lookup(name) else {
        return Ok(default);
    };
    match v.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            name,
            value: v,
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn database_defaults_to_mysql() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.dialect, DialectKind::MySql);
        assert_eq!(config.port, 3306);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.user, "root");
        assert_eq!(config.database, "test");
        assert_eq!(config.url, None);
    }

    #[test]
    fn unknown_dialect_falls_back_to_mysql() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[("DB_DIALECT", "oracle")])).unwrap();
        assert_eq!(config.dialect, DialectKind::MySql);
    }

    #[test]
    fn postgres_uses_its_default_port() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[("DB_DIALECT", "PostgreSQL")])).unwrap();
        assert_eq!(config.dialect, DialectKind::Postgres);
        assert_eq!(config.port, 5432);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = DatabaseConfig::from_lookup(lookup_from(&[("DB_PORT", "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "DB_PORT", .. }));
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("QUERY_TIMEOUT_MS", "0"),
            ("SCHEMA_CACHE", "false"),
        ]))
        .unwrap();
        assert_eq!(config.query_timeout, None);
        assert!(!config.schema_cache);
        assert_eq!(config.max_page_size, 1000);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(ServiceConfig::from_lookup(lookup_from(&[("MAX_PAGE_SIZE", "0")])).is_err());
    }
}
