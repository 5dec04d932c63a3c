//! Configuration loading and representation.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | required for Postgres |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |
//! | `CATALOG_DEFAULT_PAGE_SIZE` | `20` |

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::read_model::DEFAULT_PAGE_SIZE;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is malformed: {reason}")]
    Malformed { name: &'static str, reason: String },

    #[error("database connection failed: {0}")]
    Connect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub default_page_size: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => parse_positive::<u32>("DATABASE_MAX_CONNECTIONS", &raw)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let default_page_size = match lookup("CATALOG_DEFAULT_PAGE_SIZE") {
            Some(raw) => parse_positive::<i64>("CATALOG_DEFAULT_PAGE_SIZE", &raw)?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            database_url,
            max_connections,
            default_page_size,
        })
    }

    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

/// Open a Postgres pool for `config`.
pub async fn connect_pool(config: &CatalogConfig) -> Result<PgPool, ConfigError> {
    let url = config.require_database_url()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .map_err(|e| ConfigError::Connect(e.to_string()))?;

    info!(max_connections = config.max_connections, "postgres pool ready");
    Ok(pool)
}

fn parse_positive<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value: T = raw.trim().parse().map_err(|e: T::Err| ConfigError::Malformed {
        name,
        reason: e.to_string(),
    })?;
    if value <= T::default() {
        return Err(ConfigError::Malformed {
            name,
            reason: "must be positive".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(
            config.require_database_url().unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
    }

    #[test]
    fn reads_all_values() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("CATALOG_DEFAULT_PAGE_SIZE", " 50 "),
        ]))
        .unwrap();

        assert_eq!(config.require_database_url().unwrap(), "postgres://localhost/catalog");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.default_page_size, 50);
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = CatalogConfig::from_lookup(lookup(&[("DATABASE_MAX_CONNECTIONS", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { name: "DATABASE_MAX_CONNECTIONS", .. }));

        let err = CatalogConfig::from_lookup(lookup(&[("CATALOG_DEFAULT_PAGE_SIZE", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { name: "CATALOG_DEFAULT_PAGE_SIZE", .. }));
    }
}
