//! Centralized configuration (environment variables + defaults).

use anyhow::Context;
use std::net::SocketAddr;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_COLLECTION: &str = "pn_records";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    /// `production` in any letter case selects production; anything else is development.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub collection: String,
    pub max_connections: u32,
}

impl Config {
    /// Loads `.env` (if present) and reads the `PN_REGISTRY_API_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PN_REGISTRY_API_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PN_REGISTRY_API_PORT must be a valid port, got '{}'", v))?,
            None => DEFAULT_PORT,
        };

        let max_connections = match non_empty("PN_REGISTRY_API_MAX_CONNECTIONS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| {
                    format!("PN_REGISTRY_API_MAX_CONNECTIONS must be a valid u32, got '{}'", v)
                })?
                .max(1),
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let collection =
            non_empty("PN_REGISTRY_API_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.into());
        if !crate::storage::postgres::validate_ident(&collection) {
            anyhow::bail!(
                "PN_REGISTRY_API_COLLECTION must be a plain SQL identifier, got '{}'",
                collection
            );
        }

        Ok(Self {
            host: non_empty("PN_REGISTRY_API_HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
            environment: Environment::from_env_value(
                lookup("PN_REGISTRY_API_ENVIRONMENT").as_deref(),
            ),
            database_url: non_empty("DATABASE_URL"),
            collection,
            max_connections,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.collection, "pn_records");
        assert_eq!(cfg.environment, Environment::Development);
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.bind_addr().unwrap().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn environment_is_case_insensitive() {
        let cfg = config(&[("PN_REGISTRY_API_ENVIRONMENT", "Production")]).unwrap();
        assert!(cfg.environment.is_production());
        let cfg = config(&[("PN_REGISTRY_API_ENVIRONMENT", "staging")]).unwrap();
        assert!(!cfg.environment.is_production());
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(config(&[("PN_REGISTRY_API_PORT", "eighty")]).is_err());
        assert!(config(&[("PN_REGISTRY_API_COLLECTION", "pn-records")]).is_err());
        assert!(config(&[("PN_REGISTRY_API_MAX_CONNECTIONS", "-1")]).is_err());
    }

    #[test]
    fn overrides_are_read() {
        let cfg = config(&[
            ("PN_REGISTRY_API_PORT", "9090"),
            ("DATABASE_URL", "postgres://localhost/pn"),
            ("PN_REGISTRY_API_MAX_CONNECTIONS", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/pn"));
        assert_eq!(cfg.max_connections, 1);
    }
}
