//! Process configuration read from the environment.

use std::net::SocketAddr;

use anyhow::{Context, bail};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// `BIZTIME_BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `USE_PERSISTENT_STORES`: Postgres when true, in-memory otherwise.
    pub use_persistent_stores: bool,
    /// `DATABASE_URL`, required when persistent.
    pub database_url: Option<String>,
    /// `BIZTIME_MIGRATE`: apply the bundled schema on start.
    pub migrate: bool,
    /// `BIZTIME_DB_MAX_CONNECTIONS`
    pub max_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            use_persistent_stores: false,
            database_url: None,
            migrate: true,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = lookup("BIZTIME_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIZTIME_BIND_ADDR must be a socket address such as 0.0.0.0:3000")?;

        let use_persistent_stores = flag(&lookup, "USE_PERSISTENT_STORES", false)?;
        let migrate = flag(&lookup, "BIZTIME_MIGRATE", true)?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if use_persistent_stores && database_url.is_none() {
            bail!("DATABASE_URL is required when USE_PERSISTENT_STORES=true");
        }

        let max_connections = match lookup("BIZTIME_DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .context("BIZTIME_DB_MAX_CONNECTIONS must be a positive integer")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            bind_addr,
            use_persistent_stores,
            database_url,
            migrate,
            max_connections,
        })
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> anyhow::Result<bool> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => bail!("{key} must be true or false, got {other:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_in_memory_on_port_3000() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, ApiConfig::default());
        assert_eq!(cfg.bind_addr.port(), 3000);
    }

    #[test]
    fn persistent_requires_database_url() {
        let err = config(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let cfg = config(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/biztime"),
            ("BIZTIME_MIGRATE", "false"),
        ])
        .unwrap();
        assert!(cfg.use_persistent_stores);
        assert!(!cfg.migrate);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(config(&[("BIZTIME_BIND_ADDR", "not-an-addr")]).is_err());
        assert!(config(&[("USE_PERSISTENT_STORES", "maybe")]).is_err());
        assert!(config(&[("BIZTIME_DB_MAX_CONNECTIONS", "-1")]).is_err());
    }
}
