//! Process configuration, read once from environment variables at startup.

use std::net::SocketAddr;

use thiserror::Error;

use depot_stock::WarehouseCode;

pub const BIND_ADDR_VAR: &str = "DEPOT_BIND_ADDR";
pub const LOG_FORMAT_VAR: &str = "DEPOT_LOG_FORMAT";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";
pub const DEFAULT_WAREHOUSE_VAR: &str = "DEPOT_DEFAULT_WAREHOUSE";

const DEFAULT_WAREHOUSE: &str = "MAIN";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `info` or `depot_infra=debug`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            filter: "info".to_string(),
        }
    }
}

/// Settings the warehouse engine itself needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Warehouse applied to feed lines that do not name one.
    pub default_warehouse: WarehouseCode,
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log: LogConfig,
    pub engine: EngineSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup; unset or blank variables take
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match get(BIND_ADDR_VAR) {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                var: BIND_ADDR_VAR,
                reason: format!("'{raw}': {e}"),
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let format = match get(LOG_FORMAT_VAR).map(|v| v.to_lowercase()).as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") | Some("text") => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: LOG_FORMAT_VAR,
                    reason: format!("'{other}' (expected json or pretty)"),
                });
            }
        };

        let filter = get(LOG_FILTER_VAR).unwrap_or_else(|| "info".to_string());

        let warehouse = get(DEFAULT_WAREHOUSE_VAR).unwrap_or_else(|| DEFAULT_WAREHOUSE.to_string());
        let engine = EngineSettings {
            default_warehouse: WarehouseCode::new(warehouse).map_err(|e| ConfigError::Invalid {
                var: DEFAULT_WAREHOUSE_VAR,
                reason: e.to_string(),
            })?,
        };

        Ok(Self {
            bind_addr,
            log: LogConfig { format, filter },
            engine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.log, LogConfig::default());
        assert_eq!(cfg.engine.default_warehouse.as_str(), "MAIN");
    }

    #[test]
    fn values_are_read() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (LOG_FORMAT_VAR, "Pretty"),
            (LOG_FILTER_VAR, "depot_infra=debug"),
            (DEFAULT_WAREHOUSE_VAR, " W2 "),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.log.format, LogFormat::Pretty);
        assert_eq!(cfg.log.filter, "depot_infra=debug");
        assert_eq!(cfg.engine.default_warehouse.as_str(), "W2");
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = AppConfig::from_lookup(lookup(&[(BIND_ADDR_VAR, "not-an-addr")])).unwrap_err();
        assert!(err.to_string().starts_with(BIND_ADDR_VAR));

        let err = AppConfig::from_lookup(lookup(&[(LOG_FORMAT_VAR, "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: LOG_FORMAT_VAR, .. }));
    }
}
