//! Agent configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use scriptmon_core::collection::CollectionConfig;
use scriptmon_core::error::CoreError;
use scriptmon_core::metric_names::{
    DEFAULT_FLOAT_PRECISION, DEFAULT_SCRIPTS_PATH, DEFAULT_SCRIPT_TIMEOUT_SECS,
};

/// Default interval between collection passes.
const DEFAULT_INTERVAL_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} environment variable is required")]
    Missing { var: &'static str },

    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Collection(#[from] CoreError),
}

/// Where to push samples when running against a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// WebSocket endpoint, e.g. `ws://host:3000/ws/metrics`.
    pub ws_url: String,
    pub worker_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub collection: CollectionConfig,
    /// Time between the starts of consecutive passes.
    pub interval: Duration,
    /// `None` runs in log-only mode.
    pub backend: Option<BackendConfig>,
}

impl AgentConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                         |
    /// |-------------------------|---------------------------------|
    /// | `SCRIPTS_PATH`          | `/etc/scriptmon/user_scripts/`  |
    /// | `FLOAT_PRECISION`       | `4`                             |
    /// | `SCRIPT_TIMEOUT_SECS`   | `30` (`0` disables the timeout) |
    /// | `COLLECT_INTERVAL_SECS` | `60`                            |
    /// | `METRIC_PREFIX`         | --                              |
    /// | `BACKEND_WS_URL`        | -- (log-only mode)              |
    /// | `WORKER_ID`             | required with `BACKEND_WS_URL`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let scripts_path =
            PathBuf::from(var("SCRIPTS_PATH").unwrap_or_else(|| DEFAULT_SCRIPTS_PATH.into()));

        let float_precision: u32 =
            parse_or("FLOAT_PRECISION", var("FLOAT_PRECISION"), DEFAULT_FLOAT_PRECISION)?;

        let timeout_secs: u64 = parse_or(
            "SCRIPT_TIMEOUT_SECS",
            var("SCRIPT_TIMEOUT_SECS"),
            DEFAULT_SCRIPT_TIMEOUT_SECS,
        )?;
        let script_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let interval_secs: u64 = parse_or(
            "COLLECT_INTERVAL_SECS",
            var("COLLECT_INTERVAL_SECS"),
            DEFAULT_INTERVAL_SECS,
        )?;
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "COLLECT_INTERVAL_SECS",
                value: interval_secs.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let backend = match var("BACKEND_WS_URL") {
            Some(ws_url) => {
                let raw = var("WORKER_ID").ok_or(ConfigError::Missing { var: "WORKER_ID" })?;
                let worker_id = parse_or("WORKER_ID", Some(raw), 0)?;
                Some(BackendConfig { ws_url, worker_id })
            }
            None => None,
        };

        let collection = CollectionConfig {
            scripts_path,
            float_precision,
            script_timeout,
            metric_prefix: var("METRIC_PREFIX"),
        };
        collection.validate()?;

        Ok(Self {
            collection,
            interval: Duration::from_secs(interval_secs),
            backend,
        })
    }
}

/// Parse `raw` as `T`, falling back to `default` when unset.
fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AgentConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AgentConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]).expect("defaults are valid");
        assert_eq!(config.collection, CollectionConfig::default());
        assert_eq!(config.interval, Duration::from_secs(60));
        assert!(config.backend.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("SCRIPTS_PATH", "/opt/scripts"),
            ("FLOAT_PRECISION", "2"),
            ("SCRIPT_TIMEOUT_SECS", "5"),
            ("COLLECT_INTERVAL_SECS", "10"),
            ("METRIC_PREFIX", "servers.web01"),
        ])
        .expect("valid");
        assert_eq!(config.collection.scripts_path, PathBuf::from("/opt/scripts"));
        assert_eq!(config.collection.float_precision, 2);
        assert_eq!(config.collection.script_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.collection.metric_prefix.as_deref(), Some("servers.web01"));
        assert_eq!(config.interval, Duration::from_secs(10));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = load(&[("SCRIPT_TIMEOUT_SECS", "0")]).expect("valid");
        assert_eq!(config.collection.script_timeout, None);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("FLOAT_PRECISION", "  "), ("METRIC_PREFIX", "")]).expect("valid");
        assert_eq!(config.collection.float_precision, 4);
        assert!(config.collection.metric_prefix.is_none());
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert_matches!(
            load(&[("FLOAT_PRECISION", "four")]),
            Err(ConfigError::Invalid { var: "FLOAT_PRECISION", .. })
        );
        assert_matches!(
            load(&[("COLLECT_INTERVAL_SECS", "0")]),
            Err(ConfigError::Invalid { var: "COLLECT_INTERVAL_SECS", .. })
        );
        assert_matches!(
            load(&[("FLOAT_PRECISION", "99")]),
            Err(ConfigError::Collection(_))
        );
    }

    #[test]
    fn backend_requires_worker_id() {
        assert_matches!(
            load(&[("BACKEND_WS_URL", "ws://localhost:3000/ws/metrics")]),
            Err(ConfigError::Missing { var: "WORKER_ID" })
        );

        let config = load(&[
            ("BACKEND_WS_URL", "ws://localhost:3000/ws/metrics"),
            ("WORKER_ID", "7"),
        ])
        .expect("valid");
        assert_eq!(
            config.backend,
            Some(BackendConfig {
                ws_url: "ws://localhost:3000/ws/metrics".to_string(),
                worker_id: 7,
            })
        );
    }
}
