use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::metric_names::{
    DEFAULT_FLOAT_PRECISION, DEFAULT_SCRIPTS_PATH, DEFAULT_SCRIPT_TIMEOUT_SECS,
    MAX_FLOAT_PRECISION,
};

/// Settings for one [`ScriptCollector`](super::ScriptCollector).
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionConfig {
    /// Directory scanned (non-recursively) for executable scripts.
    pub scripts_path: PathBuf,
    /// Decimal places for values written with a decimal point.
    pub float_precision: u32,
    /// Per-script wall-clock limit. `None` waits indefinitely, which lets a
    /// hung script stall the whole pass.
    pub script_timeout: Option<Duration>,
    /// Prepended (dot-joined) to every sample name handed to the sink.
    pub metric_prefix: Option<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            scripts_path: PathBuf::from(DEFAULT_SCRIPTS_PATH),
            float_precision: DEFAULT_FLOAT_PRECISION,
            script_timeout: Some(Duration::from_secs(DEFAULT_SCRIPT_TIMEOUT_SECS)),
            metric_prefix: None,
        }
    }
}

impl CollectionConfig {
    /// Default settings scanning `scripts_path`.
    pub fn for_path(scripts_path: impl Into<PathBuf>) -> Self {
        Self {
            scripts_path: scripts_path.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.scripts_path.as_os_str().is_empty() {
            return Err(CoreError::Validation(
                "scripts_path must not be empty".to_string(),
            ));
        }
        if self.float_precision > MAX_FLOAT_PRECISION {
            return Err(CoreError::Validation(format!(
                "float_precision must be at most {MAX_FLOAT_PRECISION}, got {}",
                self.float_precision
            )));
        }
        if self.script_timeout == Some(Duration::ZERO) {
            return Err(CoreError::Validation(
                "script_timeout must be positive; use None to disable it".to_string(),
            ));
        }
        Ok(())
    }
}
