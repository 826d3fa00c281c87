//! Well-known defaults and message type constants shared between the
//! collector and the hosts that drive it.

/// Directory scanned for user scripts when none is configured.
pub const DEFAULT_SCRIPTS_PATH: &str = "/etc/scriptmon/user_scripts/";

/// Decimal places applied to values written with a decimal point.
pub const DEFAULT_FLOAT_PRECISION: u32 = 4;

/// Upper bound accepted for `float_precision`.
///
/// Anything larger is beyond what an `f64` can meaningfully render.
pub const MAX_FLOAT_PRECISION: u32 = 17;

/// Default per-script wall-clock limit in seconds (`0` disables it).
pub const DEFAULT_SCRIPT_TIMEOUT_SECS: u64 = 30;

/// WebSocket message type discriminator for script metric payloads.
pub const MSG_TYPE_SCRIPT_METRICS: &str = "script_metrics";
