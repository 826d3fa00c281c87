/// Errors raised by core configuration and setup, before any pass runs.
///
/// Per-script failures are never errors at this level; they are reported
/// as [`RunOutcome`](crate::collection::RunOutcome) values instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}
