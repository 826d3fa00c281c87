//! Script execution interface and shared types.
//!
//! Defines [`ScriptExecutor`], the seam the collector runs scripts through,
//! along with [`ScriptInput`], [`ScriptOutput`], and [`ScriptError`].

use std::time::Duration;

/// Per-invocation settings passed to a script executor.
///
/// Scripts always run with no arguments, no stdin, and the agent's own
/// environment; only the wall-clock limit is configurable.
#[derive(Debug, Clone, Default)]
pub struct ScriptInput {
    /// Maximum wall-clock time before the process is killed.
    /// `None` waits for the script indefinitely.
    pub timeout: Option<Duration>,
}

/// Captured output from a script execution.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    /// Complete stdout captured from the process.
    pub stdout: String,
    /// Complete stderr captured from the process.
    pub stderr: String,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ScriptOutput {
    /// Whether the process exited with status zero.
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Errors that prevent a script from producing a [`ScriptOutput`].
///
/// A non-zero exit is *not* an error here: the process ran, and the caller
/// decides what its exit code means.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The script file was not found at the specified path.
    #[error("Script not found: {0}")]
    NotFound(String),
    /// The script file exists but lacks execute permissions.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// The script exceeded its configured timeout and was killed.
    #[error("Script timed out after {elapsed_ms}ms")]
    Timeout {
        /// Elapsed wall-clock time before the process was killed.
        elapsed_ms: u64,
        /// Whatever the script wrote to stderr before it was killed.
        stderr: String,
    },
    /// An I/O error occurred while spawning or waiting on the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait implemented by script runners.
///
/// Receives a file path and per-invocation settings, spawns the process,
/// and returns its captured output or the reason it could not run.
pub trait ScriptExecutor: Send + Sync {
    /// Execute the script at `script_path` with the given `input`.
    fn execute(
        &self,
        script_path: &str,
        input: ScriptInput,
    ) -> impl std::future::Future<Output = Result<ScriptOutput, ScriptError>> + Send;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
