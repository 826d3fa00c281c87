//! Direct executable runner.
//!
//! Runs a script file directly (not through a shell), so the kernel picks
//! the interpreter from its shebang line. Validates that the file exists
//! and has execute permissions before spawning.

use std::path::Path;

use super::discovery::is_executable;
use super::executor::{ScriptError, ScriptExecutor, ScriptInput, ScriptOutput};
use super::subprocess;

/// Executor that spawns the script path itself with no arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryExecutor;

impl ScriptExecutor for BinaryExecutor {
    async fn execute(
        &self,
        binary_path: &str,
        input: ScriptInput,
    ) -> Result<ScriptOutput, ScriptError> {
        // The listing may be stale by the time we get here.
        let metadata = tokio::fs::metadata(binary_path)
            .await
            .map_err(|_| ScriptError::NotFound(binary_path.to_string()))?;

        if !metadata.is_file() || !is_executable(Path::new(binary_path)) {
            return Err(ScriptError::PermissionDenied(format!(
                "{binary_path} is not executable"
            )));
        }

        let mut cmd = tokio::process::Command::new(binary_path);
        subprocess::run_command(&mut cmd, input).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
