//! Shared subprocess management utilities.
//!
//! Provides [`run_command`], the spawn + capture + timeout logic used by
//! [`BinaryExecutor`](super::binary::BinaryExecutor). The caller builds the
//! [`tokio::process::Command`]; everything about pipes and process lifetime
//! is handled here.

use std::process::Stdio;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use super::executor::{ScriptError, ScriptInput, ScriptOutput};

/// Maximum stdout or stderr size captured per stream (10 MiB).
///
/// Bytes past this limit are read and discarded so the script can still
/// finish writing and exit normally.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Read size for each pipe.
const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Spawn `cmd` with stdin closed, capture stdout/stderr, and enforce the
/// optional timeout from `input`.
///
/// The child is always reaped before this returns: normally via `wait`, on
/// timeout via `kill` (which also waits), and on any other early exit via
/// `kill_on_drop`.
pub async fn run_command(
    cmd: &mut Command,
    input: ScriptInput,
) -> Result<ScriptOutput, ScriptError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();

    let mut child = cmd.spawn()?;

    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();

    // Buffers live outside the capture future so whatever was read before
    // a timeout is still available afterwards.
    let mut stdout_bytes = Vec::new();
    let mut stderr_bytes = Vec::new();

    // Drain both pipes while waiting so a chatty script cannot block on a
    // full pipe buffer.
    let capture = async {
        let (status, stdout_truncated, stderr_truncated) = tokio::join!(
            child.wait(),
            read_stream(stdout_handle, &mut stdout_bytes),
            read_stream(stderr_handle, &mut stderr_bytes)
        );
        if stdout_truncated || stderr_truncated {
            tracing::warn!(
                stdout_truncated,
                stderr_truncated,
                limit_bytes = MAX_OUTPUT_BYTES,
                "Script output exceeded capture limit and was truncated",
            );
        }
        status
    };

    let waited = match input.timeout {
        Some(limit) => tokio::time::timeout(limit, capture).await.ok(),
        None => Some(capture.await),
    };

    let Some(status) = waited else {
        let elapsed_ms = start.elapsed().as_millis() as u64;
        if let Err(e) = child.kill().await {
            tracing::warn!(error = %e, "Failed to kill timed-out script");
        }
        return Err(ScriptError::Timeout {
            elapsed_ms,
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
        });
    };

    let status = status?;

    Ok(ScriptOutput {
        stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
        stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
        exit_code: status.code().unwrap_or(-1),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Read a stream to EOF, keeping at most [`MAX_OUTPUT_BYTES`] in `buf`.
///
/// Appends chunk by chunk, so a cancelled read leaves the partial output in
/// `buf`. Returns whether anything was discarded.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>, buf: &mut Vec<u8>) -> bool {
    let Some(mut h) = handle else {
        return false;
    };

    let mut chunk = [0u8; READ_CHUNK_BYTES];
    let mut truncated = false;
    loop {
        let n = match h.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        let room = MAX_OUTPUT_BYTES.saturating_sub(buf.len());
        if n > room {
            truncated = true;
        }
        buf.extend_from_slice(&chunk[..n.min(room)]);
    }
    truncated
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
