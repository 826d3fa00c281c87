//! The collection pass: list, filter, run, classify, parse, publish.
//!
//! [`ScriptCollector`] runs every executable script in its configured
//! directory once, strictly one after another, and reports a [`ScriptRun`]
//! per spawned script. No condition inside a pass is fatal: an unreadable
//! directory yields an empty result and every per-script failure is logged
//! and isolated.

pub mod config;
pub mod outcome;
pub mod sink;

use std::path::PathBuf;

pub use config::CollectionConfig;
pub use outcome::{PassSummary, RunOutcome, ScriptRun};
pub use sink::MetricSink;

use crate::metric_names::MAX_FLOAT_PRECISION;
use crate::metrics::parser::{has_content, parse_output};
use crate::scripting::binary::BinaryExecutor;
use crate::scripting::discovery::{list_scripts, ScriptEntry};
use crate::scripting::executor::{ScriptError, ScriptExecutor, ScriptInput};

/// Runs user scripts and turns their output into metric samples.
///
/// Holds no mutable state, so one collector can serve passes from several
/// tasks at once.
#[derive(Debug, Clone)]
pub struct ScriptCollector<E = BinaryExecutor> {
    config: CollectionConfig,
    executor: E,
}

impl ScriptCollector<BinaryExecutor> {
    pub fn new(config: CollectionConfig) -> Self {
        Self::with_executor(config, BinaryExecutor)
    }
}

impl<E: ScriptExecutor> ScriptCollector<E> {
    /// Build a collector that runs scripts through `executor`.
    pub fn with_executor(config: CollectionConfig, executor: E) -> Self {
        Self { config, executor }
    }

    /// Run one pass without publishing anywhere.
    pub async fn collect(&self) -> Vec<ScriptRun> {
        self.run_pass(None).await
    }

    /// Run one pass, publishing each sample to `sink` as soon as its script
    /// has been classified. Samples handed to the sink carry the configured
    /// metric prefix; the samples inside the returned runs do not.
    pub async fn collect_into(&self, sink: &mut dyn MetricSink) -> Vec<ScriptRun> {
        self.run_pass(Some(sink)).await
    }

    async fn run_pass(&self, mut sink: Option<&mut dyn MetricSink>) -> Vec<ScriptRun> {
        let scripts_path = &self.config.scripts_path;

        let entries = match list_scripts(scripts_path).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    scripts_path = %scripts_path.display(),
                    error = %e,
                    "Scripts directory is not readable; nothing to collect",
                );
                return Vec::new();
            }
        };

        let mut runs = Vec::new();

        for entry in entries {
            if !entry.is_candidate() {
                if entry.is_file {
                    tracing::info!(path = %entry.path.display(), "Script is not executable; skipping");
                } else {
                    tracing::debug!(path = %entry.path.display(), "Not a regular file; skipping");
                }
                continue;
            }

            let run = self.run_script(entry).await;

            if let Some(sink) = sink.as_deref_mut() {
                let prefix = self.config.metric_prefix.as_deref().unwrap_or("");
                for sample in run.outcome.samples() {
                    sink.publish(&sample.with_prefix(prefix));
                }
            }

            runs.push(run);
        }

        runs
    }

    /// Execute and classify a single candidate.
    async fn run_script(&self, entry: ScriptEntry) -> ScriptRun {
        let path = entry.path.to_string_lossy().into_owned();
        tracing::debug!(script = %path, "Executing script");

        let input = ScriptInput {
            timeout: self.config.script_timeout,
        };

        let mut output = match self.executor.execute(&path, input).await {
            Ok(output) => output,
            Err(ScriptError::Timeout { elapsed_ms, stderr }) => {
                tracing::error!(script = %path, elapsed_ms, "Script timed out and was killed; skipping");
                return ScriptRun {
                    stderr: non_blank_stderr(&path, stderr),
                    ..ScriptRun::new(entry, RunOutcome::TimedOut { elapsed_ms })
                };
            }
            Err(e) => {
                tracing::error!(script = %path, error = %e, "Error launching script; skipping");
                return ScriptRun::new(
                    entry,
                    RunOutcome::LaunchError {
                        reason: e.to_string(),
                    },
                );
            }
        };

        let succeeded = output.succeeded();
        let stderr = non_blank_stderr(&path, std::mem::take(&mut output.stderr));

        if !succeeded {
            tracing::error!(script = %path, exit_code = output.exit_code, "Script returned non-zero exit value; skipping");
            return ScriptRun {
                stderr,
                ..ScriptRun::new(
                    entry,
                    RunOutcome::ExitError {
                        code: output.exit_code,
                    },
                )
            };
        }

        if !has_content(&output.stdout) {
            tracing::info!(script = %path, "Script returned no output");
            return ScriptRun {
                stderr,
                ..ScriptRun::new(entry, RunOutcome::NoOutput)
            };
        }

        let parsed = parse_output(&output.stdout, self.config.float_precision);
        for e in &parsed.errors {
            tracing::warn!(script = %path, error = %e, "Skipping malformed output line");
        }
        tracing::debug!(
            script = %path,
            samples = parsed.samples.len(),
            duration_ms = output.duration_ms,
            "Script completed",
        );

        ScriptRun {
            entry,
            outcome: RunOutcome::Success {
                samples: parsed.samples,
            },
            stderr,
            parse_errors: parsed.errors,
        }
    }
}

/// Log non-blank stderr and keep it for the [`ScriptRun`].
fn non_blank_stderr(path: &str, stderr: String) -> Option<String> {
    if stderr.trim().is_empty() {
        return None;
    }
    tracing::error!(script = %path, stderr = %stderr.trim(), "Script wrote to stderr");
    Some(stderr)
}

/// Run one pass over `scripts_path` with default settings apart from the
/// float precision, which is clamped to [`MAX_FLOAT_PRECISION`].
pub async fn collect(scripts_path: impl Into<PathBuf>, float_precision: u32) -> Vec<ScriptRun> {
    if float_precision > MAX_FLOAT_PRECISION {
        tracing::warn!(
            float_precision,
            max = MAX_FLOAT_PRECISION,
            "Float precision too large; clamping",
        );
    }
    let config = CollectionConfig {
        float_precision: float_precision.min(MAX_FLOAT_PRECISION),
        ..CollectionConfig::for_path(scripts_path)
    };
    ScriptCollector::new(config).collect().await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;
    use crate::metrics::{MetricSample, ParseError};
    use crate::scripting::executor::ScriptOutput;
    use crate::scripting::test_helpers::write_script;

    /// Executor that records every path it is asked to run and replies with
    /// a canned exit code and stdout.
    #[derive(Clone, Default)]
    struct RecordingExecutor {
        calls: Arc<Mutex<Vec<String>>>,
        exit_code: i32,
        stdout: String,
    }

    impl ScriptExecutor for RecordingExecutor {
        async fn execute(
            &self,
            script_path: &str,
            _input: ScriptInput,
        ) -> Result<ScriptOutput, ScriptError> {
            self.calls
                .lock()
                .expect("lock")
                .push(script_path.to_string());
            Ok(ScriptOutput {
                stdout: self.stdout.clone(),
                stderr: String::new(),
                exit_code: self.exit_code,
                duration_ms: 0,
            })
        }
    }

    fn collector_for(dir: &std::path::Path) -> ScriptCollector {
        ScriptCollector::new(CollectionConfig {
            script_timeout: Some(Duration::from_secs(5)),
            ..CollectionConfig::for_path(dir)
        })
    }

    #[tokio::test]
    async fn non_executable_files_are_never_spawned() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(dir.path(), "a.sh", "", 0o755);
        write_script(dir.path(), "b.sh", "", 0o644);

        let executor = RecordingExecutor {
            stdout: "x 1\n".to_string(),
            ..RecordingExecutor::default()
        };
        let calls = executor.calls.clone();
        let collector =
            ScriptCollector::with_executor(CollectionConfig::for_path(dir.path()), executor);

        let runs = collector.collect().await;
        assert_eq!(runs.len(), 1);

        let calls = calls.lock().expect("lock");
        assert_eq!(calls.len(), 1);
        assert!(calls[0].ends_with("a.sh"));
    }

    #[tokio::test]
    async fn non_zero_exit_discards_output() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(dir.path(), "fail.sh", "", 0o755);

        let executor = RecordingExecutor {
            exit_code: 2,
            stdout: "x 1\n".to_string(),
            ..RecordingExecutor::default()
        };
        let collector =
            ScriptCollector::with_executor(CollectionConfig::for_path(dir.path()), executor);

        let mut sink: Vec<MetricSample> = Vec::new();
        let runs = collector.collect_into(&mut sink).await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].outcome, RunOutcome::ExitError { code: 2 });
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn scenario_one_executable_one_not() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(
            dir.path(),
            "a.sh",
            "printf 'cpu.load 3.5\\nmem.free 1024\\n'\n",
            0o755,
        );
        let marker = dir.path().join("b-ran");
        write_script(
            dir.path(),
            "b.sh",
            &format!("touch {}\necho never 1\n", marker.display()),
            0o644,
        );

        let runs = collector_for(dir.path()).collect().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].entry.name, "a.sh");
        assert_eq!(
            runs[0].outcome.samples(),
            [
                MetricSample {
                    name: "cpu.load".to_string(),
                    value: 3.5,
                    precision: 4,
                },
                MetricSample {
                    name: "mem.free".to_string(),
                    value: 1024.0,
                    precision: 0,
                },
            ]
        );
        assert!(!marker.exists(), "b.sh must never run");
    }

    #[tokio::test]
    async fn empty_output_is_no_output() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(dir.path(), "quiet.sh", "echo\necho '   '\n", 0o755);

        let runs = collector_for(dir.path()).collect().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].outcome, RunOutcome::NoOutput);
    }

    #[tokio::test]
    async fn stderr_is_kept_alongside_success() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(dir.path(), "noisy.sh", "echo warn >&2\necho ok 1\n", 0o755);

        let runs = collector_for(dir.path()).collect().await;
        assert_eq!(runs[0].outcome.samples().len(), 1);
        assert_eq!(runs[0].stderr.as_deref(), Some("warn\n"));
    }

    #[tokio::test]
    async fn malformed_lines_are_isolated() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(
            dir.path(),
            "mixed.sh",
            "echo good 1\necho 'too many tokens'\necho bad value\necho also.good 2.5\n",
            0o755,
        );

        let runs = collector_for(dir.path()).collect().await;
        let names: Vec<&str> = runs[0]
            .outcome
            .samples()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, ["good", "also.good"]);
        assert_eq!(runs[0].parse_errors.len(), 2);
        assert_matches!(
            runs[0].parse_errors[0],
            ParseError::WrongTokenCount { line_number: 2, .. }
        );
    }

    #[tokio::test]
    async fn timeout_is_reported_with_partial_stderr() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(
            dir.path(),
            "hang.sh",
            "echo starting >&2\nexec sleep 60\n",
            0o755,
        );

        let collector = ScriptCollector::new(CollectionConfig {
            script_timeout: Some(Duration::from_millis(300)),
            ..CollectionConfig::for_path(dir.path())
        });
        let runs = collector.collect().await;
        assert_matches!(runs[0].outcome, RunOutcome::TimedOut { .. });
        assert_eq!(runs[0].stderr.as_deref(), Some("starting\n"));
    }

    #[tokio::test]
    async fn unexecutable_binary_is_a_launch_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("garbage");
        std::fs::write(&path, b"\x00\xde\xad\xbe\xef\x00\x01\x02").expect("write garbage");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod");

        let runs = collector_for(dir.path()).collect().await;
        assert_eq!(runs.len(), 1);
        assert_matches!(runs[0].outcome, RunOutcome::LaunchError { .. });
        assert!(runs[0].outcome.is_failure());
    }

    #[tokio::test]
    async fn stderr_is_kept_on_exit_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(dir.path(), "fail.sh", "echo oops >&2\nexit 2\n", 0o755);

        let runs = collector_for(dir.path()).collect().await;
        assert_eq!(runs[0].outcome, RunOutcome::ExitError { code: 2 });
        assert_eq!(runs[0].stderr.as_deref(), Some("oops\n"));
    }

    #[tokio::test]
    async fn stderr_is_kept_on_no_output() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(dir.path(), "note.sh", "echo note >&2\nexit 0\n", 0o755);

        let runs = collector_for(dir.path()).collect().await;
        assert_eq!(runs[0].outcome, RunOutcome::NoOutput);
        assert_eq!(runs[0].stderr.as_deref(), Some("note\n"));
    }

    #[tokio::test]
    async fn free_collect_clamps_precision() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(dir.path(), "f.sh", "echo f 0.5\n", 0o755);

        let runs = collect(dir.path(), u32::MAX).await;
        let samples = runs[0].outcome.samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].precision, MAX_FLOAT_PRECISION);
        assert_eq!(samples[0].formatted_value(), "0.50000000000000000");
    }

    #[tokio::test]
    async fn missing_directory_yields_empty_result() {
        let runs = collect("/nonexistent/scriptmon/scripts", 4).await;
        assert!(runs.is_empty());
    }

    #[tokio::test]
    async fn sink_receives_prefixed_samples() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write_script(dir.path(), "a.sh", "echo cpu.load 0.5\n", 0o755);

        let collector = ScriptCollector::new(CollectionConfig {
            metric_prefix: Some("host01".to_string()),
            ..CollectionConfig::for_path(dir.path())
        });
        let mut sink: Vec<MetricSample> = Vec::new();
        let runs = collector.collect_into(&mut sink).await;

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].name, "host01.cpu.load");
        assert_eq!(runs[0].outcome.samples()[0].name, "cpu.load");
    }
}
