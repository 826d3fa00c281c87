use serde::Serialize;

use crate::metrics::{MetricSample, ParseError};
use crate::scripting::discovery::ScriptEntry;

/// How a single script fared during a collection pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Exit 0 with output; samples are in line order. May be empty when
    /// every line was malformed.
    Success { samples: Vec<MetricSample> },
    /// Non-zero exit (or `-1` when killed by a signal). Output discarded.
    ExitError { code: i32 },
    /// Exit 0 but nothing on stdout besides blank lines.
    NoOutput,
    /// The process could not be started.
    LaunchError { reason: String },
    /// The script outlived its timeout and was killed.
    TimedOut { elapsed_ms: u64 },
}

impl RunOutcome {
    /// Samples produced by this script; empty for every non-success outcome.
    pub fn samples(&self) -> &[MetricSample] {
        match self {
            Self::Success { samples } => samples,
            _ => &[],
        }
    }

    /// Whether this outcome counts as a failed script in pass summaries.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ExitError { .. } | Self::LaunchError { .. } | Self::TimedOut { .. }
        )
    }
}

/// Result of running one script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptRun {
    pub entry: ScriptEntry,
    pub outcome: RunOutcome,
    /// Non-blank stderr, kept whatever the outcome.
    pub stderr: Option<String>,
    /// Lines dropped from an otherwise successful run.
    pub parse_errors: Vec<ParseError>,
}

impl ScriptRun {
    pub(crate) fn new(entry: ScriptEntry, outcome: RunOutcome) -> Self {
        Self {
            entry,
            outcome,
            stderr: None,
            parse_errors: Vec::new(),
        }
    }
}

/// Counts over one pass, used for the agent's per-pass log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub scripts: usize,
    pub samples: usize,
    pub failed_scripts: usize,
    pub malformed_lines: usize,
}

impl PassSummary {
    pub fn from_runs(runs: &[ScriptRun]) -> Self {
        runs.iter().fold(Self::default(), |mut acc, run| {
            acc.scripts += 1;
            acc.samples += run.outcome.samples().len();
            acc.malformed_lines += run.parse_errors.len();
            if run.outcome.is_failure() {
                acc.failed_scripts += 1;
            }
            acc
        })
    }
}
