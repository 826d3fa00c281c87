//! Parser for the `<metric.path> <numeric value>` line format.
//!
//! Each non-blank line must hold exactly two whitespace-separated tokens.
//! A malformed line is reported and dropped on its own; it never aborts the
//! rest of the output.

use serde::Serialize;

use super::sample::MetricSample;

/// Why a single output line could not become a [`MetricSample`].
///
/// `line_number` is 1-based and counts blank lines, so it matches what a
/// script author sees when running the script by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum ParseError {
    #[error("line {line_number}: expected `name value`, found {token_count} token(s): {line:?}")]
    WrongTokenCount {
        line_number: usize,
        token_count: usize,
        line: String,
    },

    #[error("line {line_number}: value {value:?} for {name:?} is not a finite number")]
    NonNumericValue {
        line_number: usize,
        name: String,
        value: String,
    },
}

/// Samples and per-line errors from one script's stdout, both in line order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedOutput {
    pub samples: Vec<MetricSample>,
    pub errors: Vec<ParseError>,
}

/// Whether `stdout` contains at least one non-blank line.
pub fn has_content(stdout: &str) -> bool {
    stdout.lines().any(|line| !line.trim().is_empty())
}

/// Parse one non-blank line.
///
/// Values containing a literal `.` get `float_precision`; everything else
/// (including exponent forms such as `1e3`) gets precision 0.
pub fn parse_line(
    line: &str,
    line_number: usize,
    float_precision: u32,
) -> Result<MetricSample, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [name, raw_value] = tokens.as_slice() else {
        return Err(ParseError::WrongTokenCount {
            line_number,
            token_count: tokens.len(),
            line: line.to_string(),
        });
    };

    let value = raw_value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::NonNumericValue {
            line_number,
            name: name.to_string(),
            value: raw_value.to_string(),
        })?;

    let precision = if raw_value.contains('.') {
        float_precision
    } else {
        0
    };

    Ok(MetricSample {
        name: name.to_string(),
        value,
        precision,
    })
}

/// Parse every non-blank line of `stdout`.
pub fn parse_output(stdout: &str, float_precision: u32) -> ParsedOutput {
    let mut parsed = ParsedOutput::default();

    for (idx, line) in stdout.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, idx + 1, float_precision) {
            Ok(sample) => parsed.samples.push(sample),
            Err(e) => parsed.errors.push(e),
        }
    }

    parsed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
