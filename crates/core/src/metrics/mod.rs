//! Metric samples and the two-column script output format.

pub mod parser;
pub mod sample;

pub use parser::{parse_line, parse_output, ParseError, ParsedOutput};
pub use sample::MetricSample;
