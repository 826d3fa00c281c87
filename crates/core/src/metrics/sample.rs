use serde::{Deserialize, Serialize};

/// A single named numeric measurement parsed from script output.
///
/// `precision` is the number of decimal places the value is published
/// with: zero for integer literals, the configured float precision for
/// literals containing a decimal point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Dot-delimited metric path, e.g. `cpu.load`.
    pub name: String,
    pub value: f64,
    pub precision: u32,
}

impl MetricSample {
    /// Render the value rounded to exactly `precision` decimal places.
    pub fn formatted_value(&self) -> String {
        format!("{:.*}", self.precision as usize, self.value)
    }

    /// Copy of this sample with `prefix.` prepended to its name.
    ///
    /// An empty prefix (or one that is only dots) leaves the name unchanged.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        let prefix = prefix.trim_matches('.');
        let name = if prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{prefix}.{}", self.name)
        };
        Self {
            name,
            value: self.value,
            precision: self.precision,
        }
    }
}
