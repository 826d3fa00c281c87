//! Metric sinks provided by the agent.

use chrono::Utc;
use scriptmon_core::collection::MetricSink;
use scriptmon_core::metrics::MetricSample;

/// Tracing target for published samples, so they can be routed or filtered
/// separately from the agent's own diagnostics.
pub const METRICS_TARGET: &str = "scriptmon::metrics";

/// Emits each sample as a Graphite plaintext line (`name value timestamp`)
/// through `tracing`.
///
/// Used when no backend is configured; pointing a log shipper at the
/// [`METRICS_TARGET`] events is enough to forward them.
#[derive(Debug, Default)]
pub struct LogSink {
    published: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples published since creation.
    pub fn published(&self) -> usize {
        self.published
    }
}

impl MetricSink for LogSink {
    fn publish(&mut self, sample: &MetricSample) {
        tracing::info!(
            target: METRICS_TARGET,
            "{}",
            graphite_line(sample, Utc::now().timestamp())
        );
        self.published += 1;
    }
}

/// Collects samples in memory until the caller drains them.
///
/// The push transport fills one per pass and sends its contents as a single
/// payload.
#[derive(Debug, Default)]
pub struct BufferSink {
    samples: Vec<MetricSample>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples published since the last drain, in publish order.
    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    /// Take every buffered sample, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<MetricSample> {
        std::mem::take(&mut self.samples)
    }
}

impl MetricSink for BufferSink {
    fn publish(&mut self, sample: &MetricSample) {
        self.samples.push(sample.clone());
    }
}

/// Format `sample` as a Graphite plaintext protocol line.
pub fn graphite_line(sample: &MetricSample, timestamp: i64) -> String {
    format!("{} {} {}", sample.name, sample.formatted_value(), timestamp)
}
