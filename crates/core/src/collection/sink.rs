use crate::metrics::MetricSample;

/// Receives every successfully parsed sample, once, in collection order.
///
/// Hosts implement this to forward samples to their own transport. The
/// collector calls it synchronously between scripts, so implementations
/// should buffer rather than block on I/O.
pub trait MetricSink: Send {
    fn publish(&mut self, sample: &MetricSample);
}

/// A plain vector is the simplest buffering sink.
impl MetricSink for Vec<MetricSample> {
    fn publish(&mut self, sample: &MetricSample) {
        self.push(sample.clone());
    }
}
