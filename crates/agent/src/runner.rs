//! Local scheduling loop used when no backend is configured.

use std::time::Duration;

use scriptmon_core::collection::{MetricSink, PassSummary, ScriptCollector};
use scriptmon_core::scripting::executor::ScriptExecutor;

use crate::sink::LogSink;

/// Run one pass into `sink` and log its summary.
pub async fn run_pass<E: ScriptExecutor>(
    collector: &ScriptCollector<E>,
    sink: &mut dyn MetricSink,
) -> PassSummary {
    let runs = collector.collect_into(sink).await;
    let summary = PassSummary::from_runs(&runs);

    tracing::info!(
        scripts = summary.scripts,
        samples = summary.samples,
        failed_scripts = summary.failed_scripts,
        malformed_lines = summary.malformed_lines,
        "Collection pass complete",
    );

    summary
}

/// Run a pass every `interval`, publishing to a [`LogSink`], until Ctrl-C.
///
/// A slow pass delays the next tick instead of overlapping it.
pub async fn run_local<E: ScriptExecutor>(collector: &ScriptCollector<E>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut sink = LogSink::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_pass(collector, &mut sink).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(published = sink.published(), "Shutdown requested, stopping");
                break;
            }
        }
    }
}
