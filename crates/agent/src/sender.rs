//! WebSocket connection and metrics push loop.
//!
//! Connects to the backend WebSocket endpoint, runs a collection pass via
//! [`ScriptCollector`] on every tick, and pushes the resulting samples as
//! JSON. Incoming frames are drained so pings are answered; the backend has
//! no commands for this agent.

use std::time::Duration;

use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use scriptmon_core::collection::{PassSummary, ScriptCollector};
use scriptmon_core::metric_names::MSG_TYPE_SCRIPT_METRICS;
use scriptmon_core::metrics::MetricSample;
use scriptmon_core::scripting::executor::ScriptExecutor;

use crate::config::BackendConfig;
use crate::runner;
use crate::sink::BufferSink;

/// Reconnection delay after a WebSocket failure.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Outgoing metrics payload sent to the backend after each pass.
#[derive(Debug, Serialize)]
pub struct ScriptMetricsPayload {
    pub r#type: &'static str,
    pub worker_id: i64,
    pub samples: Vec<MetricSample>,
    pub failed_scripts: usize,
    pub timestamp: String,
}

impl ScriptMetricsPayload {
    pub fn new(worker_id: i64, samples: Vec<MetricSample>, summary: &PassSummary) -> Self {
        Self {
            r#type: MSG_TYPE_SCRIPT_METRICS,
            worker_id,
            samples,
            failed_scripts: summary.failed_scripts,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Run the metrics push loop until Ctrl-C.
///
/// Reconnects with a fixed delay if the WebSocket connection drops.
pub async fn run<E: ScriptExecutor>(
    backend: &BackendConfig,
    interval: Duration,
    collector: &ScriptCollector<E>,
) {
    loop {
        tracing::info!(url = %backend.ws_url, "Connecting to backend WebSocket");

        let session = async {
            match connect_async(backend.ws_url.as_str()).await {
                Ok((ws_stream, _response)) => {
                    tracing::info!("WebSocket connected");
                    run_session(ws_stream, backend.worker_id, interval, collector).await;
                    tracing::warn!("WebSocket session ended, reconnecting");
                }
                Err(e) => {
                    tracing::error!(error = %e, "WebSocket connection failed");
                }
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        };

        tokio::select! {
            _ = session => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested, stopping");
                return;
            }
        }
    }
}

/// Drive a single WebSocket session: push metrics on a timer and drain
/// incoming frames via `tokio::select!`.
async fn run_session<E: ScriptExecutor>(
    ws_stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    worker_id: i64,
    interval: Duration,
    collector: &ScriptCollector<E>,
) {
    let (mut sink, mut stream) = ws_stream.split();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = send_metrics(&mut sink, worker_id, collector).await {
                    tracing::error!(error = %e, "Failed to send metrics");
                    break;
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::warn!(raw = %text, "Ignoring unexpected message from backend");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Backend closed WebSocket");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ping / Pong / Binary -- pings are answered by tungstenite.
                    }
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "WebSocket receive error");
                        break;
                    }
                    None => {
                        tracing::info!("WebSocket stream exhausted");
                        break;
                    }
                }
            }
        }
    }
}

/// Run a collection pass and send its samples as a JSON text frame.
async fn send_metrics<S, E>(
    sink: &mut S,
    worker_id: i64,
    collector: &ScriptCollector<E>,
) -> Result<(), SendError>
where
    S: SinkExt<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
    E: ScriptExecutor,
{
    let mut buffer = BufferSink::new();
    let summary = runner::run_pass(collector, &mut buffer).await;

    let payload = ScriptMetricsPayload::new(worker_id, buffer.drain(), &summary);
    let json = serde_json::to_string(&payload)?;

    tracing::debug!(worker_id, samples = summary.samples, "Sending script metrics");
    sink.send(Message::Text(json)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_with_type_tag() {
        let summary = PassSummary {
            scripts: 2,
            samples: 1,
            failed_scripts: 1,
            malformed_lines: 0,
        };
        let samples = vec![MetricSample {
            name: "cpu.load".to_string(),
            value: 3.5,
            precision: 4,
        }];
        let payload = ScriptMetricsPayload::new(9, samples, &summary);

        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(json["type"], "script_metrics");
        assert_eq!(json["worker_id"], 9);
        assert_eq!(json["failed_scripts"], 1);
        assert_eq!(json["samples"][0]["name"], "cpu.load");
        assert_eq!(json["samples"][0]["precision"], 4);
        assert!(json["timestamp"].is_string());
    }
}
