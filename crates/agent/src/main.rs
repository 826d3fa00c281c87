//! `scriptmon-agent` -- runs user scripts and publishes their metrics.
//!
//! Every interval, executes each executable file in the scripts directory
//! and parses its `name value` output lines. Samples are pushed to a
//! backend over WebSocket when `BACKEND_WS_URL` is set, and otherwise
//! logged as Graphite plaintext lines.
//!
//! See [`AgentConfig::from_env`](scriptmon_agent::config::AgentConfig::from_env)
//! for the environment variables.

use scriptmon_agent::config::AgentConfig;
use scriptmon_agent::{runner, sender};
use scriptmon_core::collection::ScriptCollector;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scriptmon_agent=info,scriptmon_core=info,scriptmon=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        scripts_path = %config.collection.scripts_path.display(),
        float_precision = config.collection.float_precision,
        script_timeout_secs = config.collection.script_timeout.map(|t| t.as_secs()),
        interval_secs = config.interval.as_secs(),
        backend = config.backend.as_ref().map(|b| b.ws_url.as_str()),
        "Starting scriptmon-agent",
    );

    if config.collection.script_timeout.is_none() {
        tracing::warn!("Script timeout disabled -- a hung script will stall collection");
    }

    let collector = ScriptCollector::new(config.collection.clone());

    match &config.backend {
        Some(backend) => sender::run(backend, config.interval, &collector).await,
        None => runner::run_local(&collector, config.interval).await,
    }
}
