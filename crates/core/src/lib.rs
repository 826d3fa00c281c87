//! `scriptmon-core` -- external-script metrics collection.
//!
//! Discovers executable scripts in a directory, runs each one, and parses
//! their `name value` output lines into [`metrics::MetricSample`]s. All
//! logic here is free of network and global state so the agent binary (or
//! any other host) can drive it with its own sink and scheduling.

pub mod collection;
pub mod error;
pub mod metric_names;
pub mod metrics;
pub mod scripting;
