//! Script discovery and subprocess execution.
//!
//! [`discovery`] lists candidate scripts, [`binary`] runs one directly, and
//! [`subprocess`] holds the shared spawn + capture + timeout logic. Nothing
//! here parses output; that lives in [`crate::metrics`].

pub mod binary;
pub mod discovery;
pub mod executor;
pub mod subprocess;
