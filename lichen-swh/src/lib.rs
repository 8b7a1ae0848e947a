//! lichen-swh - Software Heritage license lookup agent
//!
//! Walks the distinct file contents (pfiles) of an uploaded package, asks
//! the heritage archive for each content's known license facts, and records
//! the answers durably, skipping files a previous run already covered.
//!
//! Exposed as a library so integration tests can drive the full pipeline
//! against a mock archive.

pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{AgentError, AgentResult};

/// Agent name used for identity registration and the HTTP user agent
pub const AGENT_NAME: &str = "lichen-swh";
