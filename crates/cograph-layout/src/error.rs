//! Error types for layout operations.

use thiserror::Error;

/// Errors that can occur at the boundary of the layout engine.
///
/// Inside a running session most problems are handled by omission (bad
/// edges are skipped, bad overrides fall back to derived values). These
/// variants are what a host can actually observe.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// A configuration value failed validation.
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// A protocol message could not be decoded or encoded.
    #[error("malformed protocol message: {0}")]
    Protocol(#[from] serde_json::Error),

    /// A command referenced a node id that is not in the session.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The simulation task is no longer running.
    #[error("simulation task disconnected")]
    Disconnected,
}
