//! Transport error taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Errors from a single remote command execution attempt.
///
/// None of these are retried inside the transport; retry policy belongs
/// to the caller.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("{phase} timed out after {limit:?}")]
    Timeout {
        phase: &'static str,
        limit: Duration,
    },

    #[error("command i/o error: {0}")]
    CommandIo(String),
}
