//! Notification delivery errors.

use thiserror::Error;

/// Errors from a single delivery attempt. Logged and swallowed by the
/// sweep; never fatal and never retried mid-cycle.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(String),

    #[error("webhook returned status {0}")]
    Status(u16),
}
