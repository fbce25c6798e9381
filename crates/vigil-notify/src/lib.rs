//! vigil-notify — notification sinks.
//!
//! A sink accepts formatted text and either delivers it or reports an
//! error. Delivery failures are the caller's problem to log and swallow;
//! a sink never retries on its own and never aborts a sweep.

pub mod discord;
pub mod error;

use async_trait::async_trait;
use tracing::error;

pub use discord::DiscordWebhook;
pub use error::NotifyError;

/// A destination for formatted notification text.
///
/// Implementations must be safe to share across concurrent per-target
/// tasks.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Sink used when no webhook is configured: logs what would have been
/// sent at ERROR and drops it, so the sweep itself keeps working.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        error!("no webhook configured, dropping notification: {message}");
        Ok(())
    }
}
