//! Push/SMS notification seam
//!
//! Notifications are a best-effort side channel on state transitions.
//! Failures are logged by the lifecycle manager and never propagated as
//! operation failures.

use thiserror::Error;
use tracing::info;

/// Notification gateway failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotifyError {
    #[error("notification gateway unreachable: {0}")]
    Unreachable(String),
}

/// Outbound push/SMS gateway
pub trait NotificationGateway: Send + Sync {
    /// Deliver a message to a user or agent; best-effort
    fn push(&self, recipient: &str, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Default gateway that records notifications in the log stream
pub struct LogNotifier;

impl NotificationGateway for LogNotifier {
    fn push(&self, recipient: &str, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(recipient, title, body, "notification");
        Ok(())
    }
}
