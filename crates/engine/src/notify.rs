//! Invitation notification boundary.
//!
//! Sending the actual email lives outside the engine. The engine calls the
//! notifier strictly after the invite transaction commits, and a notifier
//! failure is logged and swallowed: it must never roll back or fail the
//! participant resolution that triggered it.

use std::fmt;

/// Payload handed to the mail collaborator for a new invite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InviteNotification {
    pub recipient_email: String,
    pub trip_name: String,
    pub inviter_name: String,
    pub join_link: String,
    pub unsubscribe_link: String,
}

/// Fire-and-forget collaborator for invitation delivery.
pub trait InviteNotifier: Send + Sync {
    /// Attempts delivery. Errors are reported to the caller only so it can
    /// log them; they carry no control-flow meaning.
    fn send_invitation(&self, notification: InviteNotification) -> Result<(), NotifyError>;
}

#[derive(Debug)]
pub struct NotifyError(pub String);

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification failed: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Default notifier: records the attempt in the log and succeeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl InviteNotifier for LogNotifier {
    fn send_invitation(&self, notification: InviteNotification) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %notification.recipient_email,
            trip = %notification.trip_name,
            "invitation queued"
        );
        Ok(())
    }
}
