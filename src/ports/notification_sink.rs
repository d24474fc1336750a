//! Notification sink port.
//!
//! The lifecycle only produces notifications. Durable delivery and read
//! tracking belong to the implementation (the in-app message table in
//! production).

use async_trait::async_trait;

use crate::domain::evaluation::Notification;
use crate::domain::foundation::DomainError;

/// Accepts notifications for delivery.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Hands one notification over for delivery.
    ///
    /// # Errors
    ///
    /// - `NotificationFailed` if the message could not be accepted
    async fn send(&self, notification: &Notification) -> Result<(), DomainError>;
}
