//! Recording notification sink.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::evaluation::Notification;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::NotificationSink;

/// Keeps every accepted notification in memory.
#[derive(Default)]
pub struct InMemoryNotificationSink {
    sent: RwLock<Vec<Notification>>,
    rejected: HashSet<UserId>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses notifications addressed to `user`.
    pub fn rejecting(mut self, user: UserId) -> Self {
        self.rejected.insert(user);
        self
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }

    pub async fn sent_to(&self, user: UserId) -> Vec<Notification> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|n| n.recipient == user)
            .cloned()
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.write().await.clear();
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn send(&self, notification: &Notification) -> Result<(), DomainError> {
        if self.rejected.contains(&notification.recipient) {
            return Err(DomainError::new(
                ErrorCode::NotificationFailed,
                format!("Recipient {} rejected", notification.recipient),
            ));
        }
        self.sent.write().await.push(notification.clone());
        Ok(())
    }
}
