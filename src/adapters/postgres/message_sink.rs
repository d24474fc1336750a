//! PostgreSQL implementation of NotificationSink.
//!
//! Notifications become rows of the `messages` table, the in-app inbox
//! the student portal reads from.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::evaluation::Notification;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::NotificationSink;

/// Writes notifications to the `messages` table.
pub struct PostgresMessageSink {
    pool: PgPool,
}

impl PostgresMessageSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for PostgresMessageSink {
    async fn send(&self, notification: &Notification) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO messages (title, content, sender, receiver, type, is_read, create_time)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            "#,
        )
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.sender)
        .bind(notification.recipient.as_i64())
        .bind(notification.category.as_str())
        .bind(*Timestamp::now().as_naive())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::NotificationFailed,
                format!("Failed to store message: {}", e),
            )
        })?;

        Ok(())
    }
}
