//! In-app notifications produced by the lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

/// Sender label used for notifications raised by scheduled processes.
pub const SYSTEM_SENDER: &str = "系统";

/// Message category as stored in the message table's `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    System,
    Evaluation,
    Announcement,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::System => "system",
            NotificationCategory::Evaluation => "evaluation",
            NotificationCategory::Announcement => "announcement",
        }
    }
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: UserId,
    pub title: String,
    pub body: String,
    pub sender: String,
    pub category: NotificationCategory,
}

impl Notification {
    /// Tells a student their publicity period ended and the result stands.
    pub fn publicity_ended(recipient: UserId, display_name: &str, ended_at: &Timestamp) -> Self {
        Self {
            recipient,
            title: format!("{}公示期结束", display_name),
            body: format!(
                "您的{}公示期已于{}结束，评测结果已确认。",
                display_name, ended_at
            ),
            sender: SYSTEM_SENDER.to_string(),
            category: NotificationCategory::Evaluation,
        }
    }

    /// Tells a student their squad's forms entered publicity.
    pub fn publicity_opened(recipient: UserId, sender: impl Into<String>) -> Self {
        Self {
            recipient,
            title: "综测公示通知".to_string(),
            body: "您的综测表已经进入公示阶段，请查看并确认评测结果。如有异议，请及时反馈。".to_string(),
            sender: sender.into(),
            category: NotificationCategory::Evaluation,
        }
    }
}
