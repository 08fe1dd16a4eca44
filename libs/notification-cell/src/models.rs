use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: String,
    pub feature: String,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub channels: Vec<NotificationChannel>,
    pub metadata: Option<Value>,
    pub related_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    InApp,
    Email,
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationChannel::InApp => write!(f, "in_app"),
            NotificationChannel::Email => write!(f, "email"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub recipient: String,
    pub recipient_email: Option<String>,
    pub feature: String,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub channels: Vec<NotificationChannel>,
    pub metadata: Option<Value>,
    pub related_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Email dispatch error: {0}")]
    EmailError(String),
}
