use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreateNotificationRequest, EmailMessage, Notification, NotificationChannel,
    NotificationError,
};

/// Outbound side-effect collaborator. Every booking and PDC transition
/// fires a notification through here; callers never await the outcome for
/// correctness, they spawn it and log failures.
pub struct NotificationDispatchService {
    supabase: Arc<SupabaseClient>,
    http: reqwest::Client,
    email_api_url: String,
    email_api_key: String,
    email_from_address: String,
    email_enabled: bool,
}

impl NotificationDispatchService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            http: reqwest::Client::new(),
            email_api_url: config.email_api_url.clone(),
            email_api_key: config.email_api_key.clone(),
            email_from_address: config.email_from_address.clone(),
            email_enabled: config.is_email_configured(),
        }
    }

    /// Fire-and-forget entry point: spawns the dispatch and logs the
    /// result. State mutations in the calling cell are already committed
    /// by the time this runs, so failures here are never surfaced.
    pub fn spawn_dispatch(self: &Arc<Self>, request: CreateNotificationRequest) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            match service.create_notification(request).await {
                Ok(notification) => {
                    debug!("Notification {} dispatched ({})", notification.id, notification.notification_type);
                }
                Err(e) => {
                    warn!("Notification dispatch failed: {}", e);
                }
            }
        });
    }

    pub async fn create_notification(
        &self,
        request: CreateNotificationRequest,
    ) -> Result<Notification, NotificationError> {
        if request.recipient.is_empty() {
            return Err(NotificationError::ValidationError(
                "Notification recipient is required".to_string(),
            ));
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            recipient: request.recipient,
            feature: request.feature,
            notification_type: request.notification_type,
            title: request.title,
            message: request.message,
            channels: request.channels,
            metadata: request.metadata,
            related_id: request.related_id,
            created_at: Utc::now(),
        };

        self.persist(&notification).await?;

        if notification.channels.contains(&NotificationChannel::Email) {
            if let Some(to) = request.recipient_email {
                let email = EmailMessage {
                    to,
                    subject: notification.title.clone(),
                    html: format!("<p>{}</p>", notification.message),
                };
                // Email failure is logged independently; the stored
                // notification stands regardless.
                if let Err(e) = self.send_email(email).await {
                    warn!("Email dispatch failed for notification {}: {}", notification.id, e);
                }
            }
        }

        Ok(notification)
    }

    pub async fn send_email(&self, message: EmailMessage) -> Result<(), NotificationError> {
        if !self.email_enabled {
            debug!("Email not configured, skipping send to {}", message.to);
            return Ok(());
        }

        let payload = json!({
            "from": self.email_from_address,
            "to": message.to,
            "subject": message.subject,
            "html": message.html,
        });

        let response = self
            .http
            .post(&self.email_api_url)
            .bearer_auth(&self.email_api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::EmailError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::EmailError(format!(
                "email API returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn persist(&self, notification: &Notification) -> Result<(), NotificationError> {
        let body = serde_json::to_value(notification)
            .map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        // Representation requested so the response is always a JSON array
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, "/rest/v1/notifications", Some(body), Some(headers))
            .await
            .map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
