use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::{
    CreateNotificationRequest, NotificationChannel, NotificationDispatchService,
    NotificationError,
};
use shared_utils::test_utils::TestConfig;

fn request(channels: Vec<NotificationChannel>) -> CreateNotificationRequest {
    CreateNotificationRequest {
        recipient: "client@example.com".to_string(),
        recipient_email: Some("client@example.com".to_string()),
        feature: "appointments".to_string(),
        notification_type: "inquiry_confirmed".to_string(),
        title: "Appointment confirmed".to_string(),
        message: "See you Monday.".to_string(),
        channels,
        metadata: None,
        related_id: Some(Uuid::new_v4()),
    }
}

#[tokio::test]
async fn test_create_notification_persists_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .and(body_partial_json(json!({
            "feature": "appointments",
            "notification_type": "inquiry_confirmed"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = NotificationDispatchService::new(
        &TestConfig::with_url(&mock_server.uri()).to_app_config(),
    );
    let notification = service
        .create_notification(request(vec![NotificationChannel::InApp]))
        .await
        .unwrap();

    assert_eq!(notification.notification_type, "inquiry_confirmed");
}

#[tokio::test]
async fn test_create_notification_rejects_empty_recipient() {
    let mock_server = MockServer::start().await;

    let service = NotificationDispatchService::new(
        &TestConfig::with_url(&mock_server.uri()).to_app_config(),
    );
    let mut req = request(vec![NotificationChannel::InApp]);
    req.recipient = String::new();

    let result = service.create_notification(req).await;
    assert!(matches!(result, Err(NotificationError::ValidationError(_))));
}

#[tokio::test]
async fn test_email_channel_tolerated_when_unconfigured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{}])))
        .mount(&mock_server)
        .await;

    // Test config leaves email unconfigured; the send is a silent no-op
    let service = NotificationDispatchService::new(
        &TestConfig::with_url(&mock_server.uri()).to_app_config(),
    );
    let notification = service
        .create_notification(request(vec![
            NotificationChannel::InApp,
            NotificationChannel::Email,
        ]))
        .await
        .unwrap();

    assert!(notification.channels.contains(&NotificationChannel::Email));
}

#[tokio::test]
async fn test_persist_failure_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let service = NotificationDispatchService::new(
        &TestConfig::with_url(&mock_server.uri()).to_app_config(),
    );
    let result = service
        .create_notification(request(vec![NotificationChannel::InApp]))
        .await;

    assert!(matches!(result, Err(NotificationError::DatabaseError(_))));
}
