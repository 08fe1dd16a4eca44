use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::router::booking_routes;
use shared_utils::test_utils::{MockStoreRows, TestConfig};

fn create_test_app(server: &MockServer) -> Router {
    booking_routes(Arc::new(TestConfig::with_url(&server.uri()).to_app_config()))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn test_get_available_slots_endpoint() {
    let mock_server = MockServer::start().await;
    let d = date(2026, 9, 7);

    Mock::given(method("GET"))
        .and(path("/rest/v1/timeslots"))
        .and(query_param("date", format!("eq.{}", d)))
        .and(query_param("is_available", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::timeslot_row(d, time(10, 0), true, None)
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let request = Request::builder()
        .method("GET")
        .uri("/slots?date=2026-09-07")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["count"], 1);
    assert_eq!(json_response["slots"][0]["label"], "10:00 AM");
}

#[tokio::test]
async fn test_get_inquiry_endpoint_not_found() {
    let mock_server = MockServer::start().await;
    let inquiry_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/inquiries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let request = Request::builder()
        .method("GET")
        .uri(&format!("/inquiries/{}", inquiry_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["error"], "Inquiry not found");
}
