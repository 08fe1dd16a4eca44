use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pdc_cell::router::pdc_routes;
use shared_utils::clock;
use shared_utils::test_utils::{MockStoreRows, TestConfig};

fn create_test_app(server: &MockServer) -> Router {
    pdc_routes(Arc::new(TestConfig::with_url(&server.uri()).to_app_config()))
}

#[tokio::test]
async fn test_search_checks_endpoint() {
    let mock_server = MockServer::start().await;
    let today = clock::today();

    // Read-triggered sweep
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/post_dated_checks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(query_param("status", "eq.issued"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::pdc_row(Uuid::new_v4(), "CHK-6001", today, "issued")
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let request = Request::builder()
        .method("GET")
        .uri("/search?status=issued")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["success"], true);
    assert_eq!(json_response["count"], 1);
    assert_eq!(json_response["checks"][0]["check_number"], "CHK-6001");
}

#[tokio::test]
async fn test_cancel_issued_check_endpoint_rejected() {
    let mock_server = MockServer::start().await;
    let pdc_id = Uuid::new_v4();
    let today = clock::today();

    // Conditional cancel matches nothing
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(query_param("id", format!("eq.{}", pdc_id)))
        .and(query_param("status", "eq.pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(query_param("id", format!("eq.{}", pdc_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::pdc_row(pdc_id, "CHK-6002", today, "issued")
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let request = Request::builder()
        .method("POST")
        .uri(&format!("/{}/cancel", pdc_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
