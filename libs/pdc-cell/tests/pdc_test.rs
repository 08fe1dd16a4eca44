use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pdc_cell::models::{CreatePdcRequest, PdcError, PdcItem, PdcSearchQuery, PdcStatus};
use pdc_cell::services::pdc::PdcService;
use shared_utils::clock;
use shared_utils::test_utils::{MockStoreRows, TestConfig};

async fn service_for(server: &MockServer) -> PdcService {
    PdcService::new(&TestConfig::with_url(&server.uri()).to_app_config())
}

fn create_request(check_number: &str, check_date: NaiveDate) -> CreatePdcRequest {
    CreatePdcRequest {
        check_number: check_number.to_string(),
        check_date,
        supplier: "Steelworks Ltd".to_string(),
        total_amount: 12500.0,
        items: vec![PdcItem {
            description: "Rebar bundle".to_string(),
            quantity: 50,
            unit_price: 250.0,
        }],
    }
}

#[tokio::test]
async fn test_create_future_check_stays_pending() {
    let mock_server = MockServer::start().await;
    let future = clock::today() + Duration::days(30);

    Mock::given(method("GET"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(query_param("check_number", "eq.CHK-1001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(body_partial_json(json!({ "status": "pending" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreRows::pdc_row(Uuid::new_v4(), "CHK-1001", future, "pending")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let pdc = service
        .create_pdc(create_request("CHK-1001", future))
        .await
        .unwrap();

    assert_eq!(pdc.status, PdcStatus::Pending);
    assert!(pdc.issued_at.is_none());
}

#[tokio::test]
async fn test_create_due_check_is_issued_immediately() {
    let mock_server = MockServer::start().await;
    let yesterday = clock::today() - Duration::days(1);

    Mock::given(method("GET"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(query_param("check_number", "eq.CHK-1002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    // The insert itself carries issued status, no separate transition
    Mock::given(method("POST"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(body_partial_json(json!({ "status": "issued" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreRows::pdc_row(Uuid::new_v4(), "CHK-1002", yesterday, "issued")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let pdc = service
        .create_pdc(create_request("CHK-1002", yesterday))
        .await
        .unwrap();

    assert_eq!(pdc.status, PdcStatus::Issued);
    assert!(pdc.issued_at.is_some());
}

#[tokio::test]
async fn test_create_rejects_duplicate_check_number() {
    let mock_server = MockServer::start().await;
    let future = clock::today() + Duration::days(10);

    Mock::given(method("GET"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(query_param("check_number", "eq.CHK-1003"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::pdc_row(Uuid::new_v4(), "CHK-1003", future, "pending")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/post_dated_checks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let result = service.create_pdc(create_request("CHK-1003", future)).await;

    assert_matches!(result, Err(PdcError::DuplicateCheckNumber));
}

#[tokio::test]
async fn test_create_rejects_non_positive_amount() {
    let mock_server = MockServer::start().await;
    let mut request = create_request("CHK-1004", clock::today() + Duration::days(5));
    request.total_amount = 0.0;

    let service = service_for(&mock_server).await;
    let result = service.create_pdc(request).await;

    assert_matches!(result, Err(PdcError::ValidationError(_)));
}

#[tokio::test]
async fn test_sweep_issues_only_due_pending_checks() {
    let mock_server = MockServer::start().await;
    let today = clock::today();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(query_param("status", "eq.pending"))
        .and(query_param("check_date", format!("lte.{}", today)))
        .and(body_partial_json(json!({ "status": "issued" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::pdc_row(Uuid::new_v4(), "CHK-2001", today, "issued"),
            MockStoreRows::pdc_row(Uuid::new_v4(), "CHK-2002", today - Duration::days(3), "issued"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let issued = service.sweep_due_checks().await.unwrap();

    assert_eq!(issued.len(), 2);
    assert!(issued.iter().all(|pdc| pdc.status == PdcStatus::Issued));
}

#[tokio::test]
async fn test_get_runs_sweep_before_read() {
    let mock_server = MockServer::start().await;
    let pdc_id = Uuid::new_v4();
    let today = clock::today();

    // Read-triggered sweep fires exactly once
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(query_param("status", "eq.pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(query_param("id", format!("eq.{}", pdc_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::pdc_row(pdc_id, "CHK-3001", today + Duration::days(7), "pending")
        ])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let pdc = service.get_pdc(pdc_id).await.unwrap();

    assert_eq!(pdc.id, pdc_id);
    assert_eq!(pdc.status, PdcStatus::Pending);
}

#[tokio::test]
async fn test_cancel_pending_check() {
    let mock_server = MockServer::start().await;
    let pdc_id = Uuid::new_v4();
    let future = clock::today() + Duration::days(14);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/post_dated_checks"))
        .and(query_param("id", format!("eq.{}", pdc_id)))
        .and(query_param("status", "eq.pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::pdc_row(pdc_id, "CHK-4001", future, "cancelled")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let cancelled = service.cancel_pdc(pdc_id).await.unwrap();

    assert_eq!(cancelled.status, PdcStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
}

#[tokio::test]
async fn test_cancel_issued_check_is_rejected() {
    let mock_server = MockServer::start().await;
    let pdc_id = Uuid::new_v4();
    let yesterday = clock::today() - Duration::days(1);

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
            MockStoreRows::pdc_row(pdc_id, "CHK-4002", yesterday, "issued")
        ])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let result = service.cancel_pdc(pdc_id).await;

    assert_matches!(result, Err(PdcError::InvalidStatusTransition(PdcStatus::Issued)));
}

#[tokio::test]
async fn test_search_filters_by_status() {
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
            MockStoreRows::pdc_row(Uuid::new_v4(), "CHK-5001", today, "issued")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let checks = service
        .search_pdcs(PdcSearchQuery {
            status: Some(PdcStatus::Issued),
            supplier: None,
            from_date: None,
            to_date: None,
            limit: None,
            offset: None,
        })
        .await
        .unwrap();

    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].status, PdcStatus::Issued);
}
