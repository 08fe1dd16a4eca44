// libs/pdc-cell/src/services/pdc.rs
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::clock;
use notification_cell::{
    CreateNotificationRequest, NotificationChannel, NotificationDispatchService,
};

use crate::models::{CreatePdcRequest, PdcError, PdcSearchQuery, PdcStatus, PostDatedCheck};

/// Registers post-dated checks and moves the due ones from pending to
/// issued. Issuing happens in two places: the periodic sweep, and a
/// read-triggered sweep before any listing so callers never see a stale
/// pending check whose date has passed.
pub struct PdcService {
    supabase: Arc<SupabaseClient>,
    notifier: Arc<NotificationDispatchService>,
}

impl PdcService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            notifier: Arc::new(NotificationDispatchService::new(config)),
        }
    }

    /// Register a new check. A check dated today or earlier skips pending
    /// entirely and is created already issued.
    pub async fn create_pdc(&self, request: CreatePdcRequest) -> Result<PostDatedCheck, PdcError> {
        if request.check_number.trim().is_empty() {
            return Err(PdcError::ValidationError(
                "Check number is required".to_string(),
            ));
        }
        if request.supplier.trim().is_empty() {
            return Err(PdcError::ValidationError(
                "Supplier is required".to_string(),
            ));
        }
        if request.total_amount <= 0.0 {
            return Err(PdcError::ValidationError(
                "Total amount must be greater than zero".to_string(),
            ));
        }

        let lookup_path = format!(
            "/rest/v1/post_dated_checks?check_number=eq.{}",
            urlencoding::encode(&request.check_number)
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &lookup_path, None)
            .await
            .map_err(|e| PdcError::DatabaseError(e.to_string()))?;
        if !existing.is_empty() {
            warn!("Duplicate check number rejected: {}", request.check_number);
            return Err(PdcError::DuplicateCheckNumber);
        }

        let now = Utc::now();
        let due_already = clock::has_arrived(request.check_date);
        let status = if due_already { PdcStatus::Issued } else { PdcStatus::Pending };

        info!(
            "Registering check {} for {} dated {} ({})",
            request.check_number, request.total_amount, request.check_date, status
        );

        let pdc_data = json!({
            "check_number": request.check_number,
            "check_date": request.check_date.to_string(),
            "supplier": request.supplier,
            "total_amount": request.total_amount,
            "items": request.items,
            "status": status.to_string(),
            "issued_at": if due_already { json!(now.to_rfc3339()) } else { Value::Null },
            "cancelled_at": Value::Null,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/post_dated_checks",
                Some(pdc_data),
                Some(headers),
            )
            .await
            .map_err(|e| {
                // A concurrent create may still lose to the unique index
                let message = e.to_string();
                if message.contains("Conflict") || message.contains("duplicate") {
                    PdcError::DuplicateCheckNumber
                } else {
                    PdcError::DatabaseError(message)
                }
            })?;

        let pdc = parse_pdc_row(result.into_iter().next().ok_or_else(|| {
            PdcError::DatabaseError("Failed to create check".to_string())
        })?)?;

        self.notify(&pdc, "pdc_created", "Check registered",
            format!("Check {} for {:.2} registered, due {}.", pdc.check_number, pdc.total_amount, pdc.check_date));
        if due_already {
            self.notify(&pdc, "pdc_issued", "Check issued",
                format!("Check {} for {:.2} was due on registration and has been issued.", pdc.check_number, pdc.total_amount));
        }

        Ok(pdc)
    }

    pub async fn get_pdc(&self, pdc_id: Uuid) -> Result<PostDatedCheck, PdcError> {
        self.sweep_due_checks().await?;

        let path = format!("/rest/v1/post_dated_checks?id=eq.{}", pdc_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PdcError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(PdcError::NotFound)?;
        parse_pdc_row(row)
    }

    pub async fn search_pdcs(
        &self,
        query: PdcSearchQuery,
    ) -> Result<Vec<PostDatedCheck>, PdcError> {
        self.sweep_due_checks().await?;

        debug!("Searching checks with filters: {:?}", query);

        let mut query_parts = Vec::new();
        if let Some(status) = query.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(supplier) = query.supplier {
            query_parts.push(format!("supplier=eq.{}", urlencoding::encode(&supplier)));
        }
        if let Some(from_date) = query.from_date {
            query_parts.push(format!("check_date=gte.{}", from_date));
        }
        if let Some(to_date) = query.to_date {
            query_parts.push(format!("check_date=lte.{}", to_date));
        }

        let mut path = format!(
            "/rest/v1/post_dated_checks?{}&order=check_date.asc",
            query_parts.join("&")
        );
        if let Some(limit) = query.limit {
            path.push_str(&format!("&limit={}", limit));
        }
        if let Some(offset) = query.offset {
            path.push_str(&format!("&offset={}", offset));
        }

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PdcError::DatabaseError(e.to_string()))?;

        result.into_iter().map(parse_pdc_row).collect()
    }

    /// Cancel a pending check (soft delete, record retained). Issued
    /// checks are already out the door and cancelled ones stay cancelled,
    /// so the conditional update only matches pending rows.
    pub async fn cancel_pdc(&self, pdc_id: Uuid) -> Result<PostDatedCheck, PdcError> {
        debug!("Cancelling check: {}", pdc_id);

        let now = Utc::now();
        let path = format!(
            "/rest/v1/post_dated_checks?id=eq.{}&status=eq.pending",
            pdc_id
        );
        let body = json!({
            "status": PdcStatus::Cancelled.to_string(),
            "cancelled_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(body), Some(headers))
            .await
            .map_err(|e| PdcError::DatabaseError(e.to_string()))?;

        match result.into_iter().next() {
            Some(row) => {
                let cancelled = parse_pdc_row(row)?;
                info!("Check {} cancelled", cancelled.check_number);
                self.notify(&cancelled, "pdc_cancelled", "Check cancelled",
                    format!("Check {} has been cancelled.", cancelled.check_number));
                Ok(cancelled)
            }
            // Nothing matched: either the check does not exist or it is
            // not pending. Fetch the bare row to tell which.
            None => {
                let lookup = format!("/rest/v1/post_dated_checks?id=eq.{}", pdc_id);
                let existing: Vec<Value> = self
                    .supabase
                    .request(Method::GET, &lookup, None)
                    .await
                    .map_err(|e| PdcError::DatabaseError(e.to_string()))?;
                match existing.into_iter().next() {
                    Some(row) => {
                        let pdc = parse_pdc_row(row)?;
                        warn!(
                            "Cancel rejected for check {} in status {}",
                            pdc.check_number, pdc.status
                        );
                        Err(PdcError::InvalidStatusTransition(pdc.status))
                    }
                    None => Err(PdcError::NotFound),
                }
            }
        }
    }

    /// Issue every pending check whose date has arrived. One conditional
    /// bulk update, so concurrent sweeps cannot double-issue. Returns the
    /// checks issued by this call.
    pub async fn sweep_due_checks(&self) -> Result<Vec<PostDatedCheck>, PdcError> {
        let today = clock::today();
        let now = Utc::now();

        let path = format!(
            "/rest/v1/post_dated_checks?status=eq.pending&check_date=lte.{}",
            today
        );
        let body = json!({
            "status": PdcStatus::Issued.to_string(),
            "issued_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(body), Some(headers))
            .await
            .map_err(|e| PdcError::DatabaseError(e.to_string()))?;

        let issued: Vec<PostDatedCheck> = result
            .into_iter()
            .map(parse_pdc_row)
            .collect::<Result<Vec<PostDatedCheck>, _>>()?;

        if !issued.is_empty() {
            info!("Issued {} due check(s)", issued.len());
            for pdc in &issued {
                self.notify(pdc, "pdc_issued", "Check issued",
                    format!("Check {} for {:.2} reached its date and has been issued.", pdc.check_number, pdc.total_amount));
            }
        }

        Ok(issued)
    }

    fn notify(&self, pdc: &PostDatedCheck, notification_type: &str, title: &str, message: String) {
        self.notifier.spawn_dispatch(CreateNotificationRequest {
            recipient: "finance".to_string(),
            recipient_email: None,
            feature: "post_dated_checks".to_string(),
            notification_type: notification_type.to_string(),
            title: title.to_string(),
            message,
            channels: vec![NotificationChannel::InApp],
            metadata: Some(json!({
                "check_number": pdc.check_number,
                "check_date": pdc.check_date.to_string(),
                "supplier": pdc.supplier,
                "total_amount": pdc.total_amount,
            })),
            related_id: Some(pdc.id),
        });
    }
}

fn parse_pdc_row(row: Value) -> Result<PostDatedCheck, PdcError> {
    serde_json::from_value(row)
        .map_err(|e| PdcError::DatabaseError(format!("Failed to parse check: {}", e)))
}
