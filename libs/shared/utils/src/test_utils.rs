use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            // Email left unconfigured so tests never attempt delivery
            email_api_url: String::new(),
            email_api_key: String::new(),
            email_from_address: "no-reply@backoffice.local".to_string(),
            pdc_sweep_interval_hours: 24,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Canned PostgREST rows for wiremock-backed tests.
pub struct MockStoreRows;

impl MockStoreRows {
    pub fn timeslot_row(
        date: NaiveDate,
        time: NaiveTime,
        is_available: bool,
        inquiry_id: Option<Uuid>,
    ) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "date": date.to_string(),
            "time": time.format("%H:%M:%S").to_string(),
            "is_available": is_available,
            "inquiry_id": inquiry_id,
            "meeting_type": if inquiry_id.is_some() { json!("onsite") } else { Value::Null },
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    pub fn inquiry_row(id: Uuid, status: &str, date: NaiveDate, time: NaiveTime) -> Value {
        json!({
            "id": id,
            "client_name": "Test Client",
            "client_email": "client@example.com",
            "client_phone": "+15550100",
            "design_id": Uuid::new_v4(),
            "preferred_date": date.to_string(),
            "preferred_time": time.format("%H:%M:%S").to_string(),
            "meeting_type": "onsite",
            "status": status,
            "cancellation_reason": Value::Null,
            "reschedule_notes": Value::Null,
            "submitted_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    pub fn pdc_row(id: Uuid, check_number: &str, check_date: NaiveDate, status: &str) -> Value {
        json!({
            "id": id,
            "check_number": check_number,
            "check_date": check_date.to_string(),
            "supplier": "Steelworks Ltd",
            "total_amount": 12500.0,
            "items": [
                { "description": "Rebar bundle", "quantity": 50, "unit_price": 250.0 }
            ],
            "status": status,
            "issued_at": if status == "issued" { json!(Utc::now().to_rfc3339()) } else { Value::Null },
            "cancelled_at": if status == "cancelled" { json!(Utc::now().to_rfc3339()) } else { Value::Null },
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        })
    }
}
