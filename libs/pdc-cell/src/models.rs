// libs/pdc-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate};
use std::fmt;

// ==============================================================================
// CORE PDC MODELS
// ==============================================================================

/// A post-dated check registered against a supplier. Stays pending until
/// its check_date arrives, at which point it is issued automatically.
/// Cancellation is a soft delete, the record is retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDatedCheck {
    pub id: Uuid,
    pub check_number: String,
    pub check_date: NaiveDate,
    pub supplier: String,
    pub total_amount: f64,
    pub items: Vec<PdcItem>,
    pub status: PdcStatus,
    pub issued_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item the check covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdcItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PdcStatus {
    Pending,
    Issued,
    Cancelled,
}

impl fmt::Display for PdcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdcStatus::Pending => write!(f, "pending"),
            PdcStatus::Issued => write!(f, "issued"),
            PdcStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePdcRequest {
    pub check_number: String,
    pub check_date: NaiveDate,
    pub supplier: String,
    pub total_amount: f64,
    #[serde(default)]
    pub items: Vec<PdcItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdcSearchQuery {
    pub status: Option<PdcStatus>,
    pub supplier: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PdcError {
    #[error("Check not found")]
    NotFound,

    #[error("Check number already exists")]
    DuplicateCheckNumber,

    #[error("Check cannot be modified in current status: {0}")]
    InvalidStatusTransition(PdcStatus),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
