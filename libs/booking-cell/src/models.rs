// libs/booking-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate, NaiveTime};
use std::fmt;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// One bookable unit of appointment capacity. Available iff `inquiry_id`
/// is null; at most one non-available row exists per (date, time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeslot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub is_available: bool,
    pub inquiry_id: Option<Uuid>,
    pub meeting_type: Option<MeetingType>,
    pub updated_at: DateTime<Utc>,
}

/// A client's booking request and its lifecycle status. While status is
/// confirmed or rescheduled, (preferred_date, preferred_time) mirrors the
/// Timeslot the inquiry owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub design_id: Option<Uuid>,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub meeting_type: MeetingType,
    pub status: InquiryStatus,
    pub cancellation_reason: Option<String>,
    pub reschedule_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    Pending,
    Confirmed,
    Cancelled,
    Rescheduled,
    Completed,
}

impl fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InquiryStatus::Pending => write!(f, "pending"),
            InquiryStatus::Confirmed => write!(f, "confirmed"),
            InquiryStatus::Cancelled => write!(f, "cancelled"),
            InquiryStatus::Rescheduled => write!(f, "rescheduled"),
            InquiryStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MeetingType {
    Phone,
    Onsite,
    Video,
}

impl fmt::Display for MeetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingType::Phone => write!(f, "phone"),
            MeetingType::Onsite => write!(f, "onsite"),
            MeetingType::Video => write!(f, "video"),
        }
    }
}

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// Recurring weekly schedule expanded into discrete timeslots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySettings {
    /// Weekdays slots are generated for, 0 = Sunday .. 6 = Saturday.
    pub working_days: Vec<u32>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: u32,
    pub breaks: Vec<BreakWindow>,
}

/// Half-open window: a slot whose start satisfies `start <= t < end`
/// is excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateAvailabilityRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub settings: AvailabilitySettings,
}

/// A free slot rendered for display, with its 12-hour label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotView {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub label: String,
    pub meeting_type: Option<MeetingType>,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitInquiryRequest {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub design_id: Option<Uuid>,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub meeting_type: MeetingType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelInquiryRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleInquiryRequest {
    pub new_date: NaiveDate,
    pub new_time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquirySearchQuery {
    pub status: Option<InquiryStatus>,
    pub meeting_type: Option<MeetingType>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub submitted_from: Option<DateTime<Utc>>,
    pub submitted_to: Option<DateTime<Utc>>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// Counts computed by a full scan of the inquiries table. Fine at this
/// volume; push to store-side aggregation before it grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryStats {
    pub total: i32,
    pub pending: i32,
    pub confirmed: i32,
    pub cancelled: i32,
    pub rescheduled: i32,
    pub completed: i32,
    /// Confirmed or rescheduled inquiries whose preferred_date is today
    /// or later.
    pub upcoming: i32,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum BookingError {
    #[error("Inquiry not found")]
    NotFound,

    #[error("Time slot already booked")]
    SlotAlreadyBooked,

    #[error("Inquiry cannot be modified in current status: {0}")]
    InvalidStatusTransition(InquiryStatus),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
