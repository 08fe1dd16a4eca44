// libs/booking-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{BookingError, InquiryStatus};

pub struct InquiryLifecycleService;

impl InquiryLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed.
    pub fn validate_status_transition(
        &self,
        current_status: &InquiryStatus,
        new_status: &InquiryStatus,
    ) -> Result<(), BookingError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        let valid_transitions = self.get_valid_transitions(current_status);

        if !valid_transitions.contains(new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(BookingError::InvalidStatusTransition(current_status.clone()));
        }

        Ok(())
    }

    /// All valid next statuses for a given current status. A rescheduled
    /// inquiry may be rescheduled again; cancelled and completed are
    /// terminal.
    pub fn get_valid_transitions(&self, current_status: &InquiryStatus) -> Vec<InquiryStatus> {
        match current_status {
            InquiryStatus::Pending => vec![
                InquiryStatus::Confirmed,
                InquiryStatus::Cancelled,
            ],
            InquiryStatus::Confirmed => vec![
                InquiryStatus::Cancelled,
                InquiryStatus::Rescheduled,
                InquiryStatus::Completed,
            ],
            InquiryStatus::Rescheduled => vec![
                InquiryStatus::Cancelled,
                InquiryStatus::Rescheduled,
                InquiryStatus::Completed,
            ],
            // Terminal states
            InquiryStatus::Cancelled => vec![],
            InquiryStatus::Completed => vec![],
        }
    }

    /// Statuses that currently own a bound Timeslot.
    pub fn holds_timeslot(&self, status: &InquiryStatus) -> bool {
        matches!(status, InquiryStatus::Confirmed | InquiryStatus::Rescheduled)
    }
}
