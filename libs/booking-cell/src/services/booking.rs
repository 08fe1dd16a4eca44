// libs/booking-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::clock;
use notification_cell::{
    CreateNotificationRequest, NotificationChannel, NotificationDispatchService,
};

use crate::models::{
    AvailableSlotView, BookingError, CancelInquiryRequest, Inquiry, InquirySearchQuery,
    InquiryStats, InquiryStatus, MeetingType, RescheduleInquiryRequest, SubmitInquiryRequest,
    Timeslot,
};
use crate::services::lifecycle::InquiryLifecycleService;

/// Drives an inquiry between pending/confirmed/cancelled/rescheduled/
/// completed while keeping exactly one Timeslot bound per active booking.
///
/// Every operation loads the inquiry fresh from the store; slot claiming
/// is a single conditional write so two concurrent requests cannot both
/// take the same (date, time).
pub struct InquiryBookingService {
    supabase: Arc<SupabaseClient>,
    lifecycle: InquiryLifecycleService,
    notifier: Arc<NotificationDispatchService>,
}

impl InquiryBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            lifecycle: InquiryLifecycleService::new(),
            notifier: Arc::new(NotificationDispatchService::new(config)),
        }
    }

    /// Create a new inquiry in pending state. No Timeslot is touched
    /// until the inquiry is confirmed.
    pub async fn submit_inquiry(
        &self,
        request: SubmitInquiryRequest,
    ) -> Result<Inquiry, BookingError> {
        if request.client_name.trim().is_empty() || request.client_email.trim().is_empty() {
            return Err(BookingError::ValidationError(
                "Client name and email are required".to_string(),
            ));
        }

        info!(
            "Submitting inquiry for {} at {} {}",
            request.client_email, request.preferred_date, request.preferred_time
        );

        let now = Utc::now();
        let inquiry_data = json!({
            "client_name": request.client_name,
            "client_email": request.client_email,
            "client_phone": request.client_phone,
            "design_id": request.design_id,
            "preferred_date": request.preferred_date.to_string(),
            "preferred_time": request.preferred_time.format("%H:%M:%S").to_string(),
            "meeting_type": request.meeting_type.to_string(),
            "status": InquiryStatus::Pending.to_string(),
            "cancellation_reason": Value::Null,
            "reschedule_notes": Value::Null,
            "submitted_at": now.to_rfc3339(),
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
                "/rest/v1/inquiries",
                Some(inquiry_data),
                Some(headers),
            )
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let inquiry = parse_inquiry_row(result.into_iter().next().ok_or_else(|| {
            BookingError::DatabaseError("Failed to create inquiry".to_string())
        })?)?;

        self.notify(&inquiry, "inquiry_submitted", "Inquiry received",
            format!(
                "Your design consultation request for {} at {} has been received.",
                inquiry.preferred_date,
                clock::to_12_hour_label(inquiry.preferred_time)
            ));

        Ok(inquiry)
    }

    /// Confirm a pending inquiry into its preferred (date, time) slot.
    pub async fn confirm_inquiry(&self, inquiry_id: Uuid) -> Result<Inquiry, BookingError> {
        debug!("Confirming inquiry: {}", inquiry_id);

        let inquiry = self.get_inquiry(inquiry_id).await?;
        self.lifecycle
            .validate_status_transition(&inquiry.status, &InquiryStatus::Confirmed)?;

        self.claim_slot(
            inquiry.preferred_date,
            inquiry.preferred_time,
            inquiry.id,
            &inquiry.meeting_type,
        )
        .await?;

        let mut update = serde_json::Map::new();
        update.insert("status".to_string(), json!(InquiryStatus::Confirmed.to_string()));

        let confirmed = match self.update_inquiry_record(inquiry.id, update).await {
            Ok(updated) => updated,
            Err(e) => {
                // Known gap: the slot write has already landed and there is
                // no compensating transaction. Surface and log loudly.
                error!(
                    "Timeslot {} {} claimed but inquiry {} status update failed: {}",
                    inquiry.preferred_date, inquiry.preferred_time, inquiry.id, e
                );
                return Err(e);
            }
        };

        info!("Inquiry {} confirmed", confirmed.id);
        self.notify(&confirmed, "inquiry_confirmed", "Appointment confirmed",
            format!(
                "Your {} consultation is confirmed for {} at {}.",
                confirmed.meeting_type,
                confirmed.preferred_date,
                clock::to_12_hour_label(confirmed.preferred_time)
            ));

        Ok(confirmed)
    }

    /// Cancel an inquiry, freeing whatever Timeslot it currently owns.
    pub async fn cancel_inquiry(
        &self,
        inquiry_id: Uuid,
        request: CancelInquiryRequest,
    ) -> Result<Inquiry, BookingError> {
        debug!("Cancelling inquiry: {}", inquiry_id);

        let inquiry = self.get_inquiry(inquiry_id).await?;
        self.lifecycle
            .validate_status_transition(&inquiry.status, &InquiryStatus::Cancelled)?;

        // Pending inquiries own no slot; the filtered free matches nothing
        // and that is fine.
        self.free_slot(inquiry.preferred_date, inquiry.preferred_time, inquiry.id)
            .await?;

        let mut update = serde_json::Map::new();
        update.insert("status".to_string(), json!(InquiryStatus::Cancelled.to_string()));
        update.insert("cancellation_reason".to_string(), json!(request.reason));

        let cancelled = self.update_inquiry_record(inquiry.id, update).await?;

        info!("Inquiry {} cancelled", cancelled.id);
        self.notify(&cancelled, "inquiry_cancelled", "Appointment cancelled",
            format!(
                "Your consultation on {} at {} has been cancelled.",
                inquiry.preferred_date,
                clock::to_12_hour_label(inquiry.preferred_time)
            ));

        Ok(cancelled)
    }

    /// Move a confirmed or rescheduled inquiry to a new (date, time).
    /// The new slot is claimed before the old one is freed, so a failed
    /// claim leaves the existing booking intact.
    pub async fn reschedule_inquiry(
        &self,
        inquiry_id: Uuid,
        request: RescheduleInquiryRequest,
    ) -> Result<Inquiry, BookingError> {
        debug!(
            "Rescheduling inquiry {} to {} {}",
            inquiry_id, request.new_date, request.new_time
        );

        let inquiry = self.get_inquiry(inquiry_id).await?;
        self.lifecycle
            .validate_status_transition(&inquiry.status, &InquiryStatus::Rescheduled)?;

        let same_slot = inquiry.preferred_date == request.new_date
            && inquiry.preferred_time == request.new_time;

        if !same_slot {
            self.claim_slot(request.new_date, request.new_time, inquiry.id, &inquiry.meeting_type)
                .await?;
            self.free_slot(inquiry.preferred_date, inquiry.preferred_time, inquiry.id)
                .await?;
        }

        let mut update = serde_json::Map::new();
        update.insert("preferred_date".to_string(), json!(request.new_date.to_string()));
        update.insert(
            "preferred_time".to_string(),
            json!(request.new_time.format("%H:%M:%S").to_string()),
        );
        update.insert("status".to_string(), json!(InquiryStatus::Rescheduled.to_string()));
        if let Some(notes) = request.notes {
            update.insert("reschedule_notes".to_string(), json!(notes));
        }

        let rescheduled = match self.update_inquiry_record(inquiry.id, update).await {
            Ok(updated) => updated,
            Err(e) => {
                error!(
                    "Timeslot {} {} claimed but inquiry {} reschedule update failed: {}",
                    request.new_date, request.new_time, inquiry.id, e
                );
                return Err(e);
            }
        };

        info!(
            "Inquiry {} rescheduled to {} {}",
            rescheduled.id, rescheduled.preferred_date, rescheduled.preferred_time
        );
        self.notify(&rescheduled, "inquiry_rescheduled", "Appointment rescheduled",
            format!(
                "Your consultation has been moved to {} at {}.",
                rescheduled.preferred_date,
                clock::to_12_hour_label(rescheduled.preferred_time)
            ));

        Ok(rescheduled)
    }

    /// Mark an inquiry completed. The bound Timeslot is deliberately left
    /// as-is: the visit happened, the slot is spent.
    pub async fn complete_inquiry(&self, inquiry_id: Uuid) -> Result<Inquiry, BookingError> {
        debug!("Completing inquiry: {}", inquiry_id);

        let inquiry = self.get_inquiry(inquiry_id).await?;
        self.lifecycle
            .validate_status_transition(&inquiry.status, &InquiryStatus::Completed)?;

        let mut update = serde_json::Map::new();
        update.insert("status".to_string(), json!(InquiryStatus::Completed.to_string()));

        let completed = self.update_inquiry_record(inquiry.id, update).await?;

        info!("Inquiry {} completed", completed.id);
        self.notify(&completed, "inquiry_completed", "Consultation completed",
            "Thank you for visiting us. Your consultation is marked as completed.".to_string());

        Ok(completed)
    }

    pub async fn get_inquiry(&self, inquiry_id: Uuid) -> Result<Inquiry, BookingError> {
        let path = format!("/rest/v1/inquiries?id=eq.{}", inquiry_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(BookingError::NotFound)?;
        parse_inquiry_row(row)
    }

    /// Free slots for a date, de-duplicated by time (first occurrence
    /// wins), ascending, with a 12-hour display label each.
    pub async fn available_slots(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AvailableSlotView>, BookingError> {
        debug!("Fetching available slots for {}", date);

        let path = format!(
            "/rest/v1/timeslots?date=eq.{}&is_available=eq.true&order=time.asc",
            date
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let slots: Vec<Timeslot> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Timeslot>, _>>()
            .map_err(|e| BookingError::DatabaseError(format!("Failed to parse timeslots: {}", e)))?;

        let mut views: Vec<AvailableSlotView> = Vec::with_capacity(slots.len());
        for slot in slots {
            if views.last().map(|view| view.time) == Some(slot.time) {
                continue;
            }
            views.push(AvailableSlotView {
                date: slot.date,
                time: slot.time,
                label: clock::to_12_hour_label(slot.time),
                meeting_type: slot.meeting_type,
            });
        }

        Ok(views)
    }

    pub async fn search_inquiries(
        &self,
        query: InquirySearchQuery,
    ) -> Result<Vec<Inquiry>, BookingError> {
        debug!("Searching inquiries with filters: {:?}", query);

        let mut query_parts = Vec::new();

        if let Some(status) = query.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(meeting_type) = query.meeting_type {
            query_parts.push(format!("meeting_type=eq.{}", meeting_type));
        }
        if let Some(from_date) = query.from_date {
            query_parts.push(format!("preferred_date=gte.{}", from_date));
        }
        if let Some(to_date) = query.to_date {
            query_parts.push(format!("preferred_date=lte.{}", to_date));
        }
        if let Some(submitted_from) = query.submitted_from {
            let encoded = urlencoding::encode(&submitted_from.to_rfc3339()).into_owned();
            query_parts.push(format!("submitted_at=gte.{}", encoded));
        }
        if let Some(submitted_to) = query.submitted_to {
            let encoded = urlencoding::encode(&submitted_to.to_rfc3339()).into_owned();
            query_parts.push(format!("submitted_at=lte.{}", encoded));
        }

        let mut path = format!(
            "/rest/v1/inquiries?{}&order=preferred_date.desc,preferred_time.asc",
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
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        result.into_iter().map(parse_inquiry_row).collect()
    }

    /// Status counts via a full in-memory scan. Volume is low enough that
    /// pushing aggregation to the store is not worth it yet.
    pub async fn get_inquiry_stats(&self) -> Result<InquiryStats, BookingError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/inquiries", None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let inquiries: Vec<Inquiry> = result
            .into_iter()
            .map(parse_inquiry_row)
            .collect::<Result<Vec<Inquiry>, _>>()?;

        let today = clock::today();
        let count = |status: InquiryStatus| {
            inquiries.iter().filter(|i| i.status == status).count() as i32
        };

        Ok(InquiryStats {
            total: inquiries.len() as i32,
            pending: count(InquiryStatus::Pending),
            confirmed: count(InquiryStatus::Confirmed),
            cancelled: count(InquiryStatus::Cancelled),
            rescheduled: count(InquiryStatus::Rescheduled),
            completed: count(InquiryStatus::Completed),
            upcoming: inquiries
                .iter()
                .filter(|i| {
                    self.lifecycle.holds_timeslot(&i.status) && i.preferred_date >= today
                })
                .count() as i32,
        })
    }

    // ==============================================================================
    // PRIVATE HELPER METHODS
    // ==============================================================================

    /// Bind a (date, time) slot to an inquiry with one conditional write.
    ///
    /// The update carries `is_available=eq.true` in its filter, so it only
    /// lands if the slot is still free; an empty result means somebody
    /// else holds it (or no row exists yet). The insert fallback relies on
    /// the unique (date, time) index, which turns the insert/insert race
    /// into a duplicate error rather than a double booking.
    async fn claim_slot(
        &self,
        date: NaiveDate,
        time: chrono::NaiveTime,
        inquiry_id: Uuid,
        meeting_type: &MeetingType,
    ) -> Result<(), BookingError> {
        let time_str = time.format("%H:%M:%S").to_string();
        let now = Utc::now();

        let claim_path = format!(
            "/rest/v1/timeslots?date=eq.{}&time=eq.{}&is_available=eq.true",
            date, time_str
        );
        let claim_body = json!({
            "is_available": false,
            "inquiry_id": inquiry_id,
            "meeting_type": meeting_type.to_string(),
            "updated_at": now.to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let claimed: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &claim_path,
                Some(claim_body),
                Some(headers.clone()),
            )
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        if !claimed.is_empty() {
            debug!("Claimed existing timeslot {} {} for inquiry {}", date, time_str, inquiry_id);
            return Ok(());
        }

        // Nothing matched the conditional update: either the slot is held
        // or no row exists for this (date, time) yet.
        let lookup_path = format!("/rest/v1/timeslots?date=eq.{}&time=eq.{}", date, time_str);
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &lookup_path, None)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        if let Some(row) = existing.first() {
            let bound_to = row["inquiry_id"].as_str().map(str::to_string);
            if bound_to.as_deref() == Some(&inquiry_id.to_string()) {
                debug!("Timeslot {} {} already bound to inquiry {}", date, time_str, inquiry_id);
                return Ok(());
            }
            warn!("Timeslot {} {} already booked", date, time_str);
            return Err(BookingError::SlotAlreadyBooked);
        }

        let insert_body = json!({
            "date": date.to_string(),
            "time": time_str,
            "is_available": false,
            "inquiry_id": inquiry_id,
            "meeting_type": meeting_type.to_string(),
            "updated_at": now.to_rfc3339(),
        });

        match self
            .supabase
            .request_with_headers::<Vec<Value>>(
                Method::POST,
                "/rest/v1/timeslots",
                Some(insert_body),
                Some(headers),
            )
            .await
        {
            Ok(_) => {
                debug!("Inserted bound timeslot {} {} for inquiry {}", date, time_str, inquiry_id);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                if message.contains("Conflict") || message.contains("duplicate") {
                    warn!("Lost timeslot insert race for {} {}", date, time_str);
                    Err(BookingError::SlotAlreadyBooked)
                } else {
                    Err(BookingError::DatabaseError(message))
                }
            }
        }
    }

    /// Release the slot an inquiry holds at (date, time). Filtered on the
    /// owning inquiry id, so a slot owned by someone else (or none at
    /// all) is never touched.
    async fn free_slot(
        &self,
        date: NaiveDate,
        time: chrono::NaiveTime,
        inquiry_id: Uuid,
    ) -> Result<(), BookingError> {
        let path = format!(
            "/rest/v1/timeslots?date=eq.{}&time=eq.{}&inquiry_id=eq.{}",
            date,
            time.format("%H:%M:%S"),
            inquiry_id
        );
        let body = json!({
            "is_available": true,
            "inquiry_id": Value::Null,
            "meeting_type": Value::Null,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(body), Some(headers))
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn update_inquiry_record(
        &self,
        inquiry_id: Uuid,
        mut update: serde_json::Map<String, Value>,
    ) -> Result<Inquiry, BookingError> {
        update.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/inquiries?id=eq.{}", inquiry_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(update)),
                Some(headers),
            )
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(BookingError::NotFound)?;
        parse_inquiry_row(row)
    }

    fn notify(&self, inquiry: &Inquiry, notification_type: &str, title: &str, message: String) {
        self.notifier.spawn_dispatch(CreateNotificationRequest {
            recipient: inquiry.client_email.clone(),
            recipient_email: Some(inquiry.client_email.clone()),
            feature: "appointments".to_string(),
            notification_type: notification_type.to_string(),
            title: title.to_string(),
            message,
            channels: vec![NotificationChannel::InApp, NotificationChannel::Email],
            metadata: Some(json!({
                "preferred_date": inquiry.preferred_date.to_string(),
                "preferred_time": inquiry.preferred_time.format("%H:%M:%S").to_string(),
                "meeting_type": inquiry.meeting_type.to_string(),
            })),
            related_id: Some(inquiry.id),
        });
    }
}

fn parse_inquiry_row(row: Value) -> Result<Inquiry, BookingError> {
    serde_json::from_value(row)
        .map_err(|e| BookingError::DatabaseError(format!("Failed to parse inquiry: {}", e)))
}
