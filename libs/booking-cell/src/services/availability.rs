// libs/booking-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilitySettings, BookingError};

/// Expands a recurring weekly schedule into concrete (date, time) slots.
///
/// One slot per `slot_duration_minutes` increment between start and end
/// time; the loop condition is strict (`minutes < end`), so a final
/// partial increment is dropped. Slot starts falling inside a break
/// window (`start <= t < end`) are skipped.
pub fn expand_slots(
    start_date: NaiveDate,
    end_date: NaiveDate,
    settings: &AvailabilitySettings,
) -> Vec<(NaiveDate, NaiveTime)> {
    let start_total = minutes_of(settings.start_time);
    let end_total = minutes_of(settings.end_time);
    let step = settings.slot_duration_minutes;

    let mut slots = Vec::new();
    let mut day = start_date;
    while day <= end_date {
        if settings.working_days.contains(&day.weekday().num_days_from_sunday()) {
            let mut minutes = start_total;
            while minutes < end_total {
                if !in_break(minutes, settings) {
                    if let Some(time) =
                        NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
                    {
                        slots.push((day, time));
                    }
                }
                minutes += step;
            }
        }
        day += Duration::days(1);
    }

    slots
}

fn minutes_of(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn in_break(slot_start: u32, settings: &AvailabilitySettings) -> bool {
    settings.breaks.iter().any(|window| {
        let break_start = minutes_of(window.start);
        let break_end = minutes_of(window.end);
        break_start <= slot_start && slot_start < break_end
    })
}

pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Regenerate the bookable slots for a date range.
    ///
    /// Unbooked slots in the range are deleted first so weekday or
    /// duration changes take effect; booked slots are left untouched and
    /// the unordered insert skips over them. Partial insertion is
    /// tolerated, there is no transaction around the two writes.
    pub async fn generate(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        settings: &AvailabilitySettings,
    ) -> Result<usize, BookingError> {
        self.validate_settings(start_date, end_date, settings)?;

        debug!("Regenerating timeslots from {} to {}", start_date, end_date);

        let delete_path = format!(
            "/rest/v1/timeslots?date=gte.{}&date=lte.{}&is_available=eq.true",
            start_date, end_date
        );
        let mut delete_headers = reqwest::header::HeaderMap::new();
        delete_headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );
        let _: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &delete_path, None, Some(delete_headers))
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let slots = expand_slots(start_date, end_date, settings);
        if slots.is_empty() {
            info!("No working-day slots in range {}..{}", start_date, end_date);
            return Ok(0);
        }

        let now = Utc::now();
        let rows: Vec<Value> = slots
            .iter()
            .map(|(date, time)| {
                json!({
                    "date": date.to_string(),
                    "time": time.format("%H:%M:%S").to_string(),
                    "is_available": true,
                    "inquiry_id": Value::Null,
                    "meeting_type": Value::Null,
                    "updated_at": now.to_rfc3339(),
                })
            })
            .collect();

        // Unordered bulk insert: a leftover duplicate at one (date, time)
        // must not abort the rest.
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static(
                "resolution=ignore-duplicates,return=representation",
            ),
        );

        if let Err(e) = self
            .supabase
            .request_with_headers::<Vec<Value>>(
                Method::POST,
                "/rest/v1/timeslots",
                Some(Value::Array(rows)),
                Some(headers),
            )
            .await
        {
            warn!("Bulk timeslot insert failed: {}", e);
            return Err(BookingError::DatabaseError(e.to_string()));
        }

        info!(
            "Generated {} timeslots between {} and {}",
            slots.len(),
            start_date,
            end_date
        );
        Ok(slots.len())
    }

    fn validate_settings(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        settings: &AvailabilitySettings,
    ) -> Result<(), BookingError> {
        if start_date > end_date {
            return Err(BookingError::ValidationError(
                "Start date must not be after end date".to_string(),
            ));
        }
        if settings.start_time >= settings.end_time {
            return Err(BookingError::ValidationError(
                "Start time must be before end time".to_string(),
            ));
        }
        if settings.slot_duration_minutes == 0 {
            return Err(BookingError::ValidationError(
                "Slot duration must be at least one minute".to_string(),
            ));
        }
        if settings.working_days.iter().any(|day| *day > 6) {
            return Err(BookingError::ValidationError(
                "Working days must be between 0 (Sunday) and 6 (Saturday)".to_string(),
            ));
        }
        Ok(())
    }
}
