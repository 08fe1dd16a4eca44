use chrono::{NaiveDate, NaiveTime, Utc};

/// Current calendar day, UTC. All "has the date arrived" checks in the
/// PDC and booking cells compare at day granularity through this.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// True once `date` is today or earlier.
pub fn has_arrived(date: NaiveDate) -> bool {
    date <= today()
}

/// 12-hour display label for a slot time, e.g. "09:00 AM".
pub fn to_12_hour_label(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn label_formats_morning_and_afternoon() {
        assert_eq!(to_12_hour_label(NaiveTime::from_hms_opt(9, 0, 0).unwrap()), "09:00 AM");
        assert_eq!(to_12_hour_label(NaiveTime::from_hms_opt(14, 30, 0).unwrap()), "02:30 PM");
    }

    #[test]
    fn arrival_is_day_granular() {
        assert!(has_arrived(today()));
        assert!(has_arrived(today() - Duration::days(1)));
        assert!(!has_arrived(today() + Duration::days(1)));
    }
}
