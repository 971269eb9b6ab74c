use super::models::EventTime;
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use rust_i18n::t;

/// Inclusive UTC window covering one calendar day, as RFC 3339 strings
pub fn day_bounds(day: NaiveDate) -> (String, String) {
    let start = day.and_time(NaiveTime::MIN);
    let end = day.and_hms_opt(23, 59, 59).unwrap_or(start);
    (
        format!("{}Z", start.format("%Y-%m-%dT%H:%M:%S")),
        format!("{}Z", end.format("%Y-%m-%dT%H:%M:%S")),
    )
}

/// Render one side of an event as 24-hour `HH:MM`
pub fn format_clock(time: &EventTime, tz: &Tz) -> Option<String> {
    match time {
        EventTime::Instant(dt) => Some(dt.with_timezone(tz).format("%H:%M").to_string()),
        _ => None,
    }
}

/// Render the start/end pair shown on a class block
pub fn format_time_range(start: &EventTime, end: &EventTime, tz: &Tz) -> String {
    if matches!(start, EventTime::AllDay(_)) || matches!(end, EventTime::AllDay(_)) {
        return t!("all_day").to_string();
    }

    let unknown = || t!("unknown_time").to_string();
    let start = format_clock(start, tz).unwrap_or_else(unknown);
    let end = format_clock(end, tz).unwrap_or_else(unknown);
    format!("{} - {}", start, end)
}
