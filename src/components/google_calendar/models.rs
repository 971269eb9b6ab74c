use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Entry point type Google uses for video conferencing links
pub const VIDEO_ENTRY_POINT: &str = "video";

/// Start or end of an event after validation at the API boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    /// A precise instant with its original offset
    Instant(DateTime<FixedOffset>),
    /// A whole-day event, no time component
    AllDay(NaiveDate),
    /// Neither field was present or parseable
    Unknown,
}

impl EventTime {
    /// Resolve the `dateTime`/`date` pair Google sends, preferring the instant
    pub fn from_api(time: Option<&ApiEventTime>) -> Self {
        let Some(time) = time else {
            return EventTime::Unknown;
        };

        if let Some(instant) = time.date_time.as_deref().and_then(parse_instant) {
            return EventTime::Instant(instant);
        }

        time.date
            .as_deref()
            .and_then(|date| NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok())
            .map(EventTime::AllDay)
            .unwrap_or(EventTime::Unknown)
    }
}

/// Parse an RFC 3339 instant, treating a trailing `Z` as an explicit zero offset
pub fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    let normalized = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(stripped) => format!("{}+00:00", stripped),
        None => value.to_string(),
    };
    DateTime::parse_from_rfc3339(&normalized).ok()
}

/// Conferencing access method attached to an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    #[serde(default)]
    pub entry_point_type: String,
    #[serde(default)]
    pub uri: String,
}

/// Calendar event as the rest of the bot sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub location: Option<String>,
    pub entry_points: Vec<EntryPoint>,
}

impl Default for CalendarEvent {
    fn default() -> Self {
        Self {
            id: String::new(),
            summary: None,
            start: EventTime::Unknown,
            end: EventTime::Unknown,
            location: None,
            entry_points: Vec::new(),
        }
    }
}

impl From<ApiEvent> for CalendarEvent {
    fn from(event: ApiEvent) -> Self {
        Self {
            start: EventTime::from_api(event.start.as_ref()),
            end: EventTime::from_api(event.end.as_ref()),
            id: event.id,
            summary: event.summary,
            location: event.location.filter(|l| !l.trim().is_empty()),
            entry_points: event
                .conference_data
                .map(|data| data.entry_points)
                .unwrap_or_default(),
        }
    }
}

/// Response body of `events.list`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Event resource exactly as Google returns it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: Option<ApiEventTime>,
    #[serde(default)]
    pub end: Option<ApiEventTime>,
    #[serde(default)]
    pub conference_data: Option<ApiConferenceData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConferenceData {
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,
}
