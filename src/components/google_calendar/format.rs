//! Turns a calendar event into the text block shown for one class.
//!
//! Titles follow the `"<code> <name> (<section>)"` convention used by the
//! university timetable export. Anything else is shown as-is with the code
//! marked as unspecified. The room line always carries the conferencing
//! label, and the raw `location` field is not shown.

use super::models::{CalendarEvent, VIDEO_ENTRY_POINT};
use super::time::format_time_range;
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use rust_i18n::t;

lazy_static! {
    static ref COURSE_TITLE: Regex =
        Regex::new(r"^(\S+)\s+(.+)\s+(\([^()]*\))$").expect("course title pattern is valid");
}

/// Structured view of an event title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCourse {
    pub code: String,
    pub name: String,
    pub section: String,
}

/// Split a title into course code, name and section
pub fn parse_summary(summary: Option<&str>) -> ParsedCourse {
    let Some(raw) = summary.map(str::trim).filter(|s| !s.is_empty()) else {
        return ParsedCourse {
            code: t!("unspecified").to_string(),
            name: t!("untitled").to_string(),
            section: String::new(),
        };
    };

    match COURSE_TITLE.captures(raw) {
        Some(caps) => ParsedCourse {
            code: caps[1].to_string(),
            name: caps[2].trim().to_string(),
            section: caps[3].to_string(),
        },
        None => ParsedCourse {
            code: t!("unspecified").to_string(),
            name: raw.to_string(),
            section: String::new(),
        },
    }
}

/// URI of the first video entry point, if any
pub fn video_link(event: &CalendarEvent) -> Option<&str> {
    event
        .entry_points
        .iter()
        .find(|ep| ep.entry_point_type == VIDEO_ENTRY_POINT && !ep.uri.is_empty())
        .map(|ep| ep.uri.as_str())
}

/// Render a class block terminated by a blank line
pub fn format_event(event: &CalendarEvent, tz: &Tz) -> String {
    let course = parse_summary(event.summary.as_deref());
    let time = format_time_range(&event.start, &event.end, tz);
    let link = video_link(event)
        .map(str::to_string)
        .unwrap_or_else(|| t!("unavailable").to_string());

    let mut block = String::new();
    block.push_str(&format!("{} {}\n", t!("label_course"), course.name));
    block.push_str(&format!("{} {}\n", t!("label_time"), time));
    block.push_str(&format!("{} {}\n", t!("label_room"), t!("room_conference")));
    block.push_str(&format!("{} {}\n", t!("label_link"), link));
    block.push_str(&format!("{} {}\n", t!("label_code"), course.code));
    block.push_str(&format!("{} {}\n", t!("label_section"), course.section));
    block.push('\n');
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::models::{parse_instant, EntryPoint, EventTime};
    use chrono::NaiveDate;

    fn event(summary: &str) -> CalendarEvent {
        CalendarEvent {
            id: "evt".to_string(),
            summary: Some(summary.to_string()),
            start: EventTime::Instant(parse_instant("2024-03-04T09:00:00Z").unwrap()),
            end: EventTime::Instant(parse_instant("2024-03-04T10:30:00Z").unwrap()),
            ..Default::default()
        }
    }

    fn entry(kind: &str, uri: &str) -> EntryPoint {
        EntryPoint {
            entry_point_type: kind.to_string(),
            uri: uri.to_string(),
        }
    }

    #[test]
    fn test_parse_summary_matching() {
        let cases = [
            ("CS101 Intro to Systems (NRC-42)", "CS101", "Intro to Systems", "(NRC-42)"),
            ("MA2 Calculus (A)", "MA2", "Calculus", "(A)"),
            ("  FIS-200   Física General I  (NRC 3312) ", "FIS-200", "Física General I", "(NRC 3312)"),
            ("X1 Topics (old) (B2)", "X1", "Topics (old)", "(B2)"),
        ];

        for (summary, code, name, section) in cases {
            let parsed = parse_summary(Some(summary));
            assert_eq!(parsed.code, code, "code of {summary:?}");
            assert_eq!(parsed.name, name, "name of {summary:?}");
            assert_eq!(parsed.section, section, "section of {summary:?}");
        }
    }

    #[test]
    fn test_parse_summary_fallback() {
        for summary in ["Team meeting", "CS101 (NRC-42)", "CS101 Intro (NRC-42) extra", "(x)"] {
            let parsed = parse_summary(Some(summary));
            assert_eq!(parsed.code, "Not specified");
            assert_eq!(parsed.name, summary);
            assert_eq!(parsed.section, "");
        }

        let parsed = parse_summary(None);
        assert_eq!(parsed.code, "Not specified");
        assert_eq!(parsed.name, "Untitled");
        assert_eq!(parsed.section, "");
    }

    #[test]
    fn test_format_event_block() {
        let block = format_event(&event("CS101 Intro to Systems (NRC-42)"), &Tz::UTC);

        assert_eq!(
            block,
            "🧾 **Course:** Intro to Systems\n\
             ⏰ **Time:** 09:00 - 10:30\n\
             🏫 **Room:** Google Meet (virtual room)\n\
             🔗 **Link:** Not available\n\
             🔢 **Code:** CS101\n\
             🏷️ **Section:** (NRC-42)\n\
             \n"
        );
    }

    #[test]
    fn test_room_ignores_location() {
        let mut with_location = event("CS101 Intro to Systems (NRC-42)");
        with_location.location = Some("Pabellón B - 204".to_string());

        let block = format_event(&with_location, &Tz::UTC);
        assert!(block.contains("🏫 **Room:** Google Meet (virtual room)\n"));
        assert!(!block.contains("Pabellón"));
    }

    #[test]
    fn test_all_day_event_uses_placeholder() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let mut all_day = event("Holiday");
        all_day.start = EventTime::AllDay(day);
        all_day.end = EventTime::AllDay(day.succ_opt().unwrap());

        let block = format_event(&all_day, &Tz::UTC);
        assert!(block.contains("⏰ **Time:** All day\n"));
        assert!(block.contains("🧾 **Course:** Holiday\n"));
    }

    #[test]
    fn test_link_selection() {
        let mut no_links = event("CS101 Intro to Systems (NRC-42)");
        assert_eq!(video_link(&no_links), None);
        assert!(format_event(&no_links, &Tz::UTC).contains("🔗 **Link:** Not available\n"));

        no_links.entry_points = vec![entry("phone", "tel:+51-1-555"), entry("sip", "sip:123")];
        assert_eq!(video_link(&no_links), None);

        let mut later_video = event("CS101 Intro to Systems (NRC-42)");
        later_video.entry_points = vec![
            entry("phone", "tel:+51-1-555"),
            entry("video", "https://meet.google.com/aaa-bbbb-ccc"),
            entry("video", "https://meet.google.com/zzz-zzzz-zzz"),
        ];
        assert_eq!(
            video_link(&later_video),
            Some("https://meet.google.com/aaa-bbbb-ccc")
        );
        assert!(format_event(&later_video, &Tz::UTC)
            .contains("🔗 **Link:** https://meet.google.com/aaa-bbbb-ccc\n"));
    }

    #[test]
    fn test_format_is_idempotent() {
        let mut evt = event("CS101 Intro to Systems (NRC-42)");
        evt.entry_points = vec![entry("video", "https://meet.google.com/aaa-bbbb-ccc")];

        let first = format_event(&evt, &chrono_tz::America::Lima);
        let second = format_event(&evt, &chrono_tz::America::Lima);
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_never_fails_on_empty_event() {
        let block = format_event(&CalendarEvent::default(), &Tz::UTC);
        assert!(block.contains("🧾 **Course:** Untitled\n"));
        assert!(block.contains("⏰ **Time:** ??:?? - ??:??\n"));
        assert!(block.ends_with("\n\n"));
    }
}
