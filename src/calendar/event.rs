//! The event entity and its fixed category set.

use chrono::{NaiveDate, NaiveTime};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A single calendar entry: one date, a `[start, end)` time range, a
/// category, and descriptive text.
///
/// The serialized form matches the stored collection layout: camelCase
/// keys, the category under `type`, times as fixed-width `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

impl Event {
    /// Half-open interval test: true when both events share a date and
    /// their `[start, end)` ranges intersect. One comparison covers
    /// starts-inside, ends-inside, and full containment.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    pub fn time_span(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Event categories. Each kind maps to exactly one display color; the
/// color is derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Personal,
    Work,
    Social,
    Family,
    Other,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Personal,
        EventKind::Work,
        EventKind::Social,
        EventKind::Family,
        EventKind::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EventKind::Personal => "Personal",
            EventKind::Work => "Work",
            EventKind::Social => "Social",
            EventKind::Family => "Family",
            EventKind::Other => "Other",
        }
    }

    /// Kind-to-color lookup; family renders as magenta, the terminal
    /// stand-in for purple.
    pub fn color(self) -> Color {
        match self {
            EventKind::Personal => Color::Blue,
            EventKind::Work => Color::Green,
            EventKind::Social => Color::Yellow,
            EventKind::Family => Color::Magenta,
            EventKind::Other => Color::Red,
        }
    }
}

/// Times travel as the collection's fixed-width `HH:MM` strings.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(date: &str, start: &str, end: &str) -> Event {
        Event {
            id: 1,
            name: "Standup".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: String::new(),
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            kind: EventKind::Work,
        }
    }

    #[test]
    fn test_overlap_is_half_open() {
        let morning = make_event("2024-06-01", "09:00", "10:00");

        // Back-to-back events share an endpoint but not a minute.
        assert!(!morning.overlaps(&make_event("2024-06-01", "10:00", "11:00")));
        assert!(!morning.overlaps(&make_event("2024-06-01", "08:00", "09:00")));

        // Start inside, end inside, containment either way.
        assert!(morning.overlaps(&make_event("2024-06-01", "09:30", "10:30")));
        assert!(morning.overlaps(&make_event("2024-06-01", "08:30", "09:30")));
        assert!(morning.overlaps(&make_event("2024-06-01", "08:00", "11:00")));
        assert!(morning.overlaps(&make_event("2024-06-01", "09:15", "09:45")));
    }

    #[test]
    fn test_overlap_requires_same_date() {
        let a = make_event("2024-06-01", "09:00", "10:00");
        let b = make_event("2024-06-02", "09:00", "10:00");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_wire_format_matches_stored_collection() {
        let event = make_event("2024-06-01", "09:00", "10:00");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["endTime"], "10:00");
        assert_eq!(json["type"], "work");
        // Color is derived, never part of the payload.
        assert!(json.get("color").is_none());
    }

    #[test]
    fn test_description_defaults_to_empty_on_read() {
        let raw = r#"{"id":7,"name":"Dentist","date":"2024-06-03",
            "startTime":"14:00","endTime":"15:00","type":"personal"}"#;
        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.description, "");
        assert_eq!(event.kind, EventKind::Personal);
    }

    #[test]
    fn test_kind_colors_are_one_to_one() {
        let mut seen = Vec::new();
        for kind in EventKind::ALL {
            let color = kind.color();
            assert!(!seen.contains(&color));
            seen.push(color);
        }
    }
}
