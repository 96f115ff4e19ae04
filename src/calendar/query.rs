//! Date bucketing and search over the event collection.
//!
//! Every view consumes the same sorted listing; these helpers partition it
//! by calendar day and filter it for the search page. Pure functions, no
//! storage access.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};

use super::event::{Event, EventKind};

/// Events falling on exactly `date`, in input order.
pub fn events_on(events: &[Event], date: NaiveDate) -> Vec<Event> {
    events.iter().filter(|e| e.date == date).cloned().collect()
}

/// The Sunday on or before `date`; weeks run Sunday through Saturday.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Bucket events by day over the inclusive `[from, to]` range.
pub fn group_by_date(
    events: &[Event],
    from: NaiveDate,
    to: NaiveDate,
) -> BTreeMap<NaiveDate, Vec<Event>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        if event.date >= from && event.date <= to {
            buckets.entry(event.date).or_default().push(event.clone());
        }
    }
    buckets
}

/// Which kinds occur on each day of the given month, for the month grid's
/// colored markers. Keys are 1-based days of the month.
pub fn kinds_by_day(events: &[Event], year: i32, month: u32) -> HashMap<u32, Vec<EventKind>> {
    let mut days: HashMap<u32, Vec<EventKind>> = HashMap::new();
    for event in events {
        if event.date.year() == year && event.date.month() == month {
            days.entry(event.date.day()).or_default().push(event.kind);
        }
    }
    days
}

/// Event totals per month of `year`, January first.
pub fn monthly_counts(events: &[Event], year: i32) -> [usize; 12] {
    let mut counts = [0usize; 12];
    for event in events {
        if event.date.year() == year {
            counts[event.date.month0() as usize] += 1;
        }
    }
    counts
}

/// The search page's three stacked filters. Empty fields match
/// everything; a non-empty date that does not parse matches nothing.
#[derive(Debug, Default, Clone)]
pub struct SearchFilter {
    /// Case-insensitive substring against name or description.
    pub term: String,
    /// Exact category; `None` is any.
    pub kind: Option<EventKind>,
    /// Raw `YYYY-MM-DD` text.
    pub date: String,
}

impl SearchFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if !self.term.is_empty() {
            let needle = self.term.to_lowercase();
            let hit = event.name.to_lowercase().contains(&needle)
                || event.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(kind) = self.kind {
            if event.kind != kind {
                return false;
            }
        }

        if !self.date.is_empty() {
            match NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d") {
                Ok(date) => {
                    if event.date != date {
                        return false;
                    }
                }
                Err(_) => return false,
            }
        }

        true
    }
}

/// Apply the filter across a listing, preserving order.
pub fn filter_events(events: &[Event], filter: &SearchFilter) -> Vec<Event> {
    events.iter().filter(|e| filter.matches(e)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn make_event(id: i64, date: &str, start: &str, kind: EventKind) -> Event {
        let start_time = NaiveTime::parse_from_str(start, "%H:%M").unwrap();
        Event {
            id,
            name: format!("Event {}", id),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: String::new(),
            start_time,
            end_time: start_time + Duration::hours(1),
            kind,
        }
    }

    #[test]
    fn test_week_start_lands_on_sunday() {
        // 2024-06-05 is a Wednesday.
        let wednesday = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert_eq!(week_start(wednesday), sunday);
        // A Sunday is its own week start.
        assert_eq!(week_start(sunday), sunday);
    }

    #[test]
    fn test_group_by_date_is_inclusive_of_both_ends() {
        let events = vec![
            make_event(1, "2024-06-02", "09:00", EventKind::Work),
            make_event(2, "2024-06-05", "09:00", EventKind::Work),
            make_event(3, "2024-06-08", "09:00", EventKind::Work),
            make_event(4, "2024-06-09", "09:00", EventKind::Work),
        ];
        let from = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();

        let buckets = group_by_date(&events, from, to);
        assert_eq!(buckets.len(), 3);
        assert!(buckets.contains_key(&from));
        assert!(buckets.contains_key(&to));
        assert!(!buckets.contains_key(&NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()));
    }

    #[test]
    fn test_events_on_matches_exact_day_only() {
        let events = vec![
            make_event(1, "2024-06-02", "09:00", EventKind::Work),
            make_event(2, "2024-06-03", "09:00", EventKind::Work),
        ];
        let day = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let on_day = events_on(&events, day);
        assert_eq!(on_day.len(), 1);
        assert_eq!(on_day[0].id, 1);
    }

    #[test]
    fn test_kinds_by_day_collects_markers_for_one_month() {
        let events = vec![
            make_event(1, "2024-06-02", "09:00", EventKind::Work),
            make_event(2, "2024-06-02", "11:00", EventKind::Family),
            make_event(3, "2024-07-02", "09:00", EventKind::Work),
        ];
        let days = kinds_by_day(&events, 2024, 6);
        assert_eq!(days.len(), 1);
        assert_eq!(days[&2], vec![EventKind::Work, EventKind::Family]);
    }

    #[test]
    fn test_monthly_counts_span_the_year() {
        let events = vec![
            make_event(1, "2024-01-15", "09:00", EventKind::Work),
            make_event(2, "2024-06-02", "09:00", EventKind::Work),
            make_event(3, "2024-06-20", "09:00", EventKind::Work),
            make_event(4, "2023-06-20", "09:00", EventKind::Work),
        ];
        let counts = monthly_counts(&events, 2024);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[5], 2);
        assert_eq!(counts.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_search_term_matches_name_or_description() {
        let mut dentist = make_event(1, "2024-06-02", "09:00", EventKind::Personal);
        dentist.name = "Dentist".to_string();
        let mut lunch = make_event(2, "2024-06-02", "12:00", EventKind::Social);
        lunch.name = "Lunch".to_string();
        lunch.description = "pizza with the dental team".to_string();
        let events = vec![dentist, lunch];

        let filter = SearchFilter {
            term: "DENT".to_string(),
            ..Default::default()
        };
        let hits = filter_events(&events, &filter);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_filters_compose() {
        let events = vec![
            make_event(1, "2024-06-02", "09:00", EventKind::Work),
            make_event(2, "2024-06-02", "11:00", EventKind::Personal),
            make_event(3, "2024-06-03", "09:00", EventKind::Work),
        ];
        let filter = SearchFilter {
            kind: Some(EventKind::Work),
            date: "2024-06-02".to_string(),
            ..Default::default()
        };
        let hits = filter_events(&events, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn test_search_unparseable_date_matches_nothing() {
        let events = vec![make_event(1, "2024-06-02", "09:00", EventKind::Work)];
        let filter = SearchFilter {
            date: "junk".to_string(),
            ..Default::default()
        };
        assert!(filter_events(&events, &filter).is_empty());
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let events = vec![
            make_event(1, "2024-06-02", "09:00", EventKind::Work),
            make_event(2, "2024-06-03", "09:00", EventKind::Family),
        ];
        let filter = SearchFilter::default();
        assert_eq!(filter_events(&events, &filter).len(), 2);
    }
}
