//! Durable CRUD over the event collection, with conflict enforcement.

use std::path::{Path, PathBuf};

use super::error::{StoreError, StoreResult};
use super::event::Event;
use super::storage::{FileBackend, MemoryBackend, StorageBackend};

/// Fixed name of the user-facing backup file.
pub const EXPORT_FILE_NAME: &str = "calendrify-events.json";

/// The event repository: a thin view over one serialized collection in a
/// backing medium. Every operation is a single synchronous
/// read-modify-write; a failed conflict check leaves storage untouched.
pub struct EventStore {
    backend: Box<dyn StorageBackend>,
}

impl EventStore {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by one JSON file on disk.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileBackend::new(path)))
    }

    /// Store backed by process memory; state dies with the store.
    #[allow(dead_code)]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Every stored event, in storage order. An absent or blank payload is
    /// an empty collection; an unreadable one is a `Malformed` error for
    /// the caller to surface.
    pub fn list_all(&self) -> StoreResult<Vec<Event>> {
        match self.backend.load()? {
            Some(payload) if !payload.trim().is_empty() => {
                Ok(serde_json::from_str(&payload)?)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Insert a new event unless it overlaps a stored event on the same
    /// date. On conflict nothing is written.
    pub fn add(&self, event: Event) -> StoreResult<()> {
        let mut events = self.list_all()?;
        if let Some(existing) = find_conflict(&events, &event, None) {
            return Err(StoreError::conflict_with(existing));
        }
        events.push(event);
        self.persist(&events)
    }

    /// Replace every stored event carrying `id` with `updated`, unless
    /// `updated` overlaps some other stored event. The event being updated
    /// is excluded from the scan so a no-op time change cannot conflict
    /// with itself. An id that matches nothing writes the collection back
    /// unchanged.
    pub fn update(&self, id: i64, updated: Event) -> StoreResult<()> {
        let mut events = self.list_all()?;
        if let Some(existing) = find_conflict(&events, &updated, Some(id)) {
            return Err(StoreError::conflict_with(existing));
        }
        for event in &mut events {
            if event.id == id {
                *event = updated.clone();
            }
        }
        self.persist(&events)
    }

    /// Drop every event carrying `id`. Removing an absent id is a no-op,
    /// not an error.
    pub fn remove(&self, id: i64) -> StoreResult<()> {
        let mut events = self.list_all()?;
        events.retain(|event| event.id != id);
        self.persist(&events)
    }

    /// Write the sorted collection to `<dir>/calendrify-events.json` for
    /// user-initiated backup. Returns `None` without writing when there is
    /// nothing to export. Pure read + serialize; there is no import path.
    pub fn export(&self, dir: &Path) -> StoreResult<Option<PathBuf>> {
        let mut events = self.list_all()?;
        if events.is_empty() {
            return Ok(None);
        }
        sort_events(&mut events);
        let path = dir.join(EXPORT_FILE_NAME);
        std::fs::write(&path, serde_json::to_string(&events)?)?;
        Ok(Some(path))
    }

    fn persist(&self, events: &[Event]) -> StoreResult<()> {
        self.backend.save(&serde_json::to_string(events)?)
    }
}

/// Stable total order: date ascending, then start time ascending. Computed
/// on read, never persisted.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|event| (event.date, event.start_time));
}

/// First stored event the candidate overlaps, skipping `exclude` (the
/// candidate's own id during an update).
fn find_conflict<'a>(
    events: &'a [Event],
    candidate: &Event,
    exclude: Option<i64>,
) -> Option<&'a Event> {
    events
        .iter()
        .filter(|event| exclude != Some(event.id))
        .find(|event| event.overlaps(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event::EventKind;
    use chrono::{NaiveDate, NaiveTime};

    fn make_event(id: i64, date: &str, start: &str, end: &str) -> Event {
        Event {
            id,
            name: format!("Event {}", id),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: String::new(),
            start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            end_time: NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            kind: EventKind::Personal,
        }
    }

    #[test]
    fn test_list_all_empty_when_nothing_stored() {
        let store = EventStore::in_memory();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_list_all_blank_payload_reads_as_empty() {
        let store = EventStore::new(Box::new(MemoryBackend::with_payload("  ")));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_list_all_propagates_malformed_payload() {
        let store = EventStore::new(Box::new(MemoryBackend::with_payload("{not json")));
        let err = store.list_all().unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn test_add_then_list_round_trips() {
        let store = EventStore::in_memory();
        let event = make_event(1, "2024-06-01", "09:00", "10:00");
        store.add(event.clone()).unwrap();
        assert_eq!(store.list_all().unwrap(), vec![event]);
    }

    #[test]
    fn test_add_rejects_overlap_and_leaves_storage_unchanged() {
        let store = EventStore::in_memory();
        store.add(make_event(1, "2024-06-01", "09:00", "10:00")).unwrap();
        let before = store.list_all().unwrap();

        let err = store
            .add(make_event(2, "2024-06-01", "09:30", "10:30"))
            .unwrap_err();
        assert!(err.is_conflict());

        let after = store.list_all().unwrap();
        assert_eq!(after, before);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, 1);
    }

    #[test]
    fn test_add_allows_back_to_back_events() {
        let store = EventStore::in_memory();
        store.add(make_event(1, "2024-06-01", "09:00", "10:00")).unwrap();
        store.add(make_event(2, "2024-06-01", "10:00", "11:00")).unwrap();
        assert_eq!(store.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_identical_times_on_different_dates_never_conflict() {
        let store = EventStore::in_memory();
        store.add(make_event(1, "2024-06-01", "09:00", "10:00")).unwrap();
        store.add(make_event(2, "2024-06-02", "09:00", "10:00")).unwrap();
        assert_eq!(store.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_update_excludes_itself_from_conflict_scan() {
        let store = EventStore::in_memory();
        store.add(make_event(1, "2024-06-01", "09:00", "10:00")).unwrap();

        let mut renamed = make_event(1, "2024-06-01", "09:00", "10:00");
        renamed.name = "renamed".to_string();
        store.update(1, renamed).unwrap();

        let events = store.list_all().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "renamed");
    }

    #[test]
    fn test_update_rejects_overlap_with_other_events() {
        let store = EventStore::in_memory();
        store.add(make_event(1, "2024-06-01", "09:00", "10:00")).unwrap();
        store.add(make_event(2, "2024-06-01", "11:00", "12:00")).unwrap();
        let before = store.list_all().unwrap();

        // Try to move event 2 onto event 1.
        let err = store
            .update(2, make_event(2, "2024-06-01", "09:30", "10:30"))
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.list_all().unwrap(), before);
    }

    #[test]
    fn test_update_replaces_exactly_the_matching_event() {
        let store = EventStore::in_memory();
        store.add(make_event(1, "2024-06-01", "09:00", "10:00")).unwrap();
        store.add(make_event(2, "2024-06-01", "11:00", "12:00")).unwrap();

        let moved = make_event(2, "2024-06-03", "08:00", "09:00");
        store.update(2, moved.clone()).unwrap();

        let events = store.list_all().unwrap();
        let matching: Vec<_> = events.iter().filter(|e| e.id == 2).collect();
        assert_eq!(matching, vec![&moved]);
        assert!(events.iter().any(|e| e.id == 1));
    }

    #[test]
    fn test_update_unknown_id_is_a_no_op_replace() {
        let store = EventStore::in_memory();
        store.add(make_event(1, "2024-06-01", "09:00", "10:00")).unwrap();
        let before = store.list_all().unwrap();

        store
            .update(99, make_event(99, "2024-07-01", "09:00", "10:00"))
            .unwrap();
        assert_eq!(store.list_all().unwrap(), before);
    }

    #[test]
    fn test_remove_drops_every_match_and_tolerates_absent_ids() {
        let store = EventStore::in_memory();
        store.add(make_event(1, "2024-06-01", "09:00", "10:00")).unwrap();
        store.add(make_event(2, "2024-06-02", "09:00", "10:00")).unwrap();

        store.remove(1).unwrap();
        let after = store.list_all().unwrap();
        assert!(after.iter().all(|e| e.id != 1));
        assert_eq!(after.len(), 1);

        // Absent id: no error, collection untouched.
        store.remove(1).unwrap();
        assert_eq!(store.list_all().unwrap(), after);
    }

    #[test]
    fn test_sort_orders_by_date_then_start_time() {
        let mut events = vec![
            make_event(1, "2024-06-02", "08:00", "09:00"),
            make_event(2, "2024-06-01", "12:00", "13:00"),
            make_event(3, "2024-06-01", "09:00", "10:00"),
        ];
        sort_events(&mut events);
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_sort_is_idempotent_and_stable() {
        // Equal keys keep their relative order; sorting twice changes
        // nothing. (Equal keys cannot coexist in storage, but sort is a
        // pure function over any sequence.)
        let mut events = vec![
            make_event(1, "2024-06-01", "09:00", "10:00"),
            make_event(2, "2024-06-01", "09:00", "10:00"),
            make_event(3, "2024-05-30", "09:00", "10:00"),
        ];
        sort_events(&mut events);
        let once: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(once, vec![3, 1, 2]);

        sort_events(&mut events);
        let twice: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_export_writes_sorted_collection_under_fixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::in_memory();
        store.add(make_event(2, "2024-06-02", "09:00", "10:00")).unwrap();
        store.add(make_event(1, "2024-06-01", "09:00", "10:00")).unwrap();

        let path = store.export(dir.path()).unwrap().expect("should write");
        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);

        let raw = std::fs::read_to_string(&path).unwrap();
        let exported: Vec<Event> = serde_json::from_str(&raw).unwrap();
        let ids: Vec<i64> = exported.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_export_skips_writing_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::in_memory();
        assert!(store.export(dir.path()).unwrap().is_none());
        assert!(!dir.path().join(EXPORT_FILE_NAME).exists());
    }

    #[test]
    fn test_file_backed_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");

        let store = EventStore::open(path.clone());
        store.add(make_event(1, "2024-06-01", "09:00", "10:00")).unwrap();
        drop(store);

        let reopened = EventStore::open(path);
        let events = reopened.list_all().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Event 1");
    }

    #[test]
    fn test_conflict_error_names_the_existing_event() {
        let store = EventStore::in_memory();
        let mut standup = make_event(1, "2024-06-01", "09:00", "10:00");
        standup.name = "Standup".to_string();
        store.add(standup).unwrap();

        let err = store
            .add(make_event(2, "2024-06-01", "09:30", "10:30"))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Standup"));
        assert!(message.contains("09:00"));
    }
}
