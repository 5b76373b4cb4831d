use chatcloud_core::{Event, Selection, TimeBucket};
use std::sync::Arc;
use tokio::sync::watch;

use crate::binner::bins;

pub type EventSet = Arc<Vec<Event>>;

/// Parsed records shared by every viewer session, with their full-range timeline.
#[derive(Debug)]
pub struct Dataset {
    pub events: EventSet,
    pub buckets: Vec<TimeBucket>,
}

impl Dataset {
    pub fn new(events: Vec<Event>) -> Self {
        let buckets = bins(&events);
        Self {
            events: Arc::new(events),
            buckets,
        }
    }
}

/// Full event set plus the active subset. The active subset is swapped as a
/// whole; subscribers always observe a complete set.
pub struct EventStore {
    full: EventSet,
    active: watch::Sender<EventSet>,
    selection: Option<Selection>,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    pub fn new() -> Self {
        let empty: EventSet = Arc::new(Vec::new());
        let (active, _rx) = watch::channel(Arc::clone(&empty));
        Self {
            full: empty,
            active,
            selection: None,
        }
    }

    pub fn load(&mut self, events: impl Into<EventSet>) {
        self.full = events.into();
        self.selection = None;
        self.active.send_replace(Arc::clone(&self.full));
    }

    pub fn apply_selection(&mut self, selection: Selection) -> EventSet {
        let active: EventSet = Arc::new(
            self.full
                .iter()
                .filter(|e| selection.contains(e.time))
                .cloned()
                .collect(),
        );
        tracing::debug!(
            start = %selection.start,
            end = %selection.end,
            active = active.len(),
            total = self.full.len(),
            "selection applied"
        );
        self.selection = Some(selection);
        self.active.send_replace(Arc::clone(&active));
        active
    }

    pub fn clear_selection(&mut self) -> EventSet {
        self.selection = None;
        self.active.send_replace(Arc::clone(&self.full));
        Arc::clone(&self.full)
    }

    pub fn active(&self) -> EventSet {
        Arc::clone(&self.active.borrow())
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Change notification for the active set; the receiver starts with the
    /// current set marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<EventSet> {
        self.active.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatcloud_core::Timestamp;
    use chrono::{Duration, NaiveDate};

    fn at(h: u32, m: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .expect("valid time")
    }

    fn event(time: Timestamp, user: &str) -> Event {
        Event {
            time,
            user_id: user.into(),
            text: String::new(),
            words: Vec::new(),
        }
    }

    fn loaded() -> EventStore {
        let mut store = EventStore::new();
        store.load(vec![
            event(at(9, 0), "u1"),
            event(at(10, 0), "u2"),
            event(at(10, 0) + Duration::milliseconds(1), "u3"),
            event(at(11, 0), "u4"),
        ]);
        store
    }

    #[test]
    fn load_resets_active_to_full() {
        let mut store = loaded();
        store.apply_selection(Selection::new(at(9, 0), at(9, 0)));
        assert_eq!(store.active().len(), 1);
        store.load(vec![event(at(12, 0), "u9")]);
        assert_eq!(store.active().len(), 1);
        assert_eq!(store.active()[0].user_id, "u9");
        assert!(store.selection().is_none());
    }

    #[test]
    fn selection_bounds_are_inclusive() {
        let mut store = loaded();
        let active = store.apply_selection(Selection::new(at(9, 0), at(10, 0)));
        let users: Vec<&str> = active.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(users, vec!["u1", "u2"]);
    }

    #[test]
    fn empty_selection_result_is_valid() {
        let mut store = loaded();
        let active = store.apply_selection(Selection::new(at(5, 0), at(6, 0)));
        assert!(active.is_empty());
        assert!(store.active().is_empty());
        assert!(bins(&store.active()).is_empty());
    }

    #[test]
    fn clear_restores_full_set() {
        let mut store = loaded();
        store.apply_selection(Selection::new(at(11, 0), at(11, 0)));
        assert_eq!(store.active().len(), 1);
        store.clear_selection();
        assert_eq!(store.active().len(), 4);
        let before = store.active();
        store.clear_selection();
        assert!(Arc::ptr_eq(&before, &store.active()));
    }

    #[test]
    fn subscribers_see_whole_set_swaps() {
        let mut store = loaded();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().expect("sender alive"));

        store.apply_selection(Selection::new(at(10, 0), at(11, 0)));
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(rx.borrow_and_update().len(), 3);
        assert!(!rx.has_changed().expect("sender alive"));
    }
}
