use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Event, EventId, EventPatch, Timestamp, VisibleRange};

/// Ordered event table keyed by stable ids.
///
/// Row order is insertion order; removing a row keeps the relative order of
/// the others and never renumbers ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStore {
    rows: IndexMap<EventId, Event>,
    next_id: u64,
}

impl EventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from rows in order.
    #[must_use]
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut store = Self::new();
        for event in events {
            store.push(event);
        }
        store
    }

    pub fn append(
        &mut self,
        start: Timestamp,
        end: Option<Timestamp>,
        content: impl Into<String>,
        group: Option<String>,
    ) -> EventId {
        self.push(Event {
            start,
            end,
            content: content.into(),
            group,
        })
    }

    pub fn push(&mut self, event: Event) -> EventId {
        let id = EventId::new(self.next_id);
        self.next_id += 1;
        self.rows.insert(id, event);
        trace!(%id, rows = self.rows.len(), "append event");
        id
    }

    /// Applies `patch` to the row; returns `false` when the id is unknown.
    pub fn update(&mut self, id: EventId, patch: EventPatch) -> bool {
        match self.rows.get_mut(&id) {
            Some(event) => {
                patch.apply_to(event);
                trace!(%id, "update event");
                true
            }
            None => false,
        }
    }

    /// Removes the row; returns `false` when the id is unknown.
    pub fn remove(&mut self, id: EventId) -> bool {
        let removed = self.rows.shift_remove(&id).is_some();
        if removed {
            trace!(%id, rows = self.rows.len(), "remove event");
        }
        removed
    }

    /// Drops every row; ids keep increasing afterwards.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn replace_all(&mut self, events: impl IntoIterator<Item = Event>) {
        self.clear();
        for event in events {
            self.push(event);
        }
    }

    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.rows.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: EventId) -> bool {
        self.rows.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventId, &Event)> {
        self.rows.iter().map(|(id, event)| (*id, event))
    }

    /// Events intersecting the range widened by `overscan_ms` on both sides, in row order.
    #[must_use]
    pub fn visible_events(&self, range: VisibleRange, overscan_ms: i64) -> Vec<(EventId, &Event)> {
        let (start, end) = range.expanded_millis(overscan_ms.max(0));
        self.iter()
            .filter(|(_, event)| event.intersects(start, end))
            .collect()
    }

    /// Distinct group keys in first-seen row order.
    #[must_use]
    pub fn group_keys(&self) -> IndexSet<String> {
        self.rows
            .values()
            .filter_map(|event| event.group.clone())
            .collect()
    }

    /// Earliest start and latest end over all rows, in epoch milliseconds.
    #[must_use]
    pub fn data_range(&self) -> Option<(i64, i64)> {
        self.rows.values().fold(None, |acc, event| {
            let start = event.start_ms();
            let end = event.effective_end_ms();
            Some(match acc {
                Some((min, max)) => (start.min(min), end.max(max)),
                None => (start, end),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::EventStore;
    use crate::core::{Event, EventId, EventPatch, VisibleRange};

    fn at(hour: u32) -> crate::core::Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).single().expect("valid time")
    }

    #[test]
    fn ids_survive_removal_of_other_rows() {
        let mut store = EventStore::new();
        let first = store.push(Event::point(at(1), "a"));
        let second = store.push(Event::point(at(2), "b"));
        assert!(store.remove(first));
        assert_eq!(store.get(second).map(|e| e.content.as_str()), Some("b"));
        let third = store.push(Event::point(at(3), "c"));
        assert_eq!(third, EventId::new(2));
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut store = EventStore::new();
        assert!(!store.remove(EventId::new(7)));
        assert!(!store.update(EventId::new(7), EventPatch::default().with_content("x")));
    }

    #[test]
    fn visible_events_honour_overscan() {
        let mut store = EventStore::new();
        store.push(Event::point(at(1), "early"));
        let inside = store.push(Event::range(at(4), at(6), "inside"));
        let range = VisibleRange::new(at(5), at(8)).expect("range");

        let strict: Vec<_> = store.visible_events(range, 0).into_iter().map(|(id, _)| id).collect();
        assert_eq!(strict, vec![inside]);

        let widened = store.visible_events(range, 5 * 3_600_000);
        assert_eq!(widened.len(), 2);
    }

    #[test]
    fn group_keys_keep_first_seen_order() {
        let store = EventStore::from_events([
            Event::point(at(1), "a").with_group("zeta"),
            Event::point(at(2), "b").with_group("alpha"),
            Event::point(at(3), "c").with_group("zeta"),
        ]);
        let keys: Vec<_> = store.group_keys().into_iter().collect();
        assert_eq!(keys, vec!["zeta".to_owned(), "alpha".to_owned()]);
    }
}
