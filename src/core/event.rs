use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::Timestamp;
use crate::core::primitives::datetime_to_millis;

/// Stable identity of one event; never reused after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(u64);

impl EventId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Has both start and end; drawn as a beam.
    Range,
    /// Has only a start; drawn as a box or dot.
    Point,
}

/// One row of the event table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub start: Timestamp,
    pub end: Option<Timestamp>,
    pub content: String,
    pub group: Option<String>,
}

impl Event {
    #[must_use]
    pub fn point(start: Timestamp, content: impl Into<String>) -> Self {
        Self {
            start,
            end: None,
            content: content.into(),
            group: None,
        }
    }

    #[must_use]
    pub fn range(start: Timestamp, end: Timestamp, content: impl Into<String>) -> Self {
        Self {
            start,
            end: Some(end),
            content: content.into(),
            group: None,
        }
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        if self.end.is_some() {
            EventKind::Range
        } else {
            EventKind::Point
        }
    }

    #[must_use]
    pub fn start_ms(&self) -> i64 {
        datetime_to_millis(self.start)
    }

    /// End used for intersection tests; an end before the start collapses onto it.
    #[must_use]
    pub fn effective_end_ms(&self) -> i64 {
        let start = self.start_ms();
        self.end
            .map_or(start, |end| datetime_to_millis(end).max(start))
    }

    /// True when the event touches the inclusive window `[start_ms, end_ms]`.
    #[must_use]
    pub fn intersects(&self, start_ms: i64, end_ms: i64) -> bool {
        match self.kind() {
            EventKind::Point => (start_ms..=end_ms).contains(&self.start_ms()),
            EventKind::Range => self.start_ms() <= end_ms && self.effective_end_ms() >= start_ms,
        }
    }
}

/// Partial update applied by `EventStore::update`.
///
/// `end: Some(None)` turns a range into a point; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    pub start: Option<Timestamp>,
    pub end: Option<Option<Timestamp>>,
    pub content: Option<String>,
    pub group: Option<Option<String>>,
}

impl EventPatch {
    #[must_use]
    pub fn times(start: Timestamp, end: Option<Timestamp>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.content.is_none() && self.group.is_none()
    }

    pub(crate) fn apply_to(self, event: &mut Event) {
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(end) = self.end {
            event.end = end;
        }
        if let Some(content) = self.content {
            event.content = content;
        }
        if let Some(group) = self.group {
            event.group = group;
        }
    }
}
