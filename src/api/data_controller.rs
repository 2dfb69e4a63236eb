use tracing::debug;

use crate::core::{Event, EventId, EventPatch};
use crate::error::{TimelineError, TimelineResult};
use crate::extensions::{HookDecision, HookEvent, PendingMutation};
use crate::render::Renderer;

use super::TimelineEngine;

impl<R: Renderer> TimelineEngine<R> {
    /// Appends an event without consulting hooks.
    pub fn append_event(&mut self, event: Event) -> TimelineResult<EventId> {
        let id = self.store.push(event);
        debug!(%id, rows = self.store.len(), "append event");
        self.relayout()?;
        Ok(id)
    }

    /// Replaces the whole event table, keeping the visible range.
    pub fn set_events(&mut self, events: impl IntoIterator<Item = Event>) -> TimelineResult<()> {
        self.store.replace_all(events);
        self.selection = None;
        debug!(rows = self.store.len(), "replace events");
        self.relayout()
    }

    /// Applies `patch` without consulting hooks. Returns `false` when the id
    /// is unknown.
    pub fn change_event(&mut self, id: EventId, patch: EventPatch) -> TimelineResult<bool> {
        if !self.store.update(id, patch) {
            return Ok(false);
        }
        debug!(%id, "change event");
        self.relayout()?;
        Ok(true)
    }

    /// Removes an event without consulting hooks. Returns `false` when the
    /// id is unknown.
    pub fn remove_event(&mut self, id: EventId) -> TimelineResult<bool> {
        if !self.store.remove(id) {
            return Ok(false);
        }
        debug!(%id, rows = self.store.len(), "remove event");
        if self.selection == Some(id) {
            self.selection = None;
            self.emit(HookEvent::Select { selection: None });
        }
        self.relayout()?;
        Ok(true)
    }

    /// Removes an event after every hook approved the deletion.
    ///
    /// Returns `Ok(false)` when a hook cancelled it.
    pub fn request_delete(&mut self, id: EventId) -> TimelineResult<bool> {
        let event = self
            .store
            .get(id)
            .cloned()
            .ok_or(TimelineError::RowOutOfRange(id))?;

        let mutation = PendingMutation::Delete { id, event };
        if self.approve(&mutation) == HookDecision::Cancel {
            self.emit(HookEvent::Cancelled { id });
            return Ok(false);
        }

        self.remove_event(id)?;
        self.emit(HookEvent::Deleted { id });
        Ok(true)
    }
}
