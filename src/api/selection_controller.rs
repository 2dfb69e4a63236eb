use tracing::debug;

use crate::core::EventId;
use crate::error::{TimelineError, TimelineResult};
use crate::extensions::HookEvent;
use crate::render::Renderer;

use super::TimelineEngine;

impl<R: Renderer> TimelineEngine<R> {
    #[must_use]
    pub fn selection(&self) -> Option<EventId> {
        self.selection
    }

    /// Selects one event, or clears the selection with `None`.
    pub fn set_selection(&mut self, selection: Option<EventId>) -> TimelineResult<()> {
        if let Some(id) = selection {
            if !self.store.contains(id) {
                return Err(TimelineError::RowOutOfRange(id));
            }
        }
        self.select(selection);
        Ok(())
    }

    /// Updates the selection and emits `Select` when it changed.
    pub(super) fn select(&mut self, selection: Option<EventId>) {
        if self.selection == selection {
            return;
        }
        debug!(?selection, "selection changed");
        self.selection = selection;
        self.emit(HookEvent::Select { selection });
    }
}
