use serde::{Deserialize, Serialize};

use crate::core::{Event, EventId, Viewport, VisibleRange};
use crate::interaction::InteractionMode;

/// Read-only state snapshot passed to hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HookContext {
    pub viewport: Viewport,
    pub visible_range: VisibleRange,
    pub events_len: usize,
    pub selection: Option<EventId>,
    pub interaction_mode: InteractionMode,
}

/// Mutation awaiting approval from every registered hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PendingMutation {
    /// `event` is already in the store provisionally; a veto removes it.
    Add { id: EventId, event: Event },
    Change {
        id: EventId,
        before: Event,
        after: Event,
    },
    Delete { id: EventId, event: Event },
}

impl PendingMutation {
    #[must_use]
    pub fn id(&self) -> EventId {
        match self {
            Self::Add { id, .. } | Self::Change { id, .. } | Self::Delete { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookDecision {
    Proceed,
    Cancel,
}

/// Notifications emitted after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HookEvent {
    Ready,
    /// Emitted continuously while the range moves.
    RangeChange { range: VisibleRange },
    /// Emitted once a pan, zoom or programmatic range update completes.
    RangeChanged { range: VisibleRange },
    Select { selection: Option<EventId> },
    Added { id: EventId },
    Changed { id: EventId },
    Deleted { id: EventId },
    Cancelled { id: EventId },
    Redrawn,
}

/// Extension hook interface.
///
/// `before_commit` runs synchronously before a mutation is applied; returning
/// `HookDecision::Cancel` from any hook vetoes it.
pub trait TimelineHook {
    fn id(&self) -> &str;

    fn before_commit(
        &mut self,
        _mutation: &PendingMutation,
        _context: HookContext,
    ) -> HookDecision {
        HookDecision::Proceed
    }

    fn on_event(&mut self, _event: HookEvent, _context: HookContext) {}
}
