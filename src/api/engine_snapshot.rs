use serde::{Deserialize, Serialize};

use crate::core::{Event, EventId, LaidOutEvent, LayoutOutput, StepSpec, Viewport, VisibleRange};
use crate::error::{TimelineError, TimelineResult};
use crate::interaction::InteractionMode;
use crate::render::Renderer;

use super::{AxisTick, TimelineEngine};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub id: EventId,
    pub event: Event,
}

/// Serializable deterministic state snapshot used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub viewport: Viewport,
    pub visible_range: VisibleRange,
    pub scale: StepSpec,
    pub auto_scale: bool,
    pub selection: Option<EventId>,
    pub interaction_mode: InteractionMode,
    pub events: Vec<EventRow>,
    /// Target layout of the last layout pass.
    pub layout: LayoutOutput,
    /// Geometry currently on screen; differs from `layout` mid-animation.
    pub displayed: Vec<LaidOutEvent>,
    pub axis_ticks: Vec<AxisTick>,
    pub axis_rebuild_count: u64,
}

impl<R: Renderer> TimelineEngine<R> {
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            viewport: self.viewport,
            visible_range: self.range,
            scale: self.steps.spec(),
            auto_scale: self.steps.is_auto_scale(),
            selection: self.selection,
            interaction_mode: self.interaction.mode(),
            events: self
                .store
                .iter()
                .map(|(id, event)| EventRow {
                    id,
                    event: event.clone(),
                })
                .collect(),
            layout: self.layout.clone(),
            displayed: self.animator.displayed(),
            axis_ticks: self.axis.ticks().to_vec(),
            axis_rebuild_count: self.axis.rebuild_count(),
        }
    }

    /// Serializes the snapshot as pretty JSON for fixture-based regression checks.
    pub fn snapshot_json_pretty(&self) -> TimelineResult<String> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| TimelineError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }
}
