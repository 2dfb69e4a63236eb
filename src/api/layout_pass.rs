use tracing::trace;

use crate::core::primitives::datetime_to_millis;
use crate::core::{Event, EventId, LayoutEngine, LayoutInput, TextRole};
use crate::error::TimelineResult;
use crate::interaction::Gesture;
use crate::render::Renderer;

use super::TimelineEngine;

/// Horizontal padding on both sides of the widest group label.
pub(super) const GROUP_LABEL_PADDING_PX: f64 = 5.0;

impl<R: Renderer> TimelineEngine<R> {
    /// Width of the group label column; zero when no event has a group.
    pub(super) fn groups_column_width(&self) -> f64 {
        let keys = self.store.group_keys();
        if keys.is_empty() {
            return 0.0;
        }
        let width = match self.options.groups_width_px {
            Some(width) => width,
            None => {
                keys.iter()
                    .map(|key| self.measure.measure_text(key, TextRole::GroupLabel).width)
                    .fold(0.0, f64::max)
                    + 2.0 * GROUP_LABEL_PADDING_PX
            }
        };
        width.clamp(0.0, (f64::from(self.viewport.width) - 1.0).max(0.0))
    }

    pub(super) fn content_width(&self) -> u32 {
        let width = f64::from(self.viewport.width) - self.groups_column_width();
        width.floor().max(1.0) as u32
    }

    /// Frame x of the content area's left edge.
    pub(super) fn content_left(&self) -> f64 {
        if self.options.groups_on_right {
            0.0
        } else {
            self.groups_column_width()
        }
    }

    /// Candidate geometry of the event under an active drag.
    fn drag_overlay(&self) -> Option<(EventId, Event)> {
        let Some(Gesture::Drag(drag)) = self.interaction.gesture() else {
            return None;
        };
        let mut event = self.store.get(drag.id)?.clone();
        event.start = drag.candidate_start;
        event.end = drag.candidate_end;
        Some((drag.id, event))
    }

    /// Reconfigures the mapper, refreshes the axis and lays out every event
    /// within the overscanned range, then hands the result to the animator.
    pub(super) fn relayout(&mut self) -> TimelineResult<()> {
        let content_width = self.content_width();
        let previous_mapper = self.mapper;
        self.mapper.configure(self.range, content_width)?;
        self.update_axis()?;

        let axis = self.axis_placement();
        let overscan_ms =
            (self.options.overscan_screens * self.range.duration_ms() as f64).round() as i64;
        let overlay = self.drag_overlay();
        let group_order = self.store.group_keys();

        let output = {
            let mut rows = self.store.visible_events(self.range, overscan_ms);
            if let Some((id, event)) = overlay.as_ref() {
                match rows.iter_mut().find(|(row_id, _)| row_id == id) {
                    Some(row) => row.1 = event,
                    None => rows.push((*id, event)),
                }
            }

            let mapper = self.mapper;
            let inputs: Vec<LayoutInput<'_>> = rows
                .iter()
                .map(|(id, event)| LayoutInput {
                    id: *id,
                    event,
                    x_start: mapper.time_to_screen(event.start_ms() as f64),
                    x_end: event
                        .end
                        .map(|end| mapper.time_to_screen(datetime_to_millis(end) as f64)),
                })
                .collect();

            LayoutEngine::new(self.options.layout_config()).layout(
                &inputs,
                &group_order,
                axis,
                self.measure.as_ref(),
            )
        };

        if self.mapper == previous_mapper {
            self.animator.retarget(&output.events, self.options.animate);
        } else {
            let scale_ratio = self.mapper.factor() / previous_mapper.factor();
            self.animator
                .retarget_remapped(&output.events, self.options.animate, scale_ratio);
        }
        if let Some((id, _)) = overlay {
            if let Some(preview) = output.get(id) {
                self.animator.place(*preview);
            }
        }
        trace!(
            laid_out = output.events.len(),
            groups = output.groups.len(),
            content_width,
            "layout pass"
        );
        self.layout = output;
        Ok(())
    }
}
