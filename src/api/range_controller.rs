use tracing::debug;

use crate::core::primitives::datetime_to_millis;
use crate::core::range::{move_window, zoom_window};
use crate::core::{ScaleUnit, Timestamp, VisibleRange};
use crate::error::TimelineResult;
use crate::extensions::HookEvent;
use crate::render::Renderer;

use super::engine_init::initial_range;
use super::{TimelineEngine, TimelineOptions};

impl<R: Renderer> TimelineEngine<R> {
    /// Sets the visible range after applying zoom limits and bounds.
    pub fn set_visible_range(&mut self, start: Timestamp, end: Timestamp) -> TimelineResult<()> {
        let range = self.options.range_limits().apply(
            datetime_to_millis(start),
            datetime_to_millis(end),
            None,
        )?;
        self.apply_range(range)?;
        self.emit(HookEvent::RangeChanged { range });
        Ok(())
    }

    /// Zooms by `factor` around `around`, or the range centre when `None`.
    ///
    /// Returns `false` when the zoom was ignored because the result would
    /// fall under the minimum interval.
    pub fn zoom(&mut self, factor: f64, around: Option<Timestamp>) -> TimelineResult<bool> {
        let anchor = around.map_or_else(|| self.range.center_ms(), datetime_to_millis);
        self.zoom_around(factor, anchor)
    }

    pub(super) fn zoom_around(&mut self, factor: f64, anchor_ms: i64) -> TimelineResult<bool> {
        let limits = self.options.range_limits();
        let Some(range) = zoom_window(self.range, factor, anchor_ms, limits)? else {
            debug!(factor, anchor_ms, "zoom ignored below minimum interval");
            return Ok(false);
        };
        self.apply_range(range)?;
        self.emit(HookEvent::RangeChange { range });
        self.emit(HookEvent::RangeChanged { range });
        Ok(true)
    }

    /// Shifts the range by `factor` times its duration; negative moves left.
    pub fn move_by(&mut self, factor: f64) -> TimelineResult<()> {
        let range = move_window(self.range, factor, self.options.range_limits())?;
        self.apply_range(range)?;
        self.emit(HookEvent::RangeChange { range });
        self.emit(HookEvent::RangeChanged { range });
        Ok(())
    }

    /// Fits the range to all events with 5% padding on each side.
    pub fn fit_to_events(&mut self) -> TimelineResult<()> {
        let options = TimelineOptions {
            start: None,
            end: None,
            ..self.options.clone()
        };
        let range = initial_range(&options, &self.store, self.current_time)?;
        self.apply_range(range)?;
        self.emit(HookEvent::RangeChanged { range });
        Ok(())
    }

    /// Pins the axis scale until `set_auto_scale` is called.
    pub fn set_scale(&mut self, scale: ScaleUnit, step: u32) -> TimelineResult<()> {
        self.steps.set_scale(scale, step)?;
        self.options.scale = Some(self.steps.spec());
        self.axis.invalidate();
        self.relayout()
    }

    /// Lets the axis pick its step from the zoom level again.
    pub fn set_auto_scale(&mut self) -> TimelineResult<()> {
        self.steps.set_auto_scale(true);
        self.options.scale = None;
        self.axis.invalidate();
        self.relayout()
    }

    pub(super) fn apply_range(&mut self, range: VisibleRange) -> TimelineResult<()> {
        debug!(start = %range.start(), end = %range.end(), "apply visible range");
        self.range = range;
        self.relayout()
    }
}
