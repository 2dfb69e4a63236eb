use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::primitives::millis_to_datetime;
use crate::core::{AxisPlacement, StepSpec, TextRole, Timestamp};
use crate::error::TimelineResult;
use crate::render::Renderer;

use super::TimelineEngine;

/// Minor labels are kept at least this many characters apart.
const MIN_STEP_CHARS: f64 = 6.0;
/// Vertical padding around each label row of the axis.
pub(super) const AXIS_LABEL_PADDING_PX: f64 = 3.0;
const MAX_AXIS_TICKS: usize = 10_000;

/// One tick of the time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub time: Timestamp,
    pub is_major: bool,
    pub minor_label: String,
    pub major_label: String,
}

/// Ticks built for the visible range plus one screen on each side.
///
/// While the scale factor is unchanged and the range has not moved more
/// than one content width from where the ticks were built, the cached ticks
/// are reused and only their screen positions shift.
#[derive(Debug, Clone, Default)]
pub(super) struct AxisCache {
    ticks: Vec<AxisTick>,
    spec: Option<StepSpec>,
    built_factor: f64,
    built_offset: f64,
    rebuild_count: u64,
}

impl AxisCache {
    pub(super) fn ticks(&self) -> &[AxisTick] {
        &self.ticks
    }

    pub(super) fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    pub(super) fn invalidate(&mut self) {
        self.spec = None;
    }

    fn can_translate(&self, factor: f64, offset: f64, width_px: f64) -> bool {
        self.spec.is_some()
            && self.built_factor == factor
            && ((offset - self.built_offset) * factor).abs() <= width_px
    }
}

impl<R: Renderer> TimelineEngine<R> {
    pub(super) fn axis_height(&self) -> f64 {
        let minor = self.measure.character_size(TextRole::AxisMinor).height;
        if self.options.show_major_labels {
            let major = self.measure.character_size(TextRole::AxisMajor).height;
            minor + major + 3.0 * AXIS_LABEL_PADDING_PX
        } else {
            minor + 2.0 * AXIS_LABEL_PADDING_PX
        }
    }

    pub(super) fn axis_placement(&self) -> AxisPlacement {
        let height = self.axis_height();
        let top = if self.options.axis_on_top {
            0.0
        } else {
            (f64::from(self.viewport.height) - height).max(0.0)
        };
        AxisPlacement { top, height }
    }

    /// Reuses the cached ticks when possible, otherwise rebuilds them.
    pub(super) fn update_axis(&mut self) -> TimelineResult<()> {
        let factor = self.mapper.factor();
        let offset = self.mapper.offset();
        let width = f64::from(self.mapper.pixel_width());
        if self.axis.can_translate(factor, offset, width) {
            trace!(offset, "translate cached axis");
            return Ok(());
        }
        self.rebuild_axis()
    }

    fn rebuild_axis(&mut self) -> TimelineResult<()> {
        let char_width = self.measure.character_size(TextRole::AxisMinor).width;
        let minimum_step_ms = (self.mapper.screen_to_time(char_width * MIN_STEP_CHARS)
            - self.mapper.screen_to_time(0.0))
        .max(0.0);

        let (start_ms, end_ms) = self.range.expanded_millis(self.range.duration_ms());
        let start = millis_to_datetime(start_ms).unwrap_or_else(|_| self.range.start());
        let end = millis_to_datetime(end_ms).unwrap_or_else(|_| self.range.end());
        self.steps.set_range(start, end, minimum_step_ms)?;

        let mut ticks = Vec::new();
        self.steps.start();
        while !self.steps.done() {
            if ticks.len() >= MAX_AXIS_TICKS {
                warn!(
                    limit = MAX_AXIS_TICKS,
                    scale = ?self.steps.scale(),
                    step = self.steps.step(),
                    "axis tick limit reached; truncating axis"
                );
                break;
            }
            ticks.push(AxisTick {
                time: self.steps.current(),
                is_major: self.steps.is_major(),
                minor_label: self.steps.minor_label(),
                major_label: self.steps.major_label(),
            });
            self.steps.next();
        }

        self.axis.ticks = ticks;
        self.axis.spec = Some(self.steps.spec());
        self.axis.built_factor = self.mapper.factor();
        self.axis.built_offset = self.mapper.offset();
        self.axis.rebuild_count += 1;
        debug!(
            scale = ?self.steps.scale(),
            step = self.steps.step(),
            ticks = self.axis.ticks.len(),
            rebuilds = self.axis.rebuild_count,
            "rebuilt time axis"
        );
        Ok(())
    }
}
