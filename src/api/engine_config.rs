use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::core::primitives::datetime_to_millis;
use crate::core::range::{MAX_ZOOM_INTERVAL_MS, MIN_ZOOM_INTERVAL_MS};
use crate::core::{
    EventLayout, LayoutConfig, RangeLimits, ScaleUnit, StepSpec, Timestamp, Viewport,
};
use crate::error::{TimelineError, TimelineResult};

/// Public engine configuration.
///
/// Serializable so hosts can persist timeline setup; every field falls back
/// to its default when missing from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    pub viewport: Viewport,
    /// Initial visible range; fitted to the events when either edge is missing.
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    /// Pins the axis step; `None` selects it from the zoom level.
    pub scale: Option<StepSpec>,
    pub layout: EventLayout,
    pub animate: bool,
    pub stack_events: bool,
    pub event_margin_px: f64,
    pub event_margin_axis_px: f64,
    pub show_major_labels: bool,
    pub axis_on_top: bool,
    pub moveable: bool,
    pub zoomable: bool,
    pub selectable: bool,
    pub editable: bool,
    pub enable_keys: bool,
    pub snap_events: bool,
    /// Width of the resize handles at both ends of a range event.
    pub drag_area_width_px: f64,
    pub min: Option<Timestamp>,
    pub max: Option<Timestamp>,
    pub zoom_min_ms: i64,
    pub zoom_max_ms: i64,
    /// Events this many screen widths beyond either edge are laid out too.
    pub overscan_screens: f64,
    pub groups_on_right: bool,
    /// Fixed width of the group label column; measured from labels when `None`.
    pub groups_width_px: Option<f64>,
    pub utc_offset_minutes: i32,
    pub show_current_time: bool,
    pub show_custom_time: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        Self {
            viewport: Viewport::new(800, 300),
            start: None,
            end: None,
            scale: None,
            layout: layout.layout,
            animate: true,
            stack_events: layout.stack_events,
            event_margin_px: layout.event_margin_px,
            event_margin_axis_px: layout.event_margin_axis_px,
            show_major_labels: true,
            axis_on_top: layout.axis_on_top,
            moveable: true,
            zoomable: true,
            selectable: true,
            editable: false,
            enable_keys: true,
            snap_events: true,
            drag_area_width_px: 10.0,
            min: None,
            max: None,
            zoom_min_ms: MIN_ZOOM_INTERVAL_MS,
            zoom_max_ms: MAX_ZOOM_INTERVAL_MS,
            overscan_screens: 1.0,
            groups_on_right: false,
            groups_width_px: None,
            utc_offset_minutes: 0,
            show_current_time: true,
            show_custom_time: false,
        }
    }
}

impl TimelineOptions {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_range(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: ScaleUnit, step: u32) -> Self {
        self.scale = Some(StepSpec::new(scale, step));
        self
    }

    #[must_use]
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    #[must_use]
    pub fn with_animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: EventLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_event_margins(mut self, event_margin_px: f64, event_margin_axis_px: f64) -> Self {
        self.event_margin_px = event_margin_px;
        self.event_margin_axis_px = event_margin_axis_px;
        self
    }

    #[must_use]
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            layout: self.layout,
            stack_events: self.stack_events,
            event_margin_px: self.event_margin_px,
            event_margin_axis_px: self.event_margin_axis_px,
            axis_on_top: self.axis_on_top,
            ..LayoutConfig::default()
        }
    }

    #[must_use]
    pub fn range_limits(&self) -> RangeLimits {
        RangeLimits {
            zoom_min_ms: self.zoom_min_ms,
            zoom_max_ms: self.zoom_max_ms,
            min_ms: self.min.map(datetime_to_millis),
            max_ms: self.max.map(datetime_to_millis),
        }
    }

    pub fn utc_offset(&self) -> TimelineResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            TimelineError::InvalidData(format!(
                "utc offset of {} minutes is out of range",
                self.utc_offset_minutes
            ))
        })
    }

    pub fn from_json_str(input: &str) -> TimelineResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| TimelineError::InvalidData(format!("failed to parse options json: {e}")))
    }

    pub fn to_json_pretty(&self) -> TimelineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            TimelineError::InvalidData(format!("failed to serialize options json: {e}"))
        })
    }
}
