use chrono::Utc;
use tracing::debug;

use crate::core::primitives::{MILLIS_PER_DAY, datetime_to_millis};
use crate::core::{
    Animator, CoordinateMapper, Event, EventStore, LayoutOutput, MeasurementProvider, StepDate,
    Timestamp, VisibleRange,
};
use crate::error::TimelineResult;
use crate::extensions::HookEvent;
use crate::interaction::InteractionState;
use crate::render::Renderer;

use super::axis_builder::AxisCache;
use super::validation::validate_options;
use super::{TimelineEngine, TimelineOptions};

/// Window shown around "now" when neither options nor data give a range.
const DEFAULT_WINDOW_BEFORE_NOW_MS: i64 = MILLIS_PER_DAY;
const DEFAULT_WINDOW_AFTER_NOW_MS: i64 = 4 * MILLIS_PER_DAY;
/// Padding added on each side by `fit_to_events`, as a share of the data span.
pub(super) const FIT_PADDING_RATIO: f64 = 0.05;

impl<R: Renderer> TimelineEngine<R> {
    /// Creates an engine with an empty event table.
    pub fn new(
        renderer: R,
        measure: impl MeasurementProvider + 'static,
        options: TimelineOptions,
    ) -> TimelineResult<Self> {
        validate_options(&options)?;
        let offset = options.utc_offset()?;
        let now = Utc::now();
        let range = initial_range(&options, &EventStore::new(), now)?;
        let mut steps = StepDate::new(range.start(), range.end(), 0.0, offset)?;
        if let Some(scale) = options.scale {
            steps.set_scale(scale.scale, scale.step)?;
        }

        let mut engine = Self {
            renderer,
            measure: Box::new(measure),
            viewport: options.viewport,
            mapper: CoordinateMapper::new(range, options.viewport.width)?,
            options,
            range,
            steps,
            store: EventStore::new(),
            layout: LayoutOutput::default(),
            animator: Animator::new(),
            axis: AxisCache::default(),
            interaction: InteractionState::default(),
            selection: None,
            hooks: Vec::new(),
            current_time: now,
            custom_time: now,
        };
        engine.relayout()?;
        Ok(engine)
    }

    /// Replaces the event table and options, resets the visible range, and
    /// renders a fresh frame.
    pub fn draw(
        &mut self,
        events: impl IntoIterator<Item = Event>,
        options: TimelineOptions,
    ) -> TimelineResult<()> {
        validate_options(&options)?;
        let offset = options.utc_offset()?;

        self.store.replace_all(events);
        let range = initial_range(&options, &self.store, self.current_time)?;
        let mut steps = StepDate::new(range.start(), range.end(), 0.0, offset)?;
        if let Some(scale) = options.scale {
            steps.set_scale(scale.scale, scale.step)?;
        }

        self.viewport = options.viewport;
        self.options = options;
        self.range = range;
        self.steps = steps;
        self.selection = None;
        self.interaction = InteractionState::default();
        self.animator.clear();
        self.axis.invalidate();
        debug!(
            events = self.store.len(),
            start = %range.start(),
            end = %range.end(),
            "draw timeline"
        );

        self.redraw()?;
        self.emit(HookEvent::Ready);
        Ok(())
    }
}

/// Options range when given, else the data range with padding, else a
/// window around `now`.
pub(super) fn initial_range(
    options: &TimelineOptions,
    store: &EventStore,
    now: Timestamp,
) -> TimelineResult<VisibleRange> {
    let limits = options.range_limits();
    if let (Some(start), Some(end)) = (options.start, options.end) {
        return limits.apply(datetime_to_millis(start), datetime_to_millis(end), None);
    }
    match store.data_range() {
        Some((start, end)) => {
            let padding = ((end - start) as f64 * FIT_PADDING_RATIO).round() as i64;
            limits.apply(start - padding, end + padding, None)
        }
        None => {
            let now = datetime_to_millis(now);
            limits.apply(
                now - DEFAULT_WINDOW_BEFORE_NOW_MS,
                now + DEFAULT_WINDOW_AFTER_NOW_MS,
                None,
            )
        }
    }
}
