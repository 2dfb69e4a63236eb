use crate::core::{
    Animator, CoordinateMapper, Event, EventId, EventStore, LaidOutEvent, LayoutOutput,
    MeasurementProvider, StepDate, StepSpec, Timestamp, Viewport, VisibleRange,
};
use crate::error::TimelineResult;
use crate::extensions::{HookEvent, TimelineHook};
use crate::interaction::{InteractionMode, InteractionState};
use crate::render::Renderer;

use super::TimelineOptions;
use super::axis_builder::{AxisCache, AxisTick};

/// Main orchestration facade consumed by host applications.
///
/// `TimelineEngine` owns the event table, the visible range, layout and
/// animation state, and hands finished frames to the renderer. Mutating
/// operations recompute layout immediately; the host decides when to call
/// `render` (or `redraw`) and drives `tick_animation` on a fixed interval.
pub struct TimelineEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) measure: Box<dyn MeasurementProvider>,
    pub(super) options: TimelineOptions,
    pub(super) viewport: Viewport,
    pub(super) range: VisibleRange,
    pub(super) mapper: CoordinateMapper,
    pub(super) steps: StepDate,
    pub(super) store: EventStore,
    pub(super) layout: LayoutOutput,
    pub(super) animator: Animator,
    pub(super) axis: AxisCache,
    pub(super) interaction: InteractionState,
    pub(super) selection: Option<EventId>,
    pub(super) hooks: Vec<Box<dyn TimelineHook>>,
    pub(super) current_time: Timestamp,
    pub(super) custom_time: Timestamp,
}

impl<R: Renderer> TimelineEngine<R> {
    /// Recomputes layout, renders one frame and notifies hooks.
    pub fn redraw(&mut self) -> TimelineResult<()> {
        self.relayout()?;
        self.render()?;
        self.emit(HookEvent::Redrawn);
        Ok(())
    }

    /// Renders the currently displayed geometry without recomputing layout.
    pub fn render(&mut self) -> TimelineResult<()> {
        let frame = self.build_render_frame()?;
        self.renderer.render(&frame)
    }

    /// Advances running tweens by one step. Returns `true` while any remain;
    /// the host should call `render` after each tick.
    pub fn tick_animation(&mut self) -> bool {
        self.animator.tick()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    #[must_use]
    pub fn options(&self) -> &TimelineOptions {
        &self.options
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn visible_range(&self) -> VisibleRange {
        self.range
    }

    #[must_use]
    pub fn mapper(&self) -> CoordinateMapper {
        self.mapper
    }

    #[must_use]
    pub fn scale(&self) -> StepSpec {
        self.steps.spec()
    }

    #[must_use]
    pub fn is_auto_scale(&self) -> bool {
        self.steps.is_auto_scale()
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    #[must_use]
    pub fn add_mode(&self) -> bool {
        self.interaction.add_mode()
    }

    pub fn set_add_mode(&mut self, enabled: bool) {
        self.interaction.set_add_mode(enabled);
    }

    /// Target layout of the last layout pass, in content coordinates.
    #[must_use]
    pub fn layout(&self) -> &LayoutOutput {
        &self.layout
    }

    /// Currently displayed rectangle of one event, in frame coordinates.
    #[must_use]
    pub fn event_geometry(&self, id: EventId) -> Option<LaidOutEvent> {
        let left = self.content_left();
        self.animator
            .displayed_geometry(id)
            .map(|geometry| LaidOutEvent {
                left: geometry.left + left,
                ..geometry
            })
    }

    #[must_use]
    pub fn axis_ticks(&self) -> &[AxisTick] {
        self.axis.ticks()
    }

    /// Number of times the axis was rebuilt rather than translated.
    #[must_use]
    pub fn axis_rebuild_count(&self) -> u64 {
        self.axis.rebuild_count()
    }

    #[must_use]
    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.store.get(id)
    }

    pub fn events(&self) -> impl Iterator<Item = (EventId, &Event)> {
        self.store.iter()
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn current_time(&self) -> Timestamp {
        self.current_time
    }

    pub fn set_current_time(&mut self, time: Timestamp) {
        self.current_time = time;
    }

    #[must_use]
    pub fn custom_time(&self) -> Timestamp {
        self.custom_time
    }

    pub fn set_custom_time(&mut self, time: Timestamp) {
        self.custom_time = time;
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
