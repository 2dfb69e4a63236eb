use tracing::{debug, trace};

use crate::core::primitives::{datetime_to_millis, millis_f64_to_datetime, millis_to_datetime};
use crate::core::{Event, EventId, EventKind, EventPatch, LaidOutEvent, Timestamp, Viewport};
use crate::error::{TimelineError, TimelineResult};
use crate::extensions::{HookDecision, HookEvent, PendingMutation};
use crate::interaction::{
    CreateGesture, DragGesture, DragMode, Gesture, InteractionMode, KeyInput, PanGesture,
    PointerButton,
};
use crate::render::Renderer;

use super::TimelineEngine;
use super::validation::validate_pointer;

const NEW_EVENT_CONTENT: &str = "New";
const WHEEL_ZOOM_DIVISOR: f64 = 5.0;
const KEY_MOVE_FACTOR: f64 = 0.2;
const KEY_ZOOM_FACTOR: f64 = 0.4;

impl<R: Renderer> TimelineEngine<R> {
    /// Resizes the frame and relays out.
    pub fn set_viewport(&mut self, viewport: Viewport) -> TimelineResult<()> {
        if !viewport.is_valid() {
            return Err(TimelineError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = viewport;
        self.options.viewport = viewport;
        self.relayout()
    }

    /// Picks up a frame resize reported by the measurement provider and
    /// reconfigures a mapper that no longer matches the content width.
    ///
    /// Returns `true` when geometry had to be recomputed.
    pub fn check_resize(&mut self) -> TimelineResult<bool> {
        let mut stale = false;
        if let Some(actual) = self.measure.frame_size() {
            if actual != self.viewport {
                if !actual.is_valid() {
                    return Err(TimelineError::InvalidViewport {
                        width: actual.width,
                        height: actual.height,
                    });
                }
                debug!(
                    old_width = self.viewport.width,
                    old_height = self.viewport.height,
                    width = actual.width,
                    height = actual.height,
                    "frame resized"
                );
                self.viewport = actual;
                self.options.viewport = actual;
                stale = true;
            }
        }
        if let Err(err) = self.mapper.ensure_fresh(self.content_width()) {
            debug!(error = %err, "reconfiguring stale coordinate mapper");
            stale = true;
        }
        if stale {
            self.relayout()?;
        }
        Ok(stale)
    }

    pub fn pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: PointerButton,
    ) -> TimelineResult<InteractionMode> {
        validate_pointer(x, y)?;
        self.check_resize()?;
        if !self.interaction.is_idle() {
            let (last_x, last_y) = self.interaction.pointer();
            debug!(mode = ?self.interaction.mode(), "ending active gesture before pointer down");
            self.pointer_up(last_x, last_y)?;
        }

        self.interaction.on_pointer_down(x, y);
        if button != PointerButton::Primary {
            return Ok(self.interaction.mode());
        }

        if self.interaction.add_mode() && self.options.editable {
            self.begin_create(x)?;
        } else if let Some(hit) = self.hit_test(x, y) {
            if self.options.selectable {
                self.select(Some(hit.id));
            }
            if self.options.editable {
                self.begin_drag(hit, x);
            }
        } else if self.options.moveable {
            self.interaction.begin(Gesture::Pan(PanGesture {
                origin_x: x,
                snapshot: self.range,
            }));
        } else if self.options.selectable {
            self.select(None);
        }

        trace!(x, y, mode = ?self.interaction.mode(), "pointer down");
        Ok(self.interaction.mode())
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> TimelineResult<()> {
        validate_pointer(x, y)?;
        self.interaction.on_pointer_move(x, y);
        match self.interaction.gesture() {
            None => Ok(()),
            Some(Gesture::Pan(pan)) => self.pan_to(pan, x),
            Some(Gesture::Drag(drag)) => self.drag_to(drag, x),
            Some(Gesture::Create(create)) => self.grow_created(create, x),
        }
    }

    /// Ends the active gesture at `(x, y)`.
    ///
    /// Dragged and created events go through the hooks here; a cancelled
    /// drag leaves the store untouched and animates back.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> TimelineResult<()> {
        self.pointer_move(x, y)?;
        let moved = self.interaction.pointer_moved();
        match self.interaction.finish() {
            None => Ok(()),
            Some(Gesture::Pan(_)) => {
                if moved {
                    self.emit(HookEvent::RangeChanged { range: self.range });
                } else if self.options.selectable {
                    self.select(None);
                }
                Ok(())
            }
            Some(Gesture::Drag(drag)) => self.commit_drag(drag),
            Some(Gesture::Create(create)) => self.commit_add(create.id).map(|_| ()),
        }
    }

    /// Zooms around the pointer by `delta / 5`. Returns `true` when the
    /// range changed.
    pub fn wheel(&mut self, delta: f64, x: f64) -> TimelineResult<bool> {
        if !delta.is_finite() || !x.is_finite() {
            return Err(TimelineError::InvalidData(
                "wheel delta and position must be finite".to_owned(),
            ));
        }
        self.check_resize()?;
        if !self.options.zoomable || delta == 0.0 {
            return Ok(false);
        }
        let anchor = self
            .mapper
            .screen_to_time(x - self.content_left())
            .round() as i64;
        self.zoom_around(delta / WHEEL_ZOOM_DIVISOR, anchor)
    }

    /// Adds a point event at the snapped time under the pointer when the
    /// background is double-clicked on an editable timeline.
    pub fn double_click(&mut self, x: f64, y: f64) -> TimelineResult<Option<EventId>> {
        validate_pointer(x, y)?;
        if !self.options.editable {
            return Ok(None);
        }
        self.check_resize()?;
        if self.hit_test(x, y).is_some() {
            return Ok(None);
        }
        let time = self.snap_time(self.time_at(x)?);
        let id = self.store.append(time, None, NEW_EVENT_CONTENT, None);
        debug!(%id, %time, "double click adds event");
        self.relayout()?;
        Ok(self.commit_add(id)?.then_some(id))
    }

    /// Handles a keyboard shortcut. Returns `true` when it had an effect.
    pub fn key(&mut self, key: KeyInput) -> TimelineResult<bool> {
        if !self.options.enable_keys {
            return Ok(false);
        }
        match key {
            KeyInput::Left => self.move_by(-KEY_MOVE_FACTOR).map(|()| true),
            KeyInput::Right => self.move_by(KEY_MOVE_FACTOR).map(|()| true),
            KeyInput::ZoomIn => self.zoom(KEY_ZOOM_FACTOR, None),
            KeyInput::ZoomOut => self.zoom(-KEY_ZOOM_FACTOR, None),
            KeyInput::Delete => match (self.options.editable, self.selection) {
                (true, Some(id)) => self.request_delete(id),
                _ => Ok(false),
            },
        }
    }

    /// Topmost displayed event under the frame position `(x, y)`.
    fn hit_test(&self, x: f64, y: f64) -> Option<LaidOutEvent> {
        let content_x = x - self.content_left();
        self.animator
            .displayed()
            .into_iter()
            .rev()
            .find(|geometry| geometry.contains(content_x, y))
    }

    fn time_at(&self, x: f64) -> TimelineResult<Timestamp> {
        millis_f64_to_datetime(self.mapper.screen_to_time(x - self.content_left()))
    }

    fn snap_time(&self, time: Timestamp) -> Timestamp {
        if self.options.snap_events {
            self.steps.snap(time)
        } else {
            time
        }
    }

    fn begin_drag(&mut self, hit: LaidOutEvent, x: f64) {
        let Some(event) = self.store.get(hit.id) else {
            return;
        };
        let content_x = x - self.content_left();
        let handle = self.options.drag_area_width_px;
        let mode = match hit.kind {
            EventKind::Range if content_x <= hit.left + handle => DragMode::ResizeLeft,
            EventKind::Range if content_x >= hit.right() - handle => DragMode::ResizeRight,
            _ => DragMode::Move,
        };
        debug!(id = %hit.id, ?mode, "begin event drag");
        self.interaction.begin(Gesture::Drag(DragGesture {
            id: hit.id,
            mode,
            origin_x: x,
            original_start: event.start,
            original_end: event.end,
            candidate_start: event.start,
            candidate_end: event.end,
        }));
    }

    fn begin_create(&mut self, x: f64) -> TimelineResult<()> {
        let anchor = self.snap_time(self.time_at(x)?);
        let id = self.store.append(anchor, None, NEW_EVENT_CONTENT, None);
        debug!(%id, %anchor, "begin event creation");
        self.interaction
            .begin(Gesture::Create(CreateGesture { id, anchor }));
        self.relayout()
    }

    fn pan_to(&mut self, pan: PanGesture, x: f64) -> TimelineResult<()> {
        let width = f64::from(self.mapper.pixel_width());
        let duration = pan.snapshot.duration_ms() as f64;
        let shift = (-(x - pan.origin_x) / width * duration).round() as i64;
        let range = self.options.range_limits().apply(
            pan.snapshot.start_ms().saturating_add(shift),
            pan.snapshot.end_ms().saturating_add(shift),
            None,
        )?;
        if range == self.range {
            return Ok(());
        }
        self.apply_range(range)?;
        self.emit(HookEvent::RangeChange { range });
        Ok(())
    }

    fn drag_to(&mut self, drag: DragGesture, x: f64) -> TimelineResult<()> {
        let dt = self.mapper.pixels_to_duration(x - drag.origin_x).round() as i64;
        let (start, end) = self.drag_candidate(drag, dt)?;
        if let Some(Gesture::Drag(active)) = self.interaction.gesture_mut() {
            active.candidate_start = start;
            active.candidate_end = end;
        }
        trace!(id = %drag.id, %start, ?end, "drag candidate");
        self.relayout()
    }

    /// Candidate `(start, end)` after shifting by `dt` milliseconds and snapping.
    fn drag_candidate(
        &self,
        drag: DragGesture,
        dt: i64,
    ) -> TimelineResult<(Timestamp, Option<Timestamp>)> {
        let original_start = datetime_to_millis(drag.original_start);
        match drag.mode {
            DragMode::Move => {
                let start =
                    self.snap_time(millis_to_datetime(original_start.saturating_add(dt))?);
                let delta = datetime_to_millis(start) - original_start;
                let end = drag
                    .original_end
                    .map(|end| millis_to_datetime(datetime_to_millis(end).saturating_add(delta)))
                    .transpose()?;
                Ok((start, end))
            }
            DragMode::ResizeLeft => {
                let mut start =
                    self.snap_time(millis_to_datetime(original_start.saturating_add(dt))?);
                if let Some(end) = drag.original_end {
                    start = start.min(end);
                }
                Ok((start, drag.original_end))
            }
            DragMode::ResizeRight => {
                let end = match drag.original_end {
                    Some(end) => {
                        let moved = millis_to_datetime(datetime_to_millis(end).saturating_add(dt))?;
                        Some(self.snap_time(moved).max(drag.original_start))
                    }
                    None => None,
                };
                Ok((drag.original_start, end))
            }
        }
    }

    fn grow_created(&mut self, create: CreateGesture, x: f64) -> TimelineResult<()> {
        let time = self.snap_time(self.time_at(x)?);
        let patch = if time == create.anchor {
            EventPatch::times(create.anchor, None)
        } else {
            EventPatch::times(create.anchor.min(time), Some(create.anchor.max(time)))
        };
        self.store.update(create.id, patch);
        self.relayout()
    }

    fn commit_drag(&mut self, drag: DragGesture) -> TimelineResult<()> {
        let before = match self.store.get(drag.id) {
            Some(event) if drag.has_changes() => event.clone(),
            _ => return self.relayout(),
        };
        let after = Event {
            start: drag.candidate_start,
            end: drag.candidate_end,
            ..before.clone()
        };
        let mutation = PendingMutation::Change {
            id: drag.id,
            before,
            after,
        };

        match self.approve(&mutation) {
            HookDecision::Proceed => {
                self.store.update(
                    drag.id,
                    EventPatch::times(drag.candidate_start, drag.candidate_end),
                );
                debug!(id = %drag.id, start = %drag.candidate_start, "commit event change");
                self.relayout()?;
                self.emit(HookEvent::Changed { id: drag.id });
            }
            HookDecision::Cancel => {
                self.relayout()?;
                self.emit(HookEvent::Cancelled { id: drag.id });
            }
        }
        Ok(())
    }

    /// Runs the `Add` hooks for a provisionally inserted row. Returns `false`
    /// and drops the row when a hook cancelled.
    fn commit_add(&mut self, id: EventId) -> TimelineResult<bool> {
        let Some(event) = self.store.get(id).cloned() else {
            return Ok(false);
        };
        let mutation = PendingMutation::Add { id, event };
        match self.approve(&mutation) {
            HookDecision::Proceed => {
                self.relayout()?;
                if self.options.selectable {
                    self.select(Some(id));
                }
                self.emit(HookEvent::Added { id });
                Ok(true)
            }
            HookDecision::Cancel => {
                self.store.remove(id);
                self.relayout()?;
                self.emit(HookEvent::Cancelled { id });
                Ok(false)
            }
        }
    }
}
