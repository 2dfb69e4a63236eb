use serde::{Deserialize, Serialize};

use crate::core::{EventId, Timestamp, VisibleRange};

/// Which part of an event a drag manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragMode {
    Move,
    ResizeLeft,
    ResizeRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    Idle,
    Panning,
    DraggingEvent(DragMode),
    CreatingEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Keyboard shortcuts understood when keys are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyInput {
    Left,
    Right,
    ZoomIn,
    ZoomOut,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PanGesture {
    pub origin_x: f64,
    pub snapshot: VisibleRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DragGesture {
    pub id: EventId,
    pub mode: DragMode,
    pub origin_x: f64,
    pub original_start: Timestamp,
    pub original_end: Option<Timestamp>,
    pub candidate_start: Timestamp,
    pub candidate_end: Option<Timestamp>,
}

impl DragGesture {
    pub fn has_changes(&self) -> bool {
        self.candidate_start != self.original_start || self.candidate_end != self.original_end
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CreateGesture {
    pub id: EventId,
    pub anchor: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Gesture {
    Pan(PanGesture),
    Drag(DragGesture),
    Create(CreateGesture),
}

/// Pointer state machine. At most one gesture is active at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionState {
    gesture: Option<Gesture>,
    add_mode: bool,
    pointer_x: f64,
    pointer_y: f64,
    pointer_moved: bool,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            gesture: None,
            add_mode: false,
            pointer_x: 0.0,
            pointer_y: 0.0,
            pointer_moved: false,
        }
    }
}

impl InteractionState {
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        match self.gesture {
            None => InteractionMode::Idle,
            Some(Gesture::Pan(_)) => InteractionMode::Panning,
            Some(Gesture::Drag(drag)) => InteractionMode::DraggingEvent(drag.mode),
            Some(Gesture::Create(_)) => InteractionMode::CreatingEvent,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.gesture.is_none()
    }

    #[must_use]
    pub fn add_mode(&self) -> bool {
        self.add_mode
    }

    pub fn set_add_mode(&mut self, enabled: bool) {
        self.add_mode = enabled;
    }

    #[must_use]
    pub fn pointer(&self) -> (f64, f64) {
        (self.pointer_x, self.pointer_y)
    }

    /// True once the pointer moved after the last `pointer_down`.
    #[must_use]
    pub fn pointer_moved(&self) -> bool {
        self.pointer_moved
    }

    pub(crate) fn gesture(&self) -> Option<Gesture> {
        self.gesture
    }

    pub(crate) fn gesture_mut(&mut self) -> Option<&mut Gesture> {
        self.gesture.as_mut()
    }

    pub(crate) fn on_pointer_down(&mut self, x: f64, y: f64) {
        self.pointer_x = x;
        self.pointer_y = y;
        self.pointer_moved = false;
    }

    pub(crate) fn on_pointer_move(&mut self, x: f64, y: f64) {
        if x != self.pointer_x || y != self.pointer_y {
            self.pointer_moved = true;
        }
        self.pointer_x = x;
        self.pointer_y = y;
    }

    pub(crate) fn begin(&mut self, gesture: Gesture) {
        self.gesture = Some(gesture);
    }

    pub(crate) fn finish(&mut self) -> Option<Gesture> {
        self.gesture.take()
    }
}
