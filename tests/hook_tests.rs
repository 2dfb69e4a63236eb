use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use timeline_rs::TimelineError;
use timeline_rs::api::{TimelineEngine, TimelineOptions};
use timeline_rs::core::{Event, EventId, FixedMetrics, ScaleUnit, Timestamp, Viewport};
use timeline_rs::extensions::{HookContext, HookDecision, HookEvent, PendingMutation, TimelineHook};
use timeline_rs::interaction::{DragMode, InteractionMode, PointerButton};
use timeline_rs::render::NullRenderer;

fn at(hour: u32, minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn options() -> TimelineOptions {
    TimelineOptions::new(Viewport::new(960, 300))
        .with_range(at(8, 0), at(16, 0))
        .with_scale(ScaleUnit::Minute, 15)
        .with_editable(true)
}

fn engine_with(events: Vec<Event>, options: TimelineOptions) -> TimelineEngine<NullRenderer> {
    let mut engine =
        TimelineEngine::new(NullRenderer::default(), FixedMetrics::default(), options.clone())
            .expect("engine init");
    engine.draw(events, options).expect("draw");
    engine
}

fn first_id(engine: &TimelineEngine<NullRenderer>) -> EventId {
    engine.events().next().map(|(id, _)| id).expect("one event")
}

#[derive(Default)]
struct Log {
    mutations: Vec<PendingMutation>,
    events: Vec<HookEvent>,
}

struct RecordingHook {
    id: String,
    decision: HookDecision,
    log: Rc<RefCell<Log>>,
}

impl RecordingHook {
    fn new(id: impl Into<String>, decision: HookDecision, log: Rc<RefCell<Log>>) -> Self {
        Self {
            id: id.into(),
            decision,
            log,
        }
    }
}

impl TimelineHook for RecordingHook {
    fn id(&self) -> &str {
        &self.id
    }

    fn before_commit(&mut self, mutation: &PendingMutation, _context: HookContext) -> HookDecision {
        self.log.borrow_mut().mutations.push(mutation.clone());
        self.decision
    }

    fn on_event(&mut self, event: HookEvent, _context: HookContext) {
        self.log.borrow_mut().events.push(event);
    }
}

fn recorded(engine: &mut TimelineEngine<NullRenderer>, decision: HookDecision) -> Rc<RefCell<Log>> {
    let log = Rc::new(RefCell::new(Log::default()));
    engine
        .add_hook(Box::new(RecordingHook::new("recorder", decision, log.clone())))
        .expect("add hook");
    log
}

#[test]
fn cancelled_drag_keeps_store_and_animates_back() {
    let mut engine = engine_with(vec![Event::range(at(10, 0), at(12, 0), "R")], options());
    let id = first_id(&engine);
    let log = recorded(&mut engine, HookDecision::Cancel);

    let mode = engine
        .pointer_down(360.0, 224.0, PointerButton::Primary)
        .expect("pointer down");
    assert_eq!(mode, InteractionMode::DraggingEvent(DragMode::Move));
    engine.pointer_move(480.0, 224.0).expect("pointer move");
    let dragged = engine.event_geometry(id).expect("displayed");
    assert_relative_eq!(dragged.left, 360.0, epsilon = 1e-6);

    engine.pointer_up(480.0, 224.0).expect("pointer up");

    let event = engine.event(id).expect("event");
    assert_eq!(event.start, at(10, 0));
    assert_eq!(event.end, Some(at(12, 0)));

    {
        let log = log.borrow();
        assert!(log.events.contains(&HookEvent::Cancelled { id }));
        assert!(!log.events.contains(&HookEvent::Changed { id }));
        match log.mutations.as_slice() {
            [PendingMutation::Change { before, after, .. }] => {
                assert_eq!(before.start, at(10, 0));
                assert_eq!(after.start, at(11, 0));
                assert_eq!(after.end, Some(at(13, 0)));
            }
            other => panic!("unexpected mutations: {other:?}"),
        }
    }

    assert!(engine.is_animating());
    let released = engine.event_geometry(id).expect("displayed");
    assert_relative_eq!(released.left, 360.0, epsilon = 1e-6);

    engine.tick_animation();
    let halfway = engine.event_geometry(id).expect("displayed");
    assert_relative_eq!(halfway.left, 300.0, epsilon = 1e-6);

    let mut ticks = 0;
    while engine.tick_animation() {
        ticks += 1;
        assert!(ticks < 100, "animation did not settle");
    }
    let settled = engine.event_geometry(id).expect("displayed");
    assert_relative_eq!(settled.left, 240.0, epsilon = 1e-6);
    assert!(!engine.is_animating());
}

#[test]
fn approved_drag_commits_and_reports_change() {
    let mut engine = engine_with(
        vec![Event::range(at(10, 0), at(12, 0), "R")],
        options().with_animate(false),
    );
    let id = first_id(&engine);
    let log = recorded(&mut engine, HookDecision::Proceed);

    engine
        .pointer_down(360.0, 224.0, PointerButton::Primary)
        .expect("pointer down");
    engine.pointer_up(480.0, 224.0).expect("pointer up");

    assert_eq!(engine.event(id).expect("event").start, at(11, 0));
    assert!(log.borrow().events.contains(&HookEvent::Changed { id }));
}

#[test]
fn drag_without_movement_skips_hooks() {
    let mut engine = engine_with(
        vec![Event::range(at(10, 0), at(12, 0), "R")],
        options().with_animate(false),
    );
    let log = recorded(&mut engine, HookDecision::Cancel);

    engine
        .pointer_down(360.0, 224.0, PointerButton::Primary)
        .expect("pointer down");
    engine.pointer_up(362.0, 224.0).expect("pointer up");

    assert!(log.borrow().mutations.is_empty());
}

#[test]
fn vetoed_delete_keeps_row() {
    let mut engine = engine_with(vec![Event::point(at(10, 0), "P")], options());
    let id = first_id(&engine);
    let log = recorded(&mut engine, HookDecision::Cancel);

    let deleted = engine.request_delete(id).expect("request delete");

    assert!(!deleted);
    assert_eq!(engine.event_count(), 1);
    assert!(log.borrow().events.contains(&HookEvent::Cancelled { id }));
    assert!(matches!(
        log.borrow().mutations.as_slice(),
        [PendingMutation::Delete { .. }]
    ));
}

#[test]
fn delete_of_unknown_row_is_an_error() {
    let mut engine = engine_with(Vec::new(), options());
    let err = engine
        .request_delete(EventId::new(42))
        .expect_err("unknown row");
    assert!(matches!(err, TimelineError::RowOutOfRange(_)));
}

#[test]
fn vetoed_add_removes_the_provisional_row() {
    let mut engine = engine_with(Vec::new(), options().with_animate(false));
    let log = recorded(&mut engine, HookDecision::Cancel);

    let added = engine.double_click(480.0, 50.0).expect("double click");

    assert_eq!(added, None);
    assert_eq!(engine.event_count(), 0);
    assert_eq!(engine.selection(), None);
    assert!(matches!(
        log.borrow().mutations.as_slice(),
        [PendingMutation::Add { .. }]
    ));
}

#[test]
fn any_cancelling_hook_vetoes() {
    let mut engine = engine_with(vec![Event::point(at(10, 0), "P")], options());
    let id = first_id(&engine);
    let proceed = Rc::new(RefCell::new(Log::default()));
    let cancel = Rc::new(RefCell::new(Log::default()));
    engine
        .add_hook(Box::new(RecordingHook::new(
            "proceed",
            HookDecision::Proceed,
            proceed.clone(),
        )))
        .expect("add hook");
    engine
        .add_hook(Box::new(RecordingHook::new(
            "cancel",
            HookDecision::Cancel,
            cancel.clone(),
        )))
        .expect("add hook");

    assert!(!engine.request_delete(id).expect("request delete"));
    assert_eq!(proceed.borrow().mutations.len(), 1);
    assert_eq!(cancel.borrow().mutations.len(), 1);
}

#[test]
fn notifications_follow_operation_order() {
    let mut engine = engine_with(vec![Event::point(at(10, 0), "P")], options());
    let id = first_id(&engine);
    let log = recorded(&mut engine, HookDecision::Proceed);

    engine
        .set_visible_range(at(9, 0), at(17, 0))
        .expect("set range");
    engine.set_selection(Some(id)).expect("select");
    engine.request_delete(id).expect("request delete");
    engine.redraw().expect("redraw");

    let log = log.borrow();
    let events = &log.events;
    assert_eq!(events.len(), 5);
    assert!(matches!(events[0], HookEvent::RangeChanged { .. }));
    assert_eq!(events[1], HookEvent::Select { selection: Some(id) });
    assert_eq!(events[2], HookEvent::Select { selection: None });
    assert_eq!(events[3], HookEvent::Deleted { id });
    assert_eq!(events[4], HookEvent::Redrawn);
}

#[test]
fn draw_reports_ready() {
    let mut engine = engine_with(Vec::new(), options());
    let log = recorded(&mut engine, HookDecision::Proceed);

    engine.draw(vec![Event::point(at(10, 0), "P")], options()).expect("draw");

    let log = log.borrow();
    let events = &log.events;
    assert_eq!(events.last(), Some(&HookEvent::Ready));
}

#[test]
fn hook_ids_must_be_unique_and_non_empty() {
    let mut engine = engine_with(Vec::new(), options());
    let log = Rc::new(RefCell::new(Log::default()));

    engine
        .add_hook(Box::new(RecordingHook::new("a", HookDecision::Proceed, log.clone())))
        .expect("first hook");
    let duplicate =
        engine.add_hook(Box::new(RecordingHook::new("a", HookDecision::Proceed, log.clone())));
    assert!(matches!(duplicate, Err(TimelineError::InvalidData(_))));
    let empty = engine.add_hook(Box::new(RecordingHook::new("", HookDecision::Proceed, log)));
    assert!(matches!(empty, Err(TimelineError::InvalidData(_))));

    assert_eq!(engine.hook_count(), 1);
    assert!(engine.has_hook("a"));
    assert!(engine.remove_hook("a"));
    assert!(!engine.remove_hook("a"));
    assert_eq!(engine.hook_count(), 0);
}
