use chrono::{TimeDelta, TimeZone, Utc};
use timeline_rs::api::{TimelineEngine, TimelineOptions};
use timeline_rs::core::{Event, EventId, EventPatch, FixedMetrics, Timestamp, Viewport};
use timeline_rs::interaction::{InteractionMode, PointerButton};
use timeline_rs::render::NullRenderer;
use timeline_rs::{TimelineError, TimelineResult};

fn at(hour: u32, minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn options() -> TimelineOptions {
    TimelineOptions::new(Viewport::new(960, 300))
        .with_range(at(8, 0), at(16, 0))
        .with_editable(true)
        .with_animate(false)
}

#[test]
fn engine_smoke_flow() -> TimelineResult<()> {
    let mut engine = TimelineEngine::new(NullRenderer::default(), FixedMetrics::default(), options())?;
    engine.draw(vec![Event::point(at(10, 0), "P")], options())?;

    let id = engine.append_event(Event::range(at(12, 0), at(13, 0), "R"))?;
    assert_eq!(engine.event_count(), 2);
    assert!(engine.layout().get(id).is_some());

    assert!(engine.change_event(id, EventPatch::default().with_content("Renamed"))?);
    assert_eq!(engine.event(id).map(|event| event.content.as_str()), Some("Renamed"));

    engine.pointer_down(100.0, 50.0, PointerButton::Primary)?;
    assert_eq!(engine.interaction_mode(), InteractionMode::Panning);
    engine.pointer_up(100.0, 50.0)?;
    assert_eq!(engine.interaction_mode(), InteractionMode::Idle);

    assert!(engine.remove_event(id)?);
    assert!(!engine.remove_event(id)?);
    assert_eq!(engine.event_count(), 1);

    engine.render()?;
    assert_eq!(engine.renderer().frames_rendered, 2);
    Ok(())
}

#[test]
fn new_engine_defaults_to_window_around_now() {
    let options = TimelineOptions::new(Viewport::new(800, 300));
    let before = Utc::now();
    let engine = TimelineEngine::new(NullRenderer::default(), FixedMetrics::default(), options)
        .expect("engine init");
    let after = Utc::now();

    let range = engine.visible_range();
    assert_eq!(range.duration_ms(), TimeDelta::days(5).num_milliseconds());
    assert!(range.start() >= before - TimeDelta::days(1) - TimeDelta::milliseconds(1));
    assert!(range.start() <= after - TimeDelta::days(1));
    assert_eq!(engine.renderer().frames_rendered, 0);
}

#[test]
fn ids_are_stable_and_never_reused() {
    let mut engine = TimelineEngine::new(NullRenderer::default(), FixedMetrics::default(), options())
        .expect("engine init");
    engine
        .draw(
            vec![Event::point(at(9, 0), "a"), Event::point(at(10, 0), "b")],
            options(),
        )
        .expect("draw");

    let ids: Vec<EventId> = engine.events().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![EventId::new(0), EventId::new(1)]);

    engine.remove_event(ids[0]).expect("remove");
    let added = engine
        .append_event(Event::point(at(11, 0), "c"))
        .expect("append");
    assert_eq!(added, EventId::new(2));
    assert_eq!(engine.event(ids[1]).map(|event| event.content.as_str()), Some("b"));
}

#[test]
fn set_events_keeps_range_and_clears_selection() {
    let mut engine = TimelineEngine::new(NullRenderer::default(), FixedMetrics::default(), options())
        .expect("engine init");
    engine
        .draw(vec![Event::point(at(9, 0), "a")], options())
        .expect("draw");
    let id = engine.events().next().map(|(id, _)| id).expect("one event");
    engine.set_selection(Some(id)).expect("select");

    engine
        .set_events(vec![Event::point(at(20, 0), "z")])
        .expect("set events");

    assert_eq!(engine.selection(), None);
    assert_eq!(engine.visible_range().start(), at(8, 0));
    assert_eq!(engine.event_count(), 1);
}

#[test]
fn invalid_options_are_rejected() {
    let zero = TimelineOptions::new(Viewport::new(0, 300));
    let err = TimelineEngine::new(NullRenderer::default(), FixedMetrics::default(), zero)
        .err()
        .expect("zero width");
    assert!(matches!(err, TimelineError::InvalidViewport { .. }));

    let inverted = TimelineOptions::new(Viewport::new(800, 300)).with_range(at(12, 0), at(10, 0));
    let err = TimelineEngine::new(NullRenderer::default(), FixedMetrics::default(), inverted)
        .err()
        .expect("inverted range");
    assert!(matches!(err, TimelineError::InvalidRange { .. }));

    let negative_margin = options().with_event_margins(-1.0, 20.0);
    assert!(
        TimelineEngine::new(NullRenderer::default(), FixedMetrics::default(), negative_margin)
            .is_err()
    );
}

#[test]
fn set_viewport_rescales_the_mapper() {
    let mut engine = TimelineEngine::new(NullRenderer::default(), FixedMetrics::default(), options())
        .expect("engine init");
    engine
        .set_viewport(Viewport::new(480, 300))
        .expect("set viewport");
    assert_eq!(engine.mapper().pixel_width(), 480);
    assert!(engine.set_viewport(Viewport::new(480, 0)).is_err());
}

#[test]
fn into_renderer_returns_backend() {
    let mut engine = TimelineEngine::new(NullRenderer::default(), FixedMetrics::default(), options())
        .expect("engine init");
    engine.redraw().expect("redraw");
    let renderer = engine.into_renderer();
    assert_eq!(renderer.frames_rendered, 1);
}
