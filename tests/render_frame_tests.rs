use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use timeline_rs::api::{TimelineEngine, TimelineOptions};
use timeline_rs::core::{Event, EventId, FixedMetrics, TextRole, Timestamp, Viewport};
use timeline_rs::render::{FrameLayer, NullRenderer, RenderFrame};

fn at(hour: u32, minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn options() -> TimelineOptions {
    TimelineOptions::new(Viewport::new(960, 300))
        .with_range(at(8, 0), at(16, 0))
        .with_animate(false)
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

fn last_frame(engine: &TimelineEngine<NullRenderer>) -> &RenderFrame {
    engine
        .renderer()
        .last_frame
        .as_ref()
        .expect("a frame was rendered")
}

#[test]
fn draw_renders_exactly_one_frame() {
    let engine = engine_with(vec![Event::point(at(10, 0), "P")], options());
    assert_eq!(engine.renderer().frames_rendered, 1);
    assert!(!last_frame(&engine).is_empty());
}

#[test]
fn redraw_without_changes_is_idempotent() {
    let mut engine = engine_with(
        vec![
            Event::range(at(10, 0), at(11, 0), "A"),
            Event::range(at(10, 30), at(11, 30), "B"),
            Event::point(at(13, 0), "C"),
        ],
        options(),
    );
    let layout = engine.layout().clone();
    let frame = last_frame(&engine).clone();

    engine.redraw().expect("redraw");

    assert_eq!(engine.layout(), &layout);
    assert_eq!(last_frame(&engine), &frame);
    assert_eq!(engine.renderer().frames_rendered, 2);
}

#[test]
fn box_point_draws_box_connector_and_axis_dot() {
    let engine = engine_with(vec![Event::point(at(10, 0), "P")], options());
    let frame = last_frame(&engine);

    let event_box = frame
        .rects
        .iter()
        .find(|rect| (rect.x - 231.5).abs() < 1e-6 && (rect.y - 212.0).abs() < 1e-6)
        .expect("event box");
    assert_relative_eq!(event_box.width, 17.0);
    assert_relative_eq!(event_box.height, 24.0);
    assert!(event_box.border.is_some());

    let connector = frame
        .lines
        .iter()
        .find(|line| (line.x1 - 240.0).abs() < 1e-6 && (line.y1 - 236.0).abs() < 1e-6)
        .expect("connector line");
    assert_relative_eq!(connector.y2, 261.0);

    assert!(
        frame
            .rects
            .iter()
            .any(|rect| (rect.x - 236.0).abs() < 1e-6 && (rect.y - 257.0).abs() < 1e-6)
    );

    let label = frame
        .texts
        .iter()
        .find(|text| text.role == TextRole::EventContent)
        .expect("event label");
    assert_eq!(label.text, "P");
    assert_relative_eq!(label.x, 236.5, epsilon = 1e-6);
}

#[test]
fn selection_changes_event_fill() {
    let mut engine = engine_with(vec![Event::range(at(10, 0), at(12, 0), "R")], options());
    let id = first_id(&engine);
    let find_fill = |frame: &RenderFrame| {
        frame
            .rects
            .iter()
            .find(|rect| (rect.x - 240.0).abs() < 1e-6 && (rect.width - 240.0).abs() < 1e-6)
            .map(|rect| rect.fill)
            .expect("range rect")
    };
    let unselected = find_fill(last_frame(&engine));

    engine.set_selection(Some(id)).expect("select");
    engine.render().expect("render");

    assert_ne!(find_fill(last_frame(&engine)), unselected);
}

#[test]
fn axis_labels_and_baseline_are_drawn() {
    let engine = engine_with(Vec::new(), options());
    let frame = last_frame(&engine);

    assert!(
        frame
            .texts
            .iter()
            .any(|text| text.role == TextRole::AxisMinor && text.text == "10:00")
    );
    assert!(
        frame
            .texts
            .iter()
            .any(|text| text.role == TextRole::AxisMajor && text.text == "4 March 2024")
    );
    assert!(frame.lines.iter().any(|line| {
        (line.y1 - 261.0).abs() < 1e-9
            && (line.y2 - 261.0).abs() < 1e-9
            && (line.x2 - line.x1 - 960.0).abs() < 1e-9
    }));
}

#[test]
fn hidden_major_labels_shrink_axis() {
    let options = TimelineOptions {
        show_major_labels: false,
        ..options()
    };
    let engine = engine_with(vec![Event::point(at(10, 0), "P")], options);
    let frame = last_frame(&engine);

    assert!(frame.texts.iter().all(|text| text.role != TextRole::AxisMajor));
    // Axis is one label row plus two paddings, 20 px tall.
    let id = first_id(&engine);
    let geometry = engine.event_geometry(id).expect("displayed");
    assert_relative_eq!(geometry.top, 280.0 - 24.0 - 20.0 - 5.0);
}

#[test]
fn group_labels_are_drawn_in_label_column() {
    let engine = engine_with(
        vec![
            Event::range(at(10, 0), at(11, 0), "A").with_group("Team A"),
            Event::range(at(10, 0), at(11, 0), "B").with_group("Team B"),
        ],
        options(),
    );
    let frame = last_frame(&engine);

    let labels: Vec<&str> = frame
        .texts
        .iter()
        .filter(|text| text.role == TextRole::GroupLabel)
        .map(|text| text.text.as_str())
        .collect();
    assert_eq!(labels, vec!["Team A", "Team B"]);
    assert!(
        frame
            .texts
            .iter()
            .filter(|text| text.role == TextRole::GroupLabel)
            .all(|text| (text.x - 5.0).abs() < 1e-9)
    );
}

#[test]
fn current_and_custom_time_markers_are_drawn_inside_window() {
    let options = TimelineOptions {
        show_custom_time: true,
        ..options()
    };
    let mut engine = engine_with(Vec::new(), options);
    engine.set_current_time(at(10, 0));
    engine.set_custom_time(at(12, 0));
    engine.render().expect("render");

    let markers: Vec<f64> = last_frame(&engine)
        .lines
        .iter()
        .filter(|line| (line.stroke_width - 2.0).abs() < f64::EPSILON)
        .map(|line| line.x1)
        .collect();
    assert_eq!(markers.len(), 2);
    assert_relative_eq!(markers[0], 240.0, epsilon = 1e-6);
    assert_relative_eq!(markers[1], 480.0, epsilon = 1e-6);

    engine.set_custom_time(at(20, 0));
    engine.render().expect("render");
    let marker_count = last_frame(&engine)
        .lines
        .iter()
        .filter(|line| (line.stroke_width - 2.0).abs() < f64::EPSILON)
        .count();
    assert_eq!(marker_count, 1);
}

#[test]
fn empty_content_draws_no_label() {
    let engine = engine_with(vec![Event::range(at(10, 0), at(11, 0), "")], options());
    let frame = last_frame(&engine);
    assert!(frame.texts.iter().all(|text| text.role != TextRole::EventContent));
}

#[test]
fn frame_layers_run_from_groups_to_time_markers() {
    let options = TimelineOptions {
        show_custom_time: true,
        ..options()
    };
    let mut engine = engine_with(
        vec![Event::range(at(10, 0), at(11, 0), "A").with_group("ops")],
        options,
    );
    engine.set_custom_time(at(12, 0));
    engine.render().expect("render");
    let frame = last_frame(&engine);

    let layers: Vec<FrameLayer> = frame.layers.iter().map(|start| start.layer).collect();
    assert_eq!(
        layers,
        vec![
            FrameLayer::Groups,
            FrameLayer::Axis,
            FrameLayer::Events,
            FrameLayer::TimeMarkers
        ]
    );

    let bands = frame.layer_rects(FrameLayer::Groups);
    assert_eq!(bands.len(), 1);
    assert_relative_eq!(bands[0].width, 960.0);

    let events = frame.layer_rects(FrameLayer::Events);
    assert_eq!(events.len(), 1);
    assert!(events[0].border.is_some());
    assert!(
        frame
            .layer_texts(FrameLayer::Events)
            .iter()
            .all(|text| text.role == TextRole::EventContent)
    );
    assert!(
        frame
            .layer_texts(FrameLayer::Axis)
            .iter()
            .all(|text| matches!(text.role, TextRole::AxisMinor | TextRole::AxisMajor))
    );

    let markers = frame.layer_lines(FrameLayer::TimeMarkers);
    assert_eq!(markers.len(), 1);
    assert_relative_eq!(markers[0].stroke_width, 2.0);
}
