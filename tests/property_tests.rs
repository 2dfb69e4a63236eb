use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use timeline_rs::core::layout::stack_items;
use timeline_rs::core::{
    CoordinateMapper, EventId, EventKind, LaidOutEvent, STEP_LADDER, VisibleRange, select_step,
};

fn boxed(id: u64, kind: EventKind, left: f64, width: f64) -> LaidOutEvent {
    LaidOutEvent {
        id: EventId::new(id),
        kind,
        left,
        top: 200.0,
        width,
        height: 24.0,
    }
}

proptest! {
    #[test]
    fn step_selection_is_monotonic(a in 0.0f64..1e13, b in 0.0f64..1e13) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(select_step(low).nominal_millis() <= select_step(high).nominal_millis());
    }

    #[test]
    fn selected_step_exceeds_minimum_unless_ladder_exhausted(minimum in 0.0f64..1e14) {
        let spec = select_step(minimum);
        let coarsest = STEP_LADDER[STEP_LADDER.len() - 1];
        prop_assert!(spec.nominal_millis() as f64 > minimum || spec == coarsest);
    }

    #[test]
    fn mapper_round_trip_stays_within_tolerance(
        start in -1_000_000_000_000i64..1_000_000_000_000,
        span in 10i64..1_000_000_000_000,
        width in 1u32..5_000,
        x in -5_000.0f64..5_000.0
    ) {
        let range = VisibleRange::from_millis(start, start + span).expect("range");
        let mapper = CoordinateMapper::new(range, width).expect("mapper");
        let time = mapper.screen_to_time(x);
        let back = mapper.time_to_screen(time);
        prop_assert!((back - x).abs() <= 0.1);
    }

    #[test]
    fn stacked_items_never_overlap(
        raw in prop::collection::vec((0u32..2_000, 0u32..400, any::<bool>()), 1..60),
        margin in 0u32..20
    ) {
        let margin = f64::from(margin);
        let mut items: Vec<LaidOutEvent> = raw
            .iter()
            .enumerate()
            .map(|(index, (left, width, is_range))| {
                let kind = if *is_range { EventKind::Range } else { EventKind::Point };
                boxed(index as u64, kind, f64::from(*left), f64::from(*width))
            })
            .collect();
        items.sort_by(timeline_rs::core::layout::stack_order);

        stack_items(&mut items, margin, false);

        for (i, a) in items.iter().enumerate() {
            for b in items.iter().skip(i + 1) {
                prop_assert!(!a.collides_with(b, margin), "{a:?} collides with {b:?}");
            }
        }
    }

    #[test]
    fn millis_round_trip_through_timestamps(millis in -8_000_000_000_000i64..8_000_000_000_000) {
        let time = Utc.timestamp_millis_opt(millis).single().expect("timestamp");
        prop_assert_eq!(timeline_rs::core::primitives::datetime_to_millis(time), millis);
    }
}
