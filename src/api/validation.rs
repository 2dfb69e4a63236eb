use crate::error::{TimelineError, TimelineResult};

use super::TimelineOptions;

const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

pub(super) fn validate_options(options: &TimelineOptions) -> TimelineResult<()> {
    if !options.viewport.is_valid() {
        return Err(TimelineError::InvalidViewport {
            width: options.viewport.width,
            height: options.viewport.height,
        });
    }

    for (value, name) in [
        (options.event_margin_px, "event_margin_px"),
        (options.event_margin_axis_px, "event_margin_axis_px"),
        (options.drag_area_width_px, "drag_area_width_px"),
        (options.overscan_screens, "overscan_screens"),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(TimelineError::InvalidData(format!(
                "option `{name}` must be finite and >= 0"
            )));
        }
    }

    if let Some(width) = options.groups_width_px {
        if !width.is_finite() || width < 0.0 || width >= f64::from(options.viewport.width) {
            return Err(TimelineError::InvalidData(
                "groups width must be finite, >= 0 and narrower than the viewport".to_owned(),
            ));
        }
    }

    if options.zoom_min_ms <= 0 || options.zoom_max_ms <= 0 {
        return Err(TimelineError::InvalidData(
            "zoom limits must be > 0".to_owned(),
        ));
    }

    if let Some(scale) = options.scale {
        if scale.step == 0 {
            return Err(TimelineError::InvalidData(
                "pinned scale step must be > 0".to_owned(),
            ));
        }
    }

    if !(-MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&options.utc_offset_minutes) {
        return Err(TimelineError::InvalidData(
            "utc offset must be between -840 and 840 minutes".to_owned(),
        ));
    }

    if let (Some(start), Some(end)) = (options.start, options.end) {
        if end < start {
            return Err(TimelineError::InvalidRange {
                start: start.timestamp_millis() as f64,
                end: end.timestamp_millis() as f64,
            });
        }
    }

    Ok(())
}

pub(super) fn validate_pointer(x: f64, y: f64) -> TimelineResult<()> {
    if !x.is_finite() || !y.is_finite() {
        return Err(TimelineError::InvalidData(
            "pointer coordinates must be finite".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_options;
    use crate::api::TimelineOptions;
    use crate::core::Viewport;
    use crate::error::TimelineError;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_options(&TimelineOptions::default()).is_ok());
    }

    #[test]
    fn negative_margin_is_rejected() {
        let options = TimelineOptions {
            event_margin_px: -1.0,
            ..TimelineOptions::default()
        };
        assert!(matches!(
            validate_options(&options),
            Err(TimelineError::InvalidData(_))
        ));
    }

    #[test]
    fn empty_viewport_is_rejected() {
        let options = TimelineOptions::new(Viewport::new(0, 200));
        assert!(matches!(
            validate_options(&options),
            Err(TimelineError::InvalidViewport { .. })
        ));
    }
}
