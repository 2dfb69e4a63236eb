use crate::core::VisibleRange;
use crate::error::{TimelineError, TimelineResult};

/// Linear mapping between content-area pixels and epoch milliseconds.
///
/// The mapper remembers the pixel width it was configured for so callers can
/// detect a resize that happened behind its back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    factor: f64,
    offset: f64,
    pixel_width: u32,
}

impl CoordinateMapper {
    pub fn new(range: VisibleRange, pixel_width: u32) -> TimelineResult<Self> {
        let mut mapper = Self {
            factor: 1.0,
            offset: 0.0,
            pixel_width: 0,
        };
        mapper.configure(range, pixel_width)?;
        Ok(mapper)
    }

    /// Recomputes `factor = width / duration` and `offset = start`.
    pub fn configure(&mut self, range: VisibleRange, pixel_width: u32) -> TimelineResult<()> {
        if pixel_width == 0 {
            return Err(TimelineError::InvalidViewport {
                width: pixel_width,
                height: 0,
            });
        }

        let duration = range.duration_ms() as f64;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TimelineError::InvalidRange {
                start: range.start_ms() as f64,
                end: range.end_ms() as f64,
            });
        }

        self.factor = f64::from(pixel_width) / duration;
        self.offset = range.start_ms() as f64;
        self.pixel_width = pixel_width;
        Ok(())
    }

    #[must_use]
    pub fn factor(self) -> f64 {
        self.factor
    }

    #[must_use]
    pub fn offset(self) -> f64 {
        self.offset
    }

    #[must_use]
    pub fn pixel_width(self) -> u32 {
        self.pixel_width
    }

    #[must_use]
    pub fn time_to_screen(self, time_ms: f64) -> f64 {
        (time_ms - self.offset) * self.factor
    }

    #[must_use]
    pub fn screen_to_time(self, x: f64) -> f64 {
        x / self.factor + self.offset
    }

    /// Converts a pixel distance into a time distance.
    #[must_use]
    pub fn pixels_to_duration(self, dx: f64) -> f64 {
        dx / self.factor
    }

    /// Fails with `ViewportStale` when `actual_width` differs from the configured width.
    pub fn ensure_fresh(self, actual_width: u32) -> TimelineResult<()> {
        if actual_width != self.pixel_width {
            return Err(TimelineError::ViewportStale {
                cached: self.pixel_width,
                actual: actual_width,
            });
        }
        Ok(())
    }
}
