use serde::{Deserialize, Serialize};

use crate::core::Timestamp;
use crate::core::primitives::{MILLIS_PER_DAY, datetime_to_millis, millis_to_datetime};
use crate::error::{TimelineError, TimelineResult};

/// Span added to `end` when a range collapses to `end <= start`.
pub const EMPTY_RANGE_EXTENSION_MS: i64 = 20 * MILLIS_PER_DAY;
/// Smallest span the visible range may zoom into.
pub const MIN_ZOOM_INTERVAL_MS: i64 = 10;
/// Largest span the visible range may zoom out to (10000 years).
pub const MAX_ZOOM_INTERVAL_MS: i64 = 10_000 * 365 * MILLIS_PER_DAY;
/// Width of the fallback window used by `min >= max` bounds.
const BOUNDS_FALLBACK_SPAN_MS: i64 = MILLIS_PER_DAY;

/// Visible time window of the timeline. `end > start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    start: Timestamp,
    end: Timestamp,
}

impl VisibleRange {
    /// Builds a range, extending `end` by 20 days when it does not exceed `start`.
    pub fn new(start: Timestamp, end: Timestamp) -> TimelineResult<Self> {
        Self::from_millis(datetime_to_millis(start), datetime_to_millis(end))
    }

    pub fn from_millis(start_ms: i64, end_ms: i64) -> TimelineResult<Self> {
        let end_ms = if end_ms <= start_ms {
            start_ms.saturating_add(EMPTY_RANGE_EXTENSION_MS)
        } else {
            end_ms
        };
        Ok(Self {
            start: millis_to_datetime(start_ms)?,
            end: millis_to_datetime(end_ms)?,
        })
    }

    #[must_use]
    pub fn start(self) -> Timestamp {
        self.start
    }

    #[must_use]
    pub fn end(self) -> Timestamp {
        self.end
    }

    #[must_use]
    pub fn start_ms(self) -> i64 {
        datetime_to_millis(self.start)
    }

    #[must_use]
    pub fn end_ms(self) -> i64 {
        datetime_to_millis(self.end)
    }

    #[must_use]
    pub fn duration_ms(self) -> i64 {
        self.end_ms() - self.start_ms()
    }

    #[must_use]
    pub fn center_ms(self) -> i64 {
        self.start_ms() + self.duration_ms() / 2
    }

    /// Returns the window widened by `margin_ms` on both sides.
    #[must_use]
    pub fn expanded_millis(self, margin_ms: i64) -> (i64, i64) {
        (
            self.start_ms().saturating_sub(margin_ms),
            self.end_ms().saturating_add(margin_ms),
        )
    }
}

/// Zoom and bound constraints applied to every range mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeLimits {
    pub zoom_min_ms: i64,
    pub zoom_max_ms: i64,
    pub min_ms: Option<i64>,
    pub max_ms: Option<i64>,
}

impl Default for RangeLimits {
    fn default() -> Self {
        Self {
            zoom_min_ms: MIN_ZOOM_INTERVAL_MS,
            zoom_max_ms: MAX_ZOOM_INTERVAL_MS,
            min_ms: None,
            max_ms: None,
        }
    }
}

impl RangeLimits {
    /// Effective `(zoom_min, zoom_max, min, max)` after hard floors and bound fitting.
    fn resolved(self) -> (i64, i64, Option<i64>, Option<i64>) {
        let mut zoom_min = self.zoom_min_ms.max(MIN_ZOOM_INTERVAL_MS);
        let mut zoom_max = self.zoom_max_ms.min(MAX_ZOOM_INTERVAL_MS);
        if zoom_max < zoom_min {
            zoom_max = zoom_min;
        }

        let mut max = self.max_ms;
        if let (Some(min), Some(max_value)) = (self.min_ms, self.max_ms) {
            let max_value = if min >= max_value {
                min + BOUNDS_FALLBACK_SPAN_MS
            } else {
                max_value
            };
            let bounded_span = max_value - min;
            zoom_max = zoom_max.min(bounded_span);
            zoom_min = zoom_min.min(bounded_span);
            max = Some(max_value);
        }

        (zoom_min, zoom_max, self.min_ms, max)
    }

    #[must_use]
    pub fn effective_zoom_min_ms(self) -> i64 {
        self.resolved().0
    }

    /// Clamps a candidate window to the limits.
    ///
    /// Order: empty interval, zoom-min expansion around `anchor_ms`, zoom-max
    /// contraction around `anchor_ms`, `min` bound, `max` bound.
    pub fn apply(
        self,
        start_ms: i64,
        end_ms: i64,
        anchor_ms: Option<i64>,
    ) -> TimelineResult<VisibleRange> {
        let (zoom_min, zoom_max, min, max) = self.resolved();

        let mut start = start_ms;
        let mut end = end_ms;
        if start >= end {
            end = start.saturating_add(EMPTY_RANGE_EXTENSION_MS);
        }

        let interval = end - start;
        let anchor_ratio = match anchor_ms {
            Some(anchor) => (anchor - start) as f64 / interval as f64,
            None => 0.5,
        };

        if interval < zoom_min {
            let diff = (zoom_min - interval) as f64;
            start -= (diff * anchor_ratio).round() as i64;
            end += (diff * (1.0 - anchor_ratio)).round() as i64;
        }

        if interval > zoom_max {
            let diff = (interval - zoom_max) as f64;
            start += (diff * anchor_ratio).round() as i64;
            end -= (diff * (1.0 - anchor_ratio)).round() as i64;
        }

        if let Some(min) = min {
            let diff = start - min;
            if diff < 0 {
                start -= diff;
                end -= diff;
            }
        }

        if let Some(max) = max {
            let diff = max - end;
            if diff < 0 {
                start += diff;
                end += diff;
            }
        }

        VisibleRange::from_millis(start, end)
    }
}

/// Computes the window produced by zooming `range` by `factor` around `anchor_ms`.
///
/// Positive factors zoom in, negative factors zoom out; factors are clamped to
/// `(-0.9, 0.9)` and negative ones are mapped through `f / (1 + f)` so that
/// zooming out by `f` undoes zooming in by the same magnitude. Returns `None`
/// when the zoomed span would fall under the minimum interval.
pub fn zoom_window(
    range: VisibleRange,
    factor: f64,
    anchor_ms: i64,
    limits: RangeLimits,
) -> TimelineResult<Option<VisibleRange>> {
    if !factor.is_finite() {
        return Err(TimelineError::InvalidData(
            "zoom factor must be finite".to_owned(),
        ));
    }

    let mut factor = factor.clamp(-0.9, 0.9);
    if factor < 0.0 {
        factor /= 1.0 + factor;
    }

    let start = range.start_ms() as f64;
    let end = range.end_ms() as f64;
    let anchor = anchor_ms as f64;
    let new_start = start - (start - anchor) * factor;
    let new_end = end - (end - anchor) * factor;

    if new_end - new_start < limits.effective_zoom_min_ms() as f64 {
        return Ok(None);
    }

    limits
        .apply(
            new_start.round() as i64,
            new_end.round() as i64,
            Some(anchor_ms),
        )
        .map(Some)
}

/// Shifts `range` by `factor` times its duration.
pub fn move_window(
    range: VisibleRange,
    factor: f64,
    limits: RangeLimits,
) -> TimelineResult<VisibleRange> {
    if !factor.is_finite() {
        return Err(TimelineError::InvalidData(
            "move factor must be finite".to_owned(),
        ));
    }
    let delta = (range.duration_ms() as f64 * factor).round() as i64;
    limits.apply(range.start_ms() + delta, range.end_ms() + delta, None)
}
