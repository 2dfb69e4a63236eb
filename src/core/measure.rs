use serde::{Deserialize, Serialize};

use crate::core::Viewport;

/// What a piece of text is used for; hosts may measure each with a different font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextRole {
    AxisMinor,
    AxisMajor,
    EventContent,
    GroupLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
}

impl TextSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Host-provided geometry reads.
///
/// Layout queries this instead of a rendering surface, which keeps stacking
/// and axis sizing testable headless.
pub trait MeasurementProvider {
    fn measure_text(&self, text: &str, role: TextRole) -> TextSize;

    /// Size of one character cell; the axis derives its minimum step from it.
    fn character_size(&self, role: TextRole) -> TextSize {
        self.measure_text("0", role)
    }

    /// Frame size as currently laid out by the host, when it can tell.
    fn frame_size(&self) -> Option<Viewport> {
        None
    }
}

/// Monospace metrics: every character has the same cell size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedMetrics {
    pub char_width_px: f64,
    pub char_height_px: f64,
    pub major_char_width_px: f64,
    pub major_char_height_px: f64,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            char_width_px: 7.0,
            char_height_px: 14.0,
            major_char_width_px: 8.0,
            major_char_height_px: 16.0,
        }
    }
}

impl MeasurementProvider for FixedMetrics {
    fn measure_text(&self, text: &str, role: TextRole) -> TextSize {
        let (char_width, char_height) = match role {
            TextRole::AxisMajor => (self.major_char_width_px, self.major_char_height_px),
            TextRole::AxisMinor | TextRole::EventContent | TextRole::GroupLabel => {
                (self.char_width_px, self.char_height_px)
            }
        };
        TextSize::new(text.chars().count() as f64 * char_width, char_height)
    }
}

#[cfg(test)]
mod tests {
    use super::{FixedMetrics, MeasurementProvider, TextRole};

    #[test]
    fn fixed_metrics_scale_with_char_count() {
        let metrics = FixedMetrics::default();
        let size = metrics.measure_text("abcd", TextRole::EventContent);
        assert_eq!(size.width, 28.0);
        assert_eq!(size.height, 14.0);
        assert_eq!(metrics.character_size(TextRole::AxisMajor).width, 8.0);
    }
}
