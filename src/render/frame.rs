use std::ops::Range;

use crate::core::Viewport;
use crate::error::{TimelineError, TimelineResult};
use crate::render::{LinePrimitive, RectPrimitive, TextPrimitive};

/// Draw layers of a timeline frame, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameLayer {
    /// Group band fills, separators and the group label column.
    Groups,
    /// Grid lines, tick marks, minor/major labels and the baseline.
    Axis,
    /// Event boxes, point connectors and dots, event content.
    Events,
    /// Current and custom time lines.
    TimeMarkers,
}

/// Where one layer starts in each primitive list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerStart {
    pub layer: FrameLayer,
    pub line: usize,
    pub rect: usize,
    pub text: usize,
}

/// Primitives of one timeline draw pass.
///
/// Each list is appended in layer order; `layers` records the offsets at which
/// every layer begins so a backend can interleave lists per layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
    pub layers: Vec<LayerStart>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Starts `layer` at the current end of every primitive list.
    pub fn begin_layer(&mut self, layer: FrameLayer) {
        self.layers.push(LayerStart {
            layer,
            line: self.lines.len(),
            rect: self.rects.len(),
            text: self.texts.len(),
        });
    }

    /// Index ranges of `layer` in `lines`, `rects` and `texts`.
    #[must_use]
    pub fn layer_ranges(
        &self,
        layer: FrameLayer,
    ) -> Option<(Range<usize>, Range<usize>, Range<usize>)> {
        let position = self.layers.iter().position(|start| start.layer == layer)?;
        let start = self.layers[position];
        let (line_end, rect_end, text_end) = match self.layers.get(position + 1) {
            Some(next) => (next.line, next.rect, next.text),
            None => (self.lines.len(), self.rects.len(), self.texts.len()),
        };
        Some((
            start.line..line_end,
            start.rect..rect_end,
            start.text..text_end,
        ))
    }

    #[must_use]
    pub fn layer_rects(&self, layer: FrameLayer) -> &[RectPrimitive] {
        self.layer_ranges(layer)
            .map_or(&[][..], |(_, rects, _)| &self.rects[rects])
    }

    #[must_use]
    pub fn layer_lines(&self, layer: FrameLayer) -> &[LinePrimitive] {
        self.layer_ranges(layer)
            .map_or(&[][..], |(lines, _, _)| &self.lines[lines])
    }

    #[must_use]
    pub fn layer_texts(&self, layer: FrameLayer) -> &[TextPrimitive] {
        self.layer_ranges(layer)
            .map_or(&[][..], |(_, _, texts)| &self.texts[texts])
    }

    pub fn validate(&self) -> TimelineResult<()> {
        if !self.viewport.is_valid() {
            return Err(TimelineError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        let mut previous: Option<LayerStart> = None;
        for start in &self.layers {
            let ordered = previous.is_none_or(|prev| {
                prev.layer < start.layer
                    && prev.line <= start.line
                    && prev.rect <= start.rect
                    && prev.text <= start.text
            });
            if !ordered
                || start.line > self.lines.len()
                || start.rect > self.rects.len()
                || start.text > self.texts.len()
            {
                return Err(TimelineError::InvalidData(format!(
                    "frame layer {:?} is out of order",
                    start.layer
                )));
            }
            previous = Some(*start);
        }

        for line in &self.lines {
            line.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rects.is_empty() && self.texts.is_empty()
    }
}
