mod frame;
mod null_renderer;
mod primitives;

pub use frame::{FrameLayer, LayerStart, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};

use crate::error::TimelineResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code stays isolated from layout and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> TimelineResult<()>;
}
