use crate::error::TimelineResult;
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless engine usage.
///
/// It still validates frame content so tests catch invalid geometry before a
/// real backend sees it.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_line_count: usize,
    pub last_rect_count: usize,
    pub last_text_count: usize,
    pub last_frame: Option<RenderFrame>,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> TimelineResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_line_count = frame.lines.len();
        self.last_rect_count = frame.rects.len();
        self.last_text_count = frame.texts.len();
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
