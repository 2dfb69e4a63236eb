use crate::core::primitives::datetime_to_millis;
use crate::core::{EventKind, EventLayout, LaidOutEvent, TextRole, Timestamp};
use crate::error::TimelineResult;
use crate::render::{
    Color, FrameLayer, LinePrimitive, RectPrimitive, RenderFrame, Renderer, TextHAlign,
    TextPrimitive,
};

use super::TimelineEngine;
use super::axis_builder::{AXIS_LABEL_PADDING_PX, AxisTick};
use super::layout_pass::GROUP_LABEL_PADDING_PX;

const TEXT_COLOR: Color = Color::rgb(0.30, 0.30, 0.30);
const AXIS_COLOR: Color = Color::rgb(0.75, 0.75, 0.75);
const MINOR_GRID_COLOR: Color = Color::rgb(0.93, 0.93, 0.93);
const MAJOR_GRID_COLOR: Color = Color::rgb(0.80, 0.80, 0.80);
const GROUP_BAND_FILL: Color = Color::rgba(0.96, 0.96, 0.96, 1.0);
const GROUP_BORDER_COLOR: Color = Color::rgb(0.85, 0.85, 0.85);
const EVENT_FILL: Color = Color::rgb(0.84, 0.87, 0.96);
const EVENT_BORDER: Color = Color::rgb(0.59, 0.69, 0.97);
const SELECTED_FILL: Color = Color::rgb(1.0, 0.97, 0.52);
const SELECTED_BORDER: Color = Color::rgb(1.0, 0.76, 0.0);
const CURRENT_TIME_COLOR: Color = Color::rgb(1.0, 0.50, 0.43);
const CUSTOM_TIME_COLOR: Color = Color::rgb(0.43, 0.58, 1.0);
const LINE_WIDTH: f64 = 1.0;
const MARKER_LINE_WIDTH: f64 = 2.0;

impl<R: Renderer> TimelineEngine<R> {
    /// Materializes the displayed state into draw commands.
    pub fn build_render_frame(&self) -> TimelineResult<RenderFrame> {
        let mut frame = RenderFrame::new(self.viewport);
        let content_left = self.content_left();

        frame.begin_layer(FrameLayer::Groups);
        self.push_group_bands(&mut frame, content_left);
        frame.begin_layer(FrameLayer::Axis);
        self.push_axis(&mut frame, content_left);
        frame.begin_layer(FrameLayer::Events);
        for geometry in self.animator.displayed() {
            self.push_event(&mut frame, geometry, content_left);
        }
        frame.begin_layer(FrameLayer::TimeMarkers);
        if self.options.show_current_time {
            self.push_time_marker(&mut frame, self.current_time, CURRENT_TIME_COLOR, content_left);
        }
        if self.options.show_custom_time {
            self.push_time_marker(&mut frame, self.custom_time, CUSTOM_TIME_COLOR, content_left);
        }

        frame.validate()?;
        Ok(frame)
    }

    fn push_group_bands(&self, frame: &mut RenderFrame, content_left: f64) {
        if self.layout.groups.is_empty() {
            return;
        }
        let frame_width = f64::from(self.viewport.width);
        let column_width = self.groups_column_width();
        let label_x = if self.options.groups_on_right {
            frame_width - column_width + GROUP_LABEL_PADDING_PX
        } else {
            GROUP_LABEL_PADDING_PX
        };
        let column_edge = if self.options.groups_on_right {
            frame_width - column_width
        } else {
            content_left
        };

        for band in &self.layout.groups {
            frame.rects.push(RectPrimitive::new(
                0.0,
                band.top,
                frame_width,
                band.height,
                GROUP_BAND_FILL,
            ));
            frame.lines.push(LinePrimitive::new(
                0.0,
                band.bottom,
                frame_width,
                band.bottom,
                LINE_WIDTH,
                GROUP_BORDER_COLOR,
            ));
            if let Some(key) = band.key.as_deref().filter(|key| !key.is_empty()) {
                frame.texts.push(TextPrimitive::new(
                    key,
                    label_x,
                    band.top + GROUP_LABEL_PADDING_PX,
                    TextRole::GroupLabel,
                    TEXT_COLOR,
                    TextHAlign::Left,
                ));
            }
        }
        frame.lines.push(LinePrimitive::vertical(
            column_edge,
            0.0,
            f64::from(self.viewport.height),
            LINE_WIDTH,
            GROUP_BORDER_COLOR,
        ));
    }

    fn push_axis(&self, frame: &mut RenderFrame, content_left: f64) {
        let axis = self.axis_placement();
        let content_width = f64::from(self.mapper.pixel_width());
        let frame_height = f64::from(self.viewport.height);
        let minor_height = self.measure.character_size(TextRole::AxisMinor).height;

        let (baseline, grid_top, grid_bottom) = if self.options.axis_on_top {
            let bottom = axis.top + axis.height;
            (bottom, bottom, frame_height)
        } else {
            (axis.top, 0.0, axis.top)
        };
        let minor_label_y = axis.top + AXIS_LABEL_PADDING_PX;
        let major_label_y = minor_label_y + minor_height + AXIS_LABEL_PADDING_PX;

        let visible: Vec<(f64, &AxisTick)> = self
            .axis
            .ticks()
            .iter()
            .map(|tick| (self.x_of(tick.time), tick))
            .collect();

        for (x, tick) in visible
            .iter()
            .filter(|(x, _)| (0.0..=content_width).contains(x))
        {
            let frame_x = content_left + x;
            let grid_color = if tick.is_major {
                MAJOR_GRID_COLOR
            } else {
                MINOR_GRID_COLOR
            };
            frame.lines.push(LinePrimitive::vertical(
                frame_x,
                grid_top,
                grid_bottom,
                LINE_WIDTH,
                grid_color,
            ));
            frame.lines.push(LinePrimitive::vertical(
                frame_x,
                axis.top,
                axis.top + minor_height,
                LINE_WIDTH,
                AXIS_COLOR,
            ));
            if !tick.minor_label.is_empty() {
                frame.texts.push(TextPrimitive::new(
                    tick.minor_label.as_str(),
                    frame_x + AXIS_LABEL_PADDING_PX,
                    minor_label_y,
                    TextRole::AxisMinor,
                    TEXT_COLOR,
                    TextHAlign::Left,
                ));
            }
        }

        if self.options.show_major_labels {
            // The label of the period under the left edge stays pinned there.
            let leading = visible
                .iter()
                .take_while(|(x, _)| *x <= 0.0)
                .last()
                .map(|(_, tick)| tick.major_label.as_str())
                .filter(|label| !label.is_empty());
            let mut reserved_until = 0.0;
            if let Some(label) = leading {
                reserved_until = self.measure.measure_text(label, TextRole::AxisMajor).width
                    + 2.0 * AXIS_LABEL_PADDING_PX;
                frame.texts.push(TextPrimitive::new(
                    label,
                    content_left + AXIS_LABEL_PADDING_PX,
                    major_label_y,
                    TextRole::AxisMajor,
                    TEXT_COLOR,
                    TextHAlign::Left,
                ));
            }
            for (x, tick) in visible.iter().filter(|(x, tick)| {
                tick.is_major && *x > reserved_until && *x <= content_width
            }) {
                if tick.major_label.is_empty() {
                    continue;
                }
                frame.texts.push(TextPrimitive::new(
                    tick.major_label.as_str(),
                    content_left + x + AXIS_LABEL_PADDING_PX,
                    major_label_y,
                    TextRole::AxisMajor,
                    TEXT_COLOR,
                    TextHAlign::Left,
                ));
            }
        }

        frame.lines.push(LinePrimitive::new(
            content_left,
            baseline,
            content_left + content_width,
            baseline,
            LINE_WIDTH,
            AXIS_COLOR,
        ));
    }

    fn push_event(&self, frame: &mut RenderFrame, geometry: LaidOutEvent, content_left: f64) {
        let Some(event) = self.store.get(geometry.id) else {
            return;
        };
        let selected = self.selection == Some(geometry.id);
        let (fill, border) = if selected {
            (SELECTED_FILL, SELECTED_BORDER)
        } else {
            (EVENT_FILL, EVENT_BORDER)
        };
        let config = self.options.layout_config();
        let padding = config.content_padding_px;
        let left = content_left + geometry.left;
        let axis = self.axis_placement();
        let axis_edge = if self.options.axis_on_top {
            axis.top + axis.height
        } else {
            axis.top
        };

        let text_x = match (geometry.kind, self.options.layout) {
            (EventKind::Point, EventLayout::Dot) => {
                let radius = config.dot_radius_px;
                let centre_y = geometry.top + geometry.height / 2.0;
                frame.rects.push(
                    RectPrimitive::new(left, centre_y - radius, 2.0 * radius, 2.0 * radius, border)
                        .with_border(border),
                );
                left + 2.0 * radius + padding
            }
            (EventKind::Point, EventLayout::Box) => {
                let centre_x = left + geometry.width / 2.0;
                let (line_from, line_to) = if self.options.axis_on_top {
                    (axis_edge, geometry.top)
                } else {
                    (geometry.bottom(), axis_edge)
                };
                frame.lines.push(LinePrimitive::vertical(
                    centre_x,
                    line_from,
                    line_to,
                    LINE_WIDTH,
                    border,
                ));
                frame.rects.push(
                    RectPrimitive::new(left, geometry.top, geometry.width, geometry.height, fill)
                        .with_border(border),
                );
                let radius = config.dot_radius_px;
                frame.rects.push(RectPrimitive::new(
                    centre_x - radius,
                    axis_edge - radius,
                    2.0 * radius,
                    2.0 * radius,
                    border,
                ));
                left + padding
            }
            (EventKind::Range, _) => {
                frame.rects.push(
                    RectPrimitive::new(left, geometry.top, geometry.width, geometry.height, fill)
                        .with_border(border),
                );
                left + padding
            }
        };

        if !event.content.is_empty() {
            frame.texts.push(TextPrimitive::new(
                event.content.as_str(),
                text_x,
                geometry.top + padding,
                TextRole::EventContent,
                TEXT_COLOR,
                TextHAlign::Left,
            ));
        }
    }

    fn push_time_marker(
        &self,
        frame: &mut RenderFrame,
        time: Timestamp,
        color: Color,
        content_left: f64,
    ) {
        let x = self.x_of(time);
        if !(0.0..=f64::from(self.mapper.pixel_width())).contains(&x) {
            return;
        }
        frame.lines.push(LinePrimitive::vertical(
            content_left + x,
            0.0,
            f64::from(self.viewport.height),
            MARKER_LINE_WIDTH,
            color,
        ));
    }

    /// Content-area x of `time`.
    fn x_of(&self, time: Timestamp) -> f64 {
        self.mapper.time_to_screen(datetime_to_millis(time) as f64)
    }
}
