use std::cmp::Ordering;

use indexmap::IndexSet;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::measure::{MeasurementProvider, TextRole};
use crate::core::{Event, EventId, EventKind};

/// How point events are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLayout {
    /// Box centred above the timestamp, connected to the axis by a line.
    Box,
    /// Dot on the timestamp with the content to its right.
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub layout: EventLayout,
    pub stack_events: bool,
    pub event_margin_px: f64,
    pub event_margin_axis_px: f64,
    pub axis_on_top: bool,
    pub content_padding_px: f64,
    pub dot_radius_px: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            layout: EventLayout::Box,
            stack_events: true,
            event_margin_px: 10.0,
            event_margin_axis_px: 20.0,
            axis_on_top: false,
            content_padding_px: 5.0,
            dot_radius_px: 4.0,
        }
    }
}

/// Vertical placement of the time axis inside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisPlacement {
    pub top: f64,
    pub height: f64,
}

/// One event handed to layout with its horizontal position already mapped.
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    pub id: EventId,
    pub event: &'a Event,
    pub x_start: f64,
    pub x_end: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaidOutEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl LaidOutEvent {
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Rectangle overlap with both rectangles grown by `margin`.
    #[must_use]
    pub fn collides_with(&self, other: &Self, margin: f64) -> bool {
        self.left - margin < other.right()
            && self.right() + margin > other.left
            && self.top - margin < other.bottom()
            && self.bottom() + margin > other.top
    }
}

/// Horizontal band shared by all events of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBand {
    /// `None` collects events without a group when other events have one.
    pub key: Option<String>,
    pub top: f64,
    pub height: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutOutput {
    pub events: Vec<LaidOutEvent>,
    pub groups: Vec<GroupBand>,
    /// Frame height needed to show every laid-out event and the axis.
    pub content_extent_px: f64,
}

impl LayoutOutput {
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&LaidOutEvent> {
        self.events.iter().find(|item| item.id == id)
    }
}

/// Converts mapped events into non-overlapping rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> LayoutConfig {
        self.config
    }

    /// Un-stacked rectangle of one event, anchored next to the axis.
    #[must_use]
    pub fn natural_geometry(
        &self,
        input: &LayoutInput<'_>,
        axis: AxisPlacement,
        measure: &dyn MeasurementProvider,
    ) -> LaidOutEvent {
        let config = self.config;
        let text = measure.measure_text(&input.event.content, TextRole::EventContent);
        let padding = config.content_padding_px;

        let (left, width, height) = match (input.event.kind(), input.x_end) {
            (EventKind::Range, Some(x_end)) => (
                input.x_start,
                (x_end - input.x_start).max(0.0),
                text.height + 2.0 * padding,
            ),
            _ => match config.layout {
                EventLayout::Box => {
                    let width = text.width + 2.0 * padding;
                    (input.x_start - width / 2.0, width, text.height + 2.0 * padding)
                }
                EventLayout::Dot => {
                    let radius = config.dot_radius_px;
                    (
                        input.x_start - radius,
                        2.0 * radius + padding + text.width,
                        (2.0 * radius).max(text.height),
                    )
                }
            },
        };

        let top = if config.axis_on_top {
            axis.top + axis.height + config.event_margin_axis_px + config.event_margin_px / 2.0
        } else {
            axis.top - height - config.event_margin_axis_px - config.event_margin_px / 2.0
        };

        LaidOutEvent {
            id: input.id,
            kind: input.event.kind(),
            left,
            top,
            width,
            height,
        }
    }

    /// Lays out `inputs`; groups are banded when `group_order` is non-empty.
    #[must_use]
    pub fn layout(
        &self,
        inputs: &[LayoutInput<'_>],
        group_order: &IndexSet<String>,
        axis: AxisPlacement,
        measure: &dyn MeasurementProvider,
    ) -> LayoutOutput {
        if inputs.is_empty() && group_order.is_empty() {
            return LayoutOutput {
                events: Vec::new(),
                groups: Vec::new(),
                content_extent_px: self.empty_extent(axis),
            };
        }

        if group_order.is_empty() {
            self.layout_stacked(inputs, axis, measure)
        } else {
            self.layout_grouped(inputs, group_order, axis, measure)
        }
    }

    fn layout_stacked(
        &self,
        inputs: &[LayoutInput<'_>],
        axis: AxisPlacement,
        measure: &dyn MeasurementProvider,
    ) -> LayoutOutput {
        let mut items: Vec<LaidOutEvent> = inputs
            .iter()
            .map(|input| self.natural_geometry(input, axis, measure))
            .collect();
        items.sort_by(stack_order);

        if self.config.stack_events {
            stack_items(&mut items, self.config.event_margin_px, self.config.axis_on_top);
        }

        let content_extent_px = self.stacked_extent(&items, axis);
        LayoutOutput {
            events: items,
            groups: Vec::new(),
            content_extent_px,
        }
    }

    fn layout_grouped(
        &self,
        inputs: &[LayoutInput<'_>],
        group_order: &IndexSet<String>,
        axis: AxisPlacement,
        measure: &dyn MeasurementProvider,
    ) -> LayoutOutput {
        let config = self.config;
        let has_ungrouped = inputs.iter().any(|input| {
            input
                .event
                .group
                .as_ref()
                .is_none_or(|key| !group_order.contains(key))
        });
        let band_count = group_order.len() + usize::from(has_ungrouped);
        let band_of = |group: Option<&String>| match group {
            Some(key) => group_order.get_index_of(key).unwrap_or(group_order.len()),
            None => group_order.len(),
        };

        let mut items: Vec<(usize, LaidOutEvent)> = inputs
            .iter()
            .map(|input| {
                (
                    band_of(input.event.group.as_ref()),
                    self.natural_geometry(input, axis, measure),
                )
            })
            .collect();

        let mut tallest = vec![0.0_f64; band_count.max(1)];
        for (band, item) in &items {
            if let Some(value) = tallest.get_mut(*band) {
                *value = value.max(item.height);
            }
        }

        let mut cursor = if config.axis_on_top {
            axis.top + axis.height + config.event_margin_axis_px
        } else {
            0.0
        };
        let mut groups = Vec::with_capacity(band_count);
        for index in 0..band_count {
            let key = group_order.get_index(index).cloned();
            let label_height = key
                .as_deref()
                .map_or(0.0, |label| measure.measure_text(label, TextRole::GroupLabel).height);
            let height = label_height.max(tallest[index]) + config.event_margin_px;
            groups.push(GroupBand {
                key,
                top: cursor,
                height,
                bottom: cursor + height,
            });
            cursor += height;
        }

        for (band, item) in &mut items {
            let group = &groups[*band];
            item.top = group.top + (group.height - item.height) / 2.0;
        }

        let mut events: Vec<LaidOutEvent> = items.into_iter().map(|(_, item)| item).collect();
        events.sort_by(stack_order);

        let content_extent_px = if config.axis_on_top {
            cursor
        } else {
            cursor + config.event_margin_axis_px + axis.height
        };

        LayoutOutput {
            events,
            groups,
            content_extent_px,
        }
    }

    fn empty_extent(&self, axis: AxisPlacement) -> f64 {
        axis.height + self.config.event_margin_axis_px
    }

    fn stacked_extent(&self, items: &[LaidOutEvent], axis: AxisPlacement) -> f64 {
        let half_margin = self.config.event_margin_px / 2.0;
        if self.config.axis_on_top {
            let lowest = items
                .iter()
                .map(LaidOutEvent::bottom)
                .fold(axis.top + axis.height, f64::max);
            lowest + half_margin
        } else {
            let highest = items
                .iter()
                .map(|item| item.top)
                .fold(axis.top, f64::min);
            axis.top - highest + half_margin + axis.height
        }
    }
}

/// Ranges before points, then ascending left edge; ids break ties.
#[must_use]
pub fn stack_order(a: &LaidOutEvent, b: &LaidOutEvent) -> Ordering {
    kind_rank(a.kind)
        .cmp(&kind_rank(b.kind))
        .then_with(|| OrderedFloat(a.left).cmp(&OrderedFloat(b.left)))
        .then_with(|| a.id.cmp(&b.id))
}

fn kind_rank(kind: EventKind) -> u8 {
    match kind {
        EventKind::Range => 0,
        EventKind::Point => 1,
    }
}

/// Returns the index of an item in `[start, end]` colliding with `items[index]`.
///
/// The range is scanned from `end` down to `start`; `end` defaults to the last
/// item. The item never collides with itself.
#[must_use]
pub fn check_overlap(
    items: &[LaidOutEvent],
    index: usize,
    start: usize,
    end: Option<usize>,
    margin: f64,
) -> Option<usize> {
    let subject = items.get(index)?;
    let end = end.unwrap_or_else(|| items.len().saturating_sub(1));
    if items.is_empty() || start > end {
        return None;
    }

    (start..=end.min(items.len() - 1))
        .rev()
        .filter(|other| *other != index)
        .find(|other| subject.collides_with(&items[*other], margin))
}

/// Moves items in `stack_order` away from the axis until none collide.
///
/// A window cursor skips items that end before the current one starts: once
/// an item begins past `max_right + margin` nothing placed earlier can touch
/// it or anything after it. The cursor resets when the scan crosses from
/// ranges to points because left edges restart there.
pub fn stack_items(items: &mut [LaidOutEvent], margin: f64, axis_on_top: bool) {
    let mut window_start = 0;
    let mut max_right = f64::NEG_INFINITY;
    let mut previous_kind = None;

    for index in 0..items.len() {
        let kind = items[index].kind;
        if previous_kind.is_some_and(|previous| previous != kind) {
            window_start = 0;
        }
        previous_kind = Some(kind);

        if items[index].left - margin >= max_right {
            window_start = index;
        }

        if index > 0 {
            while let Some(colliding) =
                check_overlap(items, index, window_start, Some(index - 1), margin)
            {
                let other = items[colliding];
                let item = &mut items[index];
                item.top = if axis_on_top {
                    other.bottom() + margin
                } else {
                    other.top - item.height - margin
                };
            }
        }

        max_right = max_right.max(items[index].right());
    }
}
