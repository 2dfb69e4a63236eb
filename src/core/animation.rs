use indexmap::IndexMap;

use crate::core::{EventId, LaidOutEvent};

/// Interval the host should wait between `Animator::tick` calls.
pub const ANIMATION_INTERVAL_MS: u64 = 30;

/// Distances under this many pixels snap straight to the target.
const SETTLE_THRESHOLD_PX: f64 = 1.0;
const HORIZONTAL_EASE_DIVISOR: f64 = 2.0;
const VERTICAL_EASE_DIVISOR: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tween {
    current: LaidOutEvent,
    target: LaidOutEvent,
}

impl Tween {
    fn is_settled(&self) -> bool {
        self.current == self.target
    }

    fn step(&mut self) {
        let current = &mut self.current;
        let target = self.target;
        current.left = ease(current.left, target.left, HORIZONTAL_EASE_DIVISOR);
        current.width = ease(current.width, target.width, HORIZONTAL_EASE_DIVISOR);
        current.top = ease(current.top, target.top, VERTICAL_EASE_DIVISOR);
        current.height = ease(current.height, target.height, VERTICAL_EASE_DIVISOR);
    }
}

fn ease(current: f64, target: f64, divisor: f64) -> f64 {
    let diff = target - current;
    if diff.abs() < SETTLE_THRESHOLD_PX {
        target
    } else {
        current + diff / divisor
    }
}

/// Per-engine tween scheduler; one entry per displayed event.
///
/// Horizontal geometry closes half the remaining distance per tick and
/// vertical geometry a quarter, so boxes slide sideways faster than they
/// restack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animator {
    tweens: IndexMap<EventId, Tween>,
}

impl Animator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the target set. Known events tween from their displayed
    /// geometry when `animate` is set; new events appear at their target.
    pub fn retarget(&mut self, targets: &[LaidOutEvent], animate: bool) {
        self.retarget_with(targets, animate, None);
    }

    /// Replaces the target set after the time-to-pixel mapping changed.
    ///
    /// `scale_ratio` is the new pixels-per-millisecond over the old one. The
    /// horizontal distance between each tween and its previous target is
    /// carried into the new mapping, so content follows a pan or zoom
    /// immediately and only the stacking change eases.
    pub fn retarget_remapped(
        &mut self,
        targets: &[LaidOutEvent],
        animate: bool,
        scale_ratio: f64,
    ) {
        self.retarget_with(targets, animate, Some(scale_ratio));
    }

    fn retarget_with(
        &mut self,
        targets: &[LaidOutEvent],
        animate: bool,
        scale_ratio: Option<f64>,
    ) {
        let mut next = IndexMap::with_capacity(targets.len());
        for target in targets {
            let current = match self.tweens.get(&target.id) {
                Some(tween) if animate => {
                    let mut current = LaidOutEvent {
                        kind: target.kind,
                        ..tween.current
                    };
                    if let Some(ratio) = scale_ratio {
                        current.left =
                            target.left + (tween.current.left - tween.target.left) * ratio;
                        current.width =
                            target.width + (tween.current.width - tween.target.width) * ratio;
                    }
                    current
                }
                _ => *target,
            };
            next.insert(
                target.id,
                Tween {
                    current,
                    target: *target,
                },
            );
        }
        self.tweens = next;
    }

    /// Overrides the displayed geometry of one event, e.g. a drag preview.
    pub fn place(&mut self, geometry: LaidOutEvent) {
        if let Some(tween) = self.tweens.get_mut(&geometry.id) {
            tween.current = geometry;
        }
    }

    /// Advances every unsettled tween by one step. Returns `true` while any remain.
    pub fn tick(&mut self) -> bool {
        let mut active = false;
        for tween in self.tweens.values_mut() {
            if !tween.is_settled() {
                tween.step();
                active |= !tween.is_settled();
            }
        }
        active
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.tweens.values().any(|tween| !tween.is_settled())
    }

    #[must_use]
    pub fn displayed(&self) -> Vec<LaidOutEvent> {
        self.tweens.values().map(|tween| tween.current).collect()
    }

    #[must_use]
    pub fn displayed_geometry(&self, id: EventId) -> Option<LaidOutEvent> {
        self.tweens.get(&id).map(|tween| tween.current)
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Animator;
    use crate::core::{EventId, EventKind, LaidOutEvent};

    fn geometry(left: f64, top: f64) -> LaidOutEvent {
        LaidOutEvent {
            id: EventId::new(1),
            kind: EventKind::Point,
            left,
            top,
            width: 40.0,
            height: 20.0,
        }
    }

    #[test]
    fn horizontal_moves_faster_than_vertical() {
        let mut animator = Animator::new();
        animator.retarget(&[geometry(0.0, 0.0)], true);
        animator.retarget(&[geometry(64.0, 64.0)], true);

        assert!(animator.tick());
        let step = animator.displayed()[0];
        assert_eq!(step.left, 32.0);
        assert_eq!(step.top, 16.0);
    }

    #[test]
    fn tweens_settle_on_target() {
        let mut animator = Animator::new();
        animator.retarget(&[geometry(0.0, 0.0)], true);
        animator.retarget(&[geometry(100.0, -40.0)], true);

        let mut ticks = 0;
        while animator.tick() {
            ticks += 1;
            assert!(ticks < 100, "animation must converge");
        }
        assert_eq!(animator.displayed()[0], geometry(100.0, -40.0));
    }

    #[test]
    fn remapped_retarget_follows_the_new_mapping() {
        let mut animator = Animator::new();
        animator.retarget(&[geometry(100.0, 0.0)], true);
        animator.retarget_remapped(&[geometry(220.0, 30.0)], true, 1.0);

        let shown = animator.displayed()[0];
        assert_eq!(shown.left, 220.0);
        assert_eq!(shown.top, 0.0);
        assert!(animator.is_active());
    }

    #[test]
    fn remapped_retarget_keeps_scaled_offset_of_running_tween() {
        let mut animator = Animator::new();
        animator.retarget(&[geometry(0.0, 0.0)], true);
        animator.retarget(&[geometry(64.0, 0.0)], true);
        animator.tick();
        assert_eq!(animator.displayed()[0].left, 32.0);

        // Zooming in 2x doubles the remaining distance to the moved target.
        animator.retarget_remapped(&[geometry(10.0, 0.0)], true, 2.0);
        assert_eq!(animator.displayed()[0].left, -54.0);
    }

    #[test]
    fn disabled_animation_jumps_to_target() {
        let mut animator = Animator::new();
        animator.retarget(&[geometry(0.0, 0.0)], false);
        animator.retarget(&[geometry(80.0, 10.0)], false);
        assert!(!animator.is_active());
        assert_eq!(animator.displayed()[0].left, 80.0);
    }
}
