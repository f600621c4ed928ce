//! Pan and pinch input.
//!
//! Pointer drags translate the shot; two-finger pinches zoom it relative
//! to the scale it had when the pinch began. Both only ever go through
//! [`pan_by`] and [`pinch_scale`].

use stripbooth_strip_model::geometry::{Offset, Point};
use stripbooth_strip_model::shot::{clamp_scale, ShotTransform};

/// Translate an offset by a pointer delta. No clamping: content may be
/// panned fully out of view.
pub fn pan_by(offset: Offset, delta: Offset) -> Offset {
    Offset::new(offset.x + delta.x, offset.y + delta.y)
}

/// Zoom relative to the scale at pinch start.
///
/// The result is clamped to `[MIN_SCALE, MAX_SCALE]`. A zero start distance
/// (both touch points on the same pixel) clamps rather than failing.
pub fn pinch_scale(base_scale: f64, start_distance: f64, current_distance: f64) -> f64 {
    clamp_scale(base_scale * (current_distance / start_distance))
}

/// Pointer and touch input delivered to the preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Mouse button or single touch pressed.
    Down(Point),
    /// Pointer moved.
    Move(Point),
    /// Released or left the preview.
    Up,
    /// A second touch landed; distance between the two touches.
    PinchStart(f64),
    /// Distance between the two touches changed.
    PinchMove(f64),
    /// Fewer than two touches remain.
    PinchEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureState {
    Idle,
    Dragging { last: Point },
    Pinching { start_distance: f64, base_scale: f64 },
}

/// Turns a stream of pointer events into shot transform updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTracker {
    state: GestureState,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    /// Whether a drag or pinch is in progress.
    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Apply one event, returning the updated transform.
    ///
    /// Returns `None` when the event does not change the transform, so
    /// callers can skip a redraw.
    pub fn apply(
        &mut self,
        transform: &ShotTransform,
        event: PointerEvent,
    ) -> Option<ShotTransform> {
        match (self.state, event) {
            (_, PointerEvent::Down(point)) => {
                self.state = GestureState::Dragging { last: point };
                None
            }
            (GestureState::Dragging { last }, PointerEvent::Move(point)) => {
                self.state = GestureState::Dragging { last: point };
                let offset = pan_by(transform.offset, point.delta_from(&last));
                Some(transform.with_offset(offset))
            }
            (_, PointerEvent::PinchStart(distance)) => {
                tracing::trace!(distance, scale = transform.scale, "Pinch started");
                self.state = GestureState::Pinching {
                    start_distance: distance,
                    base_scale: transform.scale,
                };
                None
            }
            (
                GestureState::Pinching {
                    start_distance,
                    base_scale,
                },
                PointerEvent::PinchMove(distance),
            ) => {
                let scale = pinch_scale(base_scale, start_distance, distance);
                Some(transform.with_scale(scale))
            }
            (_, PointerEvent::Up) | (_, PointerEvent::PinchEnd) => {
                self.state = GestureState::Idle;
                None
            }
            (_, PointerEvent::Move(_)) | (_, PointerEvent::PinchMove(_)) => None,
        }
    }

    /// Drop any gesture in progress.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stripbooth_strip_model::shot::{MAX_SCALE, MIN_SCALE};

    #[test]
    fn test_pan_by_is_plain_addition() {
        let moved = pan_by(Offset::new(10.0, 10.0), Offset::new(-500.0, 3.0));
        assert_eq!(moved, Offset::new(-490.0, 13.0));
    }

    #[test]
    fn test_pinch_ratio() {
        assert!((pinch_scale(1.0, 100.0, 150.0) - 1.5).abs() < 1e-12);
        assert!((pinch_scale(2.0, 200.0, 100.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pinch_clamps_degenerate_distances() {
        assert_eq!(pinch_scale(1.0, 0.0, 50.0), MAX_SCALE);
        assert_eq!(pinch_scale(1.0, 0.0, 0.0), MIN_SCALE);
        assert_eq!(pinch_scale(1.0, 100.0, 0.0), MIN_SCALE);
        assert_eq!(pinch_scale(1.0, 1.0, 1e9), MAX_SCALE);
    }

    #[test]
    fn test_drag_accumulates_deltas() {
        let mut tracker = GestureTracker::new();
        let mut t = ShotTransform::IDENTITY;

        assert!(tracker.apply(&t, PointerEvent::Down(Point::new(100.0, 100.0))).is_none());
        t = tracker
            .apply(&t, PointerEvent::Move(Point::new(130.0, 90.0)))
            .unwrap();
        t = tracker
            .apply(&t, PointerEvent::Move(Point::new(150.0, 80.0)))
            .unwrap();
        assert!(tracker.apply(&t, PointerEvent::Up).is_none());

        assert_eq!(t.offset, Offset::new(50.0, -20.0));
        assert_eq!(t.scale, 1.0);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_move_without_down_is_ignored() {
        let mut tracker = GestureTracker::new();
        let t = ShotTransform::IDENTITY;
        assert!(tracker
            .apply(&t, PointerEvent::Move(Point::new(5.0, 5.0)))
            .is_none());
    }

    #[test]
    fn test_pinch_is_relative_to_start_scale() {
        let mut tracker = GestureTracker::new();
        let mut t = ShotTransform::IDENTITY.with_scale(2.0);

        tracker.apply(&t, PointerEvent::PinchStart(100.0));
        t = tracker.apply(&t, PointerEvent::PinchMove(150.0)).unwrap();
        assert!((t.scale - 3.0).abs() < 1e-12);

        // Still relative to the pinch-start scale, not the running one.
        t = tracker.apply(&t, PointerEvent::PinchMove(50.0)).unwrap();
        assert!((t.scale - 1.0).abs() < 1e-12);

        tracker.apply(&t, PointerEvent::PinchEnd);
        assert!(tracker
            .apply(&t, PointerEvent::PinchMove(400.0))
            .is_none());
    }

    #[test]
    fn test_pinch_with_coincident_touches_clamps() {
        let mut tracker = GestureTracker::new();
        let t = ShotTransform::IDENTITY;
        tracker.apply(&t, PointerEvent::PinchStart(0.0));
        let zoomed = tracker.apply(&t, PointerEvent::PinchMove(30.0)).unwrap();
        assert_eq!(zoomed.scale, MAX_SCALE);
    }
}
