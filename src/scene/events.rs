//! Named events the scene delivers to subscribers.

use super::ObjectId;
use crate::input::MouseButton;
use kurbo::Point;

/// Surface-wide pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceEvent {
    Down,
    Move,
    Up,
    /// Pointer left the surface
    Out,
}

/// Geometry notifications emitted while an object is manipulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectEvent {
    /// Dragged by its body
    Moving,
    /// Dragged by a resize handle
    Scaling,
    /// Gesture finished and the geometry differs from its start
    Modified,
}

/// A pointer event in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub event: SurfaceEvent,
    pub point: Point,
    /// Button for press/release events
    pub button: Option<MouseButton>,
    /// Topmost evented primitive under the pointer when the event arrived
    pub target: Option<ObjectId>,
}

impl PointerEvent {
    pub fn new(event: SurfaceEvent, point: Point) -> Self {
        Self {
            event,
            point,
            button: None,
            target: None,
        }
    }

    pub fn down(point: Point, button: MouseButton) -> Self {
        Self {
            button: Some(button),
            ..Self::new(SurfaceEvent::Down, point)
        }
    }

    pub fn moved(point: Point) -> Self {
        Self::new(SurfaceEvent::Move, point)
    }

    pub fn up(point: Point, button: MouseButton) -> Self {
        Self {
            button: Some(button),
            ..Self::new(SurfaceEvent::Up, point)
        }
    }

    pub fn out(point: Point) -> Self {
        Self::new(SurfaceEvent::Out, point)
    }

    /// Whether this press/release came from the primary button.
    pub fn is_primary(&self) -> bool {
        self.button == Some(MouseButton::Left)
    }
}

/// Identifies one subscription so its owner can release it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);
