//! Move and resize gestures on the active object.
//!
//! A selectable rectangle is dragged by its body or by one of eight handles.
//! Resize handles write pending scale factors relative to the rectangle's
//! current size, anchored at the opposite edge as it was when the gesture
//! began. Every geometry change queues a [`ObjectEvent::Moving`] or
//! [`ObjectEvent::Scaling`] notification; releasing after any change queues
//! [`ObjectEvent::Modified`].

use super::{ObjectEvent, ObjectId, PrimitiveKind, Scene};
use crate::util;
use kurbo::{Point, Rect};

/// Smallest width or height a resize can produce.
const MIN_EXTENT: f64 = 1.0;

/// Part of the active object grabbed by the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Body,
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl Handle {
    const RESIZE: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];

    /// Center of the handle on `rect`; `None` for the body.
    pub fn anchor(self, rect: Rect) -> Option<Point> {
        let mid_x = (rect.x0 + rect.x1) / 2.0;
        let mid_y = (rect.y0 + rect.y1) / 2.0;
        let point = match self {
            Handle::Body => return None,
            Handle::TopLeft => (rect.x0, rect.y0),
            Handle::Top => (mid_x, rect.y0),
            Handle::TopRight => (rect.x1, rect.y0),
            Handle::Right => (rect.x1, mid_y),
            Handle::BottomRight => (rect.x1, rect.y1),
            Handle::Bottom => (mid_x, rect.y1),
            Handle::BottomLeft => (rect.x0, rect.y1),
            Handle::Left => (rect.x0, mid_y),
        };
        Some(point.into())
    }

    /// Centers of the eight resize handles on `rect`.
    pub fn resize_anchors(rect: Rect) -> impl Iterator<Item = (Handle, Point)> {
        Self::RESIZE
            .into_iter()
            .filter_map(move |handle| handle.anchor(rect).map(|point| (handle, point)))
    }

    fn moves_left(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Left | Handle::BottomLeft)
    }

    fn moves_right(self) -> bool {
        matches!(self, Handle::TopRight | Handle::Right | Handle::BottomRight)
    }

    fn moves_top(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Top | Handle::TopRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::Bottom | Handle::BottomRight)
    }

    fn is_corner(self) -> bool {
        (self.moves_left() || self.moves_right()) && (self.moves_top() || self.moves_bottom())
    }
}

/// An in-progress drag on the active object.
#[derive(Debug, Clone, Copy)]
pub(super) struct Gesture {
    pub(super) object: ObjectId,
    handle: Handle,
    /// Pointer position at press, in the object's plane
    origin: Point,
    /// Bounds at press, in the object's plane
    start: Rect,
    changed: bool,
}

impl Scene {
    /// Resize handle of the active object under `point`, if it shows controls.
    pub fn handle_at(&self, point: Point) -> Option<(ObjectId, Handle)> {
        let id = self.active?;
        let primitive = self.objects.get(&id)?;
        if !primitive.interaction.controls {
            return None;
        }
        let rect = primitive.as_rect()?.bounding_rect();
        let local = util::send_point_to_plane(point, self.plane_transform(id))?;
        let half = primitive.interaction.corner_size / 2.0;

        Handle::resize_anchors(rect)
            .find(|(_, anchor)| {
                (local.x - anchor.x).abs() <= half && (local.y - anchor.y).abs() <= half
            })
            .map(|(handle, _)| (id, handle))
    }

    /// Resolves a primary-button press.
    ///
    /// A press on a handle of the active object or on the body of a selectable
    /// rectangle starts a gesture and makes that object active; a press
    /// anywhere else clears the active object. Returns the primitive under the
    /// pointer (the grabbed object when a handle was hit).
    pub fn begin_manipulation(&mut self, point: Point) -> Option<ObjectId> {
        if let Some((id, handle)) = self.handle_at(point) {
            self.start_gesture(id, handle, point);
            return Some(id);
        }

        let target = self.hit_test(point);
        let grabbable = target.and_then(|id| {
            let primitive = self.objects.get(&id)?;
            (primitive.interaction.selectable && primitive.as_rect().is_some()).then_some(id)
        });

        match grabbable {
            Some(id) => {
                self.active = Some(id);
                self.start_gesture(id, Handle::Body, point);
            }
            None => self.discard_active_object(),
        }
        target
    }

    fn start_gesture(&mut self, object: ObjectId, handle: Handle, point: Point) {
        let Some(start) = self.rect(object).map(|rect| rect.bounding_rect()) else {
            return;
        };
        let Some(origin) = util::send_point_to_plane(point, self.plane_transform(object)) else {
            return;
        };
        log::debug!("Manipulating {} by {:?}", object, handle);
        self.gesture = Some(Gesture {
            object,
            handle,
            origin,
            start,
            changed: false,
        });
    }

    pub fn is_manipulating(&self) -> bool {
        self.gesture.is_some()
    }

    /// Applies a pointer move to the current gesture. Returns whether the
    /// object's geometry changed.
    pub fn continue_manipulation(&mut self, point: Point) -> bool {
        let Some(gesture) = self.gesture else {
            return false;
        };
        let Some(local) = util::send_point_to_plane(point, self.plane_transform(gesture.object))
        else {
            return false;
        };
        let Some(primitive) = self.objects.get_mut(&gesture.object) else {
            self.gesture = None;
            return false;
        };
        let lock_uniform = primitive.interaction.lock_uniform_scaling;
        let PrimitiveKind::Rect(rect) = &mut primitive.kind else {
            self.gesture = None;
            return false;
        };

        let delta = local - gesture.origin;
        let before = rect.bounding_rect();
        let event = if gesture.handle == Handle::Body {
            rect.left = gesture.start.x0 + delta.x;
            rect.top = gesture.start.y0 + delta.y;
            ObjectEvent::Moving
        } else {
            let target = resized(gesture.start, gesture.handle, delta.x, delta.y, lock_uniform);
            rect.left = target.x0;
            rect.top = target.y0;
            if rect.width > 0.0 {
                rect.scale_x = target.width() / rect.width;
            } else {
                rect.width = target.width();
                rect.scale_x = 1.0;
            }
            if rect.height > 0.0 {
                rect.scale_y = target.height() / rect.height;
            } else {
                rect.height = target.height();
                rect.scale_y = 1.0;
            }
            ObjectEvent::Scaling
        };

        if rect.bounding_rect() == before {
            return false;
        }
        self.notifications.push((gesture.object, event));
        if let Some(active) = self.gesture.as_mut() {
            active.changed = true;
        }
        true
    }

    /// Finishes the current gesture, queueing `Modified` if anything changed.
    pub fn end_manipulation(&mut self) -> bool {
        match self.gesture.take() {
            Some(gesture) if gesture.changed => {
                self.notifications
                    .push((gesture.object, ObjectEvent::Modified));
                true
            }
            _ => false,
        }
    }
}

/// Bounds produced by dragging `handle` of `start` by `(dx, dy)`.
fn resized(start: Rect, handle: Handle, dx: f64, dy: f64, lock_uniform: bool) -> Rect {
    let mut x0 = start.x0;
    let mut y0 = start.y0;
    let mut x1 = start.x1;
    let mut y1 = start.y1;

    if handle.moves_left() {
        x0 = (start.x0 + dx).min(start.x1 - MIN_EXTENT);
    }
    if handle.moves_right() {
        x1 = (start.x1 + dx).max(start.x0 + MIN_EXTENT);
    }
    if handle.moves_top() {
        y0 = (start.y0 + dy).min(start.y1 - MIN_EXTENT);
    }
    if handle.moves_bottom() {
        y1 = (start.y1 + dy).max(start.y0 + MIN_EXTENT);
    }

    if lock_uniform && handle.is_corner() && start.width() > 0.0 && start.height() > 0.0 {
        let factor = ((x1 - x0) / start.width()).max((y1 - y0) / start.height());
        let width = start.width() * factor;
        let height = start.height() * factor;
        if handle.moves_left() {
            x0 = x1 - width;
        } else {
            x1 = x0 + width;
        }
        if handle.moves_top() {
            y0 = y1 - height;
        } else {
            y1 = y0 + height;
        }
    }

    Rect::new(x0, y0, x1, y1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::SELECTION_BLUE;
    use crate::scene::{Interaction, Primitive, RectPrimitive};

    fn scene_with_selection() -> (Scene, ObjectId) {
        let mut scene = Scene::new(800.0, 600.0);
        let id = scene
            .add(
                Primitive::new(PrimitiveKind::Rect(RectPrimitive::new(Rect::new(
                    100.0, 100.0, 300.0, 250.0,
                ))))
                .with_interaction(Interaction::editable(8.0, SELECTION_BLUE)),
            )
            .unwrap();
        (scene, id)
    }

    #[test]
    fn body_drag_moves_and_reports() {
        let (mut scene, id) = scene_with_selection();
        assert_eq!(scene.begin_manipulation(Point::new(150.0, 150.0)), Some(id));
        assert_eq!(scene.active_object(), Some(id));

        assert!(scene.continue_manipulation(Point::new(160.0, 145.0)));
        assert_eq!(
            scene.rect(id).unwrap().bounding_rect(),
            Rect::new(110.0, 95.0, 310.0, 245.0)
        );
        assert!(scene.end_manipulation());
        assert_eq!(
            scene.take_notifications(),
            vec![(id, ObjectEvent::Moving), (id, ObjectEvent::Modified)]
        );
    }

    #[test]
    fn corner_handle_scales_against_opposite_corner() {
        let (mut scene, id) = scene_with_selection();
        scene.set_active_object(id).unwrap();

        assert_eq!(scene.handle_at(Point::new(302.0, 251.0)), Some((id, Handle::BottomRight)));
        scene.begin_manipulation(Point::new(300.0, 250.0));
        scene.continue_manipulation(Point::new(400.0, 325.0));

        let rect = scene.rect(id).unwrap();
        assert_eq!((rect.scale_x, rect.scale_y), (1.5, 1.5));
        assert_eq!((rect.width, rect.height), (200.0, 150.0));
        assert_eq!(rect.bounding_rect(), Rect::new(100.0, 100.0, 400.0, 325.0));
        assert_eq!(scene.take_notifications(), vec![(id, ObjectEvent::Scaling)]);
    }

    #[test]
    fn edge_handle_cannot_invert_rectangle() {
        let (mut scene, id) = scene_with_selection();
        scene.set_active_object(id).unwrap();
        scene.begin_manipulation(Point::new(100.0, 175.0));
        scene.continue_manipulation(Point::new(900.0, 175.0));

        let bounds = scene.rect(id).unwrap().bounding_rect();
        assert_eq!(bounds.x0, 299.0);
        assert!((bounds.width() - 1.0).abs() < 1e-9);
        assert!((bounds.height() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn uniform_lock_keeps_aspect_ratio() {
        let start = Rect::new(0.0, 0.0, 200.0, 100.0);
        let rect = resized(start, Handle::BottomRight, 200.0, 0.0, true);
        assert_eq!(rect, Rect::new(0.0, 0.0, 400.0, 200.0));
    }

    #[test]
    fn press_on_empty_space_clears_active_object() {
        let (mut scene, id) = scene_with_selection();
        scene.set_active_object(id).unwrap();
        assert_eq!(scene.begin_manipulation(Point::new(700.0, 500.0)), None);
        assert_eq!(scene.active_object(), None);
        assert!(!scene.is_manipulating());
    }

    #[test]
    fn release_without_change_is_not_modified() {
        let (mut scene, id) = scene_with_selection();
        scene.begin_manipulation(Point::new(150.0, 150.0));
        assert!(!scene.continue_manipulation(Point::new(150.0, 150.0)));
        assert!(!scene.end_manipulation());
        assert!(scene.take_notifications().is_empty());
        assert_eq!(scene.active_object(), Some(id));
    }
}
