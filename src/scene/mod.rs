//! In-memory rendering surface.
//!
//! The scene retains every primitive the overlay draws, keyed by [`ObjectId`]:
//! the background image, the mask overlay, the selection rectangle and the
//! committed annotations. Groups carry an affine transform whose children live
//! in the group's local plane. Tools subscribe to named pointer events and to
//! per-object geometry notifications; subscriptions are owned by a
//! [`ToolKind`] so the coordinator can route events and so tests can assert
//! that an inactive tool holds none. Nothing here draws pixels; see
//! [`crate::draw::render`] for that.

mod events;
mod manipulate;
mod primitive;

pub use events::{ObjectEvent, PointerEvent, SubscriptionId, SurfaceEvent};
pub use manipulate::Handle;
pub use primitive::{
    ClipOutline, Composite, GroupPrimitive, ImagePrimitive, Interaction, Primitive,
    PrimitiveKind, RectPrimitive,
};

use crate::draw::Shape;
use crate::error::OverlayError;
use crate::input::ToolKind;
use crate::util;
use kurbo::{Affine, Point, Rect};
use manipulate::Gesture;
use std::collections::HashMap;
use std::fmt;

/// Stable handle for a primitive attached to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Surface(SurfaceEvent),
    Object(ObjectId, ObjectEvent),
}

#[derive(Debug, Clone, Copy)]
struct Subscription {
    id: SubscriptionId,
    owner: ToolKind,
    target: Target,
}

/// Retained-mode surface with subscriptions, an active object and a redraw flag.
#[derive(Debug)]
pub struct Scene {
    width: f64,
    height: f64,
    next_id: u64,
    objects: HashMap<ObjectId, Primitive>,
    /// Top-level primitives in draw order
    order: Vec<ObjectId>,
    subscriptions: Vec<Subscription>,
    active: Option<ObjectId>,
    gesture: Option<Gesture>,
    notifications: Vec<(ObjectId, ObjectEvent)>,
    needs_render: bool,
    render_requests: u64,
    disposed: bool,
}

impl Scene {
    /// Creates an empty scene covering a `width` × `height` viewport.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            next_id: 0,
            objects: HashMap::new(),
            order: Vec::new(),
            subscriptions: Vec::new(),
            active: None,
            gesture: None,
            notifications: Vec::new(),
            needs_render: false,
            render_requests: 0,
            disposed: false,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// The full viewport in scene coordinates.
    pub fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    /// Attaches a top-level primitive above everything already attached.
    pub fn add(&mut self, primitive: Primitive) -> Result<ObjectId, OverlayError> {
        let id = self.insert(primitive)?;
        self.order.push(id);
        Ok(id)
    }

    /// Attaches a top-level primitive at `index` in draw order (0 is the
    /// bottom). An index past the end appends.
    pub fn add_at(&mut self, index: usize, primitive: Primitive) -> Result<ObjectId, OverlayError> {
        let id = self.insert(primitive)?;
        self.order.insert(index.min(self.order.len()), id);
        Ok(id)
    }

    /// Attaches `primitive` as the last child of `group`.
    pub fn add_to_group(
        &mut self,
        group: ObjectId,
        mut primitive: Primitive,
    ) -> Result<ObjectId, OverlayError> {
        self.group(group)?;
        primitive.parent = Some(group);
        let id = self.insert(primitive)?;
        let parent = self.group_mut(group)?;
        parent.children.push(id);
        parent.cache_dirty = true;
        Ok(id)
    }

    fn insert(&mut self, primitive: Primitive) -> Result<ObjectId, OverlayError> {
        if self.disposed {
            return Err(OverlayError::Disposed);
        }
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.insert(id, primitive);
        Ok(id)
    }

    /// Detaches a primitive (and a group's children), dropping every
    /// subscription that targets it.
    pub fn remove(&mut self, id: ObjectId) -> Result<Primitive, OverlayError> {
        let primitive = self
            .objects
            .remove(&id)
            .ok_or(OverlayError::ObjectNotFound(id))?;

        match primitive.parent {
            Some(parent) => {
                if let Some(PrimitiveKind::Group(group)) =
                    self.objects.get_mut(&parent).map(|p| &mut p.kind)
                {
                    group.children.retain(|child| *child != id);
                    group.cache_dirty = true;
                }
            }
            None => self.order.retain(|existing| *existing != id),
        }

        if let PrimitiveKind::Group(group) = &primitive.kind {
            for child in group.children.clone() {
                if let Err(err) = self.remove(child) {
                    log::debug!("Child {} of group {} already gone: {}", child, id, err);
                }
            }
        }

        self.subscriptions
            .retain(|sub| !matches!(sub.target, Target::Object(target, _) if target == id));
        self.notifications.retain(|(target, _)| *target != id);
        if self.active == Some(id) {
            self.active = None;
        }
        if self.gesture.as_ref().is_some_and(|g| g.object == id) {
            self.gesture = None;
        }
        Ok(primitive)
    }

    /// Draw-order position of a top-level primitive (0 is the bottom).
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.order.iter().position(|existing| *existing == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Primitive> {
        self.objects.get(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Top-level primitives in draw order (first = bottom).
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Primitive)> {
        self.order
            .iter()
            .filter_map(|id| self.objects.get(id).map(|p| (*id, p)))
    }

    /// First primitive in draw order (groups searched depth-first) matching
    /// `predicate`.
    pub fn find_first(&self, predicate: impl Fn(&Primitive) -> bool) -> Option<ObjectId> {
        fn walk(
            scene: &Scene,
            ids: &[ObjectId],
            predicate: &dyn Fn(&Primitive) -> bool,
        ) -> Option<ObjectId> {
            for id in ids {
                let Some(primitive) = scene.objects.get(id) else {
                    continue;
                };
                if predicate(primitive) {
                    return Some(*id);
                }
                let found = primitive
                    .as_group()
                    .and_then(|group| walk(scene, &group.children, predicate));
                if found.is_some() {
                    return found;
                }
            }
            None
        }
        walk(self, &self.order, &predicate)
    }

    pub fn rect(&self, id: ObjectId) -> Option<&RectPrimitive> {
        self.objects.get(&id).and_then(Primitive::as_rect)
    }

    pub fn rect_mut(&mut self, id: ObjectId) -> Result<&mut RectPrimitive, OverlayError> {
        match self.objects.get_mut(&id).map(|p| &mut p.kind) {
            Some(PrimitiveKind::Rect(rect)) => Ok(rect),
            _ => Err(OverlayError::ObjectNotFound(id)),
        }
    }

    pub fn shape(&self, id: ObjectId) -> Option<&Shape> {
        self.objects.get(&id).and_then(Primitive::as_shape)
    }

    /// Replaces the geometry of a shape primitive in place.
    pub fn set_shape(&mut self, id: ObjectId, shape: Shape) -> Result<(), OverlayError> {
        match self.objects.get_mut(&id).map(|p| &mut p.kind) {
            Some(PrimitiveKind::Shape(existing)) => {
                *existing = shape;
                Ok(())
            }
            _ => Err(OverlayError::ObjectNotFound(id)),
        }
    }

    fn group(&self, id: ObjectId) -> Result<&GroupPrimitive, OverlayError> {
        let primitive = self
            .objects
            .get(&id)
            .ok_or(OverlayError::ObjectNotFound(id))?;
        primitive.as_group().ok_or(OverlayError::NotAGroup(id))
    }

    fn group_mut(&mut self, id: ObjectId) -> Result<&mut GroupPrimitive, OverlayError> {
        match self.objects.get_mut(&id).map(|p| &mut p.kind) {
            Some(PrimitiveKind::Group(group)) => Ok(group),
            Some(_) => Err(OverlayError::NotAGroup(id)),
            None => Err(OverlayError::ObjectNotFound(id)),
        }
    }

    /// A group's local → scene transform.
    pub fn group_transform(&self, id: ObjectId) -> Result<Affine, OverlayError> {
        Ok(self.group(id)?.transform)
    }

    pub fn set_group_transform(&mut self, id: ObjectId, transform: Affine) -> Result<(), OverlayError> {
        let group = self.group_mut(id)?;
        group.transform = transform;
        group.cache_dirty = true;
        Ok(())
    }

    /// Flags a group's cached raster as stale.
    pub fn mark_group_dirty(&mut self, id: ObjectId) -> Result<(), OverlayError> {
        self.group_mut(id)?.cache_dirty = true;
        Ok(())
    }

    pub fn is_group_dirty(&self, id: ObjectId) -> bool {
        self.group(id).is_ok_and(|group| group.cache_dirty)
    }

    pub fn set_clip(&mut self, id: ObjectId, clip: Option<ClipOutline>) -> Result<(), OverlayError> {
        self.rect_mut(id)?.clip = clip;
        Ok(())
    }

    pub fn set_interaction(&mut self, id: ObjectId, interaction: Interaction) -> Result<(), OverlayError> {
        let primitive = self
            .objects
            .get_mut(&id)
            .ok_or(OverlayError::ObjectNotFound(id))?;
        primitive.interaction = interaction;
        if !interaction.selectable && self.active == Some(id) {
            self.active = None;
        }
        Ok(())
    }

    /// Transform from a primitive's own plane to scene coordinates.
    pub fn plane_transform(&self, id: ObjectId) -> Affine {
        let mut transform = Affine::IDENTITY;
        let mut parent = self.objects.get(&id).and_then(|p| p.parent);
        while let Some(group_id) = parent {
            match self.objects.get(&group_id) {
                Some(group) => {
                    if let Some(g) = group.as_group() {
                        transform = g.transform * transform;
                    }
                    parent = group.parent;
                }
                None => break,
            }
        }
        transform
    }

    /// Topmost evented primitive under `point` (scene coordinates).
    pub fn hit_test(&self, point: Point) -> Option<ObjectId> {
        self.hit_in(&self.order, point)
    }

    fn hit_in(&self, ids: &[ObjectId], point: Point) -> Option<ObjectId> {
        for id in ids.iter().rev() {
            let Some(primitive) = self.objects.get(id) else {
                continue;
            };
            if let Some(group) = primitive.as_group() {
                let hit = util::send_point_to_plane(point, group.transform)
                    .and_then(|local| self.hit_in(&group.children, local));
                if hit.is_some() {
                    return hit;
                }
                continue;
            }
            if primitive.interaction.evented && primitive.contains(point) {
                return Some(*id);
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Active object
    // ------------------------------------------------------------------

    pub fn active_object(&self) -> Option<ObjectId> {
        self.active
    }

    /// Makes a selectable primitive the active one (handles shown).
    pub fn set_active_object(&mut self, id: ObjectId) -> Result<(), OverlayError> {
        let primitive = self
            .objects
            .get(&id)
            .ok_or(OverlayError::ObjectNotFound(id))?;
        if primitive.interaction.selectable {
            self.active = Some(id);
        } else {
            log::debug!("Primitive {} is not selectable; active object unchanged", id);
        }
        Ok(())
    }

    pub fn discard_active_object(&mut self) {
        self.active = None;
        self.gesture = None;
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    fn subscribe(&mut self, owner: ToolKind, target: Target) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, owner, target });
        id
    }

    /// Subscribes `owner` to a surface-wide pointer event.
    pub fn on(&mut self, owner: ToolKind, event: SurfaceEvent) -> SubscriptionId {
        self.subscribe(owner, Target::Surface(event))
    }

    /// Subscribes `owner` to geometry notifications from one primitive.
    pub fn on_object(
        &mut self,
        owner: ToolKind,
        object: ObjectId,
        event: ObjectEvent,
    ) -> Result<SubscriptionId, OverlayError> {
        if !self.objects.contains_key(&object) {
            return Err(OverlayError::ObjectNotFound(object));
        }
        Ok(self.subscribe(owner, Target::Object(object, event)))
    }

    /// Releases a subscription. Unknown ids are ignored.
    pub fn off(&mut self, id: SubscriptionId) {
        self.subscriptions.retain(|sub| sub.id != id);
    }

    /// Owners subscribed to a surface event, in subscription order.
    pub fn subscribers(&self, event: SurfaceEvent) -> Vec<ToolKind> {
        self.owners_of(Target::Surface(event))
    }

    /// Owners subscribed to a primitive's notification, in subscription order.
    pub fn object_subscribers(&self, object: ObjectId, event: ObjectEvent) -> Vec<ToolKind> {
        self.owners_of(Target::Object(object, event))
    }

    fn owners_of(&self, target: Target) -> Vec<ToolKind> {
        let mut owners = Vec::new();
        for sub in self.subscriptions.iter().filter(|sub| sub.target == target) {
            if !owners.contains(&sub.owner) {
                owners.push(sub.owner);
            }
        }
        owners
    }

    /// Live subscriptions held by `owner`.
    pub fn subscription_count(&self, owner: ToolKind) -> usize {
        self.subscriptions
            .iter()
            .filter(|sub| sub.owner == owner)
            .count()
    }

    /// Drains geometry notifications queued by manipulation.
    pub fn take_notifications(&mut self) -> Vec<(ObjectId, ObjectEvent)> {
        std::mem::take(&mut self.notifications)
    }

    // ------------------------------------------------------------------
    // Redraw
    // ------------------------------------------------------------------

    /// Marks the scene for redraw.
    pub fn request_render(&mut self) {
        self.needs_render = true;
        self.render_requests += 1;
    }

    /// Consumes the redraw flag, clearing group cache flags with it.
    pub fn take_render_request(&mut self) -> bool {
        if !self.needs_render {
            return false;
        }
        self.needs_render = false;
        for primitive in self.objects.values_mut() {
            if let PrimitiveKind::Group(group) = &mut primitive.kind {
                group.cache_dirty = false;
            }
        }
        true
    }

    /// Total redraw requests since creation.
    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }

    /// Releases every primitive and subscription. Later attaches fail.
    pub fn dispose(&mut self) {
        self.objects.clear();
        self.order.clear();
        self.subscriptions.clear();
        self.notifications.clear();
        self.active = None;
        self.gesture = None;
        self.needs_render = false;
        self.disposed = true;
    }
}
