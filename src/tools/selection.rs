//! Drag-out selection mirrored into the session mask.
//!
//! The selection rectangle, in scene coordinates, is the single source of
//! truth. After every change to it, [`SelectionTool::resync`] re-derives the
//! mask contribution from the rectangle's current bounds:
//!
//! - [`HoleMask`] (crop): a destination-out rectangle inside the overlay group,
//!   converted into the group's local plane through the inverse of the group
//!   transform before it is written.
//! - [`ClipMask`] (mask): an even-odd outline on the full-canvas overlay made of
//!   the overlay boundary plus the selection as an inner sub-path, written in
//!   scene coordinates.
//!
//! Gesture: `Idle → Drawing → Committed`, back to `Drawing` on the next press
//! outside the committed selection.

use super::{Lifecycle, MaskOverlay, Subscriptions, Tool, ToolContext};
use crate::draw::{BLACK, Color, SELECTION_BLUE};
use crate::error::OverlayError;
use crate::input::ToolKind;
use crate::scene::{
    ClipOutline, Composite, Interaction, ObjectEvent, ObjectId, PointerEvent, Primitive,
    PrimitiveKind, RectPrimitive, Scene, SurfaceEvent,
};
use crate::util;
use kurbo::{Point, Rect};

const GEOMETRY_EVENTS: [ObjectEvent; 3] =
    [ObjectEvent::Moving, ObjectEvent::Scaling, ObjectEvent::Modified];

/// Appearance and commit policy of the selection rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionOptions {
    pub stroke: Color,
    pub stroke_width: f64,
    /// Handle hit-area size
    pub corner_size: f64,
    /// Drop a zero-width or zero-height selection on release
    pub discard_empty: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            stroke: SELECTION_BLUE,
            stroke_width: 1.0,
            corner_size: 8.0,
            discard_empty: true,
        }
    }
}

/// Where the current selection gesture stands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionGesture {
    #[default]
    Idle,
    /// Primary button held since `anchor`
    Drawing { anchor: Point },
    /// Selection released and interactive
    Committed,
}

/// How a selection tool mirrors its rectangle into the mask primitive.
pub trait MaskBinding: Default {
    const KIND: ToolKind;

    /// Whether only the primary button starts a selection.
    const PRIMARY_ONLY: bool;

    /// Whether the active selection draws its outline border.
    const HAS_BORDERS: bool;

    /// Writes `bounds` (scene coordinates) into the mask.
    fn apply(
        &mut self,
        scene: &mut Scene,
        mask: MaskOverlay,
        bounds: Rect,
    ) -> Result<(), OverlayError>;

    /// Removes this binding's contribution from the mask.
    fn clear(&mut self, scene: &mut Scene, mask: MaskOverlay) -> Result<(), OverlayError>;
}

/// Selection cut out of the overlay group with a destination-out rectangle.
#[derive(Debug, Default)]
pub struct HoleMask {
    hole: Option<ObjectId>,
}

impl HoleMask {
    /// The hole rectangle inside the overlay group, if one exists.
    pub fn hole(&self) -> Option<ObjectId> {
        self.hole
    }
}

impl MaskBinding for HoleMask {
    const KIND: ToolKind = ToolKind::CropSelect;
    const PRIMARY_ONLY: bool = true;
    const HAS_BORDERS: bool = false;

    fn apply(
        &mut self,
        scene: &mut Scene,
        mask: MaskOverlay,
        bounds: Rect,
    ) -> Result<(), OverlayError> {
        let MaskOverlay::Hole { group } = mask else {
            log::debug!("Overlay has no hole group; crop mask update skipped");
            return Ok(());
        };

        let transform = scene.group_transform(group)?;
        let Some(local) = util::send_rect_to_plane(bounds, transform) else {
            log::debug!("Overlay group transform is singular; crop mask update skipped");
            return Ok(());
        };

        match self.hole.filter(|id| scene.contains(*id)) {
            Some(hole) => scene.rect_mut(hole)?.set_bounds(local),
            None => {
                let rect = RectPrimitive::new(local)
                    .with_fill(BLACK)
                    .with_composite(Composite::DestinationOut);
                let hole = scene.add_to_group(group, Primitive::new(PrimitiveKind::Rect(rect)))?;
                self.hole = Some(hole);
            }
        }
        scene.mark_group_dirty(group)
    }

    fn clear(&mut self, scene: &mut Scene, mask: MaskOverlay) -> Result<(), OverlayError> {
        if let Some(hole) = self.hole.take().filter(|id| scene.contains(*id)) {
            scene.remove(hole)?;
        }
        if let MaskOverlay::Hole { group } = mask {
            scene.mark_group_dirty(group)?;
        }
        Ok(())
    }
}

/// Selection excluded from a full-canvas overlay by an even-odd outline.
#[derive(Debug, Default)]
pub struct ClipMask;

impl MaskBinding for ClipMask {
    const KIND: ToolKind = ToolKind::MaskSelect;
    const PRIMARY_ONLY: bool = false;
    const HAS_BORDERS: bool = true;

    fn apply(
        &mut self,
        scene: &mut Scene,
        mask: MaskOverlay,
        bounds: Rect,
    ) -> Result<(), OverlayError> {
        let MaskOverlay::Clip { overlay } = mask else {
            log::debug!("Overlay has no clip rectangle; mask update skipped");
            return Ok(());
        };

        let outer = scene
            .rect(overlay)
            .map(RectPrimitive::bounding_rect)
            .ok_or(OverlayError::ObjectNotFound(overlay))?;
        scene.set_clip(overlay, Some(ClipOutline::with_hole(outer, bounds)))
    }

    fn clear(&mut self, scene: &mut Scene, mask: MaskOverlay) -> Result<(), OverlayError> {
        match mask {
            MaskOverlay::Clip { overlay } if scene.contains(overlay) => scene.set_clip(overlay, None),
            _ => Ok(()),
        }
    }
}

/// Crop-style selection: hole cut out of the overlay group.
pub type CropTool = SelectionTool<HoleMask>;

/// Mask-style selection: even-odd clip on the full-canvas overlay.
pub type MaskTool = SelectionTool<ClipMask>;

/// Pointer-driven selection rectangle kept in sync with the mask.
#[derive(Debug)]
pub struct SelectionTool<M: MaskBinding> {
    lifecycle: Lifecycle,
    options: SelectionOptions,
    shortcut: Option<String>,
    gesture: SelectionGesture,
    selection: Option<ObjectId>,
    binding: M,
    pointer: Subscriptions,
    notifications: Subscriptions,
}

impl<M: MaskBinding> SelectionTool<M> {
    pub fn new(options: SelectionOptions, shortcut: Option<String>) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            options,
            shortcut,
            gesture: SelectionGesture::Idle,
            selection: None,
            binding: M::default(),
            pointer: Subscriptions::default(),
            notifications: Subscriptions::default(),
        }
    }

    pub fn options(&self) -> SelectionOptions {
        self.options
    }

    pub fn gesture(&self) -> SelectionGesture {
        self.gesture
    }

    /// The selection rectangle primitive, if one exists.
    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    /// Current selection bounds in scene coordinates.
    pub fn selection_bounds(&self, scene: &Scene) -> Option<Rect> {
        self.selection
            .and_then(|id| scene.rect(id))
            .map(RectPrimitive::bounding_rect)
    }

    pub fn binding(&self) -> &M {
        &self.binding
    }

    /// Removes the selection and its mask contribution together.
    ///
    /// Notification subscriptions on the old rectangle are released first.
    pub fn clear(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        self.notifications.release(ctx.scene);

        if let Some(selection) = self.selection.take() {
            if let Err(err) = ctx.scene.remove(selection) {
                log::debug!("Selection {} already detached: {}", selection, err);
            }
        }
        if let Some(mask) = ctx.mask {
            self.binding.clear(ctx.scene, mask)?;
        }

        self.gesture = SelectionGesture::Idle;
        ctx.scene.request_render();
        Ok(())
    }

    /// Re-derives the mask from the selection's current bounds.
    ///
    /// Pending scale factors are folded into width and height first so
    /// repeated resizes do not compound.
    pub fn resync(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        let Some(selection) = self.selection else {
            return Ok(());
        };
        let rect = ctx.scene.rect_mut(selection)?;
        rect.normalize_scale();
        let bounds = rect.bounding_rect();
        self.mirror(ctx, bounds)
    }

    fn mirror(&mut self, ctx: &mut ToolContext<'_>, bounds: Rect) -> Result<(), OverlayError> {
        match ctx.mask {
            Some(mask) => self.binding.apply(ctx.scene, mask, bounds)?,
            None => log::debug!("No mask overlay attached; selection not mirrored"),
        }
        ctx.scene.request_render();
        Ok(())
    }

    fn editable(&self) -> Interaction {
        Interaction {
            has_borders: M::HAS_BORDERS,
            ..Interaction::editable(self.options.corner_size, self.options.stroke)
        }
    }

    /// Makes the committed selection interactive and routes its geometry
    /// notifications to [`SelectionTool::resync`].
    fn arm(&mut self, ctx: &mut ToolContext<'_>, selection: ObjectId) -> Result<(), OverlayError> {
        ctx.scene.set_interaction(selection, self.editable())?;
        ctx.scene.set_active_object(selection)?;
        self.notifications.release(ctx.scene);
        self.notifications
            .on_object(ctx.scene, M::KIND, selection, &GEOMETRY_EVENTS)
    }

    fn begin(&mut self, ctx: &mut ToolContext<'_>, anchor: Point) -> Result<(), OverlayError> {
        self.clear(ctx)?;
        self.gesture = SelectionGesture::Drawing { anchor };
        Ok(())
    }

    fn drag(
        &mut self,
        ctx: &mut ToolContext<'_>,
        anchor: Point,
        current: Point,
    ) -> Result<(), OverlayError> {
        let bounds = util::drag_rect(anchor, current);

        match self.selection.filter(|id| ctx.scene.contains(*id)) {
            Some(selection) => ctx.scene.rect_mut(selection)?.set_bounds(bounds),
            None => {
                let rect = RectPrimitive::new(bounds)
                    .with_stroke(self.options.stroke, self.options.stroke_width);
                self.selection = Some(ctx.scene.add(Primitive::new(PrimitiveKind::Rect(rect)))?);
            }
        }
        self.mirror(ctx, bounds)
    }

    fn discards(&self, bounds: Rect) -> bool {
        self.options.discard_empty && util::is_degenerate(&bounds)
    }

    fn release(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        let Some(selection) = self.selection else {
            // Press and release without movement never creates a selection
            self.gesture = SelectionGesture::Idle;
            return Ok(());
        };

        let bounds = self
            .selection_bounds(ctx.scene)
            .ok_or(OverlayError::ObjectNotFound(selection))?;
        if self.discards(bounds) {
            log::debug!("Discarding zero-area selection");
            return self.clear(ctx);
        }

        self.arm(ctx, selection)?;
        self.gesture = SelectionGesture::Committed;
        log::debug!("{} selection committed at {:?}", M::KIND.label(), bounds);
        ctx.scene.request_render();
        Ok(())
    }
}

impl<M: MaskBinding> Tool for SelectionTool<M> {
    fn kind(&self) -> ToolKind {
        M::KIND
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn shortcut_key(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    fn on_activate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        for event in [SurfaceEvent::Down, SurfaceEvent::Move, SurfaceEvent::Up] {
            self.pointer.on(ctx.scene, M::KIND, event);
        }

        if let (SelectionGesture::Committed, Some(selection)) = (self.gesture, self.selection) {
            self.arm(ctx, selection)?;
        }
        ctx.scene.request_render();
        Ok(())
    }

    fn on_deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        self.pointer.release(ctx.scene);
        self.notifications.release(ctx.scene);

        // An unfinished drag is settled as if the button had been released
        if let SelectionGesture::Drawing { .. } = self.gesture {
            match self.selection_bounds(ctx.scene) {
                Some(bounds) if self.discards(bounds) => {
                    log::debug!("Discarding zero-area selection left by tool switch");
                    self.clear(ctx)?;
                }
                Some(_) => self.gesture = SelectionGesture::Committed,
                None => self.gesture = SelectionGesture::Idle,
            }
        }

        if let Some(selection) = self.selection.filter(|id| ctx.scene.contains(*id)) {
            if ctx.scene.active_object() == Some(selection) {
                ctx.scene.discard_active_object();
            }
            ctx.scene.set_interaction(selection, Interaction::inert())?;
        }
        ctx.scene.request_render();
        Ok(())
    }

    fn on_pointer(
        &mut self,
        ctx: &mut ToolContext<'_>,
        event: &PointerEvent,
    ) -> Result<(), OverlayError> {
        match (event.event, self.gesture) {
            (SurfaceEvent::Down, _) => {
                if M::PRIMARY_ONLY && !event.is_primary() {
                    return Ok(());
                }
                if event.target.is_some() && event.target == self.selection {
                    // Grabbed the committed selection; the scene moves it
                    return Ok(());
                }
                self.begin(ctx, event.point)
            }
            (SurfaceEvent::Move, SelectionGesture::Drawing { anchor }) => {
                self.drag(ctx, anchor, event.point)
            }
            (SurfaceEvent::Up, SelectionGesture::Drawing { .. }) => {
                if M::PRIMARY_ONLY && !event.is_primary() {
                    return Ok(());
                }
                self.release(ctx)
            }
            _ => Ok(()),
        }
    }

    fn on_object_event(
        &mut self,
        ctx: &mut ToolContext<'_>,
        object: ObjectId,
        _event: ObjectEvent,
    ) -> Result<(), OverlayError> {
        if Some(object) == self.selection {
            self.resync(ctx)?;
        }
        Ok(())
    }
}
