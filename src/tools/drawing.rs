//! Rectangle and arrow annotation tools.
//!
//! One shape per press-move-release cycle. The shape is created on the first
//! move, updated in place while dragging, then frozen and appended to the
//! tool's [`ShapeLog`] on release. A press on an already committed shape is
//! ignored.

use super::{Lifecycle, Subscriptions, Tool, ToolContext};
use crate::draw::{Color, RED, Shape, ShapeLog};
use crate::error::OverlayError;
use crate::input::{ToolKind, WheelDelta};
use crate::scene::{Interaction, ObjectId, PointerEvent, Primitive, PrimitiveKind, SurfaceEvent};
use crate::util;
use kurbo::Point;

/// Stroke width bounds for wheel adjustment.
const MIN_STROKE: f64 = 1.0;
const MAX_STROKE: f64 = 20.0;
const STROKE_STEP: f64 = 1.0;

/// Rectangle tool style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectOptions {
    pub stroke: Color,
    pub fill: Option<Color>,
    pub stroke_width: f64,
    pub corner_radius: f64,
}

impl Default for RectOptions {
    fn default() -> Self {
        Self {
            stroke: RED,
            fill: None,
            stroke_width: 2.0,
            corner_radius: 0.0,
        }
    }
}

/// Arrow tool style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowOptions {
    pub color: Color,
    pub stroke_width: f64,
    /// Side length of the head triangle
    pub head_length: f64,
}

impl Default for ArrowOptions {
    fn default() -> Self {
        Self {
            color: RED,
            stroke_width: 2.0,
            head_length: 15.0,
        }
    }
}

/// The shape being dragged out, not yet committed.
#[derive(Debug, Clone, Copy)]
struct Drag {
    anchor: Point,
    object: Option<ObjectId>,
}

/// Gesture and log bookkeeping shared by the rectangle and arrow tools.
#[derive(Debug, Default)]
struct ShapeDrag {
    lifecycle: Lifecycle,
    pointer: Subscriptions,
    drag: Option<Drag>,
    shapes: ShapeLog,
}

impl ShapeDrag {
    fn subscribe(&mut self, ctx: &mut ToolContext<'_>, owner: ToolKind) {
        for event in [SurfaceEvent::Down, SurfaceEvent::Move, SurfaceEvent::Up] {
            self.pointer.on(ctx.scene, owner, event);
        }
    }

    fn unsubscribe(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        self.pointer.release(ctx.scene);
        // A shape still being dragged is committed as it stands
        self.commit(ctx)
    }

    fn handle(
        &mut self,
        ctx: &mut ToolContext<'_>,
        event: &PointerEvent,
        build: impl Fn(Point, Point) -> Shape,
    ) -> Result<(), OverlayError> {
        match event.event {
            SurfaceEvent::Down => {
                if !event.is_primary() || self.drag.is_some() {
                    return Ok(());
                }
                if event
                    .target
                    .is_some_and(|target| self.shapes.contains_object(target))
                {
                    log::debug!("Press landed on a committed shape; ignoring");
                    return Ok(());
                }
                self.drag = Some(Drag {
                    anchor: event.point,
                    object: None,
                });
                Ok(())
            }
            SurfaceEvent::Move => {
                let Some(drag) = self.drag.as_mut() else {
                    return Ok(());
                };
                let shape = build(drag.anchor, event.point);
                match drag.object.filter(|id| ctx.scene.contains(*id)) {
                    Some(object) => ctx.scene.set_shape(object, shape)?,
                    None => {
                        let object = ctx.scene.add(Primitive::new(PrimitiveKind::Shape(shape)))?;
                        drag.object = Some(object);
                    }
                }
                ctx.scene.request_render();
                Ok(())
            }
            SurfaceEvent::Up => self.commit(ctx),
            SurfaceEvent::Out => Ok(()),
        }
    }

    /// Freezes the dragged shape and appends it to the log.
    fn commit(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };
        let Some(object) = drag.object else {
            return Ok(());
        };
        let Some(shape) = ctx.scene.shape(object).cloned() else {
            log::debug!("Dragged shape {} vanished before commit", object);
            return Ok(());
        };

        ctx.scene.set_interaction(object, Interaction::frozen())?;
        self.shapes.push(object, shape);
        ctx.scene.request_render();
        Ok(())
    }
}

fn wheel_stroke(width: f64, delta: WheelDelta) -> f64 {
    util::wheel_step(width, delta.delta_y, STROKE_STEP, MIN_STROKE, MAX_STROKE)
}

/// Draws stroked (optionally filled) rectangles.
#[derive(Debug, Default)]
pub struct RectTool {
    options: RectOptions,
    shortcut: Option<String>,
    state: ShapeDrag,
}

impl RectTool {
    pub fn new(options: RectOptions, shortcut: Option<String>) -> Self {
        Self {
            options,
            shortcut,
            state: ShapeDrag::default(),
        }
    }

    pub fn config(&self) -> RectOptions {
        self.options
    }

    /// Replaces the style used for shapes drawn from now on.
    pub fn set_config(&mut self, options: RectOptions) {
        self.options = options;
    }

    /// Committed rectangles in draw order.
    pub fn shapes(&self) -> &ShapeLog {
        &self.state.shapes
    }

    /// Whether a drag is in progress.
    pub fn is_drawing(&self) -> bool {
        self.state.drag.is_some()
    }
}

impl Tool for RectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Rectangle
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.state.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.state.lifecycle
    }

    fn shortcut_key(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    fn handles_wheel(&self) -> bool {
        true
    }

    fn on_activate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        self.state.subscribe(ctx, ToolKind::Rectangle);
        Ok(())
    }

    fn on_deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        self.state.unsubscribe(ctx)
    }

    fn on_pointer(
        &mut self,
        ctx: &mut ToolContext<'_>,
        event: &PointerEvent,
    ) -> Result<(), OverlayError> {
        let options = self.options;
        self.state.handle(ctx, event, |anchor, current| Shape::Rect {
            rect: util::drag_rect(anchor, current),
            stroke: options.stroke,
            fill: options.fill,
            stroke_width: options.stroke_width,
            corner_radius: options.corner_radius,
        })
    }

    fn on_wheel(&mut self, _ctx: &mut ToolContext<'_>, delta: WheelDelta) {
        self.options.stroke_width = wheel_stroke(self.options.stroke_width, delta);
        log::debug!("Rectangle stroke width {}", self.options.stroke_width);
    }
}

/// Draws a line with a triangular head centered on the release point.
#[derive(Debug, Default)]
pub struct ArrowTool {
    options: ArrowOptions,
    shortcut: Option<String>,
    state: ShapeDrag,
}

impl ArrowTool {
    pub fn new(options: ArrowOptions, shortcut: Option<String>) -> Self {
        Self {
            options,
            shortcut,
            state: ShapeDrag::default(),
        }
    }

    pub fn config(&self) -> ArrowOptions {
        self.options
    }

    /// Replaces the style used for arrows drawn from now on.
    pub fn set_config(&mut self, options: ArrowOptions) {
        self.options = options;
    }

    /// Committed arrows in draw order.
    pub fn shapes(&self) -> &ShapeLog {
        &self.state.shapes
    }

    pub fn is_drawing(&self) -> bool {
        self.state.drag.is_some()
    }
}

impl Tool for ArrowTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Arrow
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.state.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.state.lifecycle
    }

    fn shortcut_key(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    fn handles_wheel(&self) -> bool {
        true
    }

    fn on_activate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        self.state.subscribe(ctx, ToolKind::Arrow);
        Ok(())
    }

    fn on_deactivate(&mut self, ctx: &mut ToolContext<'_>) -> Result<(), OverlayError> {
        self.state.unsubscribe(ctx)
    }

    fn on_pointer(
        &mut self,
        ctx: &mut ToolContext<'_>,
        event: &PointerEvent,
    ) -> Result<(), OverlayError> {
        let options = self.options;
        self.state.handle(ctx, event, |tail, tip| Shape::Arrow {
            tail,
            tip,
            color: options.color,
            stroke_width: options.stroke_width,
            head_length: options.head_length,
        })
    }

    fn on_wheel(&mut self, _ctx: &mut ToolContext<'_>, delta: WheelDelta) {
        self.options.stroke_width = wheel_stroke(self.options.stroke_width, delta);
        log::debug!("Arrow stroke width {}", self.options.stroke_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ListenerKind, LocalHost, MouseButton};
    use crate::scene::Scene;

    fn ctx<'a>(scene: &'a mut Scene, host: &'a mut LocalHost) -> ToolContext<'a> {
        ToolContext {
            scene,
            host,
            mask: None,
        }
    }

    fn drag(tool: &mut dyn Tool, ctx: &mut ToolContext<'_>, from: (f64, f64), to: (f64, f64)) {
        let down = PointerEvent::down(from.into(), MouseButton::Left);
        let target = ctx.scene.hit_test(from.into());
        tool.on_pointer(ctx, &PointerEvent { target, ..down }).unwrap();
        tool.on_pointer(ctx, &PointerEvent::moved(to.into())).unwrap();
        tool.on_pointer(ctx, &PointerEvent::up(to.into(), MouseButton::Left))
            .unwrap();
    }

    #[test]
    fn arrow_commit_freezes_and_logs() {
        let mut scene = Scene::new(800.0, 600.0);
        let mut host = LocalHost::new();
        let mut ctx = ctx(&mut scene, &mut host);
        let mut tool = ArrowTool::default();
        tool.activate(&mut ctx).unwrap();

        drag(&mut tool, &mut ctx, (0.0, 0.0), (10.0, 10.0));

        assert_eq!(tool.shapes().len(), 1);
        let entry = tool.shapes().iter().next().unwrap();
        let primitive = ctx.scene.get(entry.object).unwrap();
        assert!(!primitive.interaction.selectable);
        assert!(primitive.interaction.evented);
        assert!(matches!(
            entry.shape,
            Shape::Arrow { tip, .. } if tip == Point::new(10.0, 10.0)
        ));
    }

    #[test]
    fn press_on_committed_shape_is_ignored() {
        let mut scene = Scene::new(800.0, 600.0);
        let mut host = LocalHost::new();
        let mut ctx = ctx(&mut scene, &mut host);
        let mut tool = RectTool::default();
        tool.activate(&mut ctx).unwrap();

        drag(&mut tool, &mut ctx, (100.0, 100.0), (200.0, 200.0));
        drag(&mut tool, &mut ctx, (150.0, 150.0), (400.0, 400.0));

        assert_eq!(tool.shapes().len(), 1);
        assert_eq!(ctx.scene.len(), 1);
    }

    #[test]
    fn click_without_move_commits_nothing() {
        let mut scene = Scene::new(800.0, 600.0);
        let mut host = LocalHost::new();
        let mut ctx = ctx(&mut scene, &mut host);
        let mut tool = RectTool::default();
        tool.activate(&mut ctx).unwrap();

        let down = PointerEvent::down(Point::new(300.0, 300.0), MouseButton::Left);
        tool.on_pointer(&mut ctx, &down).unwrap();
        assert!(tool.is_drawing());
        tool.on_pointer(&mut ctx, &PointerEvent::up(Point::new(300.0, 300.0), MouseButton::Left))
            .unwrap();
        assert!(tool.shapes().is_empty());
        assert!(ctx.scene.is_empty());
        assert!(!tool.is_drawing());
    }

    #[test]
    fn wheel_clamps_stroke_width() {
        let mut scene = Scene::new(800.0, 600.0);
        let mut host = LocalHost::new();
        let mut ctx = ctx(&mut scene, &mut host);
        let mut tool = ArrowTool::default();

        for _ in 0..25 {
            tool.on_wheel(&mut ctx, WheelDelta::UP);
            assert!(tool.config().stroke_width <= 20.0);
        }
        assert_eq!(tool.config().stroke_width, 20.0);

        for _ in 0..40 {
            tool.on_wheel(&mut ctx, WheelDelta::DOWN);
        }
        assert_eq!(tool.config().stroke_width, 1.0);
    }

    #[test]
    fn deactivate_mid_drag_commits_shape() {
        let mut scene = Scene::new(800.0, 600.0);
        let mut host = LocalHost::new();
        let mut ctx = ctx(&mut scene, &mut host);
        let mut tool = RectTool::default();
        tool.activate(&mut ctx).unwrap();

        tool.on_pointer(
            &mut ctx,
            &PointerEvent::down(Point::new(10.0, 10.0), MouseButton::Left),
        )
        .unwrap();
        tool.on_pointer(&mut ctx, &PointerEvent::moved(Point::new(60.0, 40.0)))
            .unwrap();
        tool.deactivate(&mut ctx).unwrap();
        drop(ctx);

        assert_eq!(tool.shapes().len(), 1);
        assert_eq!(scene.subscription_count(ToolKind::Rectangle), 0);
        assert_eq!(host.listener_count(ListenerKind::Wheel), 0);
    }
}
