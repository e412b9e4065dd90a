//! Retained primitives held by the scene.

use crate::asset::LoadedAsset;
use crate::draw::{Color, SELECTION_BLUE, Shape};
use kurbo::{Affine, BezPath, PathEl, Point, Rect};

use super::ObjectId;

/// How a rectangle's pixels combine with what is already drawn in its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Normal painting
    #[default]
    SourceOver,
    /// Erases the layer below wherever the rectangle covers it
    DestinationOut,
}

/// Pointer interaction flags for a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    /// Can become the active object and be manipulated
    pub selectable: bool,
    /// Participates in hit testing at all
    pub evented: bool,
    /// Shows resize handles when active
    pub controls: bool,
    /// Rotation handle disabled
    pub lock_rotation: bool,
    /// Corner handles keep the aspect ratio
    pub lock_uniform_scaling: bool,
    /// Draws an outline around the active object
    pub has_borders: bool,
    /// Side length of a handle's square hit area
    pub corner_size: f64,
    /// Handle fill color
    pub handle_color: Color,
}

impl Interaction {
    /// Ignored by hit testing entirely.
    pub const fn inert() -> Self {
        Self {
            selectable: false,
            evented: false,
            controls: false,
            lock_rotation: true,
            lock_uniform_scaling: false,
            has_borders: false,
            corner_size: 8.0,
            handle_color: SELECTION_BLUE,
        }
    }

    /// Hit-testable but never manipulated (committed annotations).
    pub const fn frozen() -> Self {
        Self {
            evented: true,
            ..Self::inert()
        }
    }

    /// Movable and resizable through eight handles, rotation locked and width
    /// and height independent.
    pub const fn editable(corner_size: f64, handle_color: Color) -> Self {
        Self {
            selectable: true,
            evented: true,
            controls: true,
            lock_rotation: true,
            lock_uniform_scaling: false,
            has_borders: true,
            corner_size,
            handle_color,
        }
    }
}

impl Default for Interaction {
    fn default() -> Self {
        Self::inert()
    }
}

/// The captured screenshot, scaled and positioned inside the viewport.
#[derive(Debug, Clone)]
pub struct ImagePrimitive {
    pub asset: LoadedAsset,
    pub left: f64,
    pub top: f64,
    pub scale: f64,
}

impl ImagePrimitive {
    /// Bounds of the scaled image in scene coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.asset.width * self.scale,
            self.top + self.asset.height * self.scale,
        )
    }
}

/// Axis-aligned rectangle with pending scale factors.
///
/// Resize handles write `scale_x`/`scale_y` and leave `width`/`height`
/// untouched; [`RectPrimitive::normalize_scale`] folds the factors back in.
#[derive(Debug, Clone, PartialEq)]
pub struct RectPrimitive {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub composite: Composite,
    /// Restricts painting to the outline's even-odd interior
    pub clip: Option<ClipOutline>,
}

impl RectPrimitive {
    pub fn new(rect: Rect) -> Self {
        Self {
            left: rect.x0,
            top: rect.y0,
            width: rect.width(),
            height: rect.height(),
            scale_x: 1.0,
            scale_y: 1.0,
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            composite: Composite::SourceOver,
            clip: None,
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_stroke(mut self, stroke: Color, width: f64) -> Self {
        self.stroke = Some(stroke);
        self.stroke_width = width;
        self
    }

    pub fn with_composite(mut self, composite: Composite) -> Self {
        self.composite = composite;
        self
    }

    /// Current extent in its parent's coordinates, scale factors applied.
    pub fn bounding_rect(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.width * self.scale_x,
            self.top + self.height * self.scale_y,
        )
    }

    /// Folds pending scale factors into width/height and resets them to 1.
    pub fn normalize_scale(&mut self) {
        self.width *= self.scale_x;
        self.height *= self.scale_y;
        self.scale_x = 1.0;
        self.scale_y = 1.0;
    }

    /// Replaces the geometry with `rect` at unit scale.
    pub fn set_bounds(&mut self, rect: Rect) {
        self.left = rect.x0;
        self.top = rect.y0;
        self.width = rect.width();
        self.height = rect.height();
        self.scale_x = 1.0;
        self.scale_y = 1.0;
    }
}

/// Container whose children are expressed in its local plane.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPrimitive {
    /// Local → scene transform
    pub transform: Affine,
    /// Children in draw order
    pub children: Vec<ObjectId>,
    /// Set when a child changed and the cached group raster is stale
    pub cache_dirty: bool,
}

impl GroupPrimitive {
    pub fn new(transform: Affine) -> Self {
        Self {
            transform,
            children: Vec::new(),
            cache_dirty: true,
        }
    }
}

/// Even-odd outline made of an outer boundary plus one inner hole.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipOutline {
    path: BezPath,
}

impl ClipOutline {
    /// `outer` clockwise then `hole` as a second sub-path; under the even-odd
    /// rule the hole is excluded from the painted region.
    pub fn with_hole(outer: Rect, hole: Rect) -> Self {
        let mut path = BezPath::new();
        push_rect(&mut path, outer);
        push_rect(&mut path, hole);
        Self { path }
    }

    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Bounding rectangle of each closed sub-path, in path order.
    pub fn subpaths(&self) -> Vec<Rect> {
        let mut rects = Vec::new();
        let mut current: Option<Rect> = None;

        for el in self.path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    if let Some(rect) = current.take() {
                        rects.push(rect);
                    }
                    current = Some(Rect::from_points(p, p));
                }
                PathEl::LineTo(p) => {
                    if let Some(rect) = current.as_mut() {
                        *rect = rect.union_pt(p);
                    }
                }
                PathEl::ClosePath => {
                    if let Some(rect) = current.take() {
                        rects.push(rect);
                    }
                }
                _ => {}
            }
        }

        if let Some(rect) = current {
            rects.push(rect);
        }
        rects
    }
}

fn push_rect(path: &mut BezPath, rect: Rect) {
    path.move_to(Point::new(rect.x0, rect.y0));
    path.line_to(Point::new(rect.x1, rect.y0));
    path.line_to(Point::new(rect.x1, rect.y1));
    path.line_to(Point::new(rect.x0, rect.y1));
    path.close_path();
}

/// What a primitive draws.
#[derive(Debug, Clone)]
pub enum PrimitiveKind {
    Image(ImagePrimitive),
    Rect(RectPrimitive),
    Group(GroupPrimitive),
    Shape(Shape),
}

/// A node attached to the scene.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub interaction: Interaction,
    /// Owning group, if any
    pub parent: Option<ObjectId>,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            interaction: Interaction::inert(),
            parent: None,
        }
    }

    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn as_rect(&self) -> Option<&RectPrimitive> {
        match &self.kind {
            PrimitiveKind::Rect(rect) => Some(rect),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupPrimitive> {
        match &self.kind {
            PrimitiveKind::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImagePrimitive> {
        match &self.kind {
            PrimitiveKind::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match &self.kind {
            PrimitiveKind::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    /// Hit test in the primitive's parent plane. Groups never match directly.
    pub fn contains(&self, point: Point) -> bool {
        match &self.kind {
            PrimitiveKind::Image(image) => image.bounds().contains(point),
            PrimitiveKind::Rect(rect) => {
                let half = rect.stroke_width / 2.0;
                rect.bounding_rect().inflate(half, half).contains(point)
            }
            PrimitiveKind::Shape(shape) => shape.contains(point),
            PrimitiveKind::Group(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_scale_into_size() {
        let mut rect = RectPrimitive::new(Rect::new(10.0, 10.0, 110.0, 60.0));
        rect.scale_x = 1.5;
        rect.scale_y = 2.0;
        assert_eq!(rect.bounding_rect(), Rect::new(10.0, 10.0, 160.0, 110.0));

        rect.normalize_scale();
        assert_eq!((rect.width, rect.height), (150.0, 100.0));
        assert_eq!((rect.scale_x, rect.scale_y), (1.0, 1.0));
        assert_eq!(rect.bounding_rect(), Rect::new(10.0, 10.0, 160.0, 110.0));
    }

    #[test]
    fn clip_outline_exposes_outer_and_hole() {
        let outer = Rect::new(0.0, 0.0, 800.0, 600.0);
        let hole = Rect::new(100.0, 100.0, 300.0, 250.0);
        let outline = ClipOutline::with_hole(outer, hole);
        assert_eq!(outline.subpaths(), vec![outer, hole]);
    }

    #[test]
    fn frozen_primitives_are_hit_but_not_selectable() {
        let frozen = Interaction::frozen();
        assert!(frozen.evented);
        assert!(!frozen.selectable);
        assert!(!Interaction::inert().evented);
    }
}
