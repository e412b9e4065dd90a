//! Cairo-based rasterization of the overlay scene.
//!
//! Primitives are painted in draw order. Groups are composited through an
//! intermediate cairo group so a destination-out child only cuts into its
//! siblings, which is how the crop hole shows the background through the
//! dimming layer. A rectangle with a clip outline is restricted to the
//! outline's even-odd interior.

use super::color::Color;
use super::shape::{ArrowHead, Shape};
use crate::error::OverlayError;
use crate::scene::{
    Composite, GroupPrimitive, Handle, ImagePrimitive, ObjectId, PrimitiveKind, RectPrimitive,
    Scene,
};
use cairo::{Context, Format, ImageSurface};
use kurbo::{Affine, BezPath, PathEl, Rect};
use std::io::{Cursor, Write};

/// Placeholder fill for backgrounds loaded without pixel data.
const PLACEHOLDER: Color = Color::new(0.5, 0.5, 0.5, 1.0);

fn set_source(ctx: &Context, color: Color) {
    ctx.set_source_rgba(color.r, color.g, color.b, color.a);
}

fn to_matrix(transform: Affine) -> cairo::Matrix {
    let [xx, yx, xy, yy, x0, y0] = transform.as_coeffs();
    cairo::Matrix::new(xx, yx, xy, yy, x0, y0)
}

fn append_path(ctx: &Context, path: &BezPath) {
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
            PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
            PathEl::QuadTo(c, p) => {
                // Cairo has no quadratic segment; elevate to cubic
                let (x0, y0) = ctx.current_point().unwrap_or((c.x, c.y));
                ctx.curve_to(
                    x0 + 2.0 / 3.0 * (c.x - x0),
                    y0 + 2.0 / 3.0 * (c.y - y0),
                    p.x + 2.0 / 3.0 * (c.x - p.x),
                    p.y + 2.0 / 3.0 * (c.y - p.y),
                    p.x,
                    p.y,
                );
            }
            PathEl::CurveTo(c1, c2, p) => ctx.curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathEl::ClosePath => ctx.close_path(),
        }
    }
}

/// Paints every primitive in `scene`, bottom to top, followed by the active
/// object's border and handles.
pub fn render_scene(ctx: &Context, scene: &Scene) {
    for (id, _) in scene.objects() {
        render_object(ctx, scene, id);
    }
    render_active_controls(ctx, scene);
}

fn render_object(ctx: &Context, scene: &Scene, id: ObjectId) {
    let Some(primitive) = scene.get(id) else {
        return;
    };
    match &primitive.kind {
        PrimitiveKind::Image(image) => render_image(ctx, image),
        PrimitiveKind::Rect(rect) => render_rect(ctx, rect),
        PrimitiveKind::Group(group) => render_group(ctx, scene, group),
        PrimitiveKind::Shape(shape) => render_shape(ctx, shape),
    }
}

/// Draws the background image scaled into place.
///
/// Undecodable data is logged and replaced by a flat placeholder so the rest
/// of the overlay still renders.
pub fn render_image(ctx: &Context, image: &ImagePrimitive) {
    let bounds = image.bounds();

    if image.asset.has_pixels() {
        match ImageSurface::create_from_png(&mut Cursor::new(&image.asset.data[..])) {
            Ok(surface) => {
                let _ = ctx.save();
                ctx.translate(image.left, image.top);
                ctx.scale(image.scale, image.scale);
                let _ = ctx.set_source_surface(&surface, 0.0, 0.0);
                let _ = ctx.paint();
                let _ = ctx.restore();
                return;
            }
            Err(err) => log::warn!("Failed to decode background {}: {}", image.asset.url, err),
        }
    }

    set_source(ctx, PLACEHOLDER);
    ctx.rectangle(bounds.x0, bounds.y0, bounds.width(), bounds.height());
    let _ = ctx.fill();
}

/// Draws a filled and/or stroked rectangle primitive, honoring its composite
/// operator and clip outline.
pub fn render_rect(ctx: &Context, rect: &RectPrimitive) {
    let bounds = rect.bounding_rect();
    let _ = ctx.save();

    if let Some(clip) = &rect.clip {
        append_path(ctx, clip.path());
        ctx.set_fill_rule(cairo::FillRule::EvenOdd);
        ctx.clip();
        ctx.set_fill_rule(cairo::FillRule::Winding);
    }

    if rect.composite == Composite::DestinationOut {
        ctx.set_operator(cairo::Operator::DestOut);
    }

    if let Some(fill) = rect.fill {
        set_source(ctx, fill);
        ctx.rectangle(bounds.x0, bounds.y0, bounds.width(), bounds.height());
        let _ = ctx.fill();
    }

    if let Some(stroke) = rect.stroke.filter(|_| rect.stroke_width > 0.0) {
        set_source(ctx, stroke);
        ctx.set_line_width(rect.stroke_width);
        ctx.set_line_join(cairo::LineJoin::Miter);
        ctx.rectangle(bounds.x0, bounds.y0, bounds.width(), bounds.height());
        let _ = ctx.stroke();
    }

    let _ = ctx.restore();
}

fn render_group(ctx: &Context, scene: &Scene, group: &GroupPrimitive) {
    let _ = ctx.save();
    ctx.transform(to_matrix(group.transform));
    ctx.push_group();
    for child in &group.children {
        render_object(ctx, scene, *child);
    }
    let _ = ctx.pop_group_to_source();
    let _ = ctx.paint();
    let _ = ctx.restore();
}

/// Renders a committed or in-progress annotation.
pub fn render_shape(ctx: &Context, shape: &Shape) {
    match shape {
        Shape::Rect {
            rect,
            stroke,
            fill,
            stroke_width,
            corner_radius,
        } => render_rounded_rect(ctx, *rect, *stroke, *fill, *stroke_width, *corner_radius),
        Shape::Arrow {
            tail,
            tip,
            color,
            stroke_width,
            head_length,
        } => {
            let _ = ctx.save();
            set_source(ctx, *color);
            ctx.set_line_width(*stroke_width);
            ctx.set_line_cap(cairo::LineCap::Round);
            ctx.move_to(tail.x, tail.y);
            ctx.line_to(tip.x, tip.y);
            let _ = ctx.stroke();

            let [apex, left, right] = ArrowHead::new(*tail, *tip, *head_length).vertices();
            ctx.move_to(apex.x, apex.y);
            ctx.line_to(left.x, left.y);
            ctx.line_to(right.x, right.y);
            ctx.close_path();
            let _ = ctx.fill();
            let _ = ctx.restore();
        }
    }
}

fn render_rounded_rect(
    ctx: &Context,
    rect: Rect,
    stroke: Color,
    fill: Option<Color>,
    stroke_width: f64,
    corner_radius: f64,
) {
    let radius = corner_radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
    let _ = ctx.save();

    ctx.new_path();
    if radius > 0.0 {
        use std::f64::consts::{FRAC_PI_2, PI};
        ctx.arc(rect.x1 - radius, rect.y0 + radius, radius, -FRAC_PI_2, 0.0);
        ctx.arc(rect.x1 - radius, rect.y1 - radius, radius, 0.0, FRAC_PI_2);
        ctx.arc(rect.x0 + radius, rect.y1 - radius, radius, FRAC_PI_2, PI);
        ctx.arc(rect.x0 + radius, rect.y0 + radius, radius, PI, PI + FRAC_PI_2);
        ctx.close_path();
    } else {
        ctx.rectangle(rect.x0, rect.y0, rect.width(), rect.height());
    }

    if let Some(fill) = fill {
        set_source(ctx, fill);
        let _ = ctx.fill_preserve();
    }
    set_source(ctx, stroke);
    ctx.set_line_width(stroke_width);
    ctx.set_line_join(cairo::LineJoin::Miter);
    let _ = ctx.stroke();

    let _ = ctx.restore();
}

/// Border and resize handles of the active object, if it shows any.
fn render_active_controls(ctx: &Context, scene: &Scene) {
    let Some(id) = scene.active_object() else {
        return;
    };
    let Some(primitive) = scene.get(id) else {
        return;
    };
    let Some(rect) = primitive.as_rect() else {
        return;
    };
    let interaction = primitive.interaction;
    let bounds = rect.bounding_rect();

    let _ = ctx.save();
    ctx.transform(to_matrix(scene.plane_transform(id)));
    set_source(ctx, interaction.handle_color);

    if interaction.has_borders {
        ctx.set_line_width(1.0);
        ctx.rectangle(bounds.x0, bounds.y0, bounds.width(), bounds.height());
        let _ = ctx.stroke();
    }

    if interaction.controls {
        let half = interaction.corner_size / 2.0;
        for (_, center) in Handle::resize_anchors(bounds) {
            ctx.rectangle(
                center.x - half,
                center.y - half,
                interaction.corner_size,
                interaction.corner_size,
            );
        }
        let _ = ctx.fill();
    }

    let _ = ctx.restore();
}

/// Rasterizes `scene` into a new ARGB surface of the viewport's size.
pub fn rasterize(scene: &Scene) -> Result<ImageSurface, OverlayError> {
    let width = scene.width().ceil() as i32;
    let height = scene.height().ceil() as i32;
    let surface = ImageSurface::create(Format::ARgb32, width.max(1), height.max(1))
        .map_err(|err| OverlayError::Render(err.to_string()))?;
    {
        let ctx = Context::new(&surface).map_err(|err| OverlayError::Render(err.to_string()))?;
        render_scene(&ctx, scene);
    }
    surface.flush();
    Ok(surface)
}

/// Rasterizes `scene` and writes it as PNG.
pub fn write_png(scene: &Scene, out: &mut impl Write) -> Result<(), OverlayError> {
    let surface = rasterize(scene)?;
    surface
        .write_to_png(out)
        .map_err(|err| OverlayError::Render(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{BLACK, RED};
    use kurbo::Point;

    fn pixel(surface: &mut ImageSurface, x: i32, y: i32) -> [u8; 4] {
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let offset = y as usize * stride + x as usize * 4;
        [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]
    }

    #[test]
    fn matrix_conversion_keeps_translation_and_scale() {
        let matrix = to_matrix(Affine::translate((5.0, 7.0)) * Affine::scale(2.0));
        let (x, y) = matrix.transform_point(1.0, 1.0);
        assert_eq!((x, y), (7.0, 9.0));
    }

    #[test]
    fn arrow_paints_head_at_tip() {
        let surface = ImageSurface::create(Format::ARgb32, 64, 64).unwrap();
        {
            let ctx = Context::new(&surface).unwrap();
            render_shape(
                &ctx,
                &Shape::Arrow {
                    tail: Point::new(4.0, 32.0),
                    tip: Point::new(48.0, 32.0),
                    color: RED,
                    stroke_width: 2.0,
                    head_length: 12.0,
                },
            );
        }
        let mut surface = surface;
        // Inside the head triangle, off the line
        assert_ne!(pixel(&mut surface, 46, 34)[3], 0);
        assert_eq!(pixel(&mut surface, 20, 50)[3], 0);
    }

    #[test]
    fn destination_out_rect_clears_pixels() {
        let surface = ImageSurface::create(Format::ARgb32, 20, 20).unwrap();
        {
            let ctx = Context::new(&surface).unwrap();
            render_rect(&ctx, &RectPrimitive::new(Rect::new(0.0, 0.0, 20.0, 20.0)).with_fill(BLACK));
            render_rect(
                &ctx,
                &RectPrimitive::new(Rect::new(5.0, 5.0, 15.0, 15.0))
                    .with_fill(BLACK)
                    .with_composite(Composite::DestinationOut),
            );
        }
        let mut surface = surface;
        assert_eq!(pixel(&mut surface, 10, 10)[3], 0);
        assert_eq!(pixel(&mut surface, 2, 2)[3], 255);
    }
}
