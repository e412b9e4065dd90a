//! Geometry and transform helpers shared by the tools and the scene.
//!
//! This module provides:
//! - Drag-rectangle normalization (anchor + current pointer → axis-aligned rect)
//! - Global → group-local point/rect conversion through an affine transform
//! - Fit-to-viewport placement of the captured image
//! - Arrowhead rotation and clamped wheel stepping
//! - Color name lookup for the configuration file

use crate::draw::{Color, color::*};
use kurbo::{Affine, Point, Rect};

// ============================================================================
// Drag Geometry
// ============================================================================

/// Builds the axis-aligned rectangle spanned by a drag gesture.
///
/// `left = min(anchor.x, current.x)`, `top = min(anchor.y, current.y)`,
/// width and height are the absolute deltas. Dragging in any direction yields
/// the same rectangle.
pub fn drag_rect(anchor: Point, current: Point) -> Rect {
    let left = anchor.x.min(current.x);
    let top = anchor.y.min(current.y);
    let width = (current.x - anchor.x).abs();
    let height = (current.y - anchor.y).abs();
    Rect::new(left, top, left + width, top + height)
}

/// Returns true when the rectangle has no area along either axis.
pub fn is_degenerate(rect: &Rect) -> bool {
    rect.width() <= 0.0 || rect.height() <= 0.0
}

// ============================================================================
// Plane Conversion
// ============================================================================

/// Maps a global scene point into the local plane of a transformed group.
///
/// `transform` is the group's local → global matrix; the point is sent through
/// its inverse. Returns `None` when the matrix cannot be inverted.
pub fn send_point_to_plane(point: Point, transform: Affine) -> Option<Point> {
    let det = transform.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    Some(transform.inverse() * point)
}

/// Maps a global rectangle into a group's local plane.
///
/// Both corners are converted so a scaled group receives a correspondingly
/// scaled rectangle; the result is re-normalized in case the group mirrors.
pub fn send_rect_to_plane(rect: Rect, transform: Affine) -> Option<Rect> {
    let p0 = send_point_to_plane(Point::new(rect.x0, rect.y0), transform)?;
    let p1 = send_point_to_plane(Point::new(rect.x1, rect.y1), transform)?;
    Some(Rect::new(p0.x, p0.y, p1.x, p1.y).abs())
}

// ============================================================================
// Background Placement
// ============================================================================

/// Placement of the background image inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Uniform scale factor applied to the image.
    pub scale: f64,
    /// Left edge of the scaled image in scene coordinates.
    pub left: f64,
    /// Top edge of the scaled image in scene coordinates.
    pub top: f64,
}

/// Scales an image to fit the viewport (aspect preserved) and centers it.
///
/// The scale factor is `min(viewport_w / image_w, viewport_h / image_h)`.
/// Degenerate image sizes fall back to an unscaled placement at the origin.
pub fn fit_to_viewport(image_w: f64, image_h: f64, viewport_w: f64, viewport_h: f64) -> Placement {
    if image_w <= 0.0 || image_h <= 0.0 {
        return Placement {
            scale: 1.0,
            left: 0.0,
            top: 0.0,
        };
    }

    let scale = (viewport_w / image_w).min(viewport_h / image_h);
    Placement {
        scale,
        left: (viewport_w - image_w * scale) / 2.0,
        top: (viewport_h - image_h * scale) / 2.0,
    }
}

// ============================================================================
// Arrowhead & Wheel Helpers
// ============================================================================

/// Rotation of a triangular arrowhead centered on `tip`, in degrees.
///
/// The triangle's apex points up at 0°, so the line direction
/// `atan2(dy, dx)` is offset by 90°.
pub fn arrow_head_rotation(tail: Point, tip: Point) -> f64 {
    let angle = (tip.y - tail.y).atan2(tip.x - tail.x);
    angle.to_degrees() + 90.0
}

/// Moves `value` one step in the wheel direction and clamps to `[min, max]`.
///
/// A positive `delta_y` (scrolling down) decreases the value; anything else
/// increases it, matching the browser wheel convention.
pub fn wheel_step(value: f64, delta_y: f64, step: f64, min: f64, max: f64) -> f64 {
    let delta = if delta_y > 0.0 { -step } else { step };
    (value + delta).clamp(min, max)
}

/// Rounds to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from the config file.
///
/// # Supported Names (case-insensitive)
/// - "red", "green", "blue", "yellow", "white", "black", "selection"
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        "selection" => Some(SELECTION_BLUE),
        _ => None,
    }
}
