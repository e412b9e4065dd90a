//! Shape definitions for freeform annotations.

use super::color::Color;
use crate::util;
use kurbo::{Affine, Point, Rect};

/// Represents a drawable annotation on top of the screenshot.
///
/// Each variant carries its own style so committed shapes render independently
/// of later tool configuration changes.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Rectangle drawn by the rectangle tool
    Rect {
        /// Outline rectangle in scene coordinates
        rect: Rect,
        /// Border color
        stroke: Color,
        /// Optional interior fill (transparent when `None`)
        fill: Option<Color>,
        /// Border thickness in pixels
        stroke_width: f64,
        /// Corner radius in pixels
        corner_radius: f64,
    },
    /// Line with a triangular head centered on the tip
    Arrow {
        /// Where the drag started
        tail: Point,
        /// Where the drag ended; the head sits here
        tip: Point,
        /// Line and head color
        color: Color,
        /// Line thickness in pixels
        stroke_width: f64,
        /// Side length of the head triangle in pixels
        head_length: f64,
    },
}

impl Shape {
    /// Returns the axis-aligned bounding box, expanded to cover the stroke.
    pub fn bounding_box(&self) -> Rect {
        match self {
            Shape::Rect {
                rect, stroke_width, ..
            } => rect.inflate(stroke_width / 2.0, stroke_width / 2.0),
            Shape::Arrow {
                tail,
                tip,
                stroke_width,
                head_length,
                ..
            } => {
                let line = Rect::from_points(*tail, *tip).inflate(stroke_width / 2.0, stroke_width / 2.0);
                let head = ArrowHead::new(*tail, *tip, *head_length);
                head.vertices()
                    .iter()
                    .fold(line, |acc, vertex| acc.union_pt(*vertex))
            }
        }
    }

    /// Hit test against the shape's bounding box.
    pub fn contains(&self, point: Point) -> bool {
        let bounds = self.bounding_box();
        point.x >= bounds.x0 && point.x <= bounds.x1 && point.y >= bounds.y0 && point.y <= bounds.y1
    }
}

/// Triangular arrowhead centered on the arrow tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    /// Center of the triangle (the arrow tip)
    pub center: Point,
    /// Width and height of the triangle
    pub size: f64,
    /// Rotation in degrees; 0° has the apex pointing up
    pub rotation_degrees: f64,
}

impl ArrowHead {
    pub fn new(tail: Point, tip: Point, size: f64) -> Self {
        Self {
            center: tip,
            size,
            rotation_degrees: util::arrow_head_rotation(tail, tip),
        }
    }

    /// Triangle vertices in scene coordinates: apex first, then the base corners.
    pub fn vertices(&self) -> [Point; 3] {
        let half = self.size / 2.0;
        let placement =
            Affine::translate(self.center.to_vec2()) * Affine::rotate(self.rotation_degrees.to_radians());
        [
            placement * Point::new(0.0, -half),
            placement * Point::new(-half, half),
            placement * Point::new(half, half),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::RED;

    fn arrow(tail: (f64, f64), tip: (f64, f64)) -> Shape {
        Shape::Arrow {
            tail: tail.into(),
            tip: tip.into(),
            color: RED,
            stroke_width: 2.0,
            head_length: 15.0,
        }
    }

    #[test]
    fn arrow_head_apex_points_along_line() {
        let head = ArrowHead::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 10.0);
        let [apex, _, _] = head.vertices();
        assert!((apex.x - 105.0).abs() < 1e-9);
        assert!(apex.y.abs() < 1e-9);
    }

    #[test]
    fn diagonal_arrow_head_rotation() {
        let head = ArrowHead::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 15.0);
        assert!((head.rotation_degrees - 135.0).abs() < 1e-9);
    }

    #[test]
    fn arrow_bounds_cover_head() {
        let bounds = arrow((0.0, 0.0), (100.0, 0.0)).bounding_box();
        assert!(bounds.x1 >= 107.5 - 1e-9);
        assert!(bounds.y0 <= -7.5 + 1e-9);
    }

    #[test]
    fn rect_bounds_include_stroke() {
        let shape = Shape::Rect {
            rect: Rect::new(10.0, 10.0, 50.0, 30.0),
            stroke: RED,
            fill: None,
            stroke_width: 4.0,
            corner_radius: 0.0,
        };
        assert_eq!(shape.bounding_box(), Rect::new(8.0, 8.0, 52.0, 32.0));
        assert!(shape.contains(Point::new(30.0, 20.0)));
        assert!(!shape.contains(Point::new(60.0, 20.0)));
    }
}
