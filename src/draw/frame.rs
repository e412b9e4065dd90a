//! Append-only log of committed annotations.

use super::shape::Shape;
use crate::scene::ObjectId;

/// A shape that has been frozen on release.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedShape {
    /// Scene primitive that renders this shape
    pub object: ObjectId,
    /// Geometry and style captured at commit time
    pub shape: Shape,
}

/// Ordered record of every shape a drawing tool has committed.
///
/// Entries are never edited or removed; the shape being dragged lives outside
/// the log until it is released.
#[derive(Debug, Default)]
pub struct ShapeLog {
    entries: Vec<CommittedShape>,
}

impl ShapeLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a committed shape (drawn on top of earlier ones).
    pub fn push(&mut self, object: ObjectId, shape: Shape) {
        self.entries.push(CommittedShape { object, shape });
    }

    /// Whether the given primitive belongs to a committed shape.
    pub fn contains_object(&self, object: ObjectId) -> bool {
        self.entries.iter().any(|entry| entry.object == object)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Committed shapes in draw order (first = bottom layer).
    pub fn iter(&self) -> impl Iterator<Item = &CommittedShape> {
        self.entries.iter()
    }
}
