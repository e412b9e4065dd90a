//! Colors, annotation shapes and Cairo rendering.
//!
//! - [`Color`]: RGBA color with the predefined constants the tools use
//! - [`Shape`]: committed annotation geometry (rectangles and arrows)
//! - [`ShapeLog`]: append-only record of committed annotations per tool
//! - [`render`]: rasterization of a whole [`crate::scene::Scene`]

pub mod color;
pub mod frame;
pub mod render;
pub mod shape;

pub use color::Color;
pub use frame::{CommittedShape, ShapeLog};
pub use render::{rasterize, render_scene, render_shape, write_png};
pub use shape::{ArrowHead, Shape};

pub use color::{
    BLACK, BLUE, GREEN, OVERLAY_DIM, RED, SELECTION_BLUE, TRANSPARENT, WHITE, YELLOW,
};
