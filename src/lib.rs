//! Screenshot annotation overlay core.
//!
//! An [`Overlay`] session opens on a screenshot and lets the user crop or
//! mask a region of it, draw rectangles and arrows, and inspect it through a
//! magnifier. The library is host-agnostic: input arrives as generic events,
//! global listeners and frame callbacks go through an injected
//! [`input::EventHost`], and the scene is rasterized with Cairo on demand.

pub mod asset;
pub mod capture;
pub mod config;
pub mod draw;
pub mod error;
pub mod input;
pub mod overlay;
pub mod scene;
pub mod tools;
pub mod util;

pub use config::Config;
pub use error::OverlayError;
pub use overlay::Overlay;
