//! Configuration type definitions.

use super::enums::{ColorSpec, SelectionStyle};
use crate::draw::Color;
use crate::tools::{ArrowOptions, MagnifierOptions, RectOptions, SelectionOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Selection tool settings.
///
/// Controls which selection tool the session starts with and how the selection
/// rectangle and its handles look.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectionConfig {
    /// "crop" cuts the selection out of a dimmed overlay group, "mask" clips a
    /// full-canvas overlay with an even-odd outline
    #[serde(default)]
    pub style: SelectionStyle,

    /// Selection outline and handle color
    #[serde(default = "default_selection_color")]
    pub stroke_color: ColorSpec,

    /// Selection outline thickness in pixels (valid range: 0.0 - 10.0)
    #[serde(default = "default_selection_stroke_width")]
    pub stroke_width: f64,

    /// Side length of the resize handles in pixels (valid range: 4.0 - 32.0)
    #[serde(default = "default_corner_size")]
    pub corner_size: f64,

    /// Drop selections with zero width or height when the drag ends
    #[serde(default = "default_discard_empty")]
    pub discard_empty: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            style: SelectionStyle::default(),
            stroke_color: default_selection_color(),
            stroke_width: default_selection_stroke_width(),
            corner_size: default_corner_size(),
            discard_empty: default_discard_empty(),
        }
    }
}

impl SelectionConfig {
    pub fn options(&self) -> SelectionOptions {
        SelectionOptions {
            stroke: self.stroke_color.to_color(),
            stroke_width: self.stroke_width,
            corner_size: self.corner_size,
            discard_empty: self.discard_empty,
        }
    }
}

/// Dimming overlay drawn over the screenshot outside the selection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OverlayConfig {
    /// Overlay color
    #[serde(default = "default_overlay_color")]
    pub color: ColorSpec,

    /// Overlay opacity (valid range: 0.0 - 1.0)
    #[serde(default = "default_overlay_opacity")]
    pub opacity: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            color: default_overlay_color(),
            opacity: default_overlay_opacity(),
        }
    }
}

impl OverlayConfig {
    pub fn fill(&self) -> Color {
        self.color.to_color().with_alpha(self.opacity)
    }
}

/// Rectangle tool defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RectangleConfig {
    /// Border color
    #[serde(default = "default_annotation_color")]
    pub stroke_color: ColorSpec,

    /// Border thickness in pixels (valid range: 1.0 - 20.0)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,

    /// Interior fill; transparent when omitted
    #[serde(default)]
    pub fill_color: Option<ColorSpec>,

    /// Corner radius in pixels (valid range: 0.0 - 50.0)
    #[serde(default)]
    pub corner_radius: f64,
}

impl Default for RectangleConfig {
    fn default() -> Self {
        Self {
            stroke_color: default_annotation_color(),
            stroke_width: default_stroke_width(),
            fill_color: None,
            corner_radius: 0.0,
        }
    }
}

impl RectangleConfig {
    pub fn options(&self) -> RectOptions {
        RectOptions {
            stroke: self.stroke_color.to_color(),
            fill: self.fill_color.as_ref().map(ColorSpec::to_color),
            stroke_width: self.stroke_width,
            corner_radius: self.corner_radius,
        }
    }
}

/// Arrow tool defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArrowConfig {
    /// Line and head color
    #[serde(default = "default_annotation_color")]
    pub stroke_color: ColorSpec,

    /// Line thickness in pixels (valid range: 1.0 - 20.0)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,

    /// Side length of the triangular head in pixels (valid range: 5.0 - 50.0)
    #[serde(default = "default_head_length")]
    pub head_length: f64,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            stroke_color: default_annotation_color(),
            stroke_width: default_stroke_width(),
            head_length: default_head_length(),
        }
    }
}

impl ArrowConfig {
    pub fn options(&self) -> ArrowOptions {
        ArrowOptions {
            color: self.stroke_color.to_color(),
            stroke_width: self.stroke_width,
            head_length: self.head_length,
        }
    }
}

/// Magnifier defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MagnifierConfig {
    /// Initial zoom factor (valid range: 1.5 - 5.0)
    #[serde(default = "default_zoom_level")]
    pub zoom_level: f64,

    /// Lens radius in pixels (valid range: 20.0 - 400.0)
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Lens border thickness in pixels
    #[serde(default = "default_border_width")]
    pub border_width: f64,

    /// Lens border color
    #[serde(default = "default_selection_color")]
    pub border_color: ColorSpec,
}

impl Default for MagnifierConfig {
    fn default() -> Self {
        Self {
            zoom_level: default_zoom_level(),
            radius: default_radius(),
            border_width: default_border_width(),
            border_color: default_selection_color(),
        }
    }
}

impl MagnifierConfig {
    pub fn options(&self) -> MagnifierOptions {
        MagnifierOptions {
            zoom_level: self.zoom_level,
            radius: self.radius,
            border_width: self.border_width,
            border_color: self.border_color.to_color(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_selection_color() -> ColorSpec {
    ColorSpec::Name("#409EFF".to_string())
}

fn default_selection_stroke_width() -> f64 {
    1.0
}

fn default_corner_size() -> f64 {
    8.0
}

fn default_discard_empty() -> bool {
    true
}

fn default_overlay_color() -> ColorSpec {
    ColorSpec::Name("black".to_string())
}

fn default_overlay_opacity() -> f64 {
    0.5
}

fn default_annotation_color() -> ColorSpec {
    ColorSpec::Name("red".to_string())
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_head_length() -> f64 {
    15.0
}

fn default_zoom_level() -> f64 {
    2.0
}

fn default_radius() -> f64 {
    100.0
}

fn default_border_width() -> f64 {
    2.0
}
