//! Configuration enum types.

use crate::draw::{Color, color::*};
use crate::input::ToolKind;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which selection tool (and mask variant) a session uses.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStyle {
    /// Selection cut out of a transformed overlay group
    #[default]
    Crop,
    /// Full-canvas overlay clipped by an even-odd outline
    Mask,
}

impl SelectionStyle {
    /// The tool that draws this kind of selection.
    pub fn tool(self) -> ToolKind {
        match self {
            SelectionStyle::Crop => ToolKind::CropSelect,
            SelectionStyle::Mask => ToolKind::MaskSelect,
        }
    }
}

/// Color specification - a named color, a hex string or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// stroke_color = "red"
///
/// # Hex color, optionally with alpha
/// stroke_color = "#409EFF"
///
/// # Custom RGB color (0-255 per component)
/// stroke_color = [255, 128, 0]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color (red, green, blue, yellow, white, black, selection) or
    /// `#RRGGBB` / `#RRGGBBAA`
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`] struct.
    ///
    /// Unknown names and malformed hex strings fall back to red with a warning.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) if name.starts_with('#') => {
                Color::from_hex(name).unwrap_or_else(|| {
                    warn!("Invalid hex color '{}', using red", name);
                    RED
                })
            }
            ColorSpec::Name(name) => crate::util::name_to_color(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using red", name);
                RED
            }),
            ColorSpec::Rgb([r, g, b]) => Color {
                r: *r as f64 / 255.0,
                g: *g as f64 / 255.0,
                b: *b as f64 / 255.0,
                a: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_names_and_arrays_resolve() {
        assert_eq!(
            ColorSpec::Name("#409EFF".to_string()).to_color(),
            SELECTION_BLUE
        );
        assert_eq!(ColorSpec::Name("White".to_string()).to_color(), WHITE);
        assert_eq!(ColorSpec::Rgb([255, 0, 0]).to_color(), RED);
    }

    #[test]
    fn malformed_colors_fall_back_to_red() {
        assert_eq!(ColorSpec::Name("#12".to_string()).to_color(), RED);
        assert_eq!(ColorSpec::Name("mauve".to_string()).to_color(), RED);
    }

    #[test]
    fn selection_style_picks_tool() {
        assert_eq!(SelectionStyle::Crop.tool(), ToolKind::CropSelect);
        assert_eq!(SelectionStyle::Mask.tool(), ToolKind::MaskSelect);
    }
}
