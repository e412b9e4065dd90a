//! RGBA color type and predefined color constants.

/// Represents an RGBA color with floating-point components.
///
/// All components are in the range 0.0 (minimum) to 1.0 (maximum).
///
/// # Examples
///
/// ```
/// use dsnap_overlay::draw::Color;
/// let red = Color { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
/// let dim = Color::new(0.0, 0.0, 0.0, 0.5);
/// assert_eq!(Color::from_hex("#FF0000"), Some(red));
/// assert_eq!(dim.a, 0.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red component (0.0 = no red, 1.0 = full red)
    pub r: f64,
    /// Green component (0.0 = no green, 1.0 = full green)
    pub g: f64,
    /// Blue component (0.0 = no blue, 1.0 = full blue)
    pub b: f64,
    /// Alpha/transparency (0.0 = fully transparent, 1.0 = fully opaque)
    pub a: f64,
}

impl Color {
    /// Creates a new color from RGBA components.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA` (leading `#` optional, case-insensitive).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() || !matches!(digits.len(), 6 | 8) {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| -> Option<f64> {
            u8::from_str_radix(&digits[range], 16)
                .ok()
                .map(|v| v as f64 / 255.0)
        };

        let r = channel(0..2)?;
        let g = channel(2..4)?;
        let b = channel(4..6)?;
        let a = if digits.len() == 8 { channel(6..8)? } else { 1.0 };
        Some(Self { r, g, b, a })
    }

    /// Returns a copy with the alpha channel replaced.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Formats as `#RRGGBB`, the notation the magnifier view consumes.
    pub fn to_hex(&self) -> String {
        let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b)
        )
    }
}

// ============================================================================
// Predefined Color Constants
// ============================================================================

/// Predefined red color, the default annotation stroke.
pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

/// Predefined green color.
pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);

/// Predefined blue color.
pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

/// Predefined yellow color.
pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0, 1.0);

/// Predefined white color.
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Predefined black color.
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Selection outline and handle color (#409EFF).
pub const SELECTION_BLUE: Color = Color::new(64.0 / 255.0, 158.0 / 255.0, 1.0, 1.0);

/// Translucent dimming layer drawn over the screenshot.
pub const OVERLAY_DIM: Color = Color::new(0.0, 0.0, 0.0, 0.5);

/// Fully transparent color.
pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
