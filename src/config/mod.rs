//! Configuration file support for dsnap-overlay.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/dsnap/overlay.toml`. Settings include the selection style,
//! overlay dimming, annotation tool defaults, magnifier appearance and tool shortcuts.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod keybindings;
pub mod types;

// Re-export commonly used types at module level
pub use enums::{ColorSpec, SelectionStyle};
pub use keybindings::ShortcutsConfig;
pub use types::{ArrowConfig, MagnifierConfig, OverlayConfig, RectangleConfig, SelectionConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [selection]
/// style = "mask"
/// stroke_color = "#409EFF"
///
/// [overlay]
/// color = "black"
/// opacity = 0.5
///
/// [arrow]
/// stroke_width = 3.0
/// head_length = 15.0
///
/// [magnifier]
/// zoom_level = 2.0
///
/// [shortcuts]
/// selection = "1"
/// rectangle = "r"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Selection tool style and appearance
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Dimming overlay outside the selection
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Rectangle tool defaults
    #[serde(default)]
    pub rectangle: RectangleConfig,

    /// Arrow tool defaults
    #[serde(default)]
    pub arrow: ArrowConfig,

    /// Magnifier defaults
    #[serde(default)]
    pub magnifier: MagnifierConfig,

    /// Tool shortcuts
    #[serde(default)]
    pub shortcuts: ShortcutsConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `selection.stroke_width`: 0.0 - 10.0
    /// - `selection.corner_size`: 4.0 - 32.0
    /// - `overlay.opacity`: 0.0 - 1.0
    /// - `rectangle.stroke_width`, `arrow.stroke_width`: 1.0 - 20.0
    /// - `rectangle.corner_radius`: 0.0 - 50.0
    /// - `arrow.head_length`: 5.0 - 50.0
    /// - `magnifier.zoom_level`: 1.5 - 5.0
    /// - `magnifier.radius`: 20.0 - 400.0
    /// - `magnifier.border_width`: 0.0 - 20.0
    pub fn validate_and_clamp(&mut self) {
        clamp_field("selection.stroke_width", &mut self.selection.stroke_width, 0.0, 10.0);
        clamp_field("selection.corner_size", &mut self.selection.corner_size, 4.0, 32.0);
        clamp_field("overlay.opacity", &mut self.overlay.opacity, 0.0, 1.0);
        clamp_field("rectangle.stroke_width", &mut self.rectangle.stroke_width, 1.0, 20.0);
        clamp_field("rectangle.corner_radius", &mut self.rectangle.corner_radius, 0.0, 50.0);
        clamp_field("arrow.stroke_width", &mut self.arrow.stroke_width, 1.0, 20.0);
        clamp_field("arrow.head_length", &mut self.arrow.head_length, 5.0, 50.0);
        clamp_field("magnifier.zoom_level", &mut self.magnifier.zoom_level, 1.5, 5.0);
        clamp_field("magnifier.radius", &mut self.magnifier.radius, 20.0, 400.0);
        clamp_field("magnifier.border_width", &mut self.magnifier.border_width, 0.0, 20.0);
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/dsnap/overlay.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("dsnap");

        Ok(config_dir.join("overlay.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if the file is missing.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    /// - Two tools are bound to the same shortcut key
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        // Validate and clamp values to acceptable ranges
        config.validate_and_clamp();

        config
            .shortcuts
            .build_tool_map(config.selection.style.tool())
            .with_context(|| format!("Invalid shortcuts in {}", config_path.display()))?;

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// JSON schema of the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

fn clamp_field(name: &str, value: &mut f64, min: f64, max: f64) {
    if !(min..=max).contains(value) {
        log::warn!(
            "Invalid {} {:.1}, clamping to {:.1}-{:.1} range",
            name,
            value,
            min,
            max
        );
        *value = if value.is_nan() { min } else { value.clamp(min, max) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{RED, SELECTION_BLUE};
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("overlay.toml")).unwrap();
        assert_eq!(config.selection.style, SelectionStyle::Crop);
        assert_eq!(config.magnifier.zoom_level, 2.0);
        assert_eq!(config.shortcuts.selection, "1");
    }

    #[test]
    fn parses_partial_file_and_clamps() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("overlay.toml");
        fs::write(
            &path,
            r##"
[selection]
style = "mask"
corner_size = 100.0

[arrow]
stroke_width = 45.0
stroke_color = [255, 0, 0]

[magnifier]
zoom_level = 0.5
border_color = "#409EFF"
"##,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.selection.style, SelectionStyle::Mask);
        assert_eq!(config.selection.corner_size, 32.0);
        assert_eq!(config.arrow.stroke_width, 20.0);
        assert_eq!(config.arrow.options().color, RED);
        assert_eq!(config.magnifier.zoom_level, 1.5);
        assert_eq!(config.magnifier.options().border_color, SELECTION_BLUE);
        assert_eq!(config.rectangle.stroke_width, 2.0);
    }

    #[test]
    fn duplicate_shortcuts_fail_to_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("overlay.toml");
        fs::write(&path, "[shortcuts]\narrow = \"1\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Duplicate shortcut '1'"));
    }

    #[test]
    fn invalid_toml_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("overlay.toml");
        fs::write(&path, "[selection\nstyle = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn overlay_fill_applies_opacity() {
        let fill = OverlayConfig::default().fill();
        assert_eq!((fill.r, fill.g, fill.b, fill.a), (0.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn schema_lists_sections() {
        let schema = serde_json::to_string(&Config::json_schema()).unwrap();
        for section in ["selection", "overlay", "rectangle", "arrow", "magnifier", "shortcuts"] {
            assert!(schema.contains(section), "schema missing {section}");
        }
    }
}
