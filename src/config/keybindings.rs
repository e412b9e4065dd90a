//! Tool shortcut configuration.
//!
//! Each tool is bound to a single key identifier as produced by
//! [`crate::input::Key::name`] ("1", "r", "Escape", ...). An empty string
//! leaves the tool without a shortcut.

use crate::error::OverlayError;
use crate::input::ToolKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Single-key shortcuts that switch tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShortcutsConfig {
    /// Selection tool (crop or mask, per `selection.style`)
    #[serde(default = "default_selection")]
    pub selection: String,

    #[serde(default = "default_rectangle")]
    pub rectangle: String,

    #[serde(default = "default_arrow")]
    pub arrow: String,

    #[serde(default = "default_magnifier")]
    pub magnifier: String,
}

impl Default for ShortcutsConfig {
    fn default() -> Self {
        Self {
            selection: default_selection(),
            rectangle: default_rectangle(),
            arrow: default_arrow(),
            magnifier: default_magnifier(),
        }
    }
}

impl ShortcutsConfig {
    /// Key bound to `tool`, or `None` when unbound. Both selection tools share
    /// the selection key.
    pub fn key_for(&self, tool: ToolKind) -> Option<&str> {
        let key = match tool {
            ToolKind::CropSelect | ToolKind::MaskSelect => &self.selection,
            ToolKind::Rectangle => &self.rectangle,
            ToolKind::Arrow => &self.arrow,
            ToolKind::Magnifier => &self.magnifier,
        };
        let key = key.trim();
        (!key.is_empty()).then_some(key)
    }

    /// Builds the key → tool map for a session whose selection tool is
    /// `selection`.
    ///
    /// Returns an error if two tools claim the same key or a key is more than
    /// one character long without being a named key.
    pub fn build_tool_map(
        &self,
        selection: ToolKind,
    ) -> Result<HashMap<String, ToolKind>, OverlayError> {
        let mut map = HashMap::new();

        for tool in [selection, ToolKind::Rectangle, ToolKind::Arrow, ToolKind::Magnifier] {
            let Some(key) = self.key_for(tool) else {
                continue;
            };
            if key.chars().count() > 1 && !is_named_key(key) {
                return Err(OverlayError::Shortcuts(format!(
                    "'{}' for the {} tool is not a single key",
                    key,
                    tool.label()
                )));
            }
            if let Some(existing) = map.insert(key.to_string(), tool) {
                return Err(OverlayError::Shortcuts(format!(
                    "Duplicate shortcut '{}' assigned to both {} and {}",
                    key,
                    existing.label(),
                    tool.label()
                )));
            }
        }

        Ok(map)
    }
}

fn is_named_key(key: &str) -> bool {
    matches!(key, "Escape" | "Return" | "Backspace" | "Tab" | "Space")
}

fn default_selection() -> String {
    "1".to_string()
}

fn default_rectangle() -> String {
    "2".to_string()
}

fn default_arrow() -> String {
    "3".to_string()
}

fn default_magnifier() -> String {
    "4".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_binds_digits() {
        let map = ShortcutsConfig::default()
            .build_tool_map(ToolKind::CropSelect)
            .unwrap();
        assert_eq!(map.get("1"), Some(&ToolKind::CropSelect));
        assert_eq!(map.get("2"), Some(&ToolKind::Rectangle));
        assert_eq!(map.get("3"), Some(&ToolKind::Arrow));
        assert_eq!(map.get("4"), Some(&ToolKind::Magnifier));
    }

    #[test]
    fn duplicate_shortcut_detection() {
        let config = ShortcutsConfig {
            arrow: "2".to_string(),
            ..ShortcutsConfig::default()
        };
        let err = config
            .build_tool_map(ToolKind::MaskSelect)
            .unwrap_err()
            .to_string();
        assert!(err.contains("Duplicate shortcut '2'"));
        assert!(err.contains("rectangle"));
        assert!(err.contains("arrow"));
    }

    #[test]
    fn empty_key_leaves_tool_unbound() {
        let config = ShortcutsConfig {
            magnifier: "  ".to_string(),
            ..ShortcutsConfig::default()
        };
        assert_eq!(config.key_for(ToolKind::Magnifier), None);
        let map = config.build_tool_map(ToolKind::CropSelect).unwrap();
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn multi_character_keys_are_rejected() {
        let config = ShortcutsConfig {
            rectangle: "Ctrl+R".to_string(),
            ..ShortcutsConfig::default()
        };
        assert!(matches!(
            config.build_tool_map(ToolKind::CropSelect),
            Err(OverlayError::Shortcuts(_))
        ));
        let named = ShortcutsConfig {
            rectangle: "Tab".to_string(),
            ..ShortcutsConfig::default()
        };
        assert!(named.build_tool_map(ToolKind::CropSelect).is_ok());
    }
}
