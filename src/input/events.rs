//! Generic input event types delivered by the embedding host.

/// Generic key representation for cross-backend compatibility.
///
/// Hosts map their native key codes to these values; the shortcut dispatcher
/// matches on [`Key::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    /// Escape key
    Escape,
    /// Return/Enter key
    Return,
    /// Backspace key
    Backspace,
    /// Tab key
    Tab,
    /// Space bar
    Space,
    /// Unmapped or unrecognized key
    Unknown,
}

impl Key {
    /// Identifier used for shortcut lookup ("1", "a", "Escape", ...).
    ///
    /// Returns `None` for keys that can never carry a shortcut.
    pub fn name(&self) -> Option<String> {
        match self {
            Key::Char(c) => Some(c.to_string()),
            Key::Escape => Some("Escape".to_string()),
            Key::Return => Some("Return".to_string()),
            Key::Backspace => Some("Backspace".to_string()),
            Key::Tab => Some("Tab".to_string()),
            Key::Space => Some("Space".to_string()),
            Key::Unknown => None,
        }
    }
}

/// Where host keyboard focus was when a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Focus is on the overlay itself
    #[default]
    Surface,
    /// A text field or text area owns the keyboard
    TextInput,
}

/// A single key press as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub focus: Focus,
}

impl KeyPress {
    /// Key press while the overlay has focus.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            focus: Focus::Surface,
        }
    }

    /// Key press while a text input has focus.
    pub fn in_text_input(key: Key) -> Self {
        Self {
            key,
            focus: Focus::TextInput,
        }
    }
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left mouse button (primary drawing button)
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

impl MouseButton {
    /// Maps a DOM-style button index (0 = primary) to a button.
    pub fn from_index(index: u16) -> Option<Self> {
        match index {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// One wheel notification. Positive `delta_y` scrolls down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    pub delta_y: f64,
}

impl WheelDelta {
    /// One notch up (towards larger values).
    pub const UP: WheelDelta = WheelDelta { delta_y: -100.0 };
    /// One notch down (towards smaller values).
    pub const DOWN: WheelDelta = WheelDelta { delta_y: 100.0 };
}
