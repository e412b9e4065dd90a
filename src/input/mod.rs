//! Input plumbing between the host and the overlay.
//!
//! This module defines the generic key, mouse and wheel events a host feeds in,
//! the closed set of tool identities, the host event-source capability used
//! for global listeners and frame pacing, and the single-key shortcut
//! dispatcher.

pub mod events;
pub mod host;
pub mod shortcuts;
pub mod tool;

// Re-export commonly used types at module level
pub use events::{Focus, Key, KeyPress, MouseButton, WheelDelta};
pub use host::{EventHost, FrameId, ListenerId, ListenerKind, LocalHost};
pub use shortcuts::ShortcutDispatcher;
pub use tool::ToolKind;
