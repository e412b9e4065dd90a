//! Error type shared by the overlay core.

use crate::scene::ObjectId;
use thiserror::Error;

/// Errors raised by the scene, the tools and the coordinator.
///
/// None of these are shown to the end user; they surface as log output or are
/// returned to the embedding host.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("primitive {0} is not attached to the surface")]
    ObjectNotFound(ObjectId),

    #[error("primitive {0} is not a group")]
    NotAGroup(ObjectId),

    #[error("listener operation failed: {0}")]
    Listener(String),

    #[error("magnifier view error: {0}")]
    View(String),

    #[error("failed to load asset: {0}")]
    Asset(String),

    #[error("invalid shortcut configuration: {0}")]
    Shortcuts(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("rendering surface has been disposed")]
    Disposed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
