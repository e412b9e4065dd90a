use thiserror::Error;

/// Errors raised while capturing the screen through the desktop portal.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Screenshot permission denied by user")]
    PermissionDenied,

    #[error("D-Bus communication error: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Failed to read screenshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Portal returned invalid response: {0}")]
    InvalidResponse(String),

    #[error("Screenshot file not ready: {0}")]
    NotReady(String),

    #[error("Captured image could not be decoded: {0}")]
    Decode(String),
}
