//! Screen capture through xdg-desktop-portal.
//!
//! The overlay opens on a screenshot. On a desktop session the host asks the
//! portal for one, reads the file the portal wrote and hands the bytes to the
//! overlay as a [`LoadedAsset`].

mod error;
pub mod portal;
mod reader;

pub use error::CaptureError;
pub use portal::CaptureMode;
pub use reader::read_image_from_uri;

use crate::asset::LoadedAsset;

/// Captures the screen and decodes the result.
///
/// The portal's temporary file is removed once read.
pub async fn capture_screen(mode: CaptureMode) -> Result<LoadedAsset, CaptureError> {
    let uri = portal::capture_via_portal(mode).await?;

    let read_uri = uri.clone();
    let bytes = tokio::task::spawn_blocking(move || read_image_from_uri(&read_uri))
        .await
        .map_err(|err| CaptureError::NotReady(format!("reader task failed: {}", err)))??;

    LoadedAsset::from_png(uri, bytes).map_err(|err| CaptureError::Decode(err.to_string()))
}
