//! Background asset loading.
//!
//! Loading is the only operation in the overlay that yields before it
//! completes. The loader boundary is async; everything that depends on the
//! asset runs after the loader resolves.

use crate::error::OverlayError;
use async_trait::async_trait;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

/// A decoded-enough screenshot: its source, pixel size and encoded bytes.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    /// Source URL or path, forwarded to the magnifier view
    pub url: String,
    /// Natural width in pixels
    pub width: f64,
    /// Natural height in pixels
    pub height: f64,
    /// PNG-encoded image data (empty for size-only assets)
    pub data: Arc<[u8]>,
}

impl LoadedAsset {
    /// Size-only asset, used by hosts that render the image themselves.
    pub fn new(url: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            url: url.into(),
            width,
            height,
            data: Arc::from(Vec::new()),
        }
    }

    /// Builds an asset from PNG bytes, reading the dimensions from the image.
    pub fn from_png(url: impl Into<String>, bytes: Vec<u8>) -> Result<Self, OverlayError> {
        let url = url.into();
        let surface = cairo::ImageSurface::create_from_png(&mut Cursor::new(&bytes))
            .map_err(|e| OverlayError::Asset(format!("{url} is not a readable PNG: {e}")))?;

        Ok(Self {
            width: surface.width() as f64,
            height: surface.height() as f64,
            url,
            data: Arc::from(bytes),
        })
    }

    /// Whether encoded pixels are available for rendering.
    pub fn has_pixels(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Asynchronous source of background images.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<LoadedAsset, OverlayError>;
}

/// Loads PNG files from a filesystem path or a `file://` URI.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileAssetLoader;

#[async_trait]
impl AssetLoader for FileAssetLoader {
    async fn load(&self, url: &str) -> Result<LoadedAsset, OverlayError> {
        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            let path = resolve_path(&url)?;
            log::debug!("Reading background asset from {}", path.display());
            let bytes = std::fs::read(&path)?;
            LoadedAsset::from_png(url, bytes)
        })
        .await
        .map_err(|e| OverlayError::Asset(format!("asset reader task failed: {e}")))?
    }
}

/// Converts a `file://` URI (percent-decoded) or a plain path into a path.
fn resolve_path(url: &str) -> Result<PathBuf, OverlayError> {
    if !url.starts_with("file:") {
        return Ok(PathBuf::from(url));
    }

    let parsed = url::Url::parse(url)
        .map_err(|e| OverlayError::Asset(format!("invalid file URI '{url}': {e}")))?;
    parsed
        .to_file_path()
        .map_err(|_| OverlayError::Asset(format!("cannot convert URI to path: {url}")))
}
