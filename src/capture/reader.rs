use super::error::CaptureError;
use std::{fs, thread, time::Duration};

/// Portals may still be flushing the file when the Response signal arrives.
const MAX_ATTEMPTS: usize = 60;
const ATTEMPT_DELAY: Duration = Duration::from_millis(50);

/// Reads the screenshot behind a portal `file://` URI, then deletes the file.
///
/// Blocks while polling for the portal to finish writing; call it from a
/// blocking task.
pub fn read_image_from_uri(uri: &str) -> Result<Vec<u8>, CaptureError> {
    let url = url::Url::parse(uri)
        .map_err(|e| CaptureError::InvalidResponse(format!("Invalid file URI '{}': {}", uri, e)))?;
    let path = url.to_file_path().map_err(|_| {
        CaptureError::InvalidResponse(format!("Cannot convert URI to path: {}", uri))
    })?;

    log::debug!("Reading screenshot from {}", path.display());

    let mut attempt = 0;
    let data = loop {
        attempt += 1;
        match fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => break bytes,
            Ok(_) => log::trace!("{} still empty (attempt {})", path.display(), attempt),
            Err(e) => log::trace!("{} not ready (attempt {}): {}", path.display(), attempt, e),
        }
        if attempt == MAX_ATTEMPTS {
            return Err(CaptureError::NotReady(format!(
                "{} not ready after {} attempts",
                path.display(),
                MAX_ATTEMPTS
            )));
        }
        thread::sleep(ATTEMPT_DELAY);
    };

    log::info!("Read {} bytes from portal screenshot", data.len());

    if let Err(e) = fs::remove_file(&path) {
        log::warn!("Failed to remove portal temp file {}: {}", path.display(), e);
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_and_removes_file() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("capture file.png");
        fs::write(&file_path, b"portal-bytes").unwrap();
        let uri = url::Url::from_file_path(&file_path).unwrap().to_string();

        let data = read_image_from_uri(&uri).unwrap();
        assert_eq!(data, b"portal-bytes");
        assert!(!file_path.exists());
    }

    #[test]
    fn rejects_non_file_uri() {
        let result = read_image_from_uri("https://example.com/shot.png");
        assert!(matches!(result, Err(CaptureError::InvalidResponse(_))));
    }
}
