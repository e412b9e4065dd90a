//! xdg-desktop-portal Screenshot request.

use super::error::CaptureError;
use futures::StreamExt;
use std::collections::HashMap;
use zbus::zvariant::{OwnedValue, Value};
use zbus::{Connection, proxy};

/// D-Bus proxy for the xdg-desktop-portal Screenshot interface.
#[proxy(
    interface = "org.freedesktop.portal.Screenshot",
    default_service = "org.freedesktop.portal.Desktop",
    default_path = "/org/freedesktop/portal/desktop"
)]
trait Screenshot {
    /// Returns the path of a Request object whose Response signal carries the
    /// screenshot URI.
    async fn screenshot(
        &self,
        parent_window: &str,
        options: HashMap<String, Value<'_>>,
    ) -> zbus::Result<zbus::zvariant::OwnedObjectPath>;
}

/// D-Bus proxy for org.freedesktop.portal.Request.
#[proxy(
    interface = "org.freedesktop.portal.Request",
    default_service = "org.freedesktop.portal.Desktop"
)]
trait Request {
    /// `response` is 0 on success, 1 when cancelled, 2 on other errors.
    #[zbus(signal)]
    fn response(&self, response: u32, results: HashMap<String, OwnedValue>) -> zbus::Result<()>;
}

/// How the portal should take the screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// Whole screen, no portal dialog
    #[default]
    FullScreen,
    /// Let the portal show its own picker first
    Interactive,
}

/// Asks the portal for a screenshot and returns the `file://` URI it wrote.
pub async fn capture_via_portal(mode: CaptureMode) -> Result<String, CaptureError> {
    log::debug!("Initiating portal screenshot capture: {:?}", mode);

    let connection = Connection::session().await?;
    let proxy = ScreenshotProxy::new(&connection).await?;
    let options = build_portal_options(mode);

    let request_path = proxy.screenshot("", options).await.map_err(|e| {
        log::error!("Portal screenshot call failed: {}", e);
        if e.to_string().contains("Cancelled") || e.to_string().contains("denied") {
            CaptureError::PermissionDenied
        } else {
            CaptureError::DBus(e)
        }
    })?;
    log::info!("Screenshot request created: {:?}", request_path);

    let request_proxy = RequestProxy::builder(&connection)
        .path(request_path)?
        .build()
        .await?;
    let mut responses = request_proxy.receive_response().await?;

    let signal = responses
        .next()
        .await
        .ok_or_else(|| CaptureError::InvalidResponse("No Response signal received".to_string()))?;
    let args = signal.args().map_err(|e| {
        CaptureError::InvalidResponse(format!("Failed to parse response args: {}", e))
    })?;

    uri_from_response(args.response, &args.results)
}

fn uri_from_response(
    code: u32,
    results: &HashMap<String, OwnedValue>,
) -> Result<String, CaptureError> {
    match code {
        0 => {
            let value = results.get("uri").ok_or_else(|| {
                CaptureError::InvalidResponse("No 'uri' field in response".to_string())
            })?;
            let uri: &str = value.downcast_ref().map_err(|e| {
                CaptureError::InvalidResponse(format!("URI is not a string: {}", e))
            })?;
            log::info!("Screenshot captured: {}", uri);
            Ok(uri.to_string())
        }
        1 => {
            log::warn!("Screenshot cancelled by user");
            Err(CaptureError::PermissionDenied)
        }
        code => Err(CaptureError::InvalidResponse(format!(
            "Portal returned error code {}",
            code
        ))),
    }
}

fn build_portal_options(mode: CaptureMode) -> HashMap<String, Value<'static>> {
    let interactive = mode == CaptureMode::Interactive;
    let mut options = HashMap::new();
    options.insert("modal".to_string(), false.into());
    options.insert("interactive".to_string(), interactive.into());
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_screen_is_not_interactive() {
        let options = build_portal_options(CaptureMode::FullScreen);
        assert_eq!(options.get("interactive"), Some(&Value::from(false)));
        assert_eq!(options.get("modal"), Some(&Value::from(false)));
    }

    #[test]
    fn interactive_mode_asks_portal_to_prompt() {
        let options = build_portal_options(CaptureMode::Interactive);
        assert_eq!(options.get("interactive"), Some(&Value::from(true)));
    }

    #[test]
    fn cancelled_response_is_permission_denied() {
        let result = uri_from_response(1, &HashMap::new());
        assert!(matches!(result, Err(CaptureError::PermissionDenied)));
    }

    #[test]
    fn success_without_uri_is_invalid() {
        let result = uri_from_response(0, &HashMap::new());
        assert!(matches!(result, Err(CaptureError::InvalidResponse(_))));
    }
}
