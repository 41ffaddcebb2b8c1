//! Blocking user-facing messages.

/// Shows action failures with the browser's `alert()`. Off the web the
/// message goes to the log instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserAlert;

impl api::Notifier for BrowserAlert {
    fn notify(&self, message: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                let _ = window.alert_with_message(message);
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            tracing::warn!(%message, "alert");
        }
    }
}
