//! Embedded Web View Abstraction
//!
//! The core never renders anything itself. Hosts embed a platform web view
//! (WKWebView, Android WebView, WebView2, an iframe) and hand the core a
//! [`WebViewHost`] that exposes the handful of operations the message bridge
//! needs. Inbound traffic flows the other way: the host forwards every script
//! message posted on the [`SCRIPT_MESSAGE_CHANNEL`] channel, plus readiness and
//! teardown signals, into the core's bridge session.
//!
//! All methods are invoked from a single control context per view; hosts that
//! must touch the view on a UI thread should marshal internally.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Name of the script-message channel the embedded page posts to.
pub const SCRIPT_MESSAGE_CHANNEL: &str = "listener";

/// URL loaded into the view while it is being torn down.
pub const BLANK_PAGE_URL: &str = "about:blank";

/// Host-provided handle to one embedded web view.
///
/// # Platform Support
///
/// - **iOS / macOS**: `WKWebView` with a `WKScriptMessageHandler` named `listener`
/// - **Android**: `WebView` with a JavaScript interface
/// - **Desktop**: WebView2, WebKitGTK or wry
/// - **Web**: same-document iframe
///
/// # Example
///
/// ```ignore
/// use bridge_traits::webview::WebViewHost;
///
/// async fn reset(view: &dyn WebViewHost) -> Result<()> {
///     view.pause_all_media_playback().await?;
///     view.load_url("about:blank").await
/// }
/// ```
#[async_trait]
pub trait WebViewHost: Send + Sync {
    /// Navigate the view to `url`.
    async fn load_url(&self, url: &str) -> Result<()>;

    /// Evaluate a script in the page's main frame and return its result, if
    /// the script produced a JSON-representable value.
    async fn evaluate_script(&self, script: &str) -> Result<Option<Value>>;

    /// Pause every media element in the page.
    ///
    /// Platforms without a native pause primitive can keep the default,
    /// which reports the capability as unavailable.
    async fn pause_all_media_playback(&self) -> Result<()> {
        Err(crate::error::BridgeError::NotAvailable(
            "pause_all_media_playback".to_string(),
        ))
    }

    /// Stop any in-flight navigation.
    async fn stop_loading(&self) -> Result<()>;

    /// Detach navigation, UI and script-message delegates so the page can no
    /// longer call back into the host.
    async fn detach_delegates(&self) -> Result<()>;

    /// Release the underlying view handle. No method is called after this.
    async fn release(&self) -> Result<()>;
}
