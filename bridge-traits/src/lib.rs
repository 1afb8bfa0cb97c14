//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the KinesteX core and the
//! platform-specific shells that embed it. Each trait represents a capability
//! the core requires but that must be implemented differently per platform
//! (desktop, iOS, Android, web).
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP transport for content requests
//! - [`WebViewHost`](webview::WebViewHost) - The embedded web view the bridge drives
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ HttpClient |
//! | iOS      | host app            | 📋 WebViewHost via WKWebView |
//! | Android  | host app            | 📋 WebViewHost via WebView |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing (see `core_runtime::Error::CapabilityMissing`).
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations should convert native errors into it and keep messages
//! actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so handles can be shared across
//! async tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod log;
pub mod webview;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use webview::{WebViewHost, BLANK_PAGE_URL, SCRIPT_MESSAGE_CHANNEL};
