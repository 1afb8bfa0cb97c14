//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! Only the HTTP transport has a desktop default: `ReqwestHttpClient`. The
//! embedded web view is always supplied by the host shell because it is tied
//! to the host's window system.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new());
//! let config = KinestexConfig::builder()
//!     .credentials("api-key", "company", "user-1")
//!     .http_client(http_client)
//!     .build()?;
//! ```

mod http;

pub use http::ReqwestHttpClient;
