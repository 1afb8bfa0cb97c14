//! Workspace façade crate.
//!
//! Host applications can depend on `kinestex-workspace` and enable the
//! documented features instead of wiring each workspace crate individually.
//! With the default `desktop-shims` feature the reqwest-backed HTTP client is
//! injected automatically.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
