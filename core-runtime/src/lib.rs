//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the KinesteX core:
//! - Logging and tracing infrastructure
//! - Configuration management (credentials, base URLs, bridge timings)
//!
//! ## Overview
//!
//! Every other core crate depends on this one for its configuration type and
//! for the logging conventions used across content requests and bridge
//! sessions.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{BridgeTimings, Credentials, KinestexConfig, KinestexConfigBuilder};
pub use error::{Error, Result};
