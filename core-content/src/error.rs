//! Error types for content requests

use bridge_traits::error::BridgeError;
use serde_json::{Map, Value};
use thiserror::Error;

/// Content request errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    /// A query value was empty or contained disallowed characters
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response carrying a structured `{message|error}` body
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Non-2xx response without a structured body
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// 2xx response that did not match the expected shape
    ///
    /// `raw` keeps the decoded body when it was a JSON object so callers can
    /// still read partial data.
    #[error("Failed to decode response: {message}")]
    Decode {
        message: String,
        raw: Option<Map<String, Value>>,
    },
}

impl ContentError {
    /// Raw body retained by a decode failure, if any.
    pub fn raw(&self) -> Option<&Map<String, Value>> {
        match self {
            ContentError::Decode { raw, .. } => raw.as_ref(),
            _ => None,
        }
    }
}

impl From<BridgeError> for ContentError {
    fn from(error: BridgeError) -> Self {
        ContentError::Network(error.to_string())
    }
}

/// Result type for content operations
pub type Result<T> = std::result::Result<T, ContentError>;
