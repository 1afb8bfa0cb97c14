use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Content error: {0}")]
    Content(#[from] core_content::ContentError),

    #[error("Validation error: {0}")]
    Validation(#[from] core_bridge::ValidationError),

    #[error("Session error: {0}")]
    Session(#[from] core_bridge::BridgeSessionError),
}

impl ServiceError {
    /// Raw response body carried by content decode failures.
    pub fn raw(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self {
            ServiceError::Content(error) => error.raw(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
