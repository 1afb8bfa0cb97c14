use thiserror::Error;

/// Rejected session input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: String },

    #[error("{field} contains disallowed character '{found}'")]
    DisallowedCharacter { field: String, found: String },

    #[error("Custom parameter key '{key}' contains disallowed character '{found}'")]
    DisallowedKey { key: String, found: String },

    #[error("No valid exercises in custom workout")]
    NoValidExercises,
}

impl ValidationError {
    /// Name of the offending field, parameter key or list.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Empty { field } => field,
            ValidationError::DisallowedCharacter { field, .. } => field,
            ValidationError::DisallowedKey { key, .. } => key,
            ValidationError::NoValidExercises => "customWorkoutExercises",
        }
    }
}

/// Inbound script message that could not be turned into a [`KinestexMessage`](crate::KinestexMessage).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("Message posted on unknown channel '{0}'")]
    UnknownChannel(String),

    #[error("Message body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Message body is not a JSON object")]
    NotAnObject,

    #[error("Message has no string 'type' field")]
    MissingType,
}

#[derive(Error, Debug)]
pub enum BridgeSessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Runtime unavailable: {0}")]
    Runtime(String),

    #[error("Invalid session configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BridgeSessionError>;
