//! Error types shared by every consent component.

use thiserror::Error;

use crate::machine::{ConsentEvent, WidgetState};

/// Result type for consent operations
pub type ConsentResult<T> = Result<T, ConsentError>;

/// Consent errors
#[derive(Error, Debug, Clone)]
pub enum ConsentError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Malformed stored value for {key}: {value:?}")]
    MalformedValue { key: String, value: String },

    #[error("Malformed consent cookie: {0}")]
    MalformedCookie(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Event {event:?} is not valid while {state:?}")]
    InvalidTransition { state: WidgetState, event: ConsentEvent },

    #[error("Callback {name} failed: {message}")]
    Callback { name: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),
}

impl From<serde_json::Error> for ConsentError {
    fn from(err: serde_json::Error) -> Self {
        ConsentError::Serialization(err.to_string())
    }
}
