use crate::model::EntityId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EduError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    /// The backend rejected a write. `alert` carries the `X-<app>-error` header when present.
    #[error("Validation failed ({status}): {}", .alert.as_deref().unwrap_or("rejected by backend"))]
    Validation {
        status: u16,
        alert: Option<String>,
        body: serde_json::Value,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl EduError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EduError::NotFound { .. })
    }
}

impl From<confique::Error> for EduError {
    fn from(err: confique::Error) -> Self {
        EduError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EduError>;
