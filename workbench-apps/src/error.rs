//! Error types for the apps layer

use thiserror::Error;
use workbench_backend::BackendError;
use workbench_fields::FieldsError;

/// Result type for app operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors raised by collections and services
#[derive(Debug, Error)]
pub enum AppError {
    /// The backend rejected or failed the call
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A document the caller asked for does not exist
    #[error("{collection} document not found: {id}")]
    NotFound { collection: String, id: String },

    /// A stored document does not match its model
    #[error("could not decode {collection} document: {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// Data to store did not serialize to a JSON object
    #[error("{collection} data must be an object")]
    InvalidData { collection: String },

    /// Date parameter not in `YYYY-MM-DD` form
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// Date range whose start is after its end
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: String, end: String },

    /// Built-in schema failed to build
    #[error(transparent)]
    Fields(#[from] FieldsError),
}

impl AppError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        AppError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// HTTP status that best describes this error to a caller.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Backend(e) => e.status_code(),
            AppError::NotFound { .. } => 404,
            AppError::InvalidDate { .. } | AppError::InvalidRange { .. } => 400,
            AppError::InvalidData { .. } | AppError::Decode { .. } | AppError::Fields(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            AppError::NotFound { .. } => true,
            AppError::Backend(e) => e.is_not_found(),
            _ => false,
        }
    }
}
