//! Error types for entity rendering

use thiserror::Error;
use workbench_fields::ValidationErrors;

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors raised while compiling or rendering templates
#[derive(Debug, Error)]
pub enum RenderError {
    /// Built-in template failed to parse
    #[error("template '{name}' failed to parse: {message}")]
    Parse { name: String, message: String },

    /// Template name not registered
    #[error("unknown template: {name}")]
    UnknownTemplate { name: String },

    /// Rendering failed
    #[error("template '{name}' failed to render: {message}")]
    Render { name: String, message: String },
}

/// Failure of `EntityForm::submit`.
#[derive(Debug, Error)]
pub enum SubmitError<E> {
    /// The submitted values failed validation; the handler was not called.
    #[error("{0}")]
    Invalid(ValidationErrors),

    /// The caller-supplied handler rejected the record.
    #[error(transparent)]
    Handler(E),
}
