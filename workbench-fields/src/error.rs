//! Error types for the schema registry

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur in schema registry operations
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Entity definition not found
    #[error("entity not found: {name}")]
    EntityNotFound { name: String },

    /// Two entities share a name
    #[error("duplicate entity name: {name}")]
    DuplicateEntity { name: String },

    /// Two fields of one entity share a name
    #[error("duplicate field '{field}' in entity '{entity}'")]
    DuplicateField { entity: String, field: String },

    /// An override would break records stored under the base definition
    #[error("override of entity '{entity}' is incompatible: {reason}")]
    IncompatibleOverride { entity: String, reason: String },

    /// A record failed validation
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Schema override directory not found
    #[error("schema directory not found: {path}")]
    NotFound { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl From<ValidationErrors> for FieldsError {
    fn from(errors: ValidationErrors) -> Self {
        FieldsError::Validation(errors)
    }
}

/// One field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All validation failures for a record, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// First error message for a field, if any.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "validation failed: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldsError::EntityNotFound {
            name: "doctor".into(),
        };
        assert_eq!(err.to_string(), "entity not found: doctor");
    }

    #[test]
    fn test_validation_error() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "is required");
        errors.push("email", "must be a valid email address");
        let err = FieldsError::from(errors);
        assert!(err.to_string().contains("name: is required"));
        assert!(err.to_string().contains("email: must be a valid email"));
    }

    #[test]
    fn test_for_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result().is_ok());
        errors.push("date", "must be a date (YYYY-MM-DD)");
        assert_eq!(errors.for_field("date"), Some("must be a date (YYYY-MM-DD)"));
        assert_eq!(errors.for_field("time"), None);
        assert_eq!(errors.len(), 1);
    }
}
