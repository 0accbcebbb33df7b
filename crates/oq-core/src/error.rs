//! Core error types for OData Query RS
//!
//! Every error here is raised synchronously while compiling a request,
//! before anything is handed to a transport.

use thiserror::Error;

/// Top-level error type for all query operations
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {message}")]
    Transport { status: Option<u16>, message: String },
}

/// Input that can never produce a valid query string.
///
/// Each variant names the field or parameter at fault so callers can
/// surface it directly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Field {field} has an invalid value: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Field {field} uses unknown operator '{operator}'")]
    UnknownOperator { field: String, operator: String },

    #[error("Field {field} has an empty value list for '{operator}'")]
    EmptyValueList { field: String, operator: String },

    #[error("Field {field} has a non-finite number")]
    NonFiniteNumber { field: String },

    #[error("Parameter {param} must be a non-negative integer, got {value}")]
    OutOfRange { param: &'static str, value: String },

    #[error("Malformed sort specification: {message}")]
    MalformedSort { message: String },

    #[error("Field selection must not be empty")]
    EmptyFieldSelection,

    #[error("Field {field} is selected more than once")]
    DuplicateField { field: String },

    #[error("Parameter {param} is invalid: {message}")]
    InvalidParam { param: String, message: String },
}

impl ValidationError {
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn malformed_sort(message: impl Into<String>) -> Self {
        Self::MalformedSort {
            message: message.into(),
        }
    }

    /// The field or parameter the error is about, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { field, .. }
            | Self::UnknownOperator { field, .. }
            | Self::EmptyValueList { field, .. }
            | Self::NonFiniteNumber { field }
            | Self::DuplicateField { field } => Some(field.as_str()),
            Self::InvalidParam { param, .. } => Some(param.as_str()),
            Self::OutOfRange { param, .. } => Some(*param),
            Self::MalformedSort { .. } | Self::EmptyFieldSelection => None,
        }
    }
}

impl QueryError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::Validation(_) => "validation_failed",
            QueryError::Json(_) => "invalid_json",
            QueryError::Config(_) => "configuration_error",
            QueryError::Transport { .. } => "transport_error",
        }
    }

    /// Whether the failure is a deterministic input problem
    pub fn is_validation(&self) -> bool {
        matches!(self, QueryError::Validation(_))
    }
}
