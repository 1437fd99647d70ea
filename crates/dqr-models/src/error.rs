//! Model validation errors.

use thiserror::Error;

use crate::field::FieldKind;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building or validating request data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid field `{field}`. Allowed fields are {allowed:?}")]
    InvalidField { field: String, allowed: Vec<String> },

    #[error("Invalid type for field `{field}`. Expected {expected} but got {found}")]
    InvalidFieldType {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },

    #[error("Invalid QR Code type `{requested}`. Available types are {available:?}")]
    UnsupportedQrCodeType {
        requested: String,
        available: Vec<String>,
    },
}
