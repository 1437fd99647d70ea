//! Client error types.

use dqr_image::ImageError;
use dqr_models::{FieldKind, ModelError};
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the QR code API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Error generating QR Code: reason: {0}")]
    Generation(String),

    #[error("Error updating QR Code: reason: {0}")]
    Update(String),

    #[error("QR Code with id {0} not found")]
    NotFound(String),

    #[error("Error getting QR Code: reason: {0}")]
    Retrieval(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Error Generating QR Code: No face could be detected in the image")]
    NoFaceDetected,

    #[error("Invalid field `{field}`. Allowed fields are {allowed:?}")]
    InvalidField { field: String, allowed: Vec<String> },

    #[error("Invalid type for field `{field}`. Expected {expected} but got {found}")]
    InvalidFieldType {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },

    #[error("QR Code {qrcode_id} `is_active` is still {actual}")]
    ActivationMismatch { qrcode_id: String, actual: bool },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),
}

impl ClientError {
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }

    pub fn not_found(qrcode_id: impl Into<String>) -> Self {
        Self::NotFound(qrcode_id.into())
    }

    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::Retrieval(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Generation(_) => "generation",
            ClientError::Update(_) => "update",
            ClientError::NotFound(_) => "not_found",
            ClientError::Retrieval(_) => "retrieval",
            ClientError::NotSupported(_) => "not_supported",
            ClientError::NoFaceDetected => "no_face_detected",
            ClientError::InvalidField { .. } => "invalid_field",
            ClientError::InvalidFieldType { .. } => "invalid_field_type",
            ClientError::ActivationMismatch { .. } => "activation_mismatch",
            ClientError::Config(_) => "config",
            ClientError::Network(_) => "network",
            ClientError::Json(_) => "json",
            ClientError::Io(_) => "io",
            ClientError::Image(_) => "image",
        }
    }
}

impl From<ModelError> for ClientError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidField { field, allowed } => ClientError::InvalidField { field, allowed },
            ModelError::InvalidFieldType {
                field,
                expected,
                found,
            } => ClientError::InvalidFieldType {
                field,
                expected,
                found,
            },
            err @ ModelError::UnsupportedQrCodeType { .. } => ClientError::NotSupported(err.to_string()),
        }
    }
}
