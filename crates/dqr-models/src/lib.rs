//! Shared data models for the Dowell QR code client.
//!
//! This crate provides Serde-serializable types for:
//! - Request payload fields and the per-operation allow-lists
//! - QR code records returned by the vendor API
//! - Image URL correction for API responses

pub mod error;
pub mod field;
pub mod payload;
pub mod qrcode;
pub mod utils;

// Re-export common types
pub use error::{ModelError, ModelResult};
pub use field::{FieldKind, FieldTable, FieldValue, CREATE_FIELDS, UPDATE_FIELDS};
pub use payload::Payload;
pub use qrcode::{ApiStatus, GeneratedQrCode, QrCodeRecord, QrCodeType};
pub use utils::{correct_image_url, correct_response_urls, file_name_from_path};
