//! Async client for the Dowell QR code generator API.
//!
//! This crate provides:
//! - `QrClient` for creating, updating, listing and (de)activating QR codes
//! - `ImageQrClient` for QR codes that resolve to an uploaded face image
//! - Environment-driven credentials and HTTP configuration

pub mod client;
pub mod config;
pub mod error;
pub mod image_client;
pub mod metrics;
pub mod options;

pub use client::{get_api_status, QrClient};
pub use config::{ClientConfig, Credentials, DEFAULT_BASE_URL, DEFAULT_DOWNLOAD_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use image_client::{ImageInput, ImageQrClient};
pub use options::{GenerateOptions, DEFAULT_LINK};

pub use dqr_models::{ApiStatus, FieldValue, GeneratedQrCode, Payload, QrCodeRecord, QrCodeType};

/// API version this client targets.
pub const API_VERSION: &str = "v2";
