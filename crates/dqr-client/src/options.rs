//! QR code creation options.

use std::path::PathBuf;

use dqr_models::{Payload, QrCodeType};

use crate::config::Credentials;
use crate::error::ClientResult;

/// Link used when none is given.
pub const DEFAULT_LINK: &str = "https://google.com/";

/// Everything needed to create one or more QR codes.
///
/// New QR codes are inactive unless `is_active` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Target the QR code resolves to.
    pub link: String,
    /// Product name; sent as an empty string when unset.
    pub product_name: Option<String>,
    /// QR code type name, validated against [`QrCodeType`].
    pub qrcode_type: String,
    /// Number of QR codes to create.
    pub quantity: i64,
    /// Logo file uploaded with the request.
    pub logo: Option<PathBuf>,
    pub logo_size: i64,
    /// Hex color. Pick one with good contrast against white.
    pub qrcode_color: String,
    pub description: String,
    pub is_active: bool,
    /// Defaults to the client's username.
    pub created_by: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            link: DEFAULT_LINK.to_string(),
            product_name: None,
            qrcode_type: QrCodeType::default().as_str().to_string(),
            quantity: 1,
            logo: None,
            logo_size: 20,
            qrcode_color: "#000000".to_string(),
            description: String::new(),
            is_active: false,
            created_by: None,
        }
    }
}

impl GenerateOptions {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }

    pub fn product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = Some(product_name.into());
        self
    }

    pub fn qrcode_type(mut self, qrcode_type: impl Into<String>) -> Self {
        self.qrcode_type = qrcode_type.into();
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn logo(mut self, logo: impl Into<PathBuf>) -> Self {
        self.logo = Some(logo.into());
        self
    }

    pub fn logo_size(mut self, logo_size: i64) -> Self {
        self.logo_size = logo_size;
        self
    }

    pub fn color(mut self, qrcode_color: impl Into<String>) -> Self {
        self.qrcode_color = qrcode_color.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Parsed QR code type; fails for types the API does not offer.
    pub fn parsed_type(&self) -> ClientResult<QrCodeType> {
        Ok(self.qrcode_type.parse::<QrCodeType>()?)
    }

    /// Create payload for `credentials`. The logo is sent separately.
    pub(crate) fn to_payload(&self, credentials: &Credentials) -> Payload {
        Payload::new()
            .with("quantity", self.quantity)
            .with(
                "created_by",
                self.created_by
                    .clone()
                    .unwrap_or_else(|| credentials.username.clone()),
            )
            .with("company_id", credentials.user_id.clone())
            .with("qrcode_type", self.qrcode_type.clone())
            .with("link", self.link.clone())
            .with("product_name", self.product_name.clone().unwrap_or_default())
            .with("qrcode_color", self.qrcode_color.clone())
            .with("logo_size", self.logo_size)
            .with("description", self.description.clone())
            .with("is_active", self.is_active)
    }
}
