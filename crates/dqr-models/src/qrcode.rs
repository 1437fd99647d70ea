//! QR code records and related vendor API types.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;

/// QR code types the vendor API can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum QrCodeType {
    /// QR code encoding a URL.
    #[default]
    Link,
}

impl QrCodeType {
    /// All supported types.
    pub const ALL: &'static [QrCodeType] = &[QrCodeType::Link];

    pub fn as_str(&self) -> &'static str {
        match self {
            QrCodeType::Link => "Link",
        }
    }

    /// Names of all supported types.
    pub fn available() -> Vec<String> {
        Self::ALL.iter().map(|t| t.as_str().to_string()).collect()
    }
}

impl fmt::Display for QrCodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QrCodeType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ModelError::UnsupportedQrCodeType {
                requested: s.to_string(),
                available: Self::available(),
            })
    }
}

/// A QR code as stored by the vendor service.
///
/// Only the fields this client relies on are typed; everything else the
/// API returns is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QrCodeRecord {
    /// Server-assigned identifier. The API returns it either as a string or a number.
    #[serde(deserialize_with = "string_or_number")]
    #[schemars(with = "String")]
    pub qrcode_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_size: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `null` from the API reads as inactive.
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_active: bool,

    /// Download URL of the rendered QR code image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode_image_url: Option<String>,

    /// Download URL of the uploaded logo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QrCodeRecord {
    /// The (image url, id) pair for this record, if it has an image URL.
    pub fn to_generated(&self) -> Option<GeneratedQrCode> {
        self.qrcode_image_url.as_ref().map(|url| GeneratedQrCode {
            image_url: url.clone(),
            qrcode_id: self.qrcode_id.clone(),
        })
    }
}

/// Compact result of generating a QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedQrCode {
    pub image_url: String,
    pub qrcode_id: String,
}

/// Vendor API health report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApiStatus {
    /// HTTP status code of the status call.
    pub status_code: u16,
    /// JSON body on success, `{"info": <body>}` otherwise.
    pub details: Map<String, Value>,
}

impl ApiStatus {
    pub fn is_up(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Unsigned(n) => n.to_string(),
        Id::Signed(n) => n.to_string(),
    })
}
