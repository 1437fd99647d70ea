//! Payload field kinds, values and the per-operation allow-lists.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Primitive kind a payload field must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer,
    Boolean,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single payload value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl FieldValue {
    /// Kind of the held value.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Boolean(_) => FieldKind::Boolean,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Render the value as a form/multipart text part.
    ///
    /// Booleans use the `True`/`False` spelling the vendor API accepts.
    pub fn to_form_value(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Boolean(true) => "True".to_string(),
            FieldValue::Boolean(false) => "False".to_string(),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// Fixed allow-list of field names and their kinds.
pub type FieldTable = [(&'static str, FieldKind)];

/// Fields accepted when creating QR codes.
pub const CREATE_FIELDS: &FieldTable = &[
    ("logo", FieldKind::Text),
    ("quantity", FieldKind::Integer),
    ("created_by", FieldKind::Text),
    ("company_id", FieldKind::Text),
    ("qrcode_type", FieldKind::Text),
    ("link", FieldKind::Text),
    ("product_name", FieldKind::Text),
    ("qrcode_color", FieldKind::Text),
    ("logo_size", FieldKind::Integer),
    ("description", FieldKind::Text),
    ("is_active", FieldKind::Boolean),
];

/// Fields accepted when updating a QR code.
pub const UPDATE_FIELDS: &FieldTable = &[
    ("logo", FieldKind::Text),
    ("company_id", FieldKind::Text),
    ("created_by", FieldKind::Text),
    ("link", FieldKind::Text),
    ("qrcode_color", FieldKind::Text),
    ("logo_size", FieldKind::Integer),
    ("product_name", FieldKind::Text),
    ("description", FieldKind::Text),
    ("is_active", FieldKind::Boolean),
];

/// Look up the kind of `field` in `table`.
pub fn kind_of(table: &FieldTable, field: &str) -> Option<FieldKind> {
    table
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, kind)| *kind)
}

/// Field names of `table`, in declaration order.
pub fn field_names(table: &FieldTable) -> Vec<String> {
    table.iter().map(|(name, _)| name.to_string()).collect()
}
