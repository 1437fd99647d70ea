//! Request payloads validated against a field allow-list.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::field::{field_names, kind_of, FieldTable, FieldValue};

/// Name → value map sent to the vendor API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, FieldValue>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Insert a field, returning the previous value if any.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check every field against `table`.
    ///
    /// Fails on the first field that is not in the table or whose value
    /// kind does not match.
    pub fn validate(&self, table: &FieldTable) -> ModelResult<()> {
        for (field, value) in &self.0 {
            let expected = kind_of(table, field).ok_or_else(|| ModelError::InvalidField {
                field: field.clone(),
                allowed: field_names(table),
            })?;

            if value.kind() != expected {
                return Err(ModelError::InvalidFieldType {
                    field: field.clone(),
                    expected,
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for Payload
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Payload {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, CREATE_FIELDS, UPDATE_FIELDS};

    #[test]
    fn test_valid_update_payload() {
        let payload = Payload::new()
            .with("qrcode_color", "#00ff23")
            .with("logo_size", 30)
            .with("is_active", true);
        assert!(payload.validate(UPDATE_FIELDS).is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let payload = Payload::new().with("quality", 2);
        let err = payload.validate(CREATE_FIELDS).unwrap_err();
        match err {
            ModelError::InvalidField { field, allowed } => {
                assert_eq!(field, "quality");
                assert!(allowed.contains(&"link".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_create_only_field_rejected_on_update() {
        let payload = Payload::new().with("quantity", 3);
        assert!(payload.validate(CREATE_FIELDS).is_ok());
        assert!(matches!(
            payload.validate(UPDATE_FIELDS),
            Err(ModelError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let payload = Payload::new().with("logo_size", "big");
        assert_eq!(
            payload.validate(UPDATE_FIELDS),
            Err(ModelError::InvalidFieldType {
                field: "logo_size".to_string(),
                expected: FieldKind::Integer,
                found: FieldKind::Text,
            })
        );
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let payload: Payload = [("link", FieldValue::from("https://example.com"))]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"link": "https://example.com"}));
    }
}
