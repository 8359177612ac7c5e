//! Opaque table rows and their identifiers

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Which field of a row holds its stable identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum IdField {
    /// The `id` field.
    #[default]
    Id,
    /// The `uuid` field.
    Uuid,
    /// Any other field name.
    Custom(String),
}

impl IdField {
    /// Returns the JSON field name.
    pub fn name(&self) -> &str {
        match self {
            Self::Id => "id",
            Self::Uuid => "uuid",
            Self::Custom(name) => name,
        }
    }
}

/// Identifier of a row, normalised to a string.
///
/// Backends key some collections by integer and others by UUID string; both
/// collapse to the same representation so selections can be compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Creates a row id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extracts an id from a JSON value.
    ///
    /// Strings and numbers are accepted; anything else has no identity.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single row of a collection.
///
/// The shape is entity specific (lead, customer, invoice, ...) and the
/// controller never looks past the identifier field.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{IdField, Row, RowId};
/// use serde_json::json;
///
/// let row: Row = serde_json::from_value(json!({"id": 7, "name": "Acme"})).unwrap();
/// assert_eq!(row.id(&IdField::Id), Some(RowId::from(7)));
/// assert_eq!(row.get_str("name"), Some("Acme"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns the raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a field as a string slice, if it is a JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Returns the row identifier read from `field`.
    pub fn id(&self, field: &IdField) -> Option<RowId> {
        self.0.get(field.name()).and_then(RowId::from_value)
    }

    /// Iterates over the field names in document order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the row and returns the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_string_ids_normalise() {
        let numeric = Row::new().set("id", 42);
        let text = Row::new().set("id", "42");
        assert_eq!(numeric.id(&IdField::Id), text.id(&IdField::Id));
    }

    #[test]
    fn test_uuid_field() {
        let row = Row::new()
            .set("id", 1)
            .set("uuid", "8b0c6f3e-6c1b-4c55-9a52-3f6a1f4d2e10");
        assert_eq!(
            row.id(&IdField::Uuid).unwrap().as_str(),
            "8b0c6f3e-6c1b-4c55-9a52-3f6a1f4d2e10"
        );
    }

    #[test]
    fn test_missing_or_unusable_id() {
        assert_eq!(Row::new().set("name", "x").id(&IdField::Id), None);
        assert_eq!(Row::new().set("id", json!(null)).id(&IdField::Id), None);
        assert_eq!(Row::new().set("id", json!([1])).id(&IdField::Id), None);
    }

    #[test]
    fn test_custom_id_field() {
        let row = Row::new().set("code", "INV-001");
        let field = IdField::Custom("code".into());
        assert_eq!(row.id(&field), Some(RowId::from("INV-001")));
    }
}
