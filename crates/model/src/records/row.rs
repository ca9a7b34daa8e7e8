use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

/// A materialized record as handed back by a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            entity: entity.to_string(),
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .and_then(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    /// Flattens the row into a `{field: value}` JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .field_values
            .iter()
            .map(|f| {
                let value = f
                    .value
                    .as_ref()
                    .map(Value::to_json)
                    .unwrap_or(serde_json::Value::Null);
                (f.name.clone(), value)
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}
