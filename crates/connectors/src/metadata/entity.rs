use crate::metadata::field::FieldMetadata;
use model::core::data_type::DataType;
use serde::{Deserialize, Serialize};

/// Schema of one scrollable collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub name: String,
    /// Unique, totally ordered identifier present on every record.
    pub id_field: String,
    pub fields: Vec<FieldMetadata>,
}

impl EntityMetadata {
    pub fn new(name: &str, id_field: &str, fields: Vec<FieldMetadata>) -> Self {
        EntityMetadata {
            name: name.to_string(),
            id_field: id_field.to_string(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Declared type of the identifier; integer when the schema omits it.
    pub fn id_type(&self) -> DataType {
        self.field(&self.id_field)
            .map(|f| f.data_type)
            .unwrap_or(DataType::Int)
    }

    /// Comparison type of `name`, or `None` for an unknown field.
    pub fn comparison_type(&self, name: &str) -> Option<DataType> {
        self.field(name)
            .map(|f| f.comparison_type(&self.id_field, self.id_type()))
    }
}
