use model::core::data_type::DataType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub referenced_entity: String,
    pub referenced_field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub name: String,
    pub data_type: DataType,
    pub ordinal: usize,
    pub foreign_key: Option<ForeignKey>,
}

impl FieldMetadata {
    pub fn new(name: &str, data_type: DataType, ordinal: usize) -> Self {
        FieldMetadata {
            name: name.to_string(),
            data_type,
            ordinal,
            foreign_key: None,
        }
    }

    pub fn references(mut self, entity: &str, field: &str) -> Self {
        self.foreign_key = Some(ForeignKey {
            referenced_entity: entity.to_string(),
            referenced_field: field.to_string(),
        });
        self
    }

    /// Type this field's values are compared as.
    ///
    /// A foreign key onto an identifier holds raw identifiers, so it compares
    /// as `id_type` rather than its declared logical type.
    pub fn comparison_type(&self, id_field: &str, id_type: DataType) -> DataType {
        match &self.foreign_key {
            Some(fk) if fk.referenced_field.eq_ignore_ascii_case(id_field) => id_type,
            _ => self.data_type,
        }
    }
}
