use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvSettings {
    pub delimiter: char,
    pub has_header: bool,
    /// Identifier column; rows without a value in it are skipped.
    pub id_field: String,
}

impl Default for CsvSettings {
    fn default() -> Self {
        CsvSettings {
            delimiter: ',',
            has_header: true,
            id_field: "id".to_string(),
        }
    }
}
