use crate::{
    error::ConnectorError,
    file::csv::settings::CsvSettings,
    memory::MemorySource,
    metadata::{entity::EntityMetadata, field::FieldMetadata},
};
use csv::{ReaderBuilder, StringRecord};
use model::{
    core::{data_type::DataType, value::FieldValue},
    records::row::RowData,
};
use std::path::Path;
use tracing::{info, warn};

/// A CSV file read into typed rows plus the schema inferred from it.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub metadata: EntityMetadata,
    pub rows: Vec<RowData>,
}

impl CsvTable {
    /// Reads `path` as collection `entity`.
    ///
    /// Column types are inferred from every non-empty cell and widened until
    /// one type fits the whole column. Empty cells become nulls.
    pub fn load(path: &Path, entity: &str, settings: &CsvSettings) -> Result<Self, ConnectorError> {
        let delimiter = u8::try_from(settings.delimiter).map_err(|_| {
            ConnectorError::Generic(format!(
                "CSV delimiter must be a single byte, got '{}'",
                settings.delimiter
            ))
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(settings.has_header)
            .flexible(true)
            .from_path(path)?;

        let records = reader.records().collect::<Result<Vec<_>, _>>()?;
        let headers = if settings.has_header {
            reader
                .headers()?
                .iter()
                .map(normalize_col_name)
                .collect::<Vec<_>>()
        } else {
            let width = records.first().map(StringRecord::len).unwrap_or(0);
            (0..width).map(|i| format!("column_{i}")).collect()
        };

        Self::from_records(entity, headers, records, settings)
    }

    fn from_records(
        entity: &str,
        headers: Vec<String>,
        records: Vec<StringRecord>,
        settings: &CsvSettings,
    ) -> Result<Self, ConnectorError> {
        let id_field = normalize_col_name(&settings.id_field);
        let id_ordinal = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(&id_field))
            .ok_or_else(|| {
                ConnectorError::Generic(format!("CSV has no identifier column '{id_field}'"))
            })?;

        let mut usable = Vec::with_capacity(records.len());
        for (line, record) in records.into_iter().enumerate() {
            if record.len() != headers.len() {
                warn!(
                    "Skipping row {}: expected {} fields, found {}",
                    line + 1,
                    headers.len(),
                    record.len()
                );
                continue;
            }
            if record.get(id_ordinal).is_none_or(str::is_empty) {
                warn!("Skipping row {}: identifier '{}' is empty", line + 1, id_field);
                continue;
            }
            usable.push(record);
        }

        let fields = headers
            .iter()
            .enumerate()
            .map(|(ordinal, name)| FieldMetadata::new(name, infer_column(&usable, ordinal), ordinal))
            .collect::<Vec<_>>();

        let rows = usable
            .iter()
            .map(|record| {
                let values = fields
                    .iter()
                    .map(|field| {
                        let cell = record.get(field.ordinal).unwrap_or("");
                        FieldValue {
                            name: field.name.clone(),
                            value: (!cell.is_empty())
                                .then(|| field.data_type.get_value(cell))
                                .flatten(),
                            data_type: field.data_type,
                        }
                    })
                    .collect();
                RowData::new(entity, values)
            })
            .collect::<Vec<_>>();

        info!("Loaded {} rows from CSV entity '{}'", rows.len(), entity);
        Ok(CsvTable {
            metadata: EntityMetadata::new(entity, &headers[id_ordinal], fields),
            rows,
        })
    }

    /// Registers the table with an in-memory source.
    pub async fn register(self, source: &MemorySource) {
        source.register(self.metadata, self.rows).await;
    }
}

fn infer_column(records: &[StringRecord], ordinal: usize) -> DataType {
    records
        .iter()
        .filter_map(|record| record.get(ordinal))
        .filter(|cell| !cell.is_empty())
        .map(DataType::infer_from_str)
        .reduce(DataType::widen)
        .unwrap_or(DataType::String)
}

pub fn normalize_col_name(name: &str) -> String {
    name.trim()
        .replace([' ', '-', '.', '(', ')', ','], "_")
        .to_lowercase()
}
