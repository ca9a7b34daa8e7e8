use connectors::{
    memory::MemorySource,
    metadata::{entity::EntityMetadata, field::FieldMetadata},
};
use engine_config::settings::ScrollSettings;
use engine_core::{
    error::ScrollError,
    page::{Page, ScrollOptions},
    scroll::ScrollEngine,
};
use model::{
    core::{
        data_type::DataType,
        value::{FieldValue, Value},
    },
    pagination::cursor::CursorInput,
    records::row::RowData,
};
use planner::{
    query::{
        ast::{common::OrderDir, select::Select},
        builder::select::SelectBuilder,
        ident,
    },
    table_ref,
};
use std::sync::Arc;

pub const FEED_ITEMS: &str = "feed_items";

/// A `feed_items` record: integer id, integer sort field `n`, and an
/// `embed_id` foreign key onto another entity's identifier.
pub fn feed_item(id: i64, n: Option<i64>) -> RowData {
    RowData::new(
        FEED_ITEMS,
        vec![
            FieldValue {
                name: "id".into(),
                value: Some(Value::Int(id)),
                data_type: DataType::Int,
            },
            FieldValue {
                name: "n".into(),
                value: n.map(Value::Int),
                data_type: DataType::Int,
            },
            FieldValue {
                name: "embed_id".into(),
                value: Some(Value::Int(100 - id)),
                data_type: DataType::String,
            },
        ],
    )
}

pub fn feed_items_metadata() -> EntityMetadata {
    EntityMetadata::new(
        FEED_ITEMS,
        "id",
        vec![
            FieldMetadata::new("id", DataType::Int, 0),
            FieldMetadata::new("n", DataType::Int, 1),
            FieldMetadata::new("embed_id", DataType::String, 2).references("embeds", "id"),
        ],
    )
}

pub async fn engine_with(rows: Vec<RowData>) -> ScrollEngine<MemorySource> {
    let source = MemorySource::new();
    source.register(feed_items_metadata(), rows).await;
    ScrollEngine::new(Arc::new(source), ScrollSettings::default())
}

/// Records `id = 1..=count` with `n = id - 1`.
pub async fn sequential_engine(count: i64) -> ScrollEngine<MemorySource> {
    engine_with((1..=count).map(|id| feed_item(id, Some(id - 1))).collect()).await
}

pub fn feed_items() -> Select {
    SelectBuilder::new()
        .select(vec![])
        .from(table_ref!(FEED_ITEMS), None)
        .build()
}

pub fn feed_items_by(field: &str, dir: OrderDir) -> Select {
    SelectBuilder::new()
        .select(vec![])
        .from(table_ref!(FEED_ITEMS), None)
        .order_by(ident(field), Some(dir))
        .build()
}

pub fn values(page: &Page, field: &str) -> Vec<Value> {
    page.records.iter().map(|r| r.get_value(field)).collect()
}

pub fn ints(values: impl IntoIterator<Item = i64>) -> Vec<Value> {
    values.into_iter().map(Value::Int).collect()
}

/// Follows `next_cursor` from the start until a page comes back empty.
pub async fn scroll_to_end(
    engine: &ScrollEngine<MemorySource>,
    select: &Select,
    limit: u64,
) -> Result<Vec<RowData>, ScrollError> {
    let options = ScrollOptions::default().limit(limit);
    let mut cursor = CursorInput::default();
    let mut records = Vec::new();

    loop {
        let page = engine.scroll(select.clone(), cursor, &options).await?;
        let Some(next) = page.next_cursor else {
            return Ok(records);
        };
        records.extend(page.records);
        cursor = next.into();
    }
}
