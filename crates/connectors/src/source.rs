use crate::{error::ConnectorError, metadata::entity::EntityMetadata};
use async_trait::async_trait;
use model::records::row::RowData;
use planner::query::ast::select::Select;

/// A queryable collection a scroll runs against.
///
/// Implementations execute the filter, ordering and limit of a [`Select`]
/// and hand back the matching records in query order.
#[async_trait]
pub trait ScrollSource: Send + Sync {
    /// Schema lookup for `entity`.
    async fn metadata(&self, entity: &str) -> Result<EntityMetadata, ConnectorError>;

    async fn fetch(&self, select: &Select) -> Result<Vec<RowData>, ConnectorError>;

    /// Executes `select` with its ordering reversed, so the limit keeps the
    /// records nearest to the filter boundary, then restores the original
    /// order in memory.
    async fn fetch_reversed_limited(&self, select: &Select) -> Result<Vec<RowData>, ConnectorError> {
        let mut rows = self.fetch(&select.reversed()).await?;
        rows.reverse();
        Ok(rows)
    }
}
