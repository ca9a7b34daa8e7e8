//! A record source held in memory, used for CSV input and tests.
//!
//! Predicates are evaluated under the same total order rows are sorted by
//! ([`Value::sort_cmp`]), so nulls sit before every other value in both
//! the filter and the ORDER BY.

use crate::{error::ConnectorError, metadata::entity::EntityMetadata, source::ScrollSource};
use async_trait::async_trait;
use model::{core::value::Value, records::row::RowData};
use planner::query::ast::{
    common::OrderDir,
    expr::{BinaryOp, BinaryOperator, Expr},
    select::Select,
};
use std::{cmp::Ordering, collections::HashMap};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct Collection {
    metadata: EntityMetadata,
    rows: Vec<RowData>,
}

#[derive(Debug, Default)]
pub struct MemorySource {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a collection.
    pub async fn register(&self, metadata: EntityMetadata, rows: Vec<RowData>) {
        let mut collections = self.collections.write().await;
        collections.insert(metadata.name.clone(), Collection { metadata, rows });
    }

    pub async fn insert(&self, entity: &str, row: RowData) -> Result<(), ConnectorError> {
        let mut collections = self.collections.write().await;
        let collection = collections
            .get_mut(entity)
            .ok_or_else(|| ConnectorError::UnknownEntity(entity.to_string()))?;
        collection.rows.push(row);
        Ok(())
    }

    /// Removes the records whose identifier equals `id`, returning how many went.
    pub async fn delete(&self, entity: &str, id: &Value) -> Result<usize, ConnectorError> {
        let mut collections = self.collections.write().await;
        let collection = collections
            .get_mut(entity)
            .ok_or_else(|| ConnectorError::UnknownEntity(entity.to_string()))?;
        let id_field = collection.metadata.id_field.clone();
        let before = collection.rows.len();
        collection
            .rows
            .retain(|row| row.get_value(&id_field).sort_cmp(id) != Ordering::Equal);
        Ok(before - collection.rows.len())
    }

    pub async fn len(&self, entity: &str) -> Result<usize, ConnectorError> {
        let collections = self.collections.read().await;
        collections
            .get(entity)
            .map(|c| c.rows.len())
            .ok_or_else(|| ConnectorError::UnknownEntity(entity.to_string()))
    }
}

#[async_trait]
impl ScrollSource for MemorySource {
    async fn metadata(&self, entity: &str) -> Result<EntityMetadata, ConnectorError> {
        let collections = self.collections.read().await;
        collections
            .get(entity)
            .map(|c| c.metadata.clone())
            .ok_or_else(|| ConnectorError::UnknownEntity(entity.to_string()))
    }

    async fn fetch(&self, select: &Select) -> Result<Vec<RowData>, ConnectorError> {
        let entity = select
            .entity()
            .ok_or_else(|| ConnectorError::Query("query has no FROM entity".to_string()))?;
        let order_keys = order_keys(select)?;

        let collections = self.collections.read().await;
        let collection = collections
            .get(entity)
            .ok_or_else(|| ConnectorError::UnknownEntity(entity.to_string()))?;

        let mut rows = Vec::new();
        for row in &collection.rows {
            let matches = match &select.where_clause {
                Some(condition) => eval(condition, row)?,
                None => true,
            };
            if matches {
                rows.push(row.clone());
            }
        }
        drop(collections);

        rows.sort_by(|a, b| {
            order_keys.iter().fold(Ordering::Equal, |acc, (field, dir)| {
                acc.then_with(|| {
                    let ord = a.get_value(field).sort_cmp(&b.get_value(field));
                    match dir {
                        OrderDir::Asc => ord,
                        OrderDir::Desc => ord.reverse(),
                    }
                })
            })
        });

        if let Some(limit) = select.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        debug!(entity, rows = rows.len(), "Memory fetch");
        project(select, rows)
    }
}

fn order_keys(select: &Select) -> Result<Vec<(String, OrderDir)>, ConnectorError> {
    select
        .order_by
        .iter()
        .map(|order| {
            order
                .expr
                .column_name()
                .map(|name| (name.to_string(), order.dir()))
                .ok_or_else(|| {
                    ConnectorError::Query(format!("cannot order by expression: {}", order.expr))
                })
        })
        .collect()
}

fn eval(expr: &Expr, row: &RowData) -> Result<bool, ConnectorError> {
    match expr {
        Expr::BinaryOp(op) => match op.op {
            BinaryOperator::And => Ok(eval(&op.left, row)? && eval(&op.right, row)?),
            BinaryOperator::Or => Ok(eval(&op.left, row)? || eval(&op.right, row)?),
            BinaryOperator::Eq => compare(op, row).map(Ordering::is_eq),
            BinaryOperator::NotEq => compare(op, row).map(Ordering::is_ne),
            BinaryOperator::Lt => compare(op, row).map(Ordering::is_lt),
            BinaryOperator::LtEq => compare(op, row).map(Ordering::is_le),
            BinaryOperator::Gt => compare(op, row).map(Ordering::is_gt),
            BinaryOperator::GtEq => compare(op, row).map(Ordering::is_ge),
        },
        Expr::Value(Value::Boolean(b)) => Ok(*b),
        other => Err(ConnectorError::Query(format!(
            "expression is not a condition: {other}"
        ))),
    }
}

fn compare(op: &BinaryOp, row: &RowData) -> Result<Ordering, ConnectorError> {
    let left = operand(&op.left, row)?;
    let right = operand(&op.right, row)?;
    Ok(left.sort_cmp(&right))
}

fn operand(expr: &Expr, row: &RowData) -> Result<Value, ConnectorError> {
    match expr {
        Expr::Identifier(ident) => Ok(row.get_value(&ident.name)),
        Expr::Value(value) => Ok(value.clone()),
        other => Err(ConnectorError::Query(format!(
            "unsupported operand: {other}"
        ))),
    }
}

fn project(select: &Select, rows: Vec<RowData>) -> Result<Vec<RowData>, ConnectorError> {
    if select.columns.is_empty() {
        return Ok(rows);
    }
    let columns = select
        .columns
        .iter()
        .map(|c| {
            c.column_name()
                .ok_or_else(|| ConnectorError::Query(format!("cannot project expression: {c}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let fields = row
                .field_values
                .into_iter()
                .filter(|f| columns.iter().any(|c| c.eq_ignore_ascii_case(&f.name)))
                .collect();
            RowData::new(&row.entity, fields)
        })
        .collect())
}
