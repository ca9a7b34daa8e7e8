//! Defines the Abstract Syntax Tree (AST) for a SELECT query.

use crate::query::{
    ast::{
        common::{OrderDir, TableRef},
        expr::Expr,
    },
    ident,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    /// The list of columns to be returned. Empty means every column.
    pub columns: Vec<Expr>,

    /// The primary table (or entity) for the query.
    /// e.g., `FROM feed_items`
    pub from: Option<FromClause>,

    /// The WHERE clause condition.
    pub where_clause: Option<Expr>,

    /// The ORDER BY clause.
    pub order_by: Vec<OrderByExpr>,

    /// The LIMIT clause.
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub table: TableRef,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: Option<OrderDir>,
}

impl OrderByExpr {
    /// The effective direction; an unspecified direction is ascending.
    pub fn dir(&self) -> OrderDir {
        self.direction.unwrap_or(OrderDir::Asc)
    }
}

impl Select {
    /// ANDs `condition` onto the existing WHERE clause, or sets it.
    pub fn and_where(&mut self, condition: Expr) {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
    }

    /// The same query with every ORDER BY key flipped.
    pub fn reversed(&self) -> Select {
        let mut select = self.clone();
        for order in &mut select.order_by {
            order.direction = Some(order.dir().reversed());
        }
        select
    }

    /// Adds `name` to an explicit column list that lacks it. A query
    /// selecting every column is left alone.
    pub fn include_column(&mut self, name: &str) {
        if self.columns.is_empty() {
            return;
        }
        let present = self
            .columns
            .iter()
            .any(|c| c.column_name().is_some_and(|col| col.eq_ignore_ascii_case(name)));
        if !present {
            self.columns.push(ident(name));
        }
    }

    pub fn entity(&self) -> Option<&str> {
        self.from.as_ref().map(|from| from.table.name.as_str())
    }
}
