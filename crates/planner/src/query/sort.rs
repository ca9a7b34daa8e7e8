//! Sort resolution and validation for keyset scrolling.
//!
//! A scrollable query orders by exactly one field; the identifier is the
//! implicit tiebreaker and is appended to the executed ORDER BY.

use crate::query::{
    ast::{
        common::OrderDir,
        select::{OrderByExpr, Select},
    },
    ident,
};
use model::pagination::cursor::{Cursor, SortDirection};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortError {
    #[error("Scrolling supports a single sort field, got: {}", fields.join(", "))]
    MultipleSortFields { fields: Vec<String> },

    #[error("Cursor sort {cursor} does not match query sort {query}")]
    MismatchedSortFields { cursor: SortSpec, query: SortSpec },

    #[error("Cannot scroll on sort expression: {0}")]
    UnsupportedSortExpression(String),
}

/// The single active sort key of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: &str, direction: SortDirection) -> Self {
        SortSpec {
            field: field.to_string(),
            direction,
        }
    }

    /// Extracts the sort key of `select`, or `None` when it has no ORDER BY.
    pub fn from_select(select: &Select) -> Result<Option<SortSpec>, SortError> {
        match select.order_by.as_slice() {
            [] => Ok(None),
            [order] => {
                let field = order
                    .expr
                    .column_name()
                    .ok_or_else(|| SortError::UnsupportedSortExpression(order.expr.to_string()))?;
                Ok(Some(SortSpec::new(field, order.dir().into())))
            }
            orders => Err(SortError::MultipleSortFields {
                fields: orders.iter().map(|o| o.expr.to_string()).collect(),
            }),
        }
    }

    pub fn of_cursor(cursor: &Cursor) -> Self {
        SortSpec::new(cursor.field_name(), cursor.direction())
    }

    /// Fails unless `cursor` was issued for this exact ordering.
    pub fn check_cursor(&self, cursor: &Cursor) -> Result<(), SortError> {
        let cursor = SortSpec::of_cursor(cursor);
        if &cursor != self {
            return Err(SortError::MismatchedSortFields {
                cursor,
                query: self.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

/// Resolves the query's sort key, injecting `id_field asc` when the query is
/// unordered. The single-field check runs before the default is injected.
pub fn resolve_sort(select: &mut Select, id_field: &str) -> Result<SortSpec, SortError> {
    if let Some(spec) = SortSpec::from_select(select)? {
        return Ok(spec);
    }
    select.order_by.push(OrderByExpr {
        expr: ident(id_field),
        direction: Some(OrderDir::Asc),
    });
    Ok(SortSpec::new(id_field, SortDirection::Asc))
}

/// Appends the identifier as secondary ORDER BY key in the sort direction,
/// unless the sort field already is the identifier.
pub fn append_tiebreak(select: &mut Select, sort_field: &str, id_field: &str) {
    let Some(primary) = select.order_by.first() else {
        return;
    };
    if sort_field.eq_ignore_ascii_case(id_field) || select.order_by.len() > 1 {
        return;
    }
    let direction = Some(primary.dir());
    select.order_by.push(OrderByExpr {
        expr: ident(id_field),
        direction,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{
        ast::expr::{Expr, FunctionCall},
        builder::select::SelectBuilder,
    };
    use crate::table_ref;
    use model::{core::data_type::DataType, pagination::cursor::CursorOptions};

    fn ordered_by(keys: &[(&str, OrderDir)]) -> Select {
        keys.iter()
            .fold(
                SelectBuilder::new()
                    .select(vec![])
                    .from(table_ref!("feed_items"), None),
                |builder, (field, dir)| builder.order_by(ident(field), Some(*dir)),
            )
            .build()
    }

    #[test]
    fn unordered_queries_default_to_id_ascending() {
        let mut select = ordered_by(&[]);
        let spec = resolve_sort(&mut select, "id").unwrap();

        assert_eq!(spec, SortSpec::new("id", SortDirection::Asc));
        assert_eq!(select.order_by.len(), 1);
        assert_eq!(select.order_by[0].expr, ident("id"));
    }

    #[test]
    fn single_sort_key_is_kept() {
        let mut select = ordered_by(&[("a_integer", OrderDir::Desc)]);
        let spec = resolve_sort(&mut select, "id").unwrap();
        assert_eq!(spec, SortSpec::new("a_integer", SortDirection::Desc));
    }

    #[test]
    fn two_sort_fields_are_rejected_by_name() {
        let mut select = ordered_by(&[("a_integer", OrderDir::Asc), ("a_string", OrderDir::Asc)]);
        let err = resolve_sort(&mut select, "id").unwrap_err();

        assert_eq!(
            err,
            SortError::MultipleSortFields {
                fields: vec!["a_integer".into(), "a_string".into()],
            }
        );
        assert!(err.to_string().contains("a_integer, a_string"));
    }

    #[test]
    fn computed_sort_keys_are_rejected() {
        let mut select = SelectBuilder::new()
            .select(vec![])
            .from(table_ref!("feed_items"), None)
            .order_by(
                Expr::FunctionCall(FunctionCall {
                    name: "LOWER".into(),
                    args: vec![ident("name")],
                }),
                None,
            )
            .build();

        assert!(matches!(
            resolve_sort(&mut select, "id"),
            Err(SortError::UnsupportedSortExpression(_))
        ));
    }

    #[test]
    fn cursor_must_match_field_and_direction() {
        let query = SortSpec::new("a", SortDirection::Asc);
        let cursor = |field: &str, direction| {
            Cursor::empty(&CursorOptions::new(field, DataType::Int, direction))
        };

        assert!(query.check_cursor(&cursor("a", SortDirection::Asc)).is_ok());
        assert_eq!(
            query.check_cursor(&cursor("a", SortDirection::Desc)),
            Err(SortError::MismatchedSortFields {
                cursor: SortSpec::new("a", SortDirection::Desc),
                query: query.clone(),
            })
        );
        assert!(query.check_cursor(&cursor("b", SortDirection::Asc)).is_err());
    }

    #[test]
    fn tiebreak_follows_the_sort_direction() {
        let mut select = ordered_by(&[("a_integer", OrderDir::Desc)]);
        append_tiebreak(&mut select, "a_integer", "id");

        assert_eq!(select.order_by.len(), 2);
        assert_eq!(select.order_by[1].expr, ident("id"));
        assert_eq!(select.order_by[1].direction, Some(OrderDir::Desc));

        let mut by_id = ordered_by(&[("id", OrderDir::Asc)]);
        append_tiebreak(&mut by_id, "id", "id");
        assert_eq!(by_id.order_by.len(), 1);
    }

    #[test]
    fn identifier_sort_matches_case_insensitively() {
        let mut select = ordered_by(&[("ID", OrderDir::Desc)]);
        append_tiebreak(&mut select, "ID", "id");
        assert_eq!(select.order_by.len(), 1);
    }
}
