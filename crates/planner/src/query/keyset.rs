use crate::query::{
    ast::{
        expr::{BinaryOperator, Expr},
        select::Select,
    },
    ident, value,
};
use model::pagination::cursor::{Cursor, SortDirection};

/// Builds the two-term keyset predicate selecting records strictly beyond a
/// cursor:
///
/// ```text
/// (field ⋈ v) OR (field = v AND id ⋈ t)
/// ```
///
/// where `⋈` is `>` when the cursor compares ascending and `<` when it
/// compares descending. A previous cursor compares opposite to its sort
/// direction, so it selects records strictly before its position.
#[derive(Debug, Clone)]
pub struct KeysetPredicate {
    id_field: String,
}

impl KeysetPredicate {
    pub fn new(id_field: &str) -> Self {
        KeysetPredicate {
            id_field: id_field.to_string(),
        }
    }

    /// The predicate for `cursor`, or `None` for the start position.
    pub fn build(&self, cursor: &Cursor) -> Option<Expr> {
        let tiebreak_id = cursor.tiebreak_id()?;
        let op = match cursor.compare_direction() {
            SortDirection::Asc => BinaryOperator::Gt,
            SortDirection::Desc => BinaryOperator::Lt,
        };
        let field = cursor.field_name();

        let further = Expr::binary(ident(field), op, value(cursor.value().clone()));
        let tied = Expr::binary(
            ident(field),
            BinaryOperator::Eq,
            value(cursor.value().clone()),
        );
        let id_further = Expr::binary(ident(&self.id_field), op, value(tiebreak_id.clone()));

        Some(further.or(tied.and(id_further)))
    }

    /// ANDs the predicate for `cursor` onto the query's existing filter.
    /// The query is left untouched for the start position.
    pub fn apply(&self, select: &mut Select, cursor: &Cursor) {
        if let Some(predicate) = self.build(cursor) {
            select.and_where(predicate);
        }
    }
}
