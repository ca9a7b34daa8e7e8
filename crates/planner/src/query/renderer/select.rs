use crate::query::{
    ast::{
        common::{OrderDir, TableRef},
        select::{FromClause, OrderByExpr, Select},
    },
    renderer::{Render, Renderer},
};
use model::core::value::Value;

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("SELECT ");
        if self.columns.is_empty() {
            r.sql.push('*');
        } else {
            render_list(r, &self.columns);
        }

        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }
        if let Some(condition) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            condition.render(r);
        }
        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            render_list(r, &self.order_by);
        }
        if let Some(limit) = self.limit {
            r.sql.push_str(" LIMIT ");
            r.bind(Value::Uint(limit));
        }
    }
}

/// Comma-separated list of nodes.
pub(crate) fn render_list<T: Render>(r: &mut Renderer, nodes: &[T]) {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            r.sql.push_str(", ");
        }
        node.render(r);
    }
}

impl Render for TableRef {
    fn render(&self, r: &mut Renderer) {
        if let Some(schema) = &self.schema {
            r.push_ident(schema);
            r.sql.push('.');
        }
        r.push_ident(&self.name);
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        self.table.render(r);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.push_ident(alias);
        }
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        match self.direction {
            Some(OrderDir::Asc) => r.sql.push_str(" ASC"),
            Some(OrderDir::Desc) => r.sql.push_str(" DESC"),
            None => {}
        }
    }
}
