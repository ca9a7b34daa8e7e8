//! Turns query AST nodes into parameterised SQL.

use crate::query::dialect::SqlDialect;
use model::core::value::Value;

pub mod expr;
pub mod select;

pub trait Render {
    fn render(&self, r: &mut Renderer);
}

/// SQL text and bound parameters accumulated while walking a node.
pub struct Renderer {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: SqlDialect,
}

impl Renderer {
    pub fn new(dialect: SqlDialect) -> Self {
        Renderer {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    pub fn push_ident(&mut self, ident: &str) {
        let quoted = self.dialect.quote(ident);
        self.sql.push_str(&quoted);
    }

    /// Binds `value` and writes its placeholder.
    pub fn bind(&mut self, value: Value) {
        let placeholder = self.dialect.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
        self.params.push(value);
    }
}

pub fn render_sql(node: &dyn Render, dialect: SqlDialect) -> (String, Vec<Value>) {
    let mut r = Renderer::new(dialect);
    node.render(&mut r);
    (r.sql, r.params)
}
