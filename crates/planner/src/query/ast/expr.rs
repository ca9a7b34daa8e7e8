//! Defines the AST for filter and ordering expressions.

use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column identifier, e.g., `a_integer` or `feed_items.id`.
    Identifier(Ident),

    /// A literal value, such as a string, number, boolean, or NULL.
    Value(Value),

    /// A binary operation, e.g., `column = 'value'` or `a > b`.
    BinaryOp(Box<BinaryOp>),

    /// A function call, e.g., `LOWER(name)`.
    FunctionCall(FunctionCall),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'users' in 'users.id'
    pub name: String,              // e.g., the 'id' in 'users.id'
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // Logical
    And,
    Or,
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::binary(self, BinaryOperator::And, other)
    }

    pub fn or(self, other: Expr) -> Self {
        Expr::binary(self, BinaryOperator::Or, other)
    }

    /// The bare column name, if this expression is a plain identifier.
    pub fn column_name(&self) -> Option<&str> {
        match self {
            Expr::Identifier(ident) => Some(&ident.name),
            _ => None,
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Identifier(Ident {
                qualifier: Some(q),
                name,
            }) => write!(f, "{q}.{name}"),
            Expr::Identifier(Ident { name, .. }) => write!(f, "{name}"),
            Expr::Value(value) => write!(f, "{value}"),
            Expr::BinaryOp(op) => write!(f, "({} {} {})", op.left, op.op, op.right),
            Expr::FunctionCall(call) => {
                let args = call
                    .args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}({args})", call.name)
            }
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        };
        write!(f, "{op}")
    }
}
