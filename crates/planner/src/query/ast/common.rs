//! Defines common, reusable AST nodes for building queries.

use model::pagination::cursor::SortDirection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl OrderDir {
    pub fn reversed(self) -> Self {
        match self {
            OrderDir::Asc => OrderDir::Desc,
            OrderDir::Desc => OrderDir::Asc,
        }
    }
}

impl From<SortDirection> for OrderDir {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => OrderDir::Asc,
            SortDirection::Desc => OrderDir::Desc,
        }
    }
}

impl From<OrderDir> for SortDirection {
    fn from(dir: OrderDir) -> Self {
        match dir {
            OrderDir::Asc => SortDirection::Asc,
            OrderDir::Desc => SortDirection::Desc,
        }
    }
}
