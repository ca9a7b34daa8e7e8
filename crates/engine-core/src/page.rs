use model::{
    core::data_type::DataType,
    pagination::cursor::Cursor,
    records::row::RowData,
};

/// Per-call knobs of a scroll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollOptions {
    /// Field the cursor is built and checked against, when it differs from
    /// the ORDER BY key (e.g. a stored name behind an alias).
    pub field_name: Option<String>,
    /// Comparison type of the sort field; inferred from metadata when unset.
    pub field_type: Option<DataType>,
    /// Treat a plain token as a previous cursor.
    pub previous: bool,
    /// Page size; falls back to the query's own limit, then the configured default.
    pub limit: Option<u64>,
}

impl ScrollOptions {
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn previous(mut self, previous: bool) -> Self {
        self.previous = previous;
        self
    }

    pub fn field(mut self, name: &str, data_type: DataType) -> Self {
        self.field_name = Some(name.to_string());
        self.field_type = Some(data_type);
        self
    }
}

/// One page of records in query order.
///
/// `next_cursor` resumes after the last record and `previous_cursor` before
/// the first; both are `None` for an empty page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<RowData>,
    pub next_cursor: Option<Cursor>,
    pub previous_cursor: Option<Cursor>,
    /// The cursor this page was requested with.
    pub current_cursor: Cursor,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Position handed to a streaming callback alongside each record.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollIterator {
    /// Resumes forward right after the current record.
    pub next_cursor: Cursor,
    /// Resumes backward from the first record of the page.
    pub previous_cursor: Cursor,
    pub current_cursor: Cursor,
    /// Restarts the scroll from the beginning.
    pub first_cursor: Cursor,
}
