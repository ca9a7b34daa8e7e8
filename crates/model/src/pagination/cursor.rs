use crate::{
    core::{data_type::DataType, value::Value},
    pagination::{error::CursorError, token},
    records::row::RowData,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Default bound on untrusted token input, in bytes.
pub const DEFAULT_MAX_TOKEN_LEN: usize = 8 * 1024;

/// Sort direction of the single scroll field.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `+1` for ascending, `-1` for descending.
    pub fn as_i8(self) -> i8 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }

    pub fn from_i8(direction: i8) -> Option<Self> {
        match direction {
            1 => Some(SortDirection::Asc),
            -1 => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "1" | "+1" => Ok(SortDirection::Asc),
            "desc" | "-1" => Ok(SortDirection::Desc),
            other => Err(format!("Unknown sort direction: {other}")),
        }
    }
}

/// Wire format of a cursor token.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenEncoding {
    /// `value:tiebreak_id`, percent-escaped.
    #[default]
    Plain,
    /// URL-safe base64 of a self-describing JSON payload.
    Base64,
}

impl fmt::Display for TokenEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenEncoding::Plain => write!(f, "plain"),
            TokenEncoding::Base64 => write!(f, "base64"),
        }
    }
}

impl FromStr for TokenEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "raw" => Ok(TokenEncoding::Plain),
            "base64" => Ok(TokenEncoding::Base64),
            other => Err(format!("Unknown token encoding: {other}")),
        }
    }
}

/// Everything needed to build a cursor besides the position itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorOptions {
    pub field_name: String,
    pub field_type: DataType,
    pub direction: SortDirection,
    pub id_field: String,
    pub id_type: DataType,
    pub is_previous: bool,
    pub encoding: TokenEncoding,
    pub max_token_len: usize,
}

impl CursorOptions {
    pub fn new(field_name: &str, field_type: DataType, direction: SortDirection) -> Self {
        CursorOptions {
            field_name: field_name.to_string(),
            field_type,
            direction,
            id_field: "id".to_string(),
            id_type: DataType::Int,
            is_previous: false,
            encoding: TokenEncoding::Plain,
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
        }
    }

    pub fn id(mut self, id_field: &str, id_type: DataType) -> Self {
        self.id_field = id_field.to_string();
        self.id_type = id_type;
        self
    }

    pub fn previous(mut self, is_previous: bool) -> Self {
        self.is_previous = is_previous;
        self
    }

    pub fn encoding(mut self, encoding: TokenEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn max_token_len(mut self, max_token_len: usize) -> Self {
        self.max_token_len = max_token_len;
        self
    }
}

/// A position in one specific ordering: the sort-field value of a record
/// plus its identifier as tiebreaker.
///
/// A cursor without a tiebreak id is the start position and adds no predicate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Cursor {
    value: Value,
    tiebreak_id: Option<Value>,
    field_name: String,
    field_type: DataType,
    direction: SortDirection,
    is_previous: bool,
    encoding: TokenEncoding,
}

impl Cursor {
    /// The start position for the given ordering.
    pub fn empty(options: &CursorOptions) -> Self {
        Cursor {
            value: Value::Null,
            tiebreak_id: None,
            field_name: options.field_name.clone(),
            field_type: options.field_type,
            direction: options.direction,
            is_previous: options.is_previous,
            encoding: options.encoding,
        }
    }

    /// Builds a positioned cursor, coercing `value` to the field type and
    /// `tiebreak_id` to the identifier type.
    pub fn new(
        value: Value,
        tiebreak_id: Value,
        options: &CursorOptions,
    ) -> Result<Self, CursorError> {
        let value = coerce(value, options.field_type)?;
        if tiebreak_id.is_null() {
            return Err(CursorError::MissingTiebreak(options.id_field.clone()));
        }
        let tiebreak_id = coerce(tiebreak_id, options.id_type)?;

        Ok(Cursor {
            tiebreak_id: Some(tiebreak_id),
            value,
            ..Cursor::empty(options)
        })
    }

    /// Derives the cursor positioned at `row`.
    ///
    /// `options.field_type` must already be the comparison type of the field:
    /// identifier-typed foreign keys compare as identifiers, not as their
    /// logical type.
    pub fn from_record(row: &RowData, options: &CursorOptions) -> Result<Self, CursorError> {
        Cursor::new(
            row.get_value(&options.field_name),
            row.get_value(&options.id_field),
            options,
        )
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn tiebreak_id(&self) -> Option<&Value> {
        self.tiebreak_id.as_ref()
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn field_type(&self) -> DataType {
        self.field_type
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn is_previous(&self) -> bool {
        self.is_previous
    }

    pub fn encoding(&self) -> TokenEncoding {
        self.encoding
    }

    pub fn is_empty(&self) -> bool {
        self.tiebreak_id.is_none()
    }

    /// Direction the keyset predicate compares in: the sort direction for a
    /// next cursor, its reverse for a previous cursor.
    pub fn compare_direction(&self) -> SortDirection {
        if self.is_previous {
            self.direction.reversed()
        } else {
            self.direction
        }
    }

    /// Encodes the cursor in its own wire format.
    pub fn encode(&self) -> String {
        match self.encoding {
            TokenEncoding::Plain => token::encode_plain(self),
            TokenEncoding::Base64 => token::encode_base64(self),
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

fn coerce(value: Value, data_type: DataType) -> Result<Value, CursorError> {
    if !data_type.is_sortable() {
        return Err(CursorError::UnsupportedType(data_type));
    }
    let text = value.to_string();
    data_type
        .coerce(value)
        .ok_or(CursorError::Coercion { value: text, data_type })
}

/// Cursor as accepted at the API boundary.
///
/// Resolved to a [`Cursor`] exactly once, before any query is built.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorInput {
    /// No position yet; derived cursors use the given encoding.
    Start(TokenEncoding),
    Plain(String),
    Base64(String),
    /// An already-decoded cursor, passed through as is.
    Cursor(Cursor),
}

impl Default for CursorInput {
    fn default() -> Self {
        CursorInput::Start(TokenEncoding::Plain)
    }
}

impl From<Cursor> for CursorInput {
    fn from(cursor: Cursor) -> Self {
        CursorInput::Cursor(cursor)
    }
}

impl CursorInput {
    /// Wraps a client-supplied token in the variant for `encoding`.
    pub fn token(token: impl Into<String>, encoding: TokenEncoding) -> Self {
        match encoding {
            TokenEncoding::Plain => CursorInput::Plain(token.into()),
            TokenEncoding::Base64 => CursorInput::Base64(token.into()),
        }
    }

    pub fn resolve(self, options: &CursorOptions) -> Result<Cursor, CursorError> {
        match self {
            CursorInput::Start(encoding) => Ok(Cursor::empty(&CursorOptions {
                encoding,
                ..options.clone()
            })),
            CursorInput::Plain(token) => token::decode_plain(&token, options),
            CursorInput::Base64(token) => token::decode_base64(&token, options),
            CursorInput::Cursor(cursor) => Ok(cursor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::FieldValue;

    fn options() -> CursorOptions {
        CursorOptions::new("a_integer", DataType::Int, SortDirection::Asc)
    }

    fn row(a_integer: Option<Value>, id: Option<Value>) -> RowData {
        RowData::new(
            "feed_items",
            vec![
                FieldValue {
                    name: "id".into(),
                    value: id,
                    data_type: DataType::Int,
                },
                FieldValue {
                    name: "a_integer".into(),
                    value: a_integer,
                    data_type: DataType::Int,
                },
            ],
        )
    }

    #[test]
    fn from_record_reads_field_and_identifier() {
        let cursor = Cursor::from_record(&row(Some(Value::Int(5)), Some(Value::Int(9))), &options())
            .expect("cursor from record");

        assert_eq!(cursor.value(), &Value::Int(5));
        assert_eq!(cursor.tiebreak_id(), Some(&Value::Int(9)));
        assert_eq!(cursor.field_name(), "a_integer");
        assert!(!cursor.is_empty());
        assert!(!cursor.is_previous());
    }

    #[test]
    fn from_record_keeps_null_sort_values() {
        let cursor = Cursor::from_record(&row(None, Some(Value::Int(9))), &options())
            .expect("cursor from record");
        assert_eq!(cursor.value(), &Value::Null);
    }

    #[test]
    fn from_record_requires_an_identifier() {
        let err = Cursor::from_record(&row(Some(Value::Int(5)), None), &options())
            .expect_err("missing id");
        assert!(matches!(err, CursorError::MissingTiebreak(field) if field == "id"));
    }

    #[test]
    fn unsortable_field_types_are_rejected() {
        let options = CursorOptions::new("payload", DataType::Json, SortDirection::Asc);
        let err = Cursor::new(Value::Int(1), Value::Int(1), &options).expect_err("json");
        assert!(matches!(err, CursorError::UnsupportedType(DataType::Json)));
    }

    #[test]
    fn previous_cursors_compare_in_reverse() {
        let next = Cursor::empty(&options());
        let previous = Cursor::empty(&options().previous(true));
        assert_eq!(next.compare_direction(), SortDirection::Asc);
        assert_eq!(previous.compare_direction(), SortDirection::Desc);
    }

    #[test]
    fn structured_cursors_pass_through_resolution() {
        let cursor = Cursor::new(Value::Int(3), Value::Int(4), &options()).unwrap();
        let resolved = CursorInput::from(cursor.clone())
            .resolve(&CursorOptions::new("other", DataType::String, SortDirection::Desc))
            .unwrap();
        assert_eq!(resolved, cursor);
    }

    #[test]
    fn start_resolves_to_an_empty_cursor_with_the_requested_encoding() {
        let cursor = CursorInput::Start(TokenEncoding::Base64)
            .resolve(&options())
            .unwrap();
        assert!(cursor.is_empty());
        assert_eq!(cursor.encoding(), TokenEncoding::Base64);
    }

    #[test]
    fn parses_directions() {
        assert_eq!("-1".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!("ASC".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!(SortDirection::from_i8(0), None);
    }
}
