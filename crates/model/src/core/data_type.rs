use crate::core::value::Value;
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap, fmt, str::FromStr};
use uuid::Uuid;

/// Declared type of a field, used to coerce cursor values and to decide
/// whether a field can drive a scroll at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Int,
    IntUnsigned,
    Float,
    Boolean,
    String,
    Uuid,
    Date,
    Timestamp,
    Json,
    Bytes,
}

lazy_static! {
    static ref TYPE_NAME_MAP: HashMap<&'static str, DataType> = build_type_name_map();
}

impl DataType {
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            DataType::Int => Cow::Borrowed("int"),
            DataType::IntUnsigned => Cow::Borrowed("int_unsigned"),
            DataType::Float => Cow::Borrowed("float"),
            DataType::Boolean => Cow::Borrowed("boolean"),
            DataType::String => Cow::Borrowed("string"),
            DataType::Uuid => Cow::Borrowed("uuid"),
            DataType::Date => Cow::Borrowed("date"),
            DataType::Timestamp => Cow::Borrowed("timestamp"),
            DataType::Json => Cow::Borrowed("json"),
            DataType::Bytes => Cow::Borrowed("bytes"),
        }
    }

    /// Whether values of this type have a total order a keyset predicate can use.
    pub fn is_sortable(&self) -> bool {
        !matches!(self, DataType::Json | DataType::Bytes)
    }

    /// Parses the canonical text form of a value of this type.
    ///
    /// Returns `None` when the text cannot be coerced, or the type is not sortable.
    pub fn get_value(&self, text: &str) -> Option<Value> {
        match self {
            DataType::Int => text.parse::<i64>().ok().map(Value::Int),
            DataType::IntUnsigned => text.parse::<u64>().ok().map(Value::Uint),
            DataType::Float => text.parse::<f64>().ok().map(Value::Float),
            DataType::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Boolean(true)),
                "false" | "0" => Some(Value::Boolean(false)),
                _ => None,
            },
            DataType::String => Some(Value::String(text.to_string())),
            DataType::Uuid => Uuid::parse_str(text).ok().map(Value::Uuid),
            DataType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(Value::Date),
            DataType::Timestamp => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|ts| Value::Timestamp(ts.with_timezone(&Utc))),
            DataType::Json | DataType::Bytes => None,
        }
    }

    /// Coerces an already-typed value into this type.
    ///
    /// Values that already match pass through; everything else goes through
    /// the canonical text form so the rules stay identical to token decoding.
    pub fn coerce(&self, value: Value) -> Option<Value> {
        if value.is_null() {
            return Some(Value::Null);
        }
        if value.data_type() == Some(*self) {
            return Some(value);
        }
        let text = value.as_canonical_string()?;
        self.get_value(&text)
    }

    /// Best-effort type inference for untyped text cells (CSV input).
    ///
    /// Tried in order: int, float, boolean, date, timestamp, uuid, string.
    pub fn infer_from_str(text: &str) -> DataType {
        const CANDIDATES: [DataType; 6] = [
            DataType::Int,
            DataType::Float,
            DataType::Boolean,
            DataType::Date,
            DataType::Timestamp,
            DataType::Uuid,
        ];

        CANDIDATES
            .into_iter()
            .find(|candidate| match candidate {
                // "1"/"0" are ints, not booleans
                DataType::Boolean => matches!(
                    text.to_ascii_lowercase().as_str(),
                    "true" | "false"
                ),
                other => other.get_value(text).is_some(),
            })
            .unwrap_or(DataType::String)
    }

    /// Widens two inferred types into one that can hold both.
    pub fn widen(self, other: DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a,
            (DataType::Int, DataType::Float) | (DataType::Float, DataType::Int) => DataType::Float,
            _ => DataType::String,
        }
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        TYPE_NAME_MAP
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| format!("Unknown field type: {s}"))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn build_type_name_map() -> HashMap<&'static str, DataType> {
    use DataType::*;

    let entries = [
        ("int", Int),
        ("integer", Int),
        ("bigint", Int),
        ("i64", Int),
        ("int_unsigned", IntUnsigned),
        ("unsigned", IntUnsigned),
        ("u64", IntUnsigned),
        ("float", Float),
        ("double", Float),
        ("real", Float),
        ("f64", Float),
        ("bool", Boolean),
        ("boolean", Boolean),
        ("string", String),
        ("text", String),
        ("varchar", String),
        ("uuid", Uuid),
        ("date", Date),
        ("timestamp", Timestamp),
        ("datetime", Timestamp),
        ("time", Timestamp),
        ("json", Json),
        ("bytes", Bytes),
        ("bytea", Bytes),
    ];

    let mut map = HashMap::new();
    for (name, data_type) in entries {
        map.insert(name, data_type);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_names_case_insensitively() {
        assert_eq!("Integer".parse::<DataType>(), Ok(DataType::Int));
        assert_eq!(" DATETIME ".parse::<DataType>(), Ok(DataType::Timestamp));
        assert!("geometry".parse::<DataType>().is_err());
    }

    #[test]
    fn infers_cell_types() {
        assert_eq!(DataType::infer_from_str("42"), DataType::Int);
        assert_eq!(DataType::infer_from_str("4.5"), DataType::Float);
        assert_eq!(DataType::infer_from_str("TRUE"), DataType::Boolean);
        assert_eq!(DataType::infer_from_str("2013-01-21"), DataType::Date);
        assert_eq!(
            DataType::infer_from_str("2013-01-21T01:42:03Z"),
            DataType::Timestamp
        );
        assert_eq!(
            DataType::infer_from_str("67e55044-10b1-426f-9247-bb680e5fe0c8"),
            DataType::Uuid
        );
        assert_eq!(DataType::infer_from_str("hello"), DataType::String);
    }

    #[test]
    fn widening_falls_back_to_string() {
        assert_eq!(DataType::Int.widen(DataType::Float), DataType::Float);
        assert_eq!(DataType::Int.widen(DataType::Date), DataType::String);
        assert_eq!(DataType::Date.widen(DataType::Date), DataType::Date);
    }

    #[test]
    fn coerce_goes_through_canonical_text() {
        assert_eq!(
            DataType::String.coerce(Value::Int(7)),
            Some(Value::String("7".into()))
        );
        assert_eq!(
            DataType::Int.coerce(Value::String("7".into())),
            Some(Value::Int(7))
        );
        assert_eq!(DataType::Int.coerce(Value::String("x".into())), None);
        assert_eq!(DataType::Json.coerce(Value::Int(1)), None);
        assert_eq!(DataType::Date.coerce(Value::Null), Some(Value::Null));
    }
}
