//! Opaque wire formats for cursors.
//!
//! Plain tokens are `value:tiebreak_id` with `%` and `:` percent-escaped in
//! each component; a lone `%` stands for a null value. Base64 tokens wrap a
//! JSON payload that also carries the sort field, direction and cursor kind.
//! Both formats encode the start position distinctly and decode the empty
//! string back to it.

use crate::{
    core::{data_type::DataType, value::Value},
    pagination::{
        cursor::{Cursor, CursorOptions, SortDirection, TokenEncoding},
        error::CursorError,
    },
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

const NULL_COMPONENT: &str = "%";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum CursorKind {
    Next,
    Previous,
}

#[derive(Serialize, Deserialize, Debug)]
struct TokenPayload {
    value: Option<String>,
    field_type: DataType,
    field_name: String,
    direction: i8,
    tiebreak_id: Option<String>,
    #[serde(rename = "type")]
    kind: CursorKind,
}

pub(crate) fn encode_plain(cursor: &Cursor) -> String {
    match cursor.tiebreak_id() {
        None => String::new(),
        Some(id) => format!(
            "{}:{}",
            encode_component(cursor.value()),
            encode_component(id)
        ),
    }
}

pub(crate) fn decode_plain(token: &str, options: &CursorOptions) -> Result<Cursor, CursorError> {
    check_len(token, options.max_token_len)?;
    let options = CursorOptions {
        encoding: TokenEncoding::Plain,
        ..options.clone()
    };
    if token.is_empty() {
        return Ok(Cursor::empty(&options));
    }

    let mut parts = token.split(':');
    let (Some(value), Some(id), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CursorError::Malformed(format!(
            "expected `value:tiebreak_id`, got '{token}'"
        )));
    };

    let value = decode_component(value, options.field_type)?;
    let id = decode_component(id, options.id_type)?;
    Cursor::new(value, id, &options)
}

pub(crate) fn encode_base64(cursor: &Cursor) -> String {
    let payload = TokenPayload {
        value: cursor.value().as_canonical_string(),
        field_type: cursor.field_type(),
        field_name: cursor.field_name().to_string(),
        direction: cursor.direction().as_i8(),
        tiebreak_id: cursor.tiebreak_id().and_then(Value::as_canonical_string),
        kind: if cursor.is_previous() {
            CursorKind::Previous
        } else {
            CursorKind::Next
        },
    };
    let json = serde_json::to_vec(&payload).expect("Failed to serialize cursor token payload");
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes a base64 token.
///
/// Field name, direction and kind come from the token itself, so a cursor
/// issued under another ordering is detected by the caller's sort check.
/// Value and id are coerced to the caller's field and identifier types.
pub(crate) fn decode_base64(token: &str, options: &CursorOptions) -> Result<Cursor, CursorError> {
    check_len(token, options.max_token_len)?;
    let base = CursorOptions {
        encoding: TokenEncoding::Base64,
        ..options.clone()
    };
    if token.is_empty() {
        return Ok(Cursor::empty(&base));
    }

    let bytes = URL_SAFE_NO_PAD.decode(token.trim())?;
    let payload: TokenPayload = serde_json::from_slice(&bytes)?;
    let direction = SortDirection::from_i8(payload.direction).ok_or_else(|| {
        CursorError::Malformed(format!("invalid direction {}", payload.direction))
    })?;

    let options = CursorOptions {
        field_name: payload.field_name,
        direction,
        is_previous: payload.kind == CursorKind::Previous,
        ..base
    };

    let Some(id) = payload.tiebreak_id else {
        return Ok(Cursor::empty(&options));
    };
    let value = match payload.value {
        Some(text) => parse_typed(&text, options.field_type)?,
        None => Value::Null,
    };
    let id = parse_typed(&id, options.id_type)?;
    Cursor::new(value, id, &options)
}

fn check_len(token: &str, max: usize) -> Result<(), CursorError> {
    if token.len() > max {
        return Err(CursorError::TooLong {
            len: token.len(),
            max,
        });
    }
    Ok(())
}

fn encode_component(value: &Value) -> String {
    match value.as_canonical_string() {
        None => NULL_COMPONENT.to_string(),
        Some(text) => escape(&text),
    }
}

fn decode_component(component: &str, data_type: DataType) -> Result<Value, CursorError> {
    if component == NULL_COMPONENT {
        return Ok(Value::Null);
    }
    parse_typed(&unescape(component)?, data_type)
}

fn parse_typed(text: &str, data_type: DataType) -> Result<Value, CursorError> {
    if !data_type.is_sortable() {
        return Err(CursorError::UnsupportedType(data_type));
    }
    data_type
        .get_value(text)
        .ok_or_else(|| CursorError::Coercion {
            value: text.to_string(),
            data_type,
        })
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape(text: &str) -> Result<String, CursorError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let escape = rest.get(pos..pos + 3);
        match escape {
            Some("%25") => out.push('%'),
            Some("%3A") | Some("%3a") => out.push(':'),
            _ => {
                return Err(CursorError::Malformed(format!(
                    "invalid escape sequence in '{text}'"
                )));
            }
        }
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Ok(out)
}
