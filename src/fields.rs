//! Typed accessors over a parsed JSON record
//!
//! All defaulting policy for dump fields lives here. Each accessor encodes
//! one policy:
//!
//! | accessor            | absent  | `null`   | string | other value          |
//! |---------------------|---------|----------|--------|----------------------|
//! | [`string_or_default`] | `""`  | `""`     | as-is  | its JSON text        |
//! | [`optional_object`] | `None`  | `None`   | `None` | `Some` only for objects |
//! | [`optional_array`]  | `None`  | `None`   | `None` | `Some` only for arrays  |
//! | [`required_string`] | error   | error    | as-is  | error                |
//! | [`raw_text`]        | n/a     | `"null"` | as-is  | its JSON text        |

use crate::error::LoadError;
use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

/// Read a field as text, defaulting to the empty string when absent or null
pub fn string_or_default(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(value) => raw_text(value),
    }
}

/// Read a field that must be a string
pub fn required_string<'a>(record: &'a Record, field: &str) -> Result<&'a str, LoadError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| LoadError::missing(field))
}

pub fn optional_object<'a>(record: &'a Record, field: &str) -> Option<&'a Record> {
    record.get(field).and_then(Value::as_object)
}

pub fn optional_array<'a>(record: &'a Record, field: &str) -> Option<&'a Vec<Value>> {
    record.get(field).and_then(Value::as_array)
}

/// Textual form of a value: strings unquoted, everything else as JSON
pub fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Drop a reference-path prefix such as `/authors/`, leaving the id
pub fn strip_reference(path: &str, prefix: &str) -> String {
    path.strip_prefix(prefix).unwrap_or(path).to_string()
}
