//! Record flattening
//!
//! Pure conversions from nested JSON records to flat string cells, so
//! every value fits a single CSV column:
//!
//! - scalars keep their text form, null becomes an empty cell
//! - arrays become one pipe-joined cell
//! - objects are serialized as minified JSON
//!
//! No I/O and no failure modes; the same input always yields the same
//! cell.

use crate::types::{FlatRow, JsonValue, Record};

/// Flatten one JSON value into its cell text
pub fn flatten_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items
            .iter()
            .map(element_text)
            .collect::<Vec<_>>()
            .join("|"),
        JsonValue::Object(_) => minified(value),
    }
}

/// Flatten every field of a record
pub fn flatten_record(record: &Record) -> FlatRow {
    record
        .iter()
        .map(|(key, value)| (key.clone(), flatten_value(value)))
        .collect()
}

/// Text form of one array element; nested structures stay JSON
fn element_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Array(_) | JsonValue::Object(_) => minified(value),
        scalar => flatten_value(scalar),
    }
}

fn minified(value: &JsonValue) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
