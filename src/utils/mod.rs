//! Input parsing helpers shared by the request handlers and services.

use serde_json::Value;

use crate::error::LibraryError;

/// Split a comma-separated field, trimming items and dropping blanks and repeats.
pub fn split_list(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

/// Accept an integer given either as a JSON number or as numeric text.
pub fn parse_integer(field: &'static str, value: &Value) -> Result<i64, LibraryError> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| LibraryError::invalid(field, "must be a whole number")),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| LibraryError::invalid(field, "must be a whole number")),
        Value::Null => Err(LibraryError::invalid(field, "is required")),
        _ => Err(LibraryError::invalid(field, "must be a whole number")),
    }
}
