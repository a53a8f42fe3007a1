use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::StoreError;

/// A schemaless JSON document
pub type Document = Map<String, Value>;

/// Collections held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Users,
    Books,
}

impl Collection {
    /// Field carrying the integer identifier of each document
    pub fn id_field(self) -> &'static str {
        match self {
            Collection::Users => "User_id",
            Collection::Books => "Book_id",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Users => f.write_str("Users"),
            Collection::Books => f.write_str("Books"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(String, Value),
    Gt(String, i64),
    Lt(String, i64),
    /// Array field holds no element matching the pattern
    Lacks(String, Value),
}

/// Conjunction of field conditions. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value.into()));
        self
    }

    pub fn and_gt(mut self, field: impl Into<String>, bound: i64) -> Self {
        self.conditions.push(Condition::Gt(field.into(), bound));
        self
    }

    pub fn and_lt(mut self, field: impl Into<String>, bound: i64) -> Self {
        self.conditions.push(Condition::Lt(field.into(), bound));
        self
    }

    pub fn and_lacks(mut self, field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Lacks(field.into(), pattern.into()));
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq(field, value) => document.get(field) == Some(value),
            Condition::Gt(field, bound) => int_field(document, field).is_some_and(|v| v > *bound),
            Condition::Lt(field, bound) => int_field(document, field).is_some_and(|v| v < *bound),
            Condition::Lacks(field, pattern) => match document.get(field) {
                Some(Value::Array(items)) => !items.iter().any(|item| element_matches(item, pattern)),
                _ => true,
            },
        })
    }
}

/// Single-field mutations
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Set(String, Value),
    Inc(String, i64),
    /// Append to an array field, creating it when absent
    Push(String, Value),
}

impl Update {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Update::Set(field.into(), value.into())
    }

    pub fn inc(field: impl Into<String>, by: i64) -> Self {
        Update::Inc(field.into(), by)
    }

    pub fn push(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Update::Push(field.into(), value.into())
    }

    /// Apply to `document`; the error names the offending field
    pub(crate) fn apply(&self, document: &mut Document) -> Result<(), String> {
        match self {
            Update::Set(field, value) => {
                document.insert(field.clone(), value.clone());
            }
            Update::Inc(field, by) => {
                let current = match document.get(field) {
                    None => 0,
                    Some(value) => value
                        .as_i64()
                        .ok_or_else(|| format!("field '{field}' is not an integer"))?,
                };
                document.insert(field.clone(), Value::from(current + by));
            }
            Update::Push(field, value) => match document
                .entry(field.clone())
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(items) => items.push(value.clone()),
                _ => return Err(format!("field '{field}' is not an array")),
            },
        }
        Ok(())
    }
}

/// Deserialize a stored document into its typed record
pub fn decode<T: DeserializeOwned>(collection: Collection, document: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(document)).map_err(|err| StoreError::Corrupt {
        collection,
        reason: err.to_string(),
    })
}

/// Serialize a typed record into a document
pub fn encode<T: Serialize>(collection: Collection, record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(document) => Ok(document),
        other => Err(StoreError::Corrupt {
            collection,
            reason: format!("expected an object, got {other}"),
        }),
    }
}

fn int_field(document: &Document, field: &str) -> Option<i64> {
    document.get(field).and_then(Value::as_i64)
}

/// An object pattern matches objects carrying all of its fields; any other
/// pattern matches by equality.
fn element_matches(element: &Value, pattern: &Value) -> bool {
    match (element, pattern) {
        (Value::Object(fields), Value::Object(wanted)) => wanted
            .iter()
            .all(|(key, value)| fields.get(key) == Some(value)),
        _ => element == pattern,
    }
}
