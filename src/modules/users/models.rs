use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Registered reader as stored in the `Users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "User_id")]
    pub id: i64,
    #[serde(rename = "Username")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    /// Raw borrowed list; may mix legacy and structured entries
    #[serde(rename = "borrowed_books", default)]
    pub borrowed: Vec<BorrowedEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewUserRecord {
    #[serde(rename = "Username")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "borrowed_books")]
    pub borrowed: Vec<BorrowedEntry>,
}

/// One element of a stored borrowed list.
///
/// Older records hold only a title string; newer ones hold `{Book_id, Title}`.
/// Anything else is kept as legacy text so it can still be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum BorrowedEntry {
    Legacy(String),
    Structured { book_id: i64, title: Option<String> },
}

impl From<Value> for BorrowedEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::String(title) => BorrowedEntry::Legacy(title),
            Value::Object(ref fields) => {
                let book_id = fields.get("Book_id").and_then(|id| match id {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                });
                let title = fields
                    .get("Title")
                    .and_then(Value::as_str)
                    .map(str::to_string);

                match (book_id, title) {
                    (Some(book_id), title) => BorrowedEntry::Structured { book_id, title },
                    (None, Some(title)) if !title.is_empty() => BorrowedEntry::Legacy(title),
                    (None, _) => BorrowedEntry::Legacy(value.to_string()),
                }
            }
            other => BorrowedEntry::Legacy(other.to_string()),
        }
    }
}

impl From<BorrowedEntry> for Value {
    fn from(entry: BorrowedEntry) -> Self {
        match entry {
            BorrowedEntry::Legacy(title) => Value::String(title),
            BorrowedEntry::Structured {
                book_id,
                title: Some(title),
            } => json!({"Book_id": book_id, "Title": title}),
            BorrowedEntry::Structured { book_id, title: None } => json!({"Book_id": book_id}),
        }
    }
}

/// Canonical borrowed record. `book_id` is `None` when a legacy title matches no book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowedRef {
    #[serde(rename = "Book_id")]
    pub book_id: Option<i64>,
    #[serde(rename = "Title")]
    pub title: String,
}

impl From<BorrowedRef> for BorrowedEntry {
    fn from(reference: BorrowedRef) -> Self {
        match reference.book_id {
            Some(book_id) => BorrowedEntry::Structured {
                book_id,
                title: Some(reference.title),
            },
            None => BorrowedEntry::Legacy(reference.title),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUp {
    #[serde(alias = "name")]
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub user_id: Value,
}

/// Public view of an account, without the raw borrowed list
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

impl From<&User> for Account {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub account: Account,
    pub borrowed_books: Vec<BorrowedRef>,
    pub borrowed_count: usize,
}
