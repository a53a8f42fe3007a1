use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Catalog entry as stored in the `Books` collection.
///
/// Field names follow the stored document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "Book_id")]
    pub id: i64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Authors", default)]
    pub authors: Vec<String>,
    #[serde(rename = "Genres", default)]
    pub genres: Vec<String>,
    #[serde(rename = "Total_copies")]
    pub total_copies: i64,
    #[serde(rename = "Available_copies")]
    pub available_copies: i64,
    /// Generated lazily the first time the book is viewed
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Book {
    /// One catalog line for the assistant context
    pub fn summary_line(&self) -> String {
        format!(
            "- {} by {} (Genres: {})",
            self.title,
            self.authors.join(", "),
            self.genres.join(", ")
        )
    }
}

/// Book fields before the store assigns an id
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewBookRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Authors")]
    pub authors: Vec<String>,
    #[serde(rename = "Genres")]
    pub genres: Vec<String>,
    #[serde(rename = "Total_copies")]
    pub total_copies: i64,
    #[serde(rename = "Available_copies")]
    pub available_copies: i64,
}

/// Request model for adding a book. Authors and genres are comma-separated;
/// copies may be a number or numeric text.
#[derive(Debug, Clone, Deserialize)]
pub struct AddBook {
    pub title: String,
    pub authors: String,
    pub genres: String,
    #[serde(default)]
    pub copies: Value,
}

/// A book together with its description, if one could be produced
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    pub book: Book,
    pub description: Option<String>,
}
