//! Canonical form of a user's borrowed list.
//!
//! Stored lists mix bare title strings, `{Book_id}` records without a title,
//! and complete `{Book_id, Title}` records. [`normalize`] resolves them into
//! [`BorrowedRef`]s using read-only catalog lookups.

use std::collections::HashMap;

use crate::modules::books::models::Book;
use crate::modules::users::models::{BorrowedEntry, BorrowedRef};

/// Title shown for a record whose book no longer exists
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Read-only catalog lookups used during normalization
pub trait BookLookup {
    fn title_of(&self, book_id: i64) -> Option<&str>;
    fn id_of(&self, title: &str) -> Option<i64>;
}

/// In-memory lookup built from a catalog listing
#[derive(Debug, Default)]
pub struct CatalogIndex {
    titles: HashMap<i64, String>,
    ids: HashMap<String, i64>,
}

impl CatalogIndex {
    /// Repeated titles resolve to the lowest book id
    pub fn from_books<'a>(books: impl IntoIterator<Item = &'a Book>) -> Self {
        let mut index = Self::default();
        for book in books {
            index.titles.insert(book.id, book.title.clone());
            index
                .ids
                .entry(book.title.clone())
                .and_modify(|id| *id = (*id).min(book.id))
                .or_insert(book.id);
        }
        index
    }
}

impl BookLookup for CatalogIndex {
    fn title_of(&self, book_id: i64) -> Option<&str> {
        self.titles.get(&book_id).map(String::as_str)
    }

    fn id_of(&self, title: &str) -> Option<i64> {
        self.ids.get(title).copied()
    }
}

/// Resolve raw entries in order. Pure: the lookup is only read.
pub fn normalize(raw: &[BorrowedEntry], lookup: &impl BookLookup) -> Vec<BorrowedRef> {
    raw.iter().map(|entry| resolve(entry, lookup)).collect()
}

/// Canonical form of a single raw entry
pub fn resolve(entry: &BorrowedEntry, lookup: &impl BookLookup) -> BorrowedRef {
    match entry {
        BorrowedEntry::Structured {
            book_id,
            title: Some(title),
        } if !title.is_empty() => BorrowedRef {
            book_id: Some(*book_id),
            title: title.clone(),
        },
        BorrowedEntry::Structured { book_id, .. } => BorrowedRef {
            book_id: Some(*book_id),
            title: lookup.title_of(*book_id).unwrap_or(UNKNOWN_TITLE).to_string(),
        },
        BorrowedEntry::Legacy(title) => BorrowedRef {
            book_id: lookup.id_of(title),
            title: title.clone(),
        },
    }
}

/// True when the normalized list holds `book_id`
pub fn holds(refs: &[BorrowedRef], book_id: i64) -> bool {
    refs.iter().any(|reference| reference.book_id == Some(book_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: i64, title: &str) -> Book {
        Book {
            id,
            title: title.to_string(),
            authors: vec!["Anon".to_string()],
            genres: vec!["Fiction".to_string()],
            total_copies: 1,
            available_copies: 1,
            description: None,
        }
    }

    fn index() -> CatalogIndex {
        CatalogIndex::from_books(&[book(1, "Dune"), book(2, "Emma"), book(5, "Emma")])
    }

    fn structured(book_id: i64, title: Option<&str>) -> BorrowedEntry {
        BorrowedEntry::Structured {
            book_id,
            title: title.map(str::to_string),
        }
    }

    fn reference(book_id: Option<i64>, title: &str) -> BorrowedRef {
        BorrowedRef {
            book_id,
            title: title.to_string(),
        }
    }

    #[test]
    fn complete_records_pass_through() {
        // Stored title wins even when the catalog title differs.
        let refs = normalize(&[structured(1, Some("Dune (1965)"))], &index());
        assert_eq!(refs, vec![reference(Some(1), "Dune (1965)")]);
    }

    #[test]
    fn missing_titles_are_filled_from_catalog() {
        let refs = normalize(
            &[structured(2, None), structured(3, Some("")), structured(9, None)],
            &index(),
        );
        assert_eq!(
            refs,
            vec![
                reference(Some(2), "Emma"),
                reference(Some(3), UNKNOWN_TITLE),
                reference(Some(9), UNKNOWN_TITLE),
            ]
        );
    }

    #[test]
    fn legacy_titles_resolve_by_exact_match() {
        let refs = normalize(
            &[
                BorrowedEntry::Legacy("Emma".into()),
                BorrowedEntry::Legacy("dune".into()),
                BorrowedEntry::Legacy("Middlemarch".into()),
            ],
            &index(),
        );
        assert_eq!(
            refs,
            vec![
                reference(Some(2), "Emma"),
                reference(None, "dune"),
                reference(None, "Middlemarch"),
            ]
        );
    }

    #[test]
    fn order_is_preserved() {
        let raw = vec![
            BorrowedEntry::Legacy("Middlemarch".into()),
            structured(2, None),
            BorrowedEntry::Legacy("Dune".into()),
        ];
        let titles: Vec<String> = normalize(&raw, &index()).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Middlemarch", "Emma", "Dune"]);
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let raw = vec![
            BorrowedEntry::Legacy("Dune".into()),
            BorrowedEntry::Legacy("Middlemarch".into()),
            BorrowedEntry::Legacy(String::new()),
            structured(2, None),
            structured(9, Some("")),
            structured(1, Some("Dune")),
        ];
        let lookup = index();
        let once = normalize(&raw, &lookup);
        let again: Vec<BorrowedEntry> = once.iter().cloned().map(BorrowedEntry::from).collect();
        assert_eq!(normalize(&again, &lookup), once);
    }

    #[test]
    fn holds_ignores_unresolved_entries() {
        let refs = vec![reference(None, "Middlemarch"), reference(Some(2), "Emma")];
        assert!(holds(&refs, 2));
        assert!(!holds(&refs, 1));
    }
}
