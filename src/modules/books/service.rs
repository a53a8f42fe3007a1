use std::sync::Arc;
use std::time::Duration;

use libris_genai::{generate_within, TextGenerator};

use super::models::{AddBook, Book, BookDetail, NewBookRecord};
use super::repository::BookRepository;
use crate::error::LibraryError;
use crate::utils::{parse_integer, split_list};

/// Catalog queries plus lazily generated book descriptions
pub struct Catalog {
    books: BookRepository,
    generator: Arc<dyn TextGenerator>,
    generation_timeout: Duration,
}

impl Catalog {
    pub fn new(
        books: BookRepository,
        generator: Arc<dyn TextGenerator>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            books,
            generator,
            generation_timeout,
        }
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, LibraryError> {
        self.books
            .find(id)
            .await?
            .ok_or_else(|| LibraryError::book_not_found(id))
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, LibraryError> {
        Ok(self.books.all().await?)
    }

    /// Books with at least one copy on the shelf
    pub async fn list_available(&self) -> Result<Vec<Book>, LibraryError> {
        Ok(self.books.available().await?)
    }

    pub async fn add_book(&self, request: AddBook) -> Result<Book, LibraryError> {
        let copies = parse_integer("copies", &request.copies)?;
        if copies <= 0 {
            return Err(LibraryError::invalid("copies", "must be greater than 0"));
        }

        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(LibraryError::invalid("title", "is required"));
        }
        let authors = split_list(&request.authors);
        if authors.is_empty() {
            return Err(LibraryError::invalid("authors", "at least one author is required"));
        }
        let genres = split_list(&request.genres);
        if genres.is_empty() {
            return Err(LibraryError::invalid("genres", "at least one genre is required"));
        }

        let book = self
            .books
            .insert(NewBookRecord {
                title,
                authors,
                genres,
                total_copies: copies,
                available_copies: copies,
            })
            .await?;

        tracing::info!(book_id = book.id, title = %book.title, copies, "book added to catalog");
        Ok(book)
    }

    /// Fill in `book.description` when it is missing.
    ///
    /// Generation or persistence failures leave the book as it was; callers
    /// show "no description available" instead.
    pub async fn ensure_description(&self, book: &mut Book) {
        if book.description.as_deref().is_some_and(|d| !d.trim().is_empty()) {
            return;
        }

        let prompt = description_prompt(book);
        let description =
            match generate_within(self.generator.as_ref(), &prompt, self.generation_timeout).await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(book_id = book.id, error = %err, "description generation failed");
                    return;
                }
            };

        if let Err(err) = self.books.set_description(book.id, &description).await {
            tracing::warn!(book_id = book.id, error = %err, "failed to cache description");
        }
        book.description = Some(description);
    }

    pub async fn book_detail(&self, id: i64) -> Result<BookDetail, LibraryError> {
        let mut book = self.get_book(id).await?;
        self.ensure_description(&mut book).await;
        let description = book.description.clone();
        Ok(BookDetail { book, description })
    }
}

fn description_prompt(book: &Book) -> String {
    format!(
        "You are helping a library show a brief description for a book.\n\
         Write a concise, engaging 3-4 sentence description suitable for a library catalog.\n\
         Avoid spoilers. Focus on premise, themes, and why it appeals to readers.\n\n\
         Title: {}\n\
         Authors: {}\n\
         Genres: {}\n",
        book.title,
        book.authors.join(", "),
        book.genres.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{library, ScriptedGenerator};
    use serde_json::json;

    fn add(title: &str, copies: serde_json::Value) -> AddBook {
        AddBook {
            title: title.to_string(),
            authors: "Frank Herbert".to_string(),
            genres: "Science Fiction, Classic".to_string(),
            copies,
        }
    }

    #[tokio::test]
    async fn add_book_starts_with_all_copies_available() {
        let lib = library(ScriptedGenerator::failing());
        let book = lib.catalog.add_book(add("  Dune ", json!("2"))).await.unwrap();

        assert_eq!(book.id, 1);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.genres, vec!["Science Fiction", "Classic"]);
        assert_eq!((book.total_copies, book.available_copies), (2, 2));
        assert_eq!(lib.catalog.get_book(1).await.unwrap(), book);
    }

    #[tokio::test]
    async fn add_book_validates_input() {
        let lib = library(ScriptedGenerator::failing());

        for (request, field) in [
            (add("Dune", json!(0)), "copies"),
            (add("Dune", json!("many")), "copies"),
            (add("   ", json!(1)), "title"),
            (
                AddBook {
                    authors: " , ".to_string(),
                    ..add("Dune", json!(1))
                },
                "authors",
            ),
            (
                AddBook {
                    genres: String::new(),
                    ..add("Dune", json!(1))
                },
                "genres",
            ),
        ] {
            match lib.catalog.add_book(request).await.unwrap_err() {
                LibraryError::InvalidInput { field: got, .. } => assert_eq!(got, field),
                other => panic!("unexpected error: {other}"),
            }
        }
        assert!(lib.catalog.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_available_skips_empty_shelves() {
        let lib = library(ScriptedGenerator::failing());
        lib.seed_book("Dune", 1).await;
        let emma = lib.seed_book("Emma", 1).await;
        lib.books.take_copy(emma.id).await.unwrap();

        let titles: Vec<String> = lib
            .catalog
            .list_available()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Dune"]);
        assert_eq!(lib.catalog.list_books().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_book_is_not_found() {
        let lib = library(ScriptedGenerator::failing());
        let err = lib.catalog.get_book(42).await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { entity: "book", id: 42 }));
    }

    #[tokio::test]
    async fn generated_description_is_cached() {
        let generator = ScriptedGenerator::replying("  A desert planet and a prophecy. ");
        let lib = library(generator.clone());
        let dune = lib.seed_book("Dune", 1).await;

        let detail = lib.catalog.book_detail(dune.id).await.unwrap();
        assert_eq!(detail.description.as_deref(), Some("A desert planet and a prophecy."));

        let again = lib.catalog.book_detail(dune.id).await.unwrap();
        assert_eq!(again.book.description, detail.description);
        assert_eq!(generator.calls(), 1);
        assert!(generator.last_prompt().unwrap().contains("Title: Dune"));
    }

    #[tokio::test]
    async fn failing_generator_leaves_description_absent() {
        let lib = library(ScriptedGenerator::failing());
        let mut dune = lib.seed_book("Dune", 1).await;

        lib.catalog.ensure_description(&mut dune).await;
        assert!(dune.description.is_none());
        assert!(lib.catalog.get_book(dune.id).await.unwrap().description.is_none());

        let detail = lib.catalog.book_detail(dune.id).await.unwrap();
        assert!(detail.description.is_none());
    }
}
