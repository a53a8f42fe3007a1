use std::sync::Arc;
use std::time::Duration;

use libris_genai::{generate_within, TextGenerator};
use serde::Serialize;

use crate::error::LibraryError;
use crate::modules::books::repository::BookRepository;

/// Reply used whenever the text generation service cannot answer
pub const FALLBACK_REPLY: &str = "I apologize, but I'm experiencing technical difficulties at the moment. \
Please try again later or contact the library staff for assistance.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Answered,
    /// The generator failed and `text` holds the fallback reply
    AssistantUnavailable,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    pub text: String,
    pub status: ReplyStatus,
}

/// Librarian chat grounded in the current catalog
pub struct Assistant {
    books: BookRepository,
    generator: Arc<dyn TextGenerator>,
    generation_timeout: Duration,
}

impl Assistant {
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

    pub async fn ask(&self, message: &str) -> Result<AssistantReply, LibraryError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(LibraryError::invalid(
                "message",
                "enter a message to chat with the librarian",
            ));
        }

        let context = self.catalog_context().await?;
        let prompt = chat_prompt(&context, message);

        match generate_within(self.generator.as_ref(), &prompt, self.generation_timeout).await {
            Ok(text) => Ok(AssistantReply {
                text,
                status: ReplyStatus::Answered,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "assistant unavailable; sending fallback reply");
                Ok(AssistantReply {
                    text: FALLBACK_REPLY.to_string(),
                    status: ReplyStatus::AssistantUnavailable,
                })
            }
        }
    }

    /// One line per catalog entry: `- title by authors (Genres: ...)`
    pub async fn catalog_context(&self) -> Result<String, LibraryError> {
        let books = self.books.all().await?;
        Ok(books
            .iter()
            .map(|book| book.summary_line())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn chat_prompt(context: &str, message: &str) -> String {
    format!(
        "You are a helpful and friendly librarian assistant for a library system.\n\n\
         Available books in the library:\n{context}\n\n\
         User asked: {message}\n\n\
         Please provide a helpful, friendly response. If the user is asking for book recommendations, \
         suggest books from the available library collection. Be conversational and encouraging.\n\
         Keep your response concise but informative.\n"
    )
}
