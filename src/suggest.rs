//! AI title suggestions.
//!
//! [`suggest_title`] wraps a [`TextGenerator`] with the rules that make its
//! output safe to use as a note title: empty notes are never sent, long
//! bodies are truncated before sending, the reply is cleaned of quoting and
//! emphasis marks, and anything shorter than [`MIN_TITLE_LEN`] is rejected.
//! Generator failures are logged and reported as [`Suggestion::ServiceError`];
//! they never propagate.

use std::borrow::Cow;
use tracing::{info, warn};

use crate::config::Language;
use crate::generator::TextGenerator;

/// Shortest reply accepted as a title, in characters.
pub const MIN_TITLE_LEN: usize = 3;

/// Appended to a body cut at the content limit.
const TRUNCATION_MARKER: &str = "...";

/// Outcome of asking the generator for a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// A usable title.
    Generated(String),
    /// The body was empty; the generator was not called.
    NoSuggestion,
    /// The generator replied with something too short to use (cleaned text).
    Invalid(String),
    /// The generator call failed.
    ServiceError(String),
}

/// Ask `generator` for a title for a note.
///
/// Makes exactly one `generate` call when `body` has content and none
/// otherwise.
pub async fn suggest_title(
    generator: &dyn TextGenerator,
    original_title: &str,
    body: &str,
    content_limit: usize,
    language: Language,
) -> Suggestion {
    if body.trim().is_empty() {
        return Suggestion::NoSuggestion;
    }

    let content = truncate_content(body, content_limit);
    let prompt = build_prompt(language, original_title, &content);

    match generator.generate(&prompt).await {
        Ok(reply) => {
            let title = clean_title(&reply);
            if title.chars().count() < MIN_TITLE_LEN {
                warn!(reply = %title, "suggested title invalid or too short");
                Suggestion::Invalid(title)
            } else {
                info!(title = %title, model = generator.model_name(), "suggested title");
                Suggestion::Generated(title)
            }
        }
        Err(e) => {
            warn!(error = %e, model = generator.model_name(), "title generation failed");
            Suggestion::ServiceError(e.to_string())
        }
    }
}

/// Cut `body` to `limit` characters, marking the cut. `0` disables the limit.
pub fn truncate_content(body: &str, limit: usize) -> Cow<'_, str> {
    if limit == 0 {
        return Cow::Borrowed(body);
    }
    match body.char_indices().nth(limit) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &body[..cut], TRUNCATION_MARKER)),
        None => Cow::Borrowed(body),
    }
}

/// Strip whitespace plus the quote and emphasis marks models like to add.
pub fn clean_title(reply: &str) -> String {
    reply
        .trim()
        .chars()
        .filter(|c| *c != '"' && *c != '*')
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn build_prompt(language: Language, original_title: &str, content: &str) -> String {
    let has_title = !original_title.trim().is_empty();

    match language {
        Language::En => {
            let original = if has_title { original_title } else { "No Original Title" };
            format!(
                "Read the note below together with its original title.\n\
                 Write a new title of about 5 to 7 words that is short, concise, \
                 and captures the main idea. Reply with the title only.\n\n\
                 Original Title: \"{original}\"\n\n\
                 Note Content:\n\"{content}\"\n\n\
                 Suggested New Title:"
            )
        }
        Language::Es => {
            let original = if has_title { original_title } else { "Sin Título Original" };
            format!(
                "Lee la nota siguiente junto con su título original.\n\
                 Escribe un título nuevo de unas 5 a 7 palabras, corto, conciso \
                 y que capture la idea principal. Responde solo con el título.\n\n\
                 Título Original: \"{original}\"\n\n\
                 Contenido de la Nota:\n\"{content}\"\n\n\
                 Título Sugerido:"
            )
        }
    }
}
