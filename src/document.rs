//! Markdown rendering and atomic file output.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::{NoteRecord, OutputDocument, TitleResolution};
use crate::sanitize::{sanitize_filename, ILLEGAL_CHARS};
use crate::timestamp::format_timestamp;

/// Shown when a note has no creation date.
pub const NO_CREATION_DATE: &str = "Date not available";

/// Title used when neither a generated nor an original title is usable.
pub fn synthetic_title(id: &str) -> String {
    format!("Imported_Note_{}", id)
}

/// `<encoded id>_<sanitized title>.md`.
///
/// The id prefix is what keeps filenames unique, so it is escaped rather
/// than sanitized: distinct ids always give distinct prefixes, and the
/// prefix never contains `_` or a path separator.
pub fn document_filename(id: &str, title: &str) -> String {
    format!("{}_{}.md", encode_id(id), sanitize_filename(title))
}

/// Percent-encode the bytes of every character that is unsafe in a
/// filename, plus `%` and `_` so the encoding stays reversible.
fn encode_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        let unsafe_char = c == '%'
            || c == '_'
            || c.is_whitespace()
            || c.is_control()
            || ILLEGAL_CHARS.contains(&c);
        if unsafe_char {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Render a note with its resolved title.
pub fn render_document(note: &NoteRecord, resolution: &TitleResolution) -> OutputDocument {
    let title = resolution.title();

    let mut content = format!("# {}\n\n", title);
    if !note.title.is_empty() && note.title != title {
        content.push_str(&format!("*(Original Title: {})*\n", note.title));
    }
    content.push_str(&format!("*(Note ID: {})*\n", note.id));
    content.push_str(&format!(
        "*(Creation Date: {})*\n",
        note.created.as_deref().unwrap_or(NO_CREATION_DATE)
    ));
    content.push_str(&format!(
        "*(Last Updated: {})*\n",
        format_timestamp(note.updated)
    ));
    content.push_str("---\n\n");
    content.push_str(&note.body);

    OutputDocument {
        filename: document_filename(&note.id, title),
        content,
    }
}

/// Write `doc` into `dir`, replacing any previous file of the same name.
///
/// Content goes to a temporary file in `dir` that is renamed into place,
/// so a failed write never leaves a partial document behind.
pub fn write_document(dir: &Path, doc: &OutputDocument) -> std::io::Result<PathBuf> {
    let target = dir.join(&doc.filename);

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(doc.content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(&target).map_err(|e| e.error)?;

    Ok(target)
}
