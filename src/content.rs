//! File content normalization
//!
//! Turns an uploaded file into a single content fragment for the model:
//! images pass through as inline references, everything else becomes text.
//! This function is total; unsupported or unreadable files degrade to a
//! descriptive placeholder rather than an error.

use crate::providers::Fragment;
use crate::session::FileAttachment;
use regex::Regex;
use std::io::Read;
use std::sync::OnceLock;

/// Maximum characters of text derived from one file
const MAX_FRAGMENT_CHARS: usize = 8000;

/// Declared MIME types treated as Word documents
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOC_MIME: &str = "application/msword";

/// Normalizes an uploaded file into one content fragment
///
/// Dispatch is on the declared MIME type only; the payload is never
/// sniffed. Text output is truncated to a fixed character budget.
///
/// # Examples
///
/// ```
/// use palaver::content::normalize;
/// use palaver::session::FileAttachment;
///
/// let file = FileAttachment::new("notes.txt", "text/plain", b"hello");
/// let fragment = normalize(&file);
/// assert_eq!(fragment.as_text(), Some("hello"));
/// ```
pub fn normalize(file: &FileAttachment) -> Fragment {
    if file.media_type.starts_with("image/") {
        // Images go to the model as-is; decoding is the model's problem.
        return Fragment::image(file.data_url());
    }

    let bytes = match file.bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Could not decode payload of {}: {}", file.name, e);
            return Fragment::text(format!(
                "User uploaded a file ({}), but its contents could not be read.",
                file.name
            ));
        }
    };

    match file.media_type.as_str() {
        "application/pdf" => Fragment::text(format!(
            "Contents of the uploaded PDF:\n\n{}",
            truncate_chars(&extract_pdf_text(&bytes), MAX_FRAGMENT_CHARS)
        )),
        DOCX_MIME | DOC_MIME => Fragment::text(format!(
            "Contents of the uploaded Word document:\n\n{}",
            truncate_chars(&extract_docx_text(&bytes), MAX_FRAGMENT_CHARS)
        )),
        media_type if media_type.starts_with("text/") => Fragment::text(truncate_chars(
            &String::from_utf8_lossy(&bytes),
            MAX_FRAGMENT_CHARS,
        )),
        _ => Fragment::text(format!(
            "User uploaded a file ({}), but this format is not supported for analysis.",
            file.name
        )),
    }
}

/// Stand-in for PDF text extraction
///
/// Only the header is checked; well-formed files yield a fixed placeholder
/// and malformed ones a fixed warning. No caller treats either as an error.
// TODO: swap the placeholder for a real extractor (pdf-extract or lopdf)
// once one is picked.
fn extract_pdf_text(bytes: &[u8]) -> String {
    if bytes.starts_with(b"%PDF-") {
        "(PDF text extraction placeholder)".to_string()
    } else {
        "Unable to read PDF content.".to_string()
    }
}

/// Extracts plain text from a Word document
///
/// A `.docx` file is a zip container; the document body lives in
/// `word/document.xml`. Markup is stripped with a regex, paragraph ends
/// become newlines, and the handful of XML entities are decoded. Any
/// failure along the way yields the empty string.
fn extract_docx_text(bytes: &[u8]) -> String {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = match zip::ZipArchive::new(cursor) {
        Ok(archive) => archive,
        Err(_) => return String::new(),
    };

    let mut xml = String::new();
    match archive.by_name("word/document.xml") {
        Ok(mut entry) => {
            if entry.read_to_string(&mut xml).is_err() {
                return String::new();
            }
        }
        Err(_) => return String::new(),
    }

    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

    let with_breaks = xml.replace("</w:p>", "\n");
    let stripped = tag_re.replace_all(&with_breaks, "");
    stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .trim()
        .to_string()
}

/// Truncates a string to a maximum number of characters
fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
