//! Generator stages for the reading companion.
//!
//! Each submodule wraps exactly one external collaborator (or one pure
//! transformation) so stages stay independently testable and a backend can
//! be swapped without touching its neighbours.
//!
//! ## Data Flow
//!
//! ```text
//! document bytes ──▶ render ──▶ clean ──▶ prompts ──▶ narrate / music / insight / emotion / art
//!   (pdfium)        (image+text) (regex)  (templates)  (speech API / audio pipeline / chat / chat / image API)
//! ```
//!
//! 1. [`render`]  — rasterise a page and extract its text; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 2. [`clean`]   — strip boilerplate footers and collapse blank lines
//! 3. [`narrate`] — speech synthesis of the page text
//! 4. [`music`]   — text-to-audio pipeline behind a trait seam + WAV encode
//! 5. [`insight`] — schema-constrained structured extraction
//! 6. [`emotion`] — six-category emotion vector
//! 7. [`art`]     — image generation, prompt → URL

pub mod art;
pub mod clean;
pub mod emotion;
pub mod insight;
pub mod music;
pub mod narrate;
pub mod render;

/// Strip a fenced code block wrapper from a model reply, if present.
///
/// Chat models occasionally wrap JSON in ```` ```json … ``` ```` fences
/// despite being told not to. The fences carry no information, so removing
/// them before parsing is shape-normalisation, not schema repair — the JSON
/// inside is still required to match its declared schema exactly.
pub(crate) fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return trimmed;
    };

    // Drop an optional language tag on the opening fence line.
    match inner.split_once('\n') {
        Some((first_line, rest)) if first_line.trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            rest.trim()
        }
        _ => inner.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_json_passes_through() {
        assert_eq!(extract_json(r#"{"joy": 1.0}"#), r#"{"joy": 1.0}"#);
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "```json\n{\"joy\": 1.0}\n```";
        assert_eq!(extract_json(raw), "{\"joy\": 1.0}");
    }

    #[test]
    fn fence_without_language_tag() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(raw), "{\"a\": 1}");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(extract_json("  {\"a\": 1}  \n"), "{\"a\": 1}");
    }
}
