//! Page-text cleanup: deterministic removal of extraction artefacts.
//!
//! Text extracted from ebook-sourced PDFs carries boilerplate the narrator
//! should never read aloud and the prompt builders should never see — most
//! commonly the source-site attribution footer with a page-number stamp that
//! appears on every single page. Removing it also collapses the blank-line
//! runs the footer leaves behind.
//!
//! Every rule is a pure `&str → String` pass with no shared state, and the
//! whole cleaner is idempotent: applying it twice yields the same result as
//! applying it once. That matters because the UI recomputes on every
//! interaction and may clean already-cleaned text.

use once_cell::sync::Lazy;
use regex::Regex;

/// The boilerplate footer stamped on every page of lectulandia-sourced PDFs:
/// site attribution plus a page-number marker.
static RE_FOOTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"www\.lectulandia\.com\s-\sPágina\s\d+").unwrap());

/// A run of one-or-more blank lines (the inner lines may hold whitespace).
static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Clean extracted page text for narration, prompting, and display.
///
/// Rules (applied in order):
/// 1. Remove every occurrence of the boilerplate footer pattern
/// 2. Collapse each run of blank lines into a single newline
/// 3. Trim leading and trailing whitespace
pub fn clean_page_text(raw: &str) -> String {
    let without_footer = RE_FOOTER.replace_all(raw, "");
    let collapsed = RE_BLANK_RUN.replace_all(&without_footer, "\n");
    collapsed.trim().to_string()
}
