//! Error types for the bookslives library.
//!
//! Every failure a caller can meet is an explicit [`CompanionError`] variant.
//! External services (speech, chat, music pipeline, image generation) each
//! get their own variant so the UI can tell the user *which* collaborator
//! failed; nothing is signalled through panics or status strings.
//!
//! The one non-error "nothing to do" outcome — asking for narration of a page
//! with no text — is modelled as [`crate::pipeline::narrate::Narration::NoText`],
//! not as an error: it is an expected state of scanned or image-only pages.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the bookslives library.
#[derive(Debug, Error)]
pub enum CompanionError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were read, but they are not a PDF.
    #[error("'{origin}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { origin: String, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{origin}' is corrupt: {detail}")]
    CorruptPdf { origin: String, detail: String },

    /// Requested page number exceeds the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium returned an error while rasterising a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// pdfium returned an error while extracting page text.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractFailed { page: usize, detail: String },

    // ── External service errors ───────────────────────────────────────────
    /// The chat-completion provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// A required credential environment variable is absent.
    #[error("{var} is not set.\n{hint}")]
    MissingCredential { var: &'static str, hint: String },

    /// The chat-completion API returned an error.
    #[error("Chat completion failed: {message}")]
    ChatApi { message: String },

    /// The speech-synthesis API returned an error.
    #[error("Speech synthesis failed: {message}")]
    SpeechApi { message: String },

    /// The text-to-audio pipeline returned an error or could not be reached.
    #[error("Music generation failed: {message}\nIs the text-to-audio server running? See --music-endpoint.")]
    MusicGeneration { message: String },

    /// The image-generation API returned an error.
    #[error("Image generation failed: {message}")]
    ImageApi { message: String },

    /// A model reply did not match the schema its prompt declared.
    ///
    /// Non-conforming replies are surfaced, never repaired or renormalised
    /// locally.
    #[error("Malformed {what} response from the model: {detail}")]
    MalformedResponse { what: &'static str, detail: String },

    // ── Local encoding errors ─────────────────────────────────────────────
    /// The f32 waveform could not be encoded as a WAV byte stream.
    #[error("Failed to encode WAV audio: {0}")]
    WavEncode(String),

    /// A rendered page image could not be PNG-encoded.
    #[error("Failed to encode page image: {0}")]
    ImageEncode(String),

    // ── Persistence errors ────────────────────────────────────────────────
    /// Could not write the reading-progress file.
    #[error("Failed to write progress file '{path}': {source}")]
    ProgressWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
