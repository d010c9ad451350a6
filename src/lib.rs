//! # bookslives
//!
//! An interactive reading companion for PDFs: narration, ambient music,
//! structured insights, and scene art for whatever page you are on.
//!
//! ## Why this crate?
//!
//! Reading is better with company. Given a PDF, bookslives renders each page
//! as an image, extracts and cleans its text, and — on demand — asks
//! external AI services to read the page aloud, score a soundtrack for it,
//! summarise what is happening, and paint the scene. Your position in every
//! book is remembered across sessions, keyed by a content hash of the file
//! itself, so renaming or moving a PDF never loses your place.
//!
//! All heavy lifting is delegated: speech synthesis, music generation, text
//! analysis, and image generation are external collaborators reached
//! through their request/response contracts. The local code is page
//! navigation, progress persistence, response-shape normalisation, and
//! memoization so repeated requests for the same page never re-invoke a
//! paid API.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Document   bytes + SHA-256 content hash (local file or URL)
//!  ├─ 2. Render     rasterise page + extract text via pdfium (spawn_blocking)
//!  ├─ 3. Clean      strip boilerplate footers, collapse blank lines
//!  ├─ 4. Generate   narration / music prompt+track / insights / emotions / art
//!  └─ 5. Remember   progress file keyed by content hash, memo caches per input
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bookslives::{Companion, CompanionConfig, Document, NavEvent, ProgressStore, ReaderSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CompanionConfig::default();
//!     let document = Document::open("book.pdf", config.download_timeout_secs).await?;
//!
//!     let mut companion = Companion::new(config.clone())?;
//!     let overview = companion.overview(&document).await?;
//!
//!     let store = ProgressStore::load(&config.progress_path, config.progress_capacity);
//!     let mut session =
//!         ReaderSession::resume(document.content_hash(), overview.page_count, store);
//!
//!     let page = companion.page_view(&document, session.current_page()).await?;
//!     let text = bookslives::clean_page_text(&page.raw_text);
//!
//!     let narration = companion.narration(&text).await?;
//!     session.navigate(NavEvent::Next)?;
//!     # let _ = narration;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bookslives` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! bookslives = { version = "0.1", default-features = false }
//! ```
//!
//! ## Credentials
//!
//! Two environment variables, both read lazily — paging through a book
//! needs neither:
//!
//! | Variable | Used by |
//! |----------|---------|
//! | `OPENAI_API_KEY` | narration, and the default chat provider |
//! | `REPLICATE_API_TOKEN` | scene-art generation |
//!
//! The music pipeline needs no key: it is a locally served text-to-audio
//! model (see [`CompanionConfig::music_endpoint`]).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cache;
pub mod companion;
pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cache::MemoCache;
pub use companion::Companion;
pub use config::{CompanionConfig, CompanionConfigBuilder, DEFAULT_CHAT_MODEL};
pub use document::{content_hash, Document};
pub use error::CompanionError;
pub use pipeline::art::ImageGenerator;
pub use pipeline::clean::clean_page_text;
pub use pipeline::emotion::EmotionVector;
pub use pipeline::insight::InsightRecord;
pub use pipeline::music::{encode_wav, HttpMusicPipeline, MusicPipeline, Waveform};
pub use pipeline::narrate::{Narration, SpeechSynthesizer};
pub use pipeline::render::{png_bytes, DocumentOverview, PageView};
pub use progress::ProgressStore;
pub use session::{MediaSlots, NavEvent, ReaderSession, ReaderState};
