//! Reader session state: explicit, with navigation as pure transitions.
//!
//! Rather than scattering "current page" and the generated-media slots
//! across global mutable state, everything a UI needs lives in one value.
//! [`ReaderState::apply`] is a pure function from state × event to state —
//! navigation can be unit-tested without a PDF, a store, or a terminal —
//! and [`ReaderSession`] layers persistence on top: every applied
//! navigation event is recorded in the [`ProgressStore`] and flushed
//! synchronously, so a crash never loses more than nothing.

use crate::error::CompanionError;
use crate::pipeline::emotion::EmotionVector;
use crate::pipeline::insight::InsightRecord;
use crate::pipeline::narrate::Narration;
use crate::progress::ProgressStore;
use tracing::debug;

/// A navigation action from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    /// Advance one page (saturating at the last page).
    Next,
    /// Go back one page (saturating at page 1).
    Prev,
    /// Jump to a page (clamped into `[1, page_count]`).
    Goto(usize),
}

/// Pure navigation state: where the reader is in a document of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderState {
    /// Total pages in the document (≥ 1).
    pub page_count: usize,
    /// Current page, 1-based, always within `[1, page_count]`.
    pub current_page: usize,
}

impl ReaderState {
    /// Start at page 1 of a document with `page_count` pages.
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count: page_count.max(1),
            current_page: 1,
        }
    }

    /// Apply a navigation event, producing the next state.
    ///
    /// Pure: the receiver is untouched, and the result's page is always
    /// within bounds — which is what keeps the progress-file invariant
    /// (`page ∈ [1, page_count]`) true at every write site.
    pub fn apply(&self, event: NavEvent) -> ReaderState {
        let target = match event {
            NavEvent::Next => self.current_page.saturating_add(1),
            NavEvent::Prev => self.current_page.saturating_sub(1),
            NavEvent::Goto(page) => page,
        };

        ReaderState {
            page_count: self.page_count,
            current_page: target.clamp(1, self.page_count),
        }
    }
}

/// Generated media for the current session: one transient slot per kind,
/// overwritten by each new generation, discarded when the session ends.
#[derive(Debug, Clone, Default)]
pub struct MediaSlots {
    pub narration: Option<Narration>,
    /// Music prompt and the WAV bytes rendered from it.
    pub music_prompt: Option<String>,
    pub music: Option<Vec<u8>>,
    pub insights: Option<InsightRecord>,
    pub emotions: Option<EmotionVector>,
    pub image_url: Option<String>,
}

/// A reading session over one document: navigation state, media slots, and
/// the persistent progress store.
#[derive(Debug)]
pub struct ReaderSession {
    hash: String,
    state: ReaderState,
    /// Media produced for the user so far.
    pub media: MediaSlots,
    store: ProgressStore,
}

impl ReaderSession {
    /// Start a session, resuming at the stored page when the document's
    /// hash is known to the store.
    ///
    /// A stored page outside the current page count is clamped rather than
    /// trusted; the hash is content-derived, so in practice this only
    /// happens when a store was hand-edited.
    pub fn resume(hash: impl Into<String>, page_count: usize, store: ProgressStore) -> Self {
        let hash = hash.into();
        let mut state = ReaderState::new(page_count);

        if let Some(saved) = store.get(&hash) {
            state = state.apply(NavEvent::Goto(saved));
            debug!("Resuming '{}' at page {}", hash, state.current_page);
        }

        Self {
            hash,
            state,
            media: MediaSlots::default(),
            store,
        }
    }

    /// Apply a navigation event, persist the new position, and return it.
    pub fn navigate(&mut self, event: NavEvent) -> Result<usize, CompanionError> {
        self.state = self.state.apply(event);
        self.store.record(&self.hash, self.state.current_page);
        self.store.save()?;
        Ok(self.state.current_page)
    }

    /// Current page, 1-based.
    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    /// Total pages in the document.
    pub fn page_count(&self) -> usize {
        self.state.page_count
    }

    /// Content hash of the document this session reads.
    pub fn content_hash(&self) -> &str {
        &self.hash
    }

    /// The session's navigation state.
    pub fn state(&self) -> ReaderState {
        self.state
    }
}
