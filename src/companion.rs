//! The companion facade: one object wiring config, caches, and generators.
//!
//! Every accessor follows the same shape: consult the memo cache for the
//! exact input, otherwise invoke the external collaborator, store the
//! successful result, return it. Failures are returned uncached so the user
//! can simply try again — a transient API error must not poison a page for
//! the rest of the session.
//!
//! ## Provider resolution
//!
//! The chat provider is resolved lazily on the first call that needs it,
//! from most-specific to least-specific:
//!
//! 1. **Pre-built provider** (`config.provider`) — the caller constructed
//!    and configured the provider entirely; useful in tests or when custom
//!    middleware is needed.
//! 2. **Named provider** (`config.provider_name`) — reads the corresponding
//!    API key from the environment.
//! 3. **OPENAI_API_KEY present** — users with multiple provider keys
//!    default to OpenAI unless they ask for another provider.
//! 4. **Full auto-detection** — the factory scans all known API key
//!    variables and picks the first available provider.
//!
//! Lazy resolution keeps credential absence a *call-time* failure: opening
//! and paging through a book needs no keys at all.

use crate::cache::MemoCache;
use crate::config::{CompanionConfig, DEFAULT_CHAT_MODEL};
use crate::document::Document;
use crate::error::CompanionError;
use crate::pipeline::art::ImageGenerator;
use crate::pipeline::emotion::{parse_emotions, EmotionVector};
use crate::pipeline::insight::{parse_insights, InsightRecord};
use crate::pipeline::music::{encode_wav, HttpMusicPipeline, MusicPipeline};
use crate::pipeline::narrate::{Narration, SpeechSynthesizer};
use crate::pipeline::render::{self, DocumentOverview, PageView};
use crate::prompts;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::{debug, info};

/// Memoized results, one table per generator kind, keyed by exact input.
#[derive(Default)]
struct MediaCaches {
    narration: MemoCache<Narration>,
    music_prompt: MemoCache<String>,
    music: MemoCache<Vec<u8>>,
    insights: MemoCache<InsightRecord>,
    emotions: MemoCache<EmotionVector>,
    image_prompt: MemoCache<String>,
    image: MemoCache<String>,
}

/// The reading companion: page access plus the five generator endpoints,
/// each memoized for the life of the process.
pub struct Companion {
    config: CompanionConfig,
    speech: SpeechSynthesizer,
    image: ImageGenerator,
    music: Arc<dyn MusicPipeline>,
    chat: Option<Arc<dyn LLMProvider>>,
    caches: MediaCaches,
}

impl Companion {
    /// Construct a companion from configuration.
    ///
    /// Builds the HTTP clients but resolves no credentials: missing API
    /// keys surface when the corresponding generator is first used.
    pub fn new(config: CompanionConfig) -> Result<Self, CompanionError> {
        let speech = SpeechSynthesizer::new(&config)?;
        let image = ImageGenerator::new(&config)?;
        let music: Arc<dyn MusicPipeline> = match &config.music_pipeline {
            Some(pipeline) => Arc::clone(pipeline),
            None => Arc::new(HttpMusicPipeline::new(&config)?),
        };

        Ok(Self {
            config,
            speech,
            image,
            music,
            chat: None,
            caches: MediaCaches::default(),
        })
    }

    /// The configuration this companion was built with.
    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    // ── Page access ──────────────────────────────────────────────────────

    /// Page count and identifying metadata; needs no API key.
    pub async fn overview(&self, document: &Document) -> Result<DocumentOverview, CompanionError> {
        render::overview(document).await
    }

    /// Rendered image plus raw extracted text for a page (1-based).
    pub async fn page_view(
        &self,
        document: &Document,
        page: usize,
    ) -> Result<PageView, CompanionError> {
        render::page_view(document, page, &self.config).await
    }

    // ── Generators ───────────────────────────────────────────────────────

    /// Narrate a page of text (MP3 bytes), memoized by the text.
    pub async fn narration(&mut self, text: &str) -> Result<Narration, CompanionError> {
        if let Some(hit) = self.caches.narration.get(text) {
            debug!("Narration cache hit");
            return Ok(hit);
        }

        let narration = self.speech.narrate(text).await?;
        self.caches.narration.insert(text, narration.clone());
        Ok(narration)
    }

    /// Generate a short MusicGen prompt for a page of text.
    pub async fn music_prompt(&mut self, text: &str) -> Result<String, CompanionError> {
        if let Some(hit) = self.caches.music_prompt.get(text) {
            return Ok(hit);
        }

        let prompt = self
            .chat_text(prompts::MUSIC_CURATOR_PROMPT, text)
            .await?;
        self.caches.music_prompt.insert(text, prompt.clone());
        Ok(prompt)
    }

    /// Render a music prompt into WAV bytes via the text-to-audio pipeline.
    pub async fn music(&mut self, prompt: &str) -> Result<Vec<u8>, CompanionError> {
        if let Some(hit) = self.caches.music.get(prompt) {
            debug!("Music cache hit");
            return Ok(hit);
        }

        let waveform = self.music.generate(prompt).await?;
        info!(
            "Generated {:.1}s of music @ {} Hz",
            waveform.duration_secs(),
            waveform.sample_rate
        );

        let wav = encode_wav(&waveform)?;
        self.caches.music.insert(prompt, wav.clone());
        Ok(wav)
    }

    /// Extract structured insights for a page of text.
    pub async fn insights(&mut self, text: &str) -> Result<InsightRecord, CompanionError> {
        if let Some(hit) = self.caches.insights.get(text) {
            return Ok(hit);
        }

        let reply = self.chat_text(prompts::INSIGHT_ANALYST_PROMPT, text).await?;
        let record = parse_insights(&reply)?;
        self.caches.insights.insert(text, record.clone());
        Ok(record)
    }

    /// Score a page of text across the six emotion categories.
    pub async fn emotions(&mut self, text: &str) -> Result<EmotionVector, CompanionError> {
        if let Some(hit) = self.caches.emotions.get(text) {
            return Ok(hit);
        }

        let reply = self
            .chat_text(
                prompts::EMOTION_ANALYST_PROMPT,
                &prompts::emotion_user_prompt(text),
            )
            .await?;
        let vector = parse_emotions(&reply)?;
        self.caches.emotions.insert(text, vector);
        Ok(vector)
    }

    /// Generate a cinematic scene prompt for a page of text.
    pub async fn image_prompt(&mut self, text: &str) -> Result<String, CompanionError> {
        if let Some(hit) = self.caches.image_prompt.get(text) {
            return Ok(hit);
        }

        let prompt = self.chat_text(prompts::IMAGE_SCENE_PROMPT, text).await?;
        self.caches.image_prompt.insert(text, prompt.clone());
        Ok(prompt)
    }

    /// Render a scene prompt into an image, returning its URL.
    pub async fn image(&mut self, prompt: &str) -> Result<String, CompanionError> {
        if let Some(hit) = self.caches.image.get(prompt) {
            return Ok(hit);
        }

        let url = self.image.generate(prompt).await?;
        self.caches.image.insert(prompt, url.clone());
        Ok(url)
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    /// One chat completion: system instruction + user text → trimmed reply.
    async fn chat_text(&mut self, system: &str, user: &str) -> Result<String, CompanionError> {
        let provider = self.chat_provider()?;

        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let options = CompletionOptions {
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            ..Default::default()
        };

        let response = provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| CompanionError::ChatApi {
                message: format!("{e}"),
            })?;

        Ok(response.content.trim().to_string())
    }

    /// Resolve (and cache) the chat provider.
    fn chat_provider(&mut self) -> Result<Arc<dyn LLMProvider>, CompanionError> {
        if let Some(ref provider) = self.chat {
            return Ok(Arc::clone(provider));
        }

        let provider = resolve_provider(&self.config)?;
        self.chat = Some(Arc::clone(&provider));
        Ok(provider)
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
fn resolve_provider(config: &CompanionConfig) -> Result<Arc<dyn LLMProvider>, CompanionError> {
    // 1) User-provided provider takes priority
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_CHAT_MODEL);

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        return create_chat_provider(name, model);
    }

    // 3) Prefer OpenAI explicitly when an OpenAI API key is present, so
    // users with multiple provider keys default predictably.
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_chat_provider("openai", model);
        }
    }

    // 4) Full auto-detection from the environment
    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| CompanionError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {e}"
            ),
        })?;

    Ok(llm_provider)
}

/// Instantiate a named provider with the given model.
fn create_chat_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, CompanionError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        CompanionError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::music::Waveform;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts invocations and returns a fixed two-sample waveform.
    struct CountingPipeline {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MusicPipeline for CountingPipeline {
        async fn generate(&self, _prompt: &str) -> Result<Waveform, CompanionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Waveform {
                samples: vec![0.25, -0.25],
                sample_rate: 32_000,
            })
        }
    }

    fn companion_with_counting_pipeline() -> (Companion, Arc<CountingPipeline>) {
        let pipeline = Arc::new(CountingPipeline {
            calls: AtomicUsize::new(0),
        });
        let config = CompanionConfig::builder()
            .music_pipeline(Arc::clone(&pipeline) as Arc<dyn MusicPipeline>)
            .build()
            .unwrap();
        (Companion::new(config).unwrap(), pipeline)
    }

    #[tokio::test]
    async fn repeated_music_calls_hit_the_pipeline_once() {
        let (mut companion, pipeline) = companion_with_counting_pipeline();

        let first = companion.music("ambient drone, slow strings").await.unwrap();
        let second = companion.music("ambient drone, slow strings").await.unwrap();

        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second, "second call returns the identical cached WAV");
        assert_eq!(&first[..4], b"RIFF");
    }

    #[tokio::test]
    async fn distinct_prompts_each_reach_the_pipeline() {
        let (mut companion, pipeline) = companion_with_counting_pipeline();

        companion.music("ambient drone").await.unwrap();
        companion.music("cinematic brass").await.unwrap();

        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn narration_of_empty_text_never_needs_credentials() {
        let mut companion = Companion::new(CompanionConfig::default()).unwrap();
        let narration = companion.narration("   ").await.unwrap();
        assert_eq!(narration, Narration::NoText);
    }
}
