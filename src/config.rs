//! Configuration for the reading companion.
//!
//! Every knob lives in [`CompanionConfig`], built via its
//! [`CompanionConfigBuilder`]. Keeping everything in one struct makes it
//! trivial to thread the same settings through every generator and to diff
//! two sessions to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A fifteen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest.

use crate::error::CompanionError;
use crate::pipeline::music::MusicPipeline;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Chat model used when none is configured.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-5-mini";

/// Configuration for a reading-companion session.
///
/// Built via [`CompanionConfig::builder()`] or [`CompanionConfig::default()`].
///
/// # Example
/// ```rust
/// use bookslives::CompanionConfig;
///
/// let config = CompanionConfig::builder()
///     .tts_voice("onyx")
///     .progress_capacity(64)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct CompanionConfig {
    /// Speech-synthesis model identifier. Default: "gpt-4o-mini-tts".
    pub tts_model: String,

    /// Narration voice. Default: "onyx".
    ///
    /// A fixed deep voice reads long-form prose without the sing-song
    /// cadence the brighter voices develop over multiple paragraphs.
    pub tts_voice: String,

    /// Speech-synthesis endpoint. Default: the OpenAI audio endpoint.
    /// Overridable so tests and proxies can intercept the call.
    pub speech_endpoint: String,

    /// Chat model for prompt generation, insights, and emotion analysis.
    /// If None, [`DEFAULT_CHAT_MODEL`] is used at provider resolution.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for chat completions. Default: 0.7.
    ///
    /// Prompt generation is a creative task — unlike transcription work,
    /// a little sampling freedom produces livelier music and scene prompts.
    pub temperature: f32,

    /// Maximum tokens per chat completion. Default: 1024.
    ///
    /// The largest structured reply (insights) fits comfortably; music and
    /// image prompts use a fraction of this.
    pub max_tokens: usize,

    /// Replicate model for scene art. Default: "black-forest-labs/flux-1.1-pro".
    pub image_model: String,

    /// Replicate API base URL. Default: "https://api.replicate.com/v1".
    pub replicate_endpoint: String,

    /// Base URL of the text-to-audio inference server.
    /// Default: "http://localhost:8000".
    pub music_endpoint: String,

    /// Enable sampling in the text-to-audio pipeline. Default: true.
    ///
    /// Deterministic decoding produces repetitive, droning output; sampling
    /// is what makes each generated track feel composed.
    pub music_do_sample: bool,

    /// Token budget for the text-to-audio pipeline. Default: 512.
    ///
    /// Bounds generation length (and therefore wall-clock time) — 512
    /// tokens is roughly ten seconds of MusicGen audio.
    pub music_max_new_tokens: u32,

    /// Timeout for one music-generation call in seconds. Default: 600.
    ///
    /// Local model inference is minutes-slow on CPU and there is no
    /// cancellation; the timeout is the only bound on a wedged server.
    pub music_timeout_secs: u64,

    /// Pre-constructed music pipeline. Takes precedence over `music_endpoint`.
    pub music_pipeline: Option<Arc<dyn MusicPipeline>>,

    /// Maximum rendered page dimension (width or height) in pixels.
    /// Default: 1600.
    ///
    /// A safety cap: an A0 poster page rendered unconstrained could exhaust
    /// memory. Either dimension is capped, the other scales proportionally.
    pub max_rendered_pixels: u32,

    /// Path of the reading-progress file. Default: "pdf_progress.json".
    pub progress_path: PathBuf,

    /// Maximum number of documents the progress store remembers.
    /// Default: 256.
    ///
    /// Keeps the store bounded for long-lived use; beyond this the
    /// least-recently-read document loses its resume position.
    pub progress_capacity: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-API-call timeout in seconds (speech, chat, image). Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            tts_model: "gpt-4o-mini-tts".to_string(),
            tts_voice: "onyx".to_string(),
            speech_endpoint: "https://api.openai.com/v1/audio/speech".to_string(),
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.7,
            max_tokens: 1024,
            image_model: "black-forest-labs/flux-1.1-pro".to_string(),
            replicate_endpoint: "https://api.replicate.com/v1".to_string(),
            music_endpoint: "http://localhost:8000".to_string(),
            music_do_sample: true,
            music_max_new_tokens: 512,
            music_timeout_secs: 600,
            music_pipeline: None,
            max_rendered_pixels: 1600,
            progress_path: PathBuf::from("pdf_progress.json"),
            progress_capacity: 256,
            download_timeout_secs: 120,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for CompanionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompanionConfig")
            .field("tts_model", &self.tts_model)
            .field("tts_voice", &self.tts_voice)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("image_model", &self.image_model)
            .field("music_endpoint", &self.music_endpoint)
            .field("music_do_sample", &self.music_do_sample)
            .field("music_max_new_tokens", &self.music_max_new_tokens)
            .field(
                "music_pipeline",
                &self.music_pipeline.as_ref().map(|_| "<dyn MusicPipeline>"),
            )
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("progress_path", &self.progress_path)
            .field("progress_capacity", &self.progress_capacity)
            .finish()
    }
}

impl CompanionConfig {
    /// Create a new builder for `CompanionConfig`.
    pub fn builder() -> CompanionConfigBuilder {
        CompanionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CompanionConfig`].
#[derive(Debug)]
pub struct CompanionConfigBuilder {
    config: CompanionConfig,
}

impl CompanionConfigBuilder {
    pub fn tts_model(mut self, model: impl Into<String>) -> Self {
        self.config.tts_model = model.into();
        self
    }

    pub fn tts_voice(mut self, voice: impl Into<String>) -> Self {
        self.config.tts_voice = voice.into();
        self
    }

    pub fn speech_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.speech_endpoint = endpoint.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.config.image_model = model.into();
        self
    }

    pub fn replicate_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.replicate_endpoint = endpoint.into();
        self
    }

    pub fn music_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.music_endpoint = endpoint.into();
        self
    }

    pub fn music_do_sample(mut self, v: bool) -> Self {
        self.config.music_do_sample = v;
        self
    }

    pub fn music_max_new_tokens(mut self, n: u32) -> Self {
        self.config.music_max_new_tokens = n;
        self
    }

    pub fn music_timeout_secs(mut self, secs: u64) -> Self {
        self.config.music_timeout_secs = secs;
        self
    }

    pub fn music_pipeline(mut self, pipeline: Arc<dyn MusicPipeline>) -> Self {
        self.config.music_pipeline = Some(pipeline);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn progress_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.progress_path = path.into();
        self
    }

    pub fn progress_capacity(mut self, n: usize) -> Self {
        self.config.progress_capacity = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CompanionConfig, CompanionError> {
        let c = &self.config;
        if c.progress_capacity == 0 {
            return Err(CompanionError::InvalidConfig(
                "Progress capacity must be ≥ 1".into(),
            ));
        }
        if c.music_max_new_tokens == 0 {
            return Err(CompanionError::InvalidConfig(
                "Music token budget must be ≥ 1".into(),
            ));
        }
        if c.tts_voice.trim().is_empty() {
            return Err(CompanionError::InvalidConfig(
                "Narration voice must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = CompanionConfig::default();
        assert_eq!(c.tts_model, "gpt-4o-mini-tts");
        assert_eq!(c.tts_voice, "onyx");
        assert!(c.music_do_sample);
        assert_eq!(c.music_max_new_tokens, 512);
        assert_eq!(c.progress_path, PathBuf::from("pdf_progress.json"));
        assert_eq!(c.progress_capacity, 256);
    }

    #[test]
    fn builder_clamps_temperature_and_pixels() {
        let c = CompanionConfig::builder()
            .temperature(9.0)
            .max_rendered_pixels(10)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.max_rendered_pixels, 100);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = CompanionConfig::builder()
            .progress_capacity(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, CompanionError::InvalidConfig(_)));
    }

    #[test]
    fn empty_voice_is_rejected() {
        assert!(CompanionConfig::builder().tts_voice("  ").build().is_err());
    }
}
