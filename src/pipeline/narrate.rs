//! Narration: speech synthesis of the current page's text.
//!
//! A thin call site around the OpenAI speech endpoint. The one piece of
//! logic that lives here rather than in the API is the empty-text check:
//! image-only and decorative pages produce no extractable text, and sending
//! an empty string to a paid endpoint would cost money to return silence.
//! That case short-circuits to [`Narration::NoText`] before any network I/O.

use crate::config::CompanionConfig;
use crate::error::CompanionError;
use serde::Serialize;
use tracing::debug;

/// Outcome of a narration request.
///
/// `NoText` is an expected state, not a failure; API problems surface as
/// `Err(CompanionError::SpeechApi { .. })` from [`SpeechSynthesizer::narrate`]
/// so callers cannot forget to handle them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narration {
    /// Synthesised speech as an MP3 byte stream.
    Audio(Vec<u8>),
    /// The page had no usable text; the API was never invoked.
    NoText,
}

/// Client for the speech-synthesis API.
pub struct SpeechSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    voice: String,
    /// Read once at construction; a missing key surfaces on the first call,
    /// never eagerly.
    api_key: Option<String>,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

impl SpeechSynthesizer {
    pub fn new(config: &CompanionConfig) -> Result<Self, CompanionError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| CompanionError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.speech_endpoint.clone(),
            model: config.tts_model.clone(),
            voice: config.tts_voice.clone(),
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }

    /// Synthesise narration for a page of text.
    ///
    /// Empty or whitespace-only input returns [`Narration::NoText`] without
    /// touching the network.
    pub async fn narrate(&self, text: &str) -> Result<Narration, CompanionError> {
        if text.trim().is_empty() {
            debug!("Narration skipped: page has no text");
            return Ok(Narration::NoText);
        }

        let api_key = self.api_key.as_deref().ok_or(CompanionError::MissingCredential {
            var: "OPENAI_API_KEY",
            hint: "export OPENAI_API_KEY=sk-... before asking for narration.".into(),
        })?;

        let body = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompanionError::SpeechApi {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CompanionError::SpeechApi {
                message: format!("HTTP {status}: {detail}"),
            });
        }

        let bytes = response.bytes().await.map_err(|e| CompanionError::SpeechApi {
            message: e.to_string(),
        })?;

        debug!("Narration synthesised: {} bytes of MP3", bytes.len());
        Ok(Narration::Audio(bytes.to_vec()))
    }

    /// Voice configured for this synthesizer.
    pub fn voice(&self) -> &str {
        &self.voice
    }
}
