//! Music generation: text-to-audio pipeline seam plus local WAV encoding.
//!
//! The generative model itself is an external collaborator — a
//! MusicGen-style pipeline served over HTTP — reached through the
//! [`MusicPipeline`] trait so tests (and alternative backends) can swap in
//! their own waveform source. What *is* local logic, and lives here, is the
//! sample conversion: the pipeline returns floating-point samples in
//! `[-1.0, 1.0]`, and players expect 16-bit signed PCM. Scaling by `32767`
//! after clamping avoids the volume distortion that naive float→int casts
//! produce on out-of-range samples.

use crate::config::CompanionConfig;
use crate::error::CompanionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

/// Raw output of a text-to-audio pipeline: mono samples plus their rate.
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Floating-point samples, nominally in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Samples per second (32_000 for MusicGen checkpoints).
    pub sample_rate: u32,
}

impl Waveform {
    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Seam over the text-to-audio generation pipeline.
///
/// Implementations run the prompt through a pre-trained model and hand back
/// the waveform; they never encode bytes — that stays local so every
/// backend produces identical WAV output.
#[async_trait]
pub trait MusicPipeline: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Waveform, CompanionError>;
}

/// Default backend: an HTTP text-to-audio inference server.
///
/// Expects a MusicGen-style serving endpoint: POST `{endpoint}/generate`
/// with the prompt and sampling parameters, receiving the waveform as JSON.
pub struct HttpMusicPipeline {
    client: reqwest::Client,
    endpoint: String,
    do_sample: bool,
    max_new_tokens: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    do_sample: bool,
    max_new_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    audio: Vec<f32>,
    sampling_rate: u32,
}

impl HttpMusicPipeline {
    pub fn new(config: &CompanionConfig) -> Result<Self, CompanionError> {
        // Local model inference is the slowest call in the whole app;
        // give it a far longer leash than the remote APIs get.
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.music_timeout_secs))
            .build()
            .map_err(|e| CompanionError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.music_endpoint.clone(),
            do_sample: config.music_do_sample,
            max_new_tokens: config.music_max_new_tokens,
        })
    }
}

#[async_trait]
impl MusicPipeline for HttpMusicPipeline {
    async fn generate(&self, prompt: &str) -> Result<Waveform, CompanionError> {
        let url = format!("{}/generate", self.endpoint.trim_end_matches('/'));
        let body = GenerateRequest {
            prompt,
            do_sample: self.do_sample,
            max_new_tokens: self.max_new_tokens,
        };

        debug!("Requesting music for prompt: {prompt}");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompanionError::MusicGeneration {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CompanionError::MusicGeneration {
                message: format!("HTTP {status}: {detail}"),
            });
        }

        let parsed: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| CompanionError::MusicGeneration {
                    message: format!("invalid waveform response: {e}"),
                })?;

        debug!(
            "Pipeline returned {} samples @ {} Hz",
            parsed.audio.len(),
            parsed.sampling_rate
        );

        Ok(Waveform {
            samples: parsed.audio,
            sample_rate: parsed.sampling_rate,
        })
    }
}

/// Encode a floating-point waveform as a mono 16-bit PCM WAV byte stream.
///
/// Samples are clamped to `[-1.0, 1.0]` before scaling so a pipeline that
/// overshoots cannot wrap around into full-scale noise.
pub fn encode_wav(waveform: &Waveform) -> Result<Vec<u8>, CompanionError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| CompanionError::WavEncode(e.to_string()))?;

        for &sample in &waveform.samples {
            let scaled = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
            writer
                .write_sample(scaled)
                .map_err(|e| CompanionError::WavEncode(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| CompanionError::WavEncode(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waveform(samples: Vec<f32>) -> Waveform {
        Waveform {
            samples,
            sample_rate: 32_000,
        }
    }

    #[test]
    fn wav_header_and_sample_count() {
        let bytes = encode_wav(&waveform(vec![0.0, 0.5, -0.5, 1.0])).unwrap();

        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // Canonical 44-byte header for a single PCM data chunk.
        assert_eq!(bytes.len(), 44 + 4 * 2);
    }

    #[test]
    fn samples_scale_to_i16_range() {
        let bytes = encode_wav(&waveform(vec![1.0, -1.0, 0.0])).unwrap();
        let data = &bytes[44..];

        let first = i16::from_le_bytes([data[0], data[1]]);
        let second = i16::from_le_bytes([data[2], data[3]]);
        let third = i16::from_le_bytes([data[4], data[5]]);

        assert_eq!(first, 32767);
        assert_eq!(second, -32767);
        assert_eq!(third, 0);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let bytes = encode_wav(&waveform(vec![2.5, -7.0])).unwrap();
        let data = &bytes[44..];

        assert_eq!(i16::from_le_bytes([data[0], data[1]]), 32767);
        assert_eq!(i16::from_le_bytes([data[2], data[3]]), -32767);
    }

    #[test]
    fn sample_rate_is_embedded_in_header() {
        let bytes = encode_wav(&waveform(vec![0.1; 8])).unwrap();
        let rate = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
        assert_eq!(rate, 32_000);
    }

    #[test]
    fn duration_reflects_sample_count() {
        let w = Waveform {
            samples: vec![0.0; 64_000],
            sample_rate: 32_000,
        };
        assert!((w.duration_secs() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_waveform_still_encodes() {
        let bytes = encode_wav(&waveform(vec![])).unwrap();
        assert_eq!(bytes.len(), 44);
    }
}
