//! Emotion vector: six fixed categories scored by the chat model.
//!
//! The model is instructed to return scores in `[0, 1]` summing to ≈1
//! (±0.05), rounded to three decimals. Those constraints are a contract
//! with the model and are deliberately *not* re-validated or renormalised
//! here: the parser requires exactly the six keys with numeric values and
//! nothing else. A reply that breaks shape is a
//! [`CompanionError::MalformedResponse`]; a reply that breaks arithmetic is
//! displayed as-is, where an attentive reader can see it.

use crate::error::CompanionError;
use crate::pipeline::extract_json;
use serde::{Deserialize, Serialize};

/// Scores for the six fixed emotion categories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmotionVector {
    pub joy: f64,
    pub sadness: f64,
    pub fear: f64,
    pub anger: f64,
    pub surprise: f64,
    pub neutrality: f64,
}

impl EmotionVector {
    /// All categories with their scores, in fixed display order.
    pub fn scores(&self) -> [(&'static str, f64); 6] {
        [
            ("joy", self.joy),
            ("sadness", self.sadness),
            ("fear", self.fear),
            ("anger", self.anger),
            ("surprise", self.surprise),
            ("neutrality", self.neutrality),
        ]
    }

    /// The highest-scoring category.
    pub fn dominant(&self) -> (&'static str, f64) {
        self.scores()
            .into_iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or(("neutrality", 0.0))
    }

    /// Sum of all scores — display-only; never used to reject a reply.
    pub fn total(&self) -> f64 {
        self.scores().iter().map(|(_, v)| v).sum()
    }
}

/// Parse a model reply into an [`EmotionVector`].
pub fn parse_emotions(raw: &str) -> Result<EmotionVector, CompanionError> {
    serde_json::from_str(extract_json(raw)).map_err(|e| CompanionError::MalformedResponse {
        what: "emotion-vector",
        detail: e.to_string(),
    })
}
