//! System instructions for every chat-completion call the companion makes.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tightening a rule (e.g. the 15-word cap on
//!    music prompts) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    calling a real model, so a prompt regression is caught by `cargo test`.
//!
//! The insight schema is part of the prompt on purpose: field presence and
//! the "Unknown Title" / "Unknown Author" sentinels are a contract with the
//! external model, not something enforced locally. Parsing in
//! [`crate::pipeline::insight`] only checks that the reply *is* the declared
//! shape; it never fills gaps itself.

/// System instruction for turning a page of prose into a MusicGen prompt.
///
/// The 15-word cap matters: text-to-audio models respond best to short,
/// dense prompts of musical vocabulary, and long prompts dilute the
/// conditioning signal.
pub const MUSIC_CURATOR_PROMPT: &str = "You are a specialized AI music curator for the MusicGen model. Your task is to analyze a \
provided text passage, focusing on its emotional atmosphere, implied tempo, genre, setting, and overall mood. Your output MUST be \
a single, short (max 15 words) English-language prompt, optimized for MusicGen, that captures the essence of the text. Do not \
include any explanation, introductory phrases, or extra characters, only the prompt itself. Be highly descriptive with musical \
terms (e.g., 'ambient drone', 'cinematic brass').";

/// System instruction for turning a page of prose into an image-model prompt.
///
/// Rule 6 ("no literal text in the image") exists because diffusion models
/// render embedded words badly; rule 5 keeps the model from producing a book
/// review instead of a scene.
pub const IMAGE_SCENE_PROMPT: &str = r#"You act as a visual prompt generator for image models (Flux, Stable Diffusion, SD3). You will receive a passage from a book and must transform it into a clear, visual, cinematic prompt ready for an image-generation model.

Follow these rules:
1. Do not summarize the text: convert it into a visual scene.
2. Describe:
   - environment and setting
   - period or style (when it applies)
   - lighting
   - emotions or atmosphere
   - key visual details (clothing, objects, colors, gestures)
3. Keep the prompt between 2 and 4 lines maximum.
4. Avoid elements that do not appear in, and cannot be inferred from, the passage.
5. Do not produce a literary interpretation: turn the passage into an IMAGE.
6. Do NOT include literal text from the book in the image.
7. Use a descriptive but natural style."#;

/// System instruction for the emotion-vector call.
pub const EMOTION_ANALYST_PROMPT: &str = "You are a precise and strict emotion analyzer. Respond only with valid JSON that \
follows exactly the requested schema. Do not add explanations or any text outside the JSON.";

/// Build the user message for the emotion-vector call.
///
/// The sum-to-one constraint (±0.05) and the three-decimal rounding are
/// self-enforced by the model; the parser deliberately does not re-check
/// them, it only requires the six keys with numeric values.
pub fn emotion_user_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following TEXT and return a JSON object with numeric scores between 0.0 and 1.0 (inclusive) for each emotion. The scores must sum to approximately 1.0 (within ±0.05). Round each score to three decimals.

Required schema:
  "joy": float,
  "sadness": float,
  "fear": float,
  "anger": float,
  "surprise": float,
  "neutrality": float

Text:
"{text}""#
    )
}

/// System instruction for structured insight extraction.
///
/// The field list mirrors [`crate::pipeline::insight::InsightRecord`]; keep
/// the two in sync when adding a field.
pub const INSIGHT_ANALYST_PROMPT: &str = r#"You are an expert analyst of books and novels. You will receive a passage from a book. Return ONLY a valid JSON object that follows exactly this schema — every key present, no extra keys, no commentary outside the JSON:

{
  "title": string            — title of the book the passage belongs to; use "Unknown Title" if it cannot be recognized,
  "authors": [string]        — author or authors of the book when identifiable; use ["Unknown Author"] otherwise,
  "sentiment": string|null   — overall sentiment: Joy / Sadness / Fear / Anger / Surprise,
  "summary": string          — main idea of the passage in a paragraph of about 3 lines,
  "topics": [string]         — main topics of the passage, at most 3 words each,
  "related_works": [string]  — up to 3 books related to the book this passage belongs to,
  "awards": [string]         — up to 3 awards the book has won; use ["Unknown"] when none are known,
  "main_characters": [string] — names of the main characters mentioned in the passage,
  "setting": string|null     — description of the main place or scene where the action happens,
  "era": string|null         — the time period in which the narrative takes place,
  "additional_themes": [string] — other important themes explored in the passage, at most 3 words each,
  "narrative_tone": string|null — overall narration tone: Melancholic / Mysterious / Nostalgic / Introspective
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_prompt_embeds_text_and_schema() {
        let p = emotion_user_prompt("It was a dark and stormy night.");
        assert!(p.contains("dark and stormy"));
        for key in ["joy", "sadness", "fear", "anger", "surprise", "neutrality"] {
            assert!(p.contains(key), "missing emotion key {key}");
        }
    }

    #[test]
    fn insight_prompt_declares_sentinels() {
        assert!(INSIGHT_ANALYST_PROMPT.contains("Unknown Title"));
        assert!(INSIGHT_ANALYST_PROMPT.contains("Unknown Author"));
    }
}
