//! Structured insight extraction from a page of text.
//!
//! The chat model is asked for a reply matching the exact field schema in
//! [`crate::prompts::INSIGHT_ANALYST_PROMPT`]; this module only parses that
//! reply and flattens it into labelled display fields. Sentinel values
//! ("Unknown Title", "Unknown Author") are supplied *by the model* per the
//! schema descriptions — nothing here invents or repairs field content, and
//! a non-conforming reply surfaces as
//! [`CompanionError::MalformedResponse`].

use crate::error::CompanionError;
use crate::pipeline::extract_json;
use serde::{Deserialize, Serialize};

/// Structured insights for one page of reading.
///
/// Field names match the JSON schema declared in the extraction prompt;
/// list fields default to empty so a model omitting an empty list does not
/// fail the whole extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub related_works: Vec<String>,
    #[serde(default)]
    pub awards: Vec<String>,
    #[serde(default)]
    pub main_characters: Vec<String>,
    #[serde(default)]
    pub setting: Option<String>,
    #[serde(default)]
    pub era: Option<String>,
    #[serde(default)]
    pub additional_themes: Vec<String>,
    #[serde(default)]
    pub narrative_tone: Option<String>,
}

impl InsightRecord {
    /// Flatten the record into ordered label/value pairs for display.
    ///
    /// Lists join with ", "; absent optional fields render as "—" so the
    /// UI shows a stable set of rows regardless of what the model knew.
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        let join = |items: &[String]| -> String {
            if items.is_empty() {
                "—".to_string()
            } else {
                items.join(", ")
            }
        };
        let opt = |value: &Option<String>| -> String {
            value.clone().unwrap_or_else(|| "—".to_string())
        };

        vec![
            ("Title", self.title.clone()),
            ("Authors", join(&self.authors)),
            ("Sentiment", opt(&self.sentiment)),
            ("Summary", self.summary.clone()),
            ("Topics", join(&self.topics)),
            ("Related works", join(&self.related_works)),
            ("Awards", join(&self.awards)),
            ("Main characters", join(&self.main_characters)),
            ("Setting", opt(&self.setting)),
            ("Era", opt(&self.era)),
            ("Additional themes", join(&self.additional_themes)),
            ("Narrative tone", opt(&self.narrative_tone)),
        ]
    }
}

/// Parse a model reply into an [`InsightRecord`].
pub fn parse_insights(raw: &str) -> Result<InsightRecord, CompanionError> {
    serde_json::from_str(extract_json(raw)).map_err(|e| CompanionError::MalformedResponse {
        what: "insight",
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPLY: &str = r#"{
        "title": "One Hundred Years of Solitude",
        "authors": ["Gabriel García Márquez"],
        "sentiment": "Sadness",
        "summary": "The founding of Macondo and the solitude that shadows the Buendía line.",
        "topics": ["solitude", "memory", "family"],
        "related_works": ["Pedro Páramo", "The House of the Spirits"],
        "awards": ["Nobel Prize"],
        "main_characters": ["José Arcadio Buendía", "Úrsula"],
        "setting": "Macondo, a town of mirrors",
        "era": "Late 19th century",
        "additional_themes": ["cyclical time"],
        "narrative_tone": "Melancholic"
    }"#;

    #[test]
    fn parses_full_reply() {
        let record = parse_insights(FULL_REPLY).unwrap();
        assert_eq!(record.title, "One Hundred Years of Solitude");
        assert_eq!(record.authors.len(), 1);
        assert_eq!(record.narrative_tone.as_deref(), Some("Melancholic"));
    }

    #[test]
    fn parses_fenced_reply() {
        let fenced = format!("```json\n{FULL_REPLY}\n```");
        assert!(parse_insights(&fenced).is_ok());
    }

    #[test]
    fn sentinel_values_pass_through_untouched() {
        let reply = r#"{
            "title": "Unknown Title",
            "authors": ["Unknown Author"],
            "sentiment": null,
            "summary": "A page without identifying signal.",
            "topics": [],
            "related_works": [],
            "awards": ["Unknown"],
            "main_characters": [],
            "setting": null,
            "era": null,
            "additional_themes": [],
            "narrative_tone": null
        }"#;

        let record = parse_insights(reply).unwrap();
        assert_eq!(record.title, "Unknown Title");
        assert_eq!(record.authors, vec!["Unknown Author".to_string()]);
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let reply = r#"{"authors": [], "summary": "no title here"}"#;
        let err = parse_insights(reply).unwrap_err();
        assert!(matches!(
            err,
            CompanionError::MalformedResponse { what: "insight", .. }
        ));
    }

    #[test]
    fn non_json_reply_is_malformed() {
        assert!(parse_insights("I could not analyze this passage.").is_err());
    }

    #[test]
    fn display_fields_are_stable_and_ordered() {
        let record = parse_insights(FULL_REPLY).unwrap();
        let fields = record.display_fields();

        assert_eq!(fields.len(), 12);
        assert_eq!(fields[0].0, "Title");
        assert_eq!(fields[11].0, "Narrative tone");
        assert_eq!(fields[4].1, "solitude, memory, family");
    }

    #[test]
    fn display_fields_mark_absent_values() {
        let record = InsightRecord {
            title: "Unknown Title".into(),
            authors: vec![],
            sentiment: None,
            summary: "…".into(),
            topics: vec![],
            related_works: vec![],
            awards: vec![],
            main_characters: vec![],
            setting: None,
            era: None,
            additional_themes: vec![],
            narrative_tone: None,
        };

        let fields = record.display_fields();
        assert_eq!(fields[1].1, "—"); // authors
        assert_eq!(fields[2].1, "—"); // sentiment
    }
}
