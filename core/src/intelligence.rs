use serde::Serialize;
use serde_json::Value;

use crate::json::{display_value, is_truthy, scalar_text, to_pretty_json};

const CONFIRMED_KEY: &str = "confirmedExtractedIntelligence";
const EXTRACTED_KEY: &str = "extractedIntelligence";

/// Which attribute the insights were read from. Only one is ever shown; the
/// confirmed variant wins whenever it is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntelligenceSource {
    Confirmed,
    Extracted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    /// Structured `{title?, value}` block, rendered under its own heading.
    Block { title: String, body: String },
    /// Bare scalar, rendered inline.
    Inline { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Intelligence {
    pub source: Option<IntelligenceSource>,
    pub entries: Vec<Insight>,
}

impl Intelligence {
    pub fn from_attributes(attributes: &Value) -> Self {
        let confirmed = attributes.get(CONFIRMED_KEY).filter(|value| is_truthy(value));
        let (source, raw) = match confirmed {
            Some(value) => (IntelligenceSource::Confirmed, Some(value)),
            None => (IntelligenceSource::Extracted, attributes.get(EXTRACTED_KEY)),
        };

        let Some(map) = raw.and_then(Value::as_object).filter(|map| !map.is_empty()) else {
            return Self::default();
        };

        Self {
            source: Some(source),
            entries: map
                .iter()
                .filter_map(|(key, item)| Insight::from_entry(key, item))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Markdown lines for the entries; empty when nothing renders.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in &self.entries {
            match entry {
                Insight::Block { title, body } => {
                    lines.push(format!("### {title}"));
                    lines.push(body.clone());
                    lines.push(String::new());
                }
                Insight::Inline { key, value } => lines.push(format!("  - {key}: {value}")),
            }
        }
        lines
    }
}

impl Insight {
    fn from_entry(key: &str, item: &Value) -> Option<Self> {
        match item {
            Value::Object(block) => {
                let value = block.get("value").filter(|value| is_truthy(value))?;
                let title = scalar_text(block.get("title")).unwrap_or_else(|| key.to_string());
                let body = match value {
                    Value::String(text) => text.clone(),
                    other => to_pretty_json(other),
                };
                Some(Insight::Block { title, body })
            }
            other if is_truthy(other) => Some(Insight::Inline {
                key: key.to_string(),
                value: display_value(other),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn confirmed_variant_takes_precedence() {
        let intelligence = Intelligence::from_attributes(&json!({
            "confirmedExtractedIntelligence": {
                "summary": { "title": "Summary", "value": "Confirmed" }
            },
            "extractedIntelligence": {
                "summary": { "title": "Summary", "value": "Raw" },
                "next_steps": { "title": "Next steps", "value": "Send pricing" }
            }
        }));
        assert_eq!(intelligence.source, Some(IntelligenceSource::Confirmed));
        assert_eq!(
            intelligence.entries,
            vec![Insight::Block {
                title: "Summary".to_string(),
                body: "Confirmed".to_string()
            }]
        );
    }

    #[test]
    fn empty_confirmed_variant_falls_back_to_extracted() {
        let intelligence = Intelligence::from_attributes(&json!({
            "confirmedExtractedIntelligence": {},
            "extractedIntelligence": { "sentiment": "positive" }
        }));
        assert_eq!(intelligence.source, Some(IntelligenceSource::Extracted));
        assert_eq!(intelligence.render_lines(), vec!["  - sentiment: positive"]);
    }

    #[test]
    fn falsy_entries_are_skipped_and_title_defaults_to_key() {
        let intelligence = Intelligence::from_attributes(&json!({
            "extractedIntelligence": {
                "summary": { "value": "Good call" },
                "objections": { "title": "Objections", "value": "" },
                "score": 0,
                "owner": null,
                "budget": 25000
            }
        }));
        assert_eq!(
            intelligence.render_lines(),
            vec!["### summary", "Good call", "", "  - budget: 25000"]
        );
    }

    #[test]
    fn structured_block_values_are_pretty_printed() {
        let intelligence = Intelligence::from_attributes(&json!({
            "extractedIntelligence": {
                "actions": { "title": "Actions", "value": ["a", "b"] }
            }
        }));
        assert_eq!(
            intelligence.render_lines(),
            vec!["### Actions", "[\n  \"a\",\n  \"b\"\n]", ""]
        );
    }

    #[test]
    fn missing_or_non_object_intelligence_is_empty() {
        assert!(Intelligence::from_attributes(&json!({})).is_empty());
        assert!(
            Intelligence::from_attributes(&json!({ "extractedIntelligence": ["x"] })).is_empty()
        );
        assert_eq!(Intelligence::from_attributes(&json!(null)).source, None);
    }
}
