//! Transcript payloads arrive in several shapes. They are decoded once into
//! [`Transcript`] and each variant renders independently.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::conversation::speaker_display_name;
use crate::json::{array_field, display_value, is_truthy, to_pretty_json};

pub const NO_TRANSCRIPT: &str = "*No transcript available*";

const UNKNOWN_SPEAKER: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "content", rename_all = "snake_case")]
pub enum Transcript {
    /// Absent, null, or any empty value.
    Missing,
    /// A flat string, or a mapping carrying a `text` field.
    PlainText(String),
    /// The primary API shape: speaker blocks with word tokens.
    SegmentList(Vec<Segment>),
    /// A mapping with pre-joined `segments`.
    SegmentMap(Vec<LabeledSegment>),
    /// A mapping with no recognised keys.
    Structured(Map<String, Value>),
    /// Any other JSON value.
    Unknown(Value),
}

/// One speaker block of the word-level shape. `text` is the concatenation of
/// the word tokens, trimmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub speaker: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSegment {
    pub speaker: String,
    pub text: String,
}

/// Consecutive segments by the same speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn<'a> {
    pub speaker: &'a str,
    pub parts: Vec<&'a str>,
}

impl Transcript {
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|value| is_truthy(value)) else {
            return Transcript::Missing;
        };

        match value {
            Value::String(text) => Transcript::PlainText(text.clone()),
            Value::Array(items) => {
                Transcript::SegmentList(items.iter().map(Segment::from_value).collect())
            }
            Value::Object(map) => {
                if let Some(text) = map.get("text") {
                    Transcript::PlainText(display_value(text))
                } else if map.contains_key("segments") {
                    Transcript::SegmentMap(
                        array_field(value, "segments")
                            .iter()
                            .map(LabeledSegment::from_value)
                            .collect(),
                    )
                } else {
                    Transcript::Structured(map.clone())
                }
            }
            other => Transcript::Unknown(other.clone()),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Transcript::Missing => NO_TRANSCRIPT.to_string(),
            Transcript::PlainText(text) => text.clone(),
            Transcript::SegmentList(segments) => render_segment_list(segments),
            Transcript::SegmentMap(segments) => render_labeled_segments(segments),
            Transcript::Structured(map) => to_pretty_json(&Value::Object(map.clone())),
            Transcript::Unknown(value) => display_value(value),
        }
    }
}

impl Segment {
    pub fn from_value(value: &Value) -> Self {
        let speaker = speaker_display_name(value.get("speaker"));
        let text: String = array_field(value, "words")
            .iter()
            .filter_map(|word| word.get("text").and_then(Value::as_str))
            .collect();
        Self {
            speaker,
            text: text.trim().to_string(),
        }
    }
}

impl LabeledSegment {
    pub fn from_value(value: &Value) -> Self {
        let speaker = match value.get("speaker") {
            None | Some(Value::Null) => UNKNOWN_SPEAKER.to_string(),
            Some(speaker @ Value::Object(_)) => speaker_display_name(Some(speaker)),
            Some(other) => display_value(other),
        };
        let text = value.get("text").map(display_value).unwrap_or_default();
        Self { speaker, text }
    }
}

/// Groups non-empty segments into turns. Empty segments are dropped without
/// ending the current run.
pub fn group_turns(segments: &[Segment]) -> Vec<Turn<'_>> {
    let mut turns: Vec<Turn<'_>> = Vec::new();
    for segment in segments.iter().filter(|segment| !segment.text.is_empty()) {
        match turns.last_mut() {
            Some(turn) if turn.speaker == segment.speaker => turn.parts.push(segment.text.as_str()),
            _ => turns.push(Turn {
                speaker: segment.speaker.as_str(),
                parts: vec![segment.text.as_str()],
            }),
        }
    }
    turns
}

fn render_segment_list(segments: &[Segment]) -> String {
    let turns = group_turns(segments);
    if turns.is_empty() {
        return NO_TRANSCRIPT.to_string();
    }
    turns
        .iter()
        .map(|turn| format!("**{}:** {}", turn.speaker, turn.parts.join(" ")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_labeled_segments(segments: &[LabeledSegment]) -> String {
    segments
        .iter()
        .map(|segment| format!("**{}:** {}", segment.speaker, segment.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
