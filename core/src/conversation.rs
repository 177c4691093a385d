//! Read-only views over the conversation payloads returned by `/v2/conversations`.
//!
//! Decoding never fails: every field has a named fallback so a partially
//! populated payload still renders.

use serde::Serialize;
use serde_json::Value;

use crate::intelligence::Intelligence;
use crate::json::{array_field, object_field, read_json_string, scalar_text};
use crate::timestamp::format_timestamp;
use crate::transcript::Transcript;

pub const UNKNOWN_ID: &str = "unknown";
pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_PARTICIPANT: &str = "Unknown";
pub const UNKNOWN_VIDEO_STATUS: &str = "Unknown";

/// Participants shown on a summary line before collapsing into `(+N more)`.
pub const SUMMARY_PARTICIPANT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Participant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Participant {
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: read_json_string(value.get("name")),
            email: read_json_string(value.get("email")),
        }
    }

    /// Name, else email, else `Unknown`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(UNKNOWN_PARTICIPANT)
    }

    /// `name (email)` when both are known and differ, else the display name.
    pub fn detail_label(&self) -> String {
        let name = self.display_name();
        match self.email.as_deref() {
            Some(email) if email != name => format!("{name} ({email})"),
            _ => name.to_string(),
        }
    }
}

/// Display name for a speaker block (`{name?, email?}`). A bare string is
/// taken as the name.
pub fn speaker_display_name(speaker: Option<&Value>) -> String {
    match speaker {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(value @ Value::Object(_)) => Participant::from_value(value).display_name().to_string(),
        _ => UNKNOWN_PARTICIPANT.to_string(),
    }
}

fn participants_from(attributes: &Value) -> Vec<Participant> {
    array_field(attributes, "participants")
        .iter()
        .map(Participant::from_value)
        .collect()
}

/// Participant names for a list entry: the first three, then `(+N more)`.
pub fn summarize_participants(participants: &[Participant]) -> String {
    let shown = participants
        .iter()
        .take(SUMMARY_PARTICIPANT_LIMIT)
        .map(Participant::display_name)
        .collect::<Vec<_>>()
        .join(", ");
    if participants.len() > SUMMARY_PARTICIPANT_LIMIT {
        format!(
            "{shown} (+{} more)",
            participants.len() - SUMMARY_PARTICIPANT_LIMIT
        )
    } else {
        shown
    }
}

fn title_from(attributes: &Value) -> String {
    scalar_text(attributes.get("title")).unwrap_or_else(|| UNTITLED.to_string())
}

fn created_at_from(attributes: &Value) -> Option<String> {
    scalar_text(attributes.get("createdAt")).filter(|raw| !raw.is_empty())
}

fn display_date(created_at: Option<&str>) -> String {
    created_at.map(format_timestamp).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub created_at: Option<String>,
    pub participants: Vec<Participant>,
}

impl ConversationSummary {
    pub fn from_value(value: &Value) -> Self {
        let attributes = value.get("attributes").unwrap_or(&Value::Null);
        Self {
            id: summary_id(value, attributes),
            title: title_from(attributes),
            created_at: created_at_from(attributes),
            participants: participants_from(attributes),
        }
    }

    pub fn display_date(&self) -> String {
        display_date(self.created_at.as_deref())
    }

    pub fn participant_summary(&self) -> String {
        summarize_participants(&self.participants)
    }
}

/// Top-level `id`, then `attributes.uuid`.
fn summary_id(value: &Value, attributes: &Value) -> String {
    scalar_text(value.get("id"))
        .or_else(|| scalar_text(attributes.get("uuid")))
        .unwrap_or_else(|| UNKNOWN_ID.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_records: Option<u64>,
    pub page_number: Option<u64>,
    pub page_count: Option<u64>,
}

impl PageMeta {
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(meta) = value else {
            return Self::default();
        };
        Self {
            total_records: meta.get("totalRecords").and_then(Value::as_u64),
            page_number: meta.get("pageNumber").and_then(Value::as_u64),
            page_count: meta.get("pageCount").and_then(Value::as_u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchResult {
    pub data: Vec<ConversationSummary>,
    pub meta: PageMeta,
}

impl SearchResult {
    pub fn from_value(value: &Value) -> Self {
        Self {
            data: array_field(value, "data")
                .iter()
                .map(ConversationSummary::from_value)
                .collect(),
            meta: PageMeta::from_value(value.get("meta")),
        }
    }

    /// `meta.totalRecords` when reported, else the number of returned items.
    pub fn total(&self) -> u64 {
        self.meta
            .total_records
            .unwrap_or(self.data.len() as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    pub id: String,
    pub title: String,
    pub created_at: Option<String>,
    pub video_status: String,
    pub participants: Vec<Participant>,
    pub intelligence: Intelligence,
    pub transcript: Transcript,
}

impl ConversationDetail {
    /// Accepts attributes at the top level or wrapped under `data`.
    pub fn from_value(value: &Value) -> Self {
        let attributes = detail_attributes(value);
        Self {
            id: detail_id(value, &attributes),
            title: title_from(&attributes),
            created_at: created_at_from(&attributes),
            video_status: scalar_text(attributes.get("videoStatus"))
                .unwrap_or_else(|| UNKNOWN_VIDEO_STATUS.to_string()),
            participants: participants_from(&attributes),
            intelligence: Intelligence::from_attributes(&attributes),
            transcript: Transcript::from_value(attributes.get("transcript")),
        }
    }

    pub fn display_date(&self) -> String {
        display_date(self.created_at.as_deref())
    }
}

fn detail_attributes(value: &Value) -> Value {
    let top_level = object_field(value, "attributes").filter(|map| !map.is_empty());
    top_level
        .or_else(|| {
            value
                .get("data")
                .and_then(|data| object_field(data, "attributes"))
        })
        .map(|attributes| Value::Object(attributes.clone()))
        .unwrap_or(Value::Null)
}

/// `attributes.uuid`, then the top-level or wrapped `id`.
fn detail_id(value: &Value, attributes: &Value) -> String {
    scalar_text(attributes.get("uuid"))
        .or_else(|| scalar_text(value.get("id")))
        .or_else(|| value.get("data").and_then(|data| scalar_text(data.get("id"))))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| UNKNOWN_ID.to_string())
}
