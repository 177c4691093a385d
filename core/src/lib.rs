//! Decoding and text rendering for Attention conversation payloads.
//!
//! Everything here is pure: callers hand in the JSON returned by the API and
//! get back typed views or display text.

pub mod conversation;
pub mod intelligence;
pub mod json;
pub mod render;
pub mod timestamp;
pub mod transcript;

pub use conversation::{ConversationDetail, ConversationSummary, PageMeta, Participant, SearchResult};
pub use intelligence::{Insight, Intelligence, IntelligenceSource};
pub use render::{NO_CONVERSATIONS, format_conversation, format_search_results};
pub use timestamp::format_timestamp;
pub use transcript::{NO_TRANSCRIPT, Transcript};

/// Renders any transcript payload shape.
pub fn format_transcript(value: Option<&serde_json::Value>) -> String {
    Transcript::from_value(value).render()
}
