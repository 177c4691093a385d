//! Markdown-flavoured text for conversation lists and conversation details.

use crate::conversation::{ConversationDetail, SearchResult};

pub const NO_CONVERSATIONS: &str = "No conversations found.";

/// Renders a page of conversation summaries in server order.
pub fn format_search_results(result: &SearchResult) -> String {
    if result.data.is_empty() {
        return NO_CONVERSATIONS.to_string();
    }

    let mut lines = vec![format!("Found {} conversations:\n", result.total())];

    for conversation in &result.data {
        lines.push(format!("- **{}**", conversation.title));
        lines.push(format!("  ID: {}", conversation.id));
        lines.push(format!("  Date: {}", conversation.display_date()));
        lines.push(format!(
            "  Participants: {}",
            conversation.participant_summary()
        ));
        lines.push(String::new());
    }

    if let Some(footer) = page_footer(result) {
        lines.push(footer);
    }

    lines.join("\n")
}

fn page_footer(result: &SearchResult) -> Option<String> {
    let page_count = result.meta.page_count.filter(|count| *count > 1)?;
    let page_number = result.meta.page_number.unwrap_or(1);
    Some(format!("\nPage {page_number} of {page_count}"))
}

/// Renders one conversation: header, participants, extracted intelligence
/// (when any) and the transcript.
pub fn format_conversation(detail: &ConversationDetail) -> String {
    let mut lines = vec![
        format!("# {}", detail.title),
        String::new(),
        format!("**ID:** {}", detail.id),
        format!("**Date:** {}", detail.display_date()),
        format!("**Video Status:** {}", detail.video_status),
        String::new(),
        "## Participants".to_string(),
    ];
    lines.extend(
        detail
            .participants
            .iter()
            .map(|participant| format!("  - {}", participant.detail_label())),
    );

    let intelligence = detail.intelligence.render_lines();
    if !intelligence.is_empty() {
        lines.push(String::new());
        lines.push("## Extracted Intelligence".to_string());
        lines.extend(intelligence);
    }

    lines.push(String::new());
    lines.push("## Transcript".to_string());
    lines.push(String::new());
    lines.push(detail.transcript.render());

    lines.join("\n")
}
