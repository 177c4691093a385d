use attention_core::{format_conversation, format_search_results};
use attention_mcp_runtime::AttentionClient;
use attention_mcp_runtime::client::{
    DEFAULT_DAYS_BACK, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, SearchParams,
};
use clap::{ArgAction, Args};

use crate::util::print_view;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Match against conversation titles
    #[arg(long, short = 'q')]
    pub query: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from_date: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub to_date: Option<String>,
    /// Only conversations with this participant
    #[arg(long)]
    pub participant_email: Option<String>,
    /// Only conversations owned by this user
    #[arg(long)]
    pub owner_email: Option<String>,
    #[arg(long, default_value_t = DEFAULT_PAGE)]
    pub page: u32,
    /// Results per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub size: u32,
    /// Ask the API for word-level transcripts
    #[arg(long)]
    pub detailed_transcript: bool,
    /// Print the decoded result as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Conversation ID (UUID)
    pub conversation_id: String,
    /// Include the full transcript with speakers (`--detailed-transcript false` to skip)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub detailed_transcript: bool,
    /// Keep internal participants in the participant list
    #[arg(long)]
    pub include_internal_participants: bool,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RecentArgs {
    /// Number of days to look back (negative values are sent as-is)
    #[arg(long, default_value_t = DEFAULT_DAYS_BACK, allow_negative_numbers = true)]
    pub days_back: i64,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub size: u32,
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    fn params(&self) -> SearchParams {
        SearchParams {
            query: self.query.clone(),
            from_date: self.from_date.clone(),
            to_date: self.to_date.clone(),
            participant_email: self.participant_email.clone(),
            owner_email: self.owner_email.clone(),
            page: self.page,
            size: self.size,
            detailed_transcript: self.detailed_transcript,
        }
    }
}

pub async fn search(client: &AttentionClient, args: SearchArgs) -> i32 {
    let result = client.search_conversations(&args.params()).await;
    print_view(result, args.json, format_search_results)
}

pub async fn get(client: &AttentionClient, args: GetArgs) -> i32 {
    let result = client
        .get_conversation(
            &args.conversation_id,
            args.detailed_transcript,
            args.include_internal_participants,
        )
        .await;
    print_view(result, args.json, format_conversation)
}

pub async fn recent(client: &AttentionClient, args: RecentArgs) -> i32 {
    let result = client
        .list_recent_conversations(args.days_back, args.size)
        .await;
    print_view(result, args.json, format_search_results)
}
