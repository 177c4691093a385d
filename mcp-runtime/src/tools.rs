use std::fmt;
use std::time::Instant;

use attention_core::{format_conversation, format_search_results};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::client::{AttentionClient, DEFAULT_DAYS_BACK, DEFAULT_PAGE_SIZE, SearchParams};
use crate::error::Error;

pub const SEARCH_CONVERSATIONS: &str = "search_conversations";
pub const GET_CONVERSATION: &str = "get_conversation";
pub const LIST_RECENT_CONVERSATIONS: &str = "list_recent_conversations";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: SEARCH_CONVERSATIONS,
            description: "Search Attention for call recordings and transcripts. Use for sales calls, customer calls, and demos.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search term for conversation title (case-insensitive partial match)"
                    },
                    "from_date": {
                        "type": "string",
                        "description": "Start date in YYYY-MM-DD format"
                    },
                    "to_date": {
                        "type": "string",
                        "description": "End date in YYYY-MM-DD format"
                    },
                    "participant_email": {
                        "type": "string",
                        "description": "Filter by participant email address"
                    },
                    "owner_email": {
                        "type": "string",
                        "description": "Filter by call owner email address"
                    },
                    "size": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 20)",
                        "default": DEFAULT_PAGE_SIZE
                    }
                }
            }),
        },
        ToolDefinition {
            name: GET_CONVERSATION,
            description: "Get full details and transcript for a specific Attention conversation by ID.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "conversation_id": {
                        "type": "string",
                        "description": "The conversation UUID"
                    },
                    "detailed_transcript": {
                        "type": "boolean",
                        "description": "Include detailed transcript with speaker labels (default: true)",
                        "default": true
                    }
                },
                "required": ["conversation_id"]
            }),
        },
        ToolDefinition {
            name: LIST_RECENT_CONVERSATIONS,
            description: "List recent Attention conversations from the past N days.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "days_back": {
                        "type": "integer",
                        "description": "Number of days to look back (default: 7)",
                        "default": DEFAULT_DAYS_BACK
                    },
                    "size": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 20)",
                        "default": DEFAULT_PAGE_SIZE
                    }
                }
            }),
        },
    ]
}

#[derive(Debug, Clone)]
pub struct ToolError {
    pub code: String,
    pub message: String,
    pub field: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    fn validation(key: &str, message: String) -> Self {
        Self::new("validation_failed", message).with_field(key)
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<Error> for ToolError {
    fn from(err: Error) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// Text payload of a `tools/call` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    pub text: String,
    pub is_error: bool,
}

impl ToolReply {
    fn text(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn error(err: &ToolError) -> Self {
        Self {
            text: format!("Error: {err}"),
            is_error: true,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut payload = json!({
            "content": [{ "type": "text", "text": self.text }]
        });
        if self.is_error {
            payload["isError"] = Value::Bool(true);
        }
        payload
    }
}

/// Routes named tool invocations to the client and formatters. Errors from
/// either side stop here and become `Error: ...` text.
#[derive(Clone, Debug)]
pub struct ToolDispatcher {
    client: AttentionClient,
}

impl ToolDispatcher {
    pub fn new(client: AttentionClient) -> Self {
        Self { client }
    }

    pub async fn call(&self, name: &str, args: &Map<String, Value>) -> ToolReply {
        let started = Instant::now();
        let result = match name {
            SEARCH_CONVERSATIONS => self.tool_search_conversations(args).await,
            GET_CONVERSATION => self.tool_get_conversation(args).await,
            LIST_RECENT_CONVERSATIONS => self.tool_list_recent_conversations(args).await,
            _ => {
                tracing::warn!(tool = name, "unknown tool requested");
                return ToolReply::text(format!("Unknown tool: {name}"));
            }
        };

        match result {
            Ok(text) => {
                tracing::info!(
                    tool = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "tool call completed"
                );
                ToolReply::text(text)
            }
            Err(err) => {
                tracing::error!(
                    tool = name,
                    code = %err.code,
                    field = err.field.as_deref(),
                    error = %err.message,
                    "error calling tool"
                );
                ToolReply::error(&err)
            }
        }
    }

    async fn tool_search_conversations(&self, args: &Map<String, Value>) -> Result<String, ToolError> {
        let params = SearchParams {
            query: arg_optional_string(args, "query")?,
            from_date: arg_optional_string(args, "from_date")?,
            to_date: arg_optional_string(args, "to_date")?,
            participant_email: arg_optional_string(args, "participant_email")?,
            owner_email: arg_optional_string(args, "owner_email")?,
            size: arg_u32(args, "size", DEFAULT_PAGE_SIZE)?,
            ..SearchParams::default()
        };
        let result = self.client.search_conversations(&params).await?;
        Ok(format_search_results(&result))
    }

    async fn tool_get_conversation(&self, args: &Map<String, Value>) -> Result<String, ToolError> {
        let conversation_id = required_string(args, "conversation_id")?;
        let detailed_transcript = arg_bool(args, "detailed_transcript", true)?;
        let detail = self
            .client
            .get_conversation(&conversation_id, detailed_transcript, false)
            .await?;
        Ok(format_conversation(&detail))
    }

    async fn tool_list_recent_conversations(
        &self,
        args: &Map<String, Value>,
    ) -> Result<String, ToolError> {
        let days_back = arg_i64(args, "days_back", DEFAULT_DAYS_BACK)?;
        let size = arg_u32(args, "size", DEFAULT_PAGE_SIZE)?;
        let result = self.client.list_recent_conversations(days_back, size).await?;
        Ok(format_search_results(&result))
    }
}

fn arg_bool(args: &Map<String, Value>, key: &str, default: bool) -> Result<bool, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(v)) => Ok(*v),
        Some(_) => Err(ToolError::validation(key, format!("'{key}' must be a boolean"))),
    }
}

fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    let value = args
        .get(key)
        .ok_or_else(|| ToolError::validation(key, format!("Missing required field '{key}'")))?;
    match value {
        Value::String(v) if !v.trim().is_empty() => Ok(v.clone()),
        Value::String(_) => Err(ToolError::validation(key, format!("'{key}' must not be empty"))),
        _ => Err(ToolError::validation(key, format!("'{key}' must be a string"))),
    }
}

fn arg_optional_string(args: &Map<String, Value>, key: &str) -> Result<Option<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(v)) if v.trim().is_empty() => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.clone())),
        Some(_) => Err(ToolError::validation(key, format!("'{key}' must be a string"))),
    }
}

fn arg_u32(args: &Map<String, Value>, key: &str, default: u32) -> Result<u32, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                ToolError::validation(key, format!("'{key}' must be a non-negative integer"))
            }),
        Some(_) => Err(ToolError::validation(
            key,
            format!("'{key}' must be a non-negative integer"),
        )),
    }
}

fn arg_i64(args: &Map<String, Value>, key: &str, default: i64) -> Result<i64, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| ToolError::validation(key, format!("'{key}' must be an integer"))),
        Some(_) => Err(ToolError::validation(key, format!("'{key}' must be an integer"))),
    }
}
