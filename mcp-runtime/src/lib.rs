use clap::Subcommand;
use serde_json::{Map, Value, json};
use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::Instrument;
use uuid::Uuid;

pub mod client;
pub mod error;
mod logging;
pub mod tools;
mod util;

pub use client::{AttentionClient, ClientConfig, DEFAULT_BASE_URL, SearchParams};
pub use error::Error;
pub use logging::{DEFAULT_LOG_FILTER, init_logging};
pub use tools::{ToolDispatcher, ToolReply, tool_definitions};
pub use util::API_KEY_ENV;

const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const MCP_SERVER_NAME: &str = "attention";
const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

#[derive(Subcommand, Clone, Debug)]
pub enum McpCommands {
    /// Run the Attention MCP server over stdio
    Serve,
    /// Check credentials and API reachability with a single one-item search
    Diagnose,
}

/// Entry point shared by the dedicated MCP binary and the CLI. Returns the
/// process exit code.
pub async fn run(config: ClientConfig, command: McpCommands) -> i32 {
    let client = match AttentionClient::new(config) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(code = err.code(), error = %err, "failed to configure Attention client");
            let payload = json!({
                "error": err.code(),
                "message": err.to_string(),
                "docs_hint": format!("Set {API_KEY_ENV} or pass --api-key."),
            });
            eprintln!("{}", to_pretty_json(&payload));
            return 1;
        }
    };

    match command {
        McpCommands::Serve => {
            let server = McpServer::new(ToolDispatcher::new(client));
            match server.serve_stdio().await {
                Ok(()) => 0,
                Err(err) => {
                    let payload = json!({
                        "error": "mcp_server_error",
                        "message": err,
                    });
                    eprintln!("{}", to_pretty_json(&payload));
                    1
                }
            }
        }
        McpCommands::Diagnose => {
            let report = diagnose(&client).await;
            println!("{}", to_pretty_json(&report));
            if report.get("status").and_then(Value::as_str) == Some("ready") {
                0
            } else {
                2
            }
        }
    }
}

async fn diagnose(client: &AttentionClient) -> Value {
    let probe = SearchParams {
        size: 1,
        ..SearchParams::default()
    };
    let mut report = json!({
        "server": MCP_SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "api_url": client.base_url().as_str(),
        "checked_at": chrono::Utc::now(),
    });
    match client.search_conversations(&probe).await {
        Ok(result) => {
            report["status"] = json!("ready");
            report["total_records"] = json!(result.total());
        }
        Err(err) => {
            report["status"] = json!("error");
            report["error"] = json!({
                "error": err.code(),
                "message": err.to_string(),
                "http_status": err.status(),
            });
        }
    }
    report
}

/// How a message arrived on stdin; replies use the same framing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Framing {
    /// One JSON document per line.
    Line,
    /// `Content-Length` headers, blank line, body.
    ContentLength,
}

/// JSON-RPC server exposing the Attention tools. Holds no state besides the
/// injected dispatcher.
pub struct McpServer {
    tools: ToolDispatcher,
    session_id: String,
}

impl McpServer {
    pub fn new(tools: ToolDispatcher) -> Self {
        Self {
            tools,
            session_id: format!("stdio-{}", Uuid::now_v7()),
        }
    }

    pub async fn serve_stdio(&self) -> Result<(), String> {
        self.serve(BufReader::new(io::stdin()), io::stdout()).await
    }

    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let span = tracing::info_span!("mcp_session", session_id = %self.session_id);
        async move {
            tracing::info!(
                server = MCP_SERVER_NAME,
                version = env!("CARGO_PKG_VERSION"),
                "mcp server listening on stdio"
            );
            loop {
                let incoming = read_message(&mut reader)
                    .await
                    .map_err(|e| format!("Failed to read MCP message: {e}"))?;
                let Some((parsed, framing)) = incoming else {
                    tracing::info!("stdin closed, shutting down");
                    break;
                };

                let responses = match parsed {
                    Ok(message) => self.handle_incoming_message(message).await,
                    Err(err) => {
                        tracing::warn!(code = err.code, error = %err.message, "discarding MCP message");
                        vec![error_response(Value::Null, err)]
                    }
                };
                for response in responses {
                    write_message(&mut writer, &response, framing)
                        .await
                        .map_err(|e| format!("Failed to write MCP response: {e}"))?;
                }
            }
            Ok::<(), String>(())
        }
        .instrument(span)
        .await
    }

    async fn handle_incoming_message(&self, incoming: Value) -> Vec<Value> {
        let mut responses = Vec::new();

        if let Some(batch) = incoming.as_array() {
            if batch.is_empty() {
                responses.push(error_response(
                    Value::Null,
                    RpcError::invalid_request("Batch request must not be empty"),
                ));
                return responses;
            }
            for item in batch {
                if let Some(response) = self.handle_single_message(item.clone()).await {
                    responses.push(response);
                }
            }
            return responses;
        }

        if let Some(response) = self.handle_single_message(incoming).await {
            responses.push(response);
        }
        responses
    }

    async fn handle_single_message(&self, incoming: Value) -> Option<Value> {
        let Some(obj) = incoming.as_object() else {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            let id = obj.get("id").cloned().unwrap_or(Value::Null);
            return Some(error_response(
                id,
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        let Some(method) = obj.get("method").and_then(Value::as_str) else {
            // A client response; this server never issues requests.
            return None;
        };

        let params = obj.get("params").cloned().unwrap_or(Value::Null);
        if let Some(id) = obj.get("id").cloned() {
            let result = self.handle_request(method, params).await;
            Some(match result {
                Ok(payload) => success_response(id, payload),
                Err(err) => error_response(id, err),
            })
        } else {
            tracing::debug!(method, "notification received");
            None
        }
    }

    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(initialize_payload()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(tools_list_payload()),
            "tools/call" => self.handle_tools_call(params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, RpcError> {
        let params = params
            .as_object()
            .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;

        let args = match params.get("arguments") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return Err(RpcError::invalid_params(
                    "tools/call 'arguments' must be an object",
                ));
            }
        };

        Ok(self.tools.call(name, &args).await.to_value())
    }
}

fn initialize_payload() -> Value {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "serverInfo": {
            "name": MCP_SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "instructions": "Use search_conversations or list_recent_conversations to find Attention call recordings, then get_conversation with an ID for the full transcript and extracted intelligence."
    })
}

fn tools_list_payload() -> Value {
    json!({ "tools": tool_definitions() })
}

#[derive(Debug)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
        }
    }

    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
        }
    }

    fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
        }
    }
}

fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message
        }
    })
}

/// Reads the next message in either framing. `Ok(None)` on clean EOF. A
/// message that cannot be used is returned as the `RpcError` to reply with.
async fn read_message<R>(
    reader: &mut R,
) -> Result<Option<(Result<Value, RpcError>, Framing)>, std::io::Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut in_headers = false;

    loop {
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            if !in_headers {
                return Ok(None);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "Unexpected EOF while reading MCP headers",
            ));
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            if in_headers {
                break;
            }
            continue;
        }

        let is_content_length = trimmed.to_ascii_lowercase().starts_with("content-length:");
        if !in_headers && !is_content_length {
            return Ok(Some((parse_json(trimmed.as_bytes()), Framing::Line)));
        }

        in_headers = true;
        if is_content_length {
            let raw_len = trimmed
                .split_once(':')
                .map(|(_, right)| right.trim())
                .unwrap_or_default();
            let parsed = raw_len.parse::<usize>().map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Invalid Content-Length header",
                )
            })?;
            content_length = Some(parsed);
        }
    }

    let content_length = content_length.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Missing Content-Length header",
        )
    })?;
    if content_length > MAX_MESSAGE_BYTES {
        let limit = u64::try_from(content_length).unwrap_or(u64::MAX);
        io::copy(&mut (&mut *reader).take(limit), &mut io::sink()).await?;
        let err = RpcError::invalid_request(format!(
            "Message of {content_length} bytes exceeds the {MAX_MESSAGE_BYTES} byte limit"
        ));
        return Ok(Some((Err(err), Framing::ContentLength)));
    }

    let mut payload = vec![0_u8; content_length];
    reader.read_exact(&mut payload).await?;

    Ok(Some((parse_json(&payload), Framing::ContentLength)))
}

fn parse_json(raw: &[u8]) -> Result<Value, RpcError> {
    serde_json::from_slice(raw).map_err(|e| RpcError::parse_error(e.to_string()))
}

async fn write_message<W>(writer: &mut W, value: &Value, framing: Framing) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(value).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to serialize JSON: {e}"),
        )
    })?;
    match framing {
        Framing::Line => {
            writer.write_all(&body).await?;
            writer.write_all(b"\n").await?;
        }
        Framing::ContentLength => {
            let header = format!(
                "Content-Length: {}\r\nContent-Type: application/json\r\n\r\n",
                body.len()
            );
            writer.write_all(header.as_bytes()).await?;
            writer.write_all(&body).await?;
        }
    }
    writer.flush().await?;
    Ok(())
}

fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
