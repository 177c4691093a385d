use attention_mcp_runtime::{AttentionClient, ClientConfig, Error};
use serde::Serialize;

pub fn exit_error(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

pub fn client(config: ClientConfig) -> AttentionClient {
    AttentionClient::new(config).unwrap_or_else(|err| exit_error(&err.to_string()))
}

/// Prints the rendered text, or the decoded view as JSON with `--json`.
pub fn print_view<T: Serialize>(
    result: Result<T, Error>,
    json: bool,
    render: impl FnOnce(&T) -> String,
) -> i32 {
    let view = match result {
        Ok(view) => view,
        Err(err) => {
            tracing::error!(code = err.code(), status = ?err.status(), "request failed");
            exit_error(&err.to_string());
        }
    };

    if json {
        match serde_json::to_string_pretty(&view) {
            Ok(text) => println!("{text}"),
            Err(err) => exit_error(&format!("Failed to serialize output: {err}")),
        }
    } else {
        println!("{}", render(&view));
    }
    0
}
