use clap::Parser;

use attention_mcp_runtime::{
    ClientConfig, DEFAULT_BASE_URL, McpCommands, init_logging, run as run_mcp,
};

#[derive(Parser)]
#[command(
    name = "attention-mcp",
    version,
    about = "Attention MCP server: call recordings, transcripts and extracted intelligence over stdio"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "ATTENTION_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// API key (Bearer token)
    #[arg(long, env = "ATTENTION_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, env = "ATTENTION_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: McpCommands,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config = ClientConfig {
        api_key: cli.api_key,
        base_url: cli.api_url,
    };
    let code = run_mcp(config, cli.command).await;
    std::process::exit(code);
}
