use attention_mcp_runtime::{ClientConfig, DEFAULT_BASE_URL, McpCommands, init_logging};
use clap::{Parser, Subcommand};

mod commands;
mod util;

use commands::conversation::{GetArgs, RecentArgs, SearchArgs};

#[derive(Parser)]
#[command(
    name = "attention",
    version,
    about = "Attention CLI: search call recordings, read transcripts, run the MCP server"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "ATTENTION_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    api_url: String,

    /// API key (Bearer token)
    #[arg(long, env = "ATTENTION_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, env = "ATTENTION_LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search conversations by title, date range, participant or owner
    Search(SearchArgs),
    /// Show one conversation with participants, intelligence and transcript
    Get(GetArgs),
    /// List conversations from the last N days
    Recent(RecentArgs),
    /// MCP server over stdio
    Mcp {
        #[command(subcommand)]
        command: McpCommands,
    },
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

    let code = match cli.command {
        Commands::Mcp { command } => attention_mcp_runtime::run(config, command).await,
        Commands::Search(args) => commands::conversation::search(&util::client(config), args).await,
        Commands::Get(args) => commands::conversation::get(&util::client(config), args).await,
        Commands::Recent(args) => commands::conversation::recent(&util::client(config), args).await,
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_defaults_to_detailed_transcript() {
        let cli = Cli::try_parse_from(["attention", "get", "c-1"]).unwrap();
        let Commands::Get(args) = cli.command else {
            panic!("expected get");
        };
        assert_eq!(args.conversation_id, "c-1");
        assert!(args.detailed_transcript);
        assert!(!args.include_internal_participants);

        let cli =
            Cli::try_parse_from(["attention", "get", "c-1", "--detailed-transcript", "false"])
                .unwrap();
        let Commands::Get(args) = cli.command else {
            panic!("expected get");
        };
        assert!(!args.detailed_transcript);
    }

    #[test]
    fn recent_and_search_use_tool_defaults() {
        let cli = Cli::try_parse_from(["attention", "recent"]).unwrap();
        let Commands::Recent(args) = cli.command else {
            panic!("expected recent");
        };
        assert_eq!((args.days_back, args.size), (7, 20));

        let cli = Cli::try_parse_from(["attention", "search", "-q", "acme", "--json"]).unwrap();
        let Commands::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.query.as_deref(), Some("acme"));
        assert_eq!((args.page, args.size), (1, 20));
        assert!(args.json);
    }

    #[test]
    fn recent_accepts_negative_days_back() {
        let cli = Cli::try_parse_from(["attention", "recent", "--days-back", "-3"]).unwrap();
        let Commands::Recent(args) = cli.command else {
            panic!("expected recent");
        };
        assert_eq!(args.days_back, -3);
    }

    #[test]
    fn mcp_subcommands_parse() {
        let cli = Cli::try_parse_from(["attention", "mcp", "serve"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Mcp {
                command: McpCommands::Serve
            }
        ));
    }
}
