//! podhome-mcp: MCP server exposing the Podhome podcast-hosting API
//!
//! Agents create, schedule and modify episodes, cut clips, and manage
//! webhooks for any of the configured shows.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use podhome_mcp::config::{self, Overrides};
use podhome_mcp::mcp::server::McpServer;
use podhome_mcp::tools::ToolRegistry;

/// MCP server for the Podhome podcast-hosting API.
///
/// Each configured show maps a show slug to its Podhome API key. Tools take
/// the slug as their `show` argument.
#[derive(Parser, Debug)]
#[command(name = "podhome-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Base URL of the Podhome API
    #[arg(long, env = "PODHOME_BASE_URL", value_name = "URL")]
    base_url: Option<String>,

    /// JSON object mapping show slugs to API keys
    #[arg(long, env = "PODHOME_SHOWS", value_name = "JSON", hide_env_values = true)]
    shows: Option<String>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber. Logs go to stderr; stdout carries MCP.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the podhome-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let overrides = Overrides {
        config_path: args.config,
        base_url: args.base_url,
        shows: args.shows,
    };

    let cfg = match config::load_config(&overrides) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if overrides.config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!(
                        "\nSet PODHOME_SHOWS or create a config at: {}",
                        default_path.display()
                    );
                }
            }
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting podhome-mcp server"
    );
    info!(
        shows = ?cfg.shows.names().collect::<Vec<_>>(),
        base_url = %cfg.base_url,
        "Loaded Podhome shows"
    );

    let mut server = McpServer::new(ToolRegistry::new(cfg));

    info!("MCP server ready, waiting for client connection...");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
