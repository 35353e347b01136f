//! Lumen CLI - chat-completion adapter host.
//!
//! A minimal host around `lumen-core`: it supplies plain parameters from
//! flags and config, issues one completion call, and prints the single
//! returned string — generated text or an `Error: ...` description.
//!
//! # Usage
//!
//! ```bash
//! # Ask a local Ollama server
//! lumen ask --provider ollama "2+2=?"
//!
//! # Ask OpenRouter with an image attached
//! lumen ask --provider openrouter --image photo.jpg "What is in this picture?"
//!
//! # View configuration
//! lumen config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Lumen - chat-completion adapters for pipeline hosts.
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one prompt (and optionally an image) to a completion backend
    Ask(cli::ask::AskArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match lumen_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `lumen config path`."
            );
            lumen_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Lumen v{}", lumen_core::VERSION);

    match cli.command {
        Commands::Ask(args) => cli::ask::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
