//! docsgpt CLI: the main entry point.
//!
//! Commands:
//! - `onboard` : Write a default config file
//! - `index`   : Provision the vector index and load embeddings into it
//! - `ask`     : Answer one question from the command line
//! - `serve`   : Start the HTTP gateway with the showcase page
//! - `doctor`  : Diagnose configuration, corpus files, and services

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "docsgpt",
    about = "docsgpt: question answering over the visionOS documentation",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Onboard,

    /// Create the index if missing and upsert the precomputed embeddings
    Index {
        /// Upsert even when the index already holds every vector
        #[arg(short, long)]
        force: bool,
    },

    /// Ask a question (defaults to the showcase question)
    Ask {
        /// The question to answer
        question: Option<String>,

        /// Print the assembled prompt before the answer
        #[arg(long)]
        print_prompt: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Use an in-memory index instead of Pinecone
        #[arg(long)]
        offline: bool,
    },

    /// Start the HTTP gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Use an in-memory index instead of Pinecone
        #[arg(long)]
        offline: bool,
    },

    /// Diagnose configuration and connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so answers on stdout stay clean.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run()?,
        Commands::Index { force } => commands::index::run(force).await?,
        Commands::Ask {
            question,
            print_prompt,
            json,
            offline,
        } => commands::ask::run(question, print_prompt, json, offline).await?,
        Commands::Serve { port, offline } => commands::serve::run(port, offline).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
