use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codebase_index::Config;
use codebase_index::client::{RagClient, check_connectivity};
use codebase_index::mcp_server::RagMcpServer;
use codebase_index::vector_db::QdrantStore;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Seconds the connectivity check waits for the store
const CHECK_TIMEOUT_SECS: u64 = 3;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser)]
#[command(name = "codebase-index", version = VERSION, about = "Semantic code search over a source tree")]
struct Cli {
    /// Path to a TOML config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "CODEBASE_INDEX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server over stdio (default)
    Serve,
    /// Index a project directory and print the report
    Index {
        /// Root of the project to index
        path: PathBuf,
    },
    /// Search the index and print the matches
    Search {
        query: String,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Verify the vector store is reachable
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            RagMcpServer::serve_stdio(config_path).await?;
        }
        Command::Index { path } => {
            let client = RagClient::new(config_path)
                .await
                .context("Failed to initialize client")?;
            let stats = client
                .index_project(&path.to_string_lossy())
                .await
                .with_context(|| format!("Failed to index {}", path.display()))?;
            println!("{}", stats.to_report());
        }
        Command::Search { query, limit } => {
            let client = RagClient::new(config_path)
                .await
                .context("Failed to initialize client")?;
            let limit = limit.unwrap_or(client.config().search.limit);
            let text = client
                .codebase_search(&query, limit, &CancellationToken::new())
                .await
                .context("Search failed")?;
            println!("{}", text);
        }
        Command::Check => {
            let config = Config::new(config_path).context("Failed to load configuration")?;
            let store = QdrantStore::with_url(
                &config.vector_db.url(),
                Duration::from_secs(CHECK_TIMEOUT_SECS),
            )?;
            let collections = check_connectivity(&store, CHECK_TIMEOUT_SECS)
                .await
                .with_context(|| format!("Qdrant at {} is not reachable", store.url()))?;
            tracing::info!(
                "Connected to Qdrant at {} ({} collections)",
                store.url(),
                collections.len()
            );
        }
    }

    Ok(())
}
