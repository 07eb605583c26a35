//! # codebase-index - Semantic Search over a Source Tree
//!
//! An MCP (Model Context Protocol) server that indexes the functions and
//! methods of a codebase into a vector store so that natural-language queries
//! can retrieve related code.
//!
//! ## Overview
//!
//! Indexing walks a directory, extracts one chunk per function or method with
//! a tree-sitter query, embeds each chunk through an Ollama-compatible
//! `/api/embed` endpoint and upserts it into a Qdrant collection. Every chunk
//! gets a deterministic id derived from its file path and symbol name, so
//! re-indexing a project overwrites points instead of duplicating them.
//!
//! Searching embeds the query and returns the nearest chunks, rendered as
//! fenced code blocks with file, line and score.
//!
//! ## Architecture
//!
//! ```text
//!        MCP client
//!            |  stdio
//!       RagMcpServer        index_project, codebase_search
//!            |
//!        RagClient
//!     /      |       \
//! FileWalker  ChunkExtractor  EmbeddingProvider -> VectorStore
//! ```
//!
//! ## Modules
//!
//! - [`mcp_server`]: MCP protocol server exposing the two tools
//! - [`client`]: Indexing and search pipelines
//! - [`indexer`]: File walking, language queries and chunk identity
//! - [`embedding`]: Embedding provider trait and the Ollama client
//! - [`vector_db`]: Vector store trait with Qdrant and in-memory backends
//! - [`config`]: Configuration management with environment variable support
//! - [`types`]: Tool request types, indexing stats and result formatting
//! - [`error`]: Error types
//!
//! ## Usage Example
//!
//! ```no_run
//! use codebase_index::mcp_server::RagMcpServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Serve over stdio (MCP protocol) with the default configuration
//!     RagMcpServer::serve_stdio(None).await?;
//!     Ok(())
//! }
//! ```

/// Indexing and search client
pub mod client;

/// Configuration management with environment variable overrides
pub mod config;

/// Embedding generation through an Ollama-compatible service
pub mod embedding;

/// Error types and utilities
pub mod error;

/// File walking, chunk extraction and chunk identity
pub mod indexer;

/// MCP server implementation
pub mod mcp_server;

/// Tool request types, stats and result formatting
pub mod types;

/// Vector database abstraction with Qdrant and in-memory backends
pub mod vector_db;

pub use client::RagClient;
pub use config::Config;
pub use error::RagError;
pub use types::{IndexingStats, SearchResult};
