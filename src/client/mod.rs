//! Core library client for codebase-index
//!
//! This module provides the main client interface for indexing a source tree
//! and searching it, either directly as a library or wrapped by the MCP server.

mod indexing;
mod search;

use crate::config::Config;
use crate::embedding::{EmbeddingProvider, OllamaEmbedder};
use crate::error::{BoundedCallError, ConfigError, RagError, ValidationError, VectorDbError};
use crate::vector_db::{Distance, InMemoryVectorStore, QdrantStore, VectorStore, ensure_collection};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Main client for interacting with the index
///
/// Built once at startup and shared (cheaply cloned) by every invocation.
/// Holds no locks of its own; concurrent index and search calls rely on the
/// store being safe for concurrent use.
///
/// # Example
///
/// ```no_run
/// use codebase_index::{Config, RagClient};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = RagClient::with_config(Config::default()).await?;
///
///     let stats = client.index_project("/path/to/code").await?;
///     println!("{}", stats.to_report());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RagClient {
    pub(crate) embedder: Arc<dyn EmbeddingProvider>,
    pub(crate) store: Arc<dyn VectorStore>,
    pub(crate) config: Arc<Config>,
}

impl RagClient {
    /// Create a client from the config file (or defaults) plus environment overrides
    pub async fn new(config_path: Option<&Path>) -> Result<Self, RagError> {
        let config = Config::new(config_path)?;
        Self::with_config(config).await
    }

    /// Create a client with the Ollama embedder and the configured store backend
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the collection
    /// cannot be checked or created.
    pub async fn with_config(config: Config) -> Result<Self, RagError> {
        config.validate()?;

        tracing::info!("Initializing client with configuration");
        tracing::debug!("Vector DB backend: {}", config.vector_db.backend);
        tracing::debug!("Embedding model: {}", config.embedding.model_name);

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config.embedding)?);

        let store: Arc<dyn VectorStore> = match config.vector_db.backend.as_str() {
            "memory" => {
                tracing::info!("Using in-memory vector store (nothing is persisted)");
                Arc::new(InMemoryVectorStore::new())
            }
            _ => Arc::new(QdrantStore::new(&config.vector_db)?),
        };

        Self::with_components(config, embedder, store).await
    }

    /// Create a client around existing embedding and store implementations
    ///
    /// The collection is created if it does not exist yet; failing to check or
    /// create it is an error.
    pub async fn with_components(
        config: Config,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self, RagError> {
        if embedder.dimension() != config.embedding.dimension {
            return Err(ConfigError::InvalidValue {
                key: "embedding.dimension".to_string(),
                reason: format!(
                    "configured {} but model '{}' produces {}",
                    config.embedding.dimension,
                    embedder.model_name(),
                    embedder.dimension()
                ),
            }
            .into());
        }

        let never_cancelled = CancellationToken::new();
        bounded(
            config.vector_db.timeout_secs,
            &never_cancelled,
            ensure_collection(
                store.as_ref(),
                &config.vector_db.collection_name,
                config.embedding.dimension,
                Distance::Cosine,
            ),
        )
        .await?;

        Ok(Self {
            embedder,
            store,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn collection_name(&self) -> &str {
        &self.config.vector_db.collection_name
    }

    /// Exact number of points currently in the collection
    pub async fn point_count(&self) -> Result<u64, RagError> {
        let never_cancelled = CancellationToken::new();
        let count = bounded(
            self.config.vector_db.timeout_secs,
            &never_cancelled,
            self.store.count(self.collection_name()),
        )
        .await?;
        Ok(count)
    }

    /// Resolve a user-supplied root to a canonical directory path
    pub fn normalize_path(path: &str) -> Result<PathBuf, RagError> {
        if path.trim().is_empty() {
            return Err(ValidationError::Empty("path".to_string()).into());
        }

        let canonical = std::fs::canonicalize(path)
            .map_err(|_| ValidationError::PathNotFound(path.to_string()))?;

        if !canonical.is_dir() {
            return Err(ValidationError::NotADirectory(path.to_string()).into());
        }

        Ok(canonical)
    }
}

/// List the store's collections within `timeout_secs`
///
/// Used by the `check` command; does not create anything.
pub async fn check_connectivity(
    store: &dyn VectorStore,
    timeout_secs: u64,
) -> Result<Vec<String>, VectorDbError> {
    let never_cancelled = CancellationToken::new();
    bounded(timeout_secs, &never_cancelled, store.list_collections()).await
}

/// Run one outbound call under a deadline, abandoning it if `cancel` fires first
pub(crate) async fn bounded<T, E, F>(
    timeout_secs: u64,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: BoundedCallError,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(E::cancelled()),
        result = tokio::time::timeout(Duration::from_secs(timeout_secs), call) => {
            result.unwrap_or_else(|_| Err(E::timed_out(timeout_secs)))
        }
    }
}
