// Qdrant is the production backend (requires external server)
pub mod qdrant_client;
pub use qdrant_client::QdrantStore;

// In-process backend for tests and throwaway sessions
pub mod memory;
pub use memory::InMemoryVectorStore;

use crate::error::VectorDbError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Similarity metric a collection is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    Cosine,
    Dot,
}

/// Metadata stored alongside every vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub file_path: String,
    pub symbol_name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub source_text: String,
    pub language: String,
    /// SHA-256 of `source_text`, hex encoded
    pub content_hash: String,
    /// Unix timestamp (seconds) of the run that wrote this point
    pub indexed_at: i64,
}

/// One point as written to the store
#[derive(Debug, Clone)]
pub struct IndexedPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

/// One nearest-neighbour hit
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: ChunkPayload,
}

/// Trait for vector database operations
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    async fn collection_exists(&self, collection: &str) -> Result<bool, VectorDbError>;

    async fn create_collection(
        &self,
        collection: &str,
        dimension: usize,
        distance: Distance,
    ) -> Result<(), VectorDbError>;

    /// Insert or overwrite points by id
    async fn upsert(&self, collection: &str, points: Vec<IndexedPoint>)
    -> Result<(), VectorDbError>;

    /// Nearest neighbours of `vector`, best first, at most `limit`
    async fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, VectorDbError>;

    /// Exact number of points in a collection
    async fn count(&self, collection: &str) -> Result<u64, VectorDbError>;

    async fn list_collections(&self) -> Result<Vec<String>, VectorDbError>;
}

/// Create `collection` with the given vector size and metric unless it exists
pub async fn ensure_collection(
    store: &dyn VectorStore,
    collection: &str,
    dimension: usize,
    distance: Distance,
) -> Result<(), VectorDbError> {
    if store.collection_exists(collection).await? {
        tracing::info!("Collection '{}' already exists", collection);
        return Ok(());
    }

    tracing::info!(
        "Creating collection '{}' with dimension {} ({:?})",
        collection,
        dimension,
        distance
    );
    store
        .create_collection(collection, dimension, distance)
        .await
}
