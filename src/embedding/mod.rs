mod ollama_client;

pub use ollama_client::{OllamaEmbedder, resolve_endpoint};

use crate::error::EmbeddingError;
use async_trait::async_trait;

/// Trait for embedding generation
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one piece of text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}
