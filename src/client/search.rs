use super::{RagClient, bounded};
use crate::error::{RagError, ValidationError};
use crate::types::{SearchResult, format_results};
use tokio_util::sync::CancellationToken;

impl RagClient {
    /// Find the chunks most similar to `query`, best first
    ///
    /// # Errors
    ///
    /// Fails on an empty query, a zero limit, or when embedding the query or
    /// querying the store fails or is cancelled.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, RagError> {
        if query.trim().is_empty() {
            return Err(ValidationError::Empty("query".to_string()).into());
        }
        if limit == 0 {
            return Err(ValidationError::ConstraintViolation {
                field: "limit".to_string(),
                constraint: "at least 1".to_string(),
                actual: limit.to_string(),
            }
            .into());
        }

        tracing::debug!("Searching for {:?} (limit {})", query, limit);

        let vector = bounded(
            self.config.embedding.timeout_secs,
            cancel,
            self.embedder.embed(query),
        )
        .await?;

        let hits = bounded(
            self.config.vector_db.timeout_secs,
            cancel,
            self.store.query(self.collection_name(), vector, limit),
        )
        .await?;

        Ok(hits
            .into_iter()
            .map(|hit| SearchResult {
                file_path: hit.payload.file_path,
                symbol_name: hit.payload.symbol_name,
                start_line: hit.payload.start_line,
                end_line: hit.payload.end_line,
                source_text: hit.payload.source_text,
                language: hit.payload.language,
                score: hit.score,
            })
            .collect())
    }

    /// Search and render the matches as the text returned to tool callers
    pub async fn codebase_search(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<String, RagError> {
        let results = self.search(query, limit, cancel).await?;
        tracing::info!("Search returned {} results", results.len());
        Ok(format_results(&results))
    }
}
