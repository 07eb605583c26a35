use super::{RagClient, bounded};
use crate::error::{EmbeddingError, RagError, VectorDbError};
use crate::indexer::{
    ChunkExtractor, CodeChunk, FileWalker, SourceLanguage, WalkOutcome, chunk_source_file,
};
use crate::types::IndexingStats;
use crate::vector_db::{ChunkPayload, IndexedPoint};
use sha2::{Digest, Sha256};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// What happened to one chunk
enum ChunkOutcome {
    Indexed,
    Failed(String),
    Cancelled,
}

/// Hex-encoded SHA-256 of a chunk's text
pub(crate) fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

impl RagClient {
    /// Index every function and method under `path`
    ///
    /// Per-file and per-chunk failures are counted in the returned stats and
    /// never abort the run. Only an invalid root is an error.
    pub async fn index_project(&self, path: &str) -> Result<IndexingStats, RagError> {
        self.index_project_cancellable(path, &CancellationToken::new())
            .await
    }

    /// Like [`index_project`](Self::index_project), stopping early when `cancel` fires
    ///
    /// A cancelled run still returns the counts gathered so far, flagged as
    /// cancelled.
    pub async fn index_project_cancellable(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<IndexingStats, RagError> {
        let root = Self::normalize_path(path)?;
        let language = self.config.indexing.source_language()?;
        let mut extractor = ChunkExtractor::new(language)?;

        let walker = FileWalker::new(&root, language)
            .with_max_file_size(self.config.indexing.max_file_size);

        tracing::info!("Indexing {} ({} sources)", root.display(), language);

        let start = Instant::now();
        let indexed_at = chrono::Utc::now().timestamp();
        let mut stats = IndexingStats::default();

        'files: for outcome in walker.iter() {
            if cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }

            match outcome {
                WalkOutcome::Skipped { path, reason } => {
                    tracing::debug!("Skipping {:?}: {:?}", path, reason);
                    stats.files_skipped += 1;
                }
                WalkOutcome::Failed { path, reason } => {
                    stats.record_failure(format!("{}: {}", path.display(), reason));
                }
                WalkOutcome::Source(file) => {
                    stats.files_scanned += 1;

                    let chunks = match chunk_source_file(&mut extractor, &file) {
                        Ok(chunks) => chunks,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            stats.record_failure(e.to_string());
                            continue;
                        }
                    };

                    tracing::debug!("{:?}: {} chunks", file.path, chunks.len());

                    for chunk in chunks {
                        match self.index_chunk(chunk, language, indexed_at, cancel).await {
                            ChunkOutcome::Indexed => stats.chunks_indexed += 1,
                            ChunkOutcome::Failed(message) => stats.record_failure(message),
                            ChunkOutcome::Cancelled => {
                                stats.cancelled = true;
                                break 'files;
                            }
                        }
                    }
                }
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        if stats.cancelled {
            tracing::info!(
                "Indexing of {} cancelled after {} files, {} chunks",
                root.display(),
                stats.files_scanned,
                stats.chunks_indexed
            );
        } else {
            tracing::info!(
                "Indexed {}: {} files, {} chunks, {} failed, {} skipped in {}ms",
                root.display(),
                stats.files_scanned,
                stats.chunks_indexed,
                stats.failed,
                stats.files_skipped,
                stats.duration_ms
            );
        }

        Ok(stats)
    }

    /// Embed one chunk and upsert it as a single point
    async fn index_chunk(
        &self,
        chunk: CodeChunk,
        language: SourceLanguage,
        indexed_at: i64,
        cancel: &CancellationToken,
    ) -> ChunkOutcome {
        let vector = match bounded(
            self.config.embedding.timeout_secs,
            cancel,
            self.embedder.embed(&chunk.source_text),
        )
        .await
        {
            Ok(vector) => vector,
            Err(EmbeddingError::Cancelled) => return ChunkOutcome::Cancelled,
            Err(e) => {
                tracing::warn!(
                    "Failed to embed {}:{}: {}",
                    chunk.file_path,
                    chunk.symbol_name,
                    e
                );
                return ChunkOutcome::Failed(format!(
                    "{}:{}: {}",
                    chunk.file_path, chunk.symbol_name, e
                ));
            }
        };

        let label = format!("{}:{}", chunk.file_path, chunk.symbol_name);
        let point = IndexedPoint {
            id: chunk.identity,
            vector,
            payload: ChunkPayload {
                content_hash: content_hash(&chunk.source_text),
                file_path: chunk.file_path,
                symbol_name: chunk.symbol_name,
                start_line: chunk.start_line,
                end_line: chunk.end_line,
                source_text: chunk.source_text,
                language: language.name().to_string(),
                indexed_at,
            },
        };

        match bounded(
            self.config.vector_db.timeout_secs,
            cancel,
            self.store.upsert(self.collection_name(), vec![point]),
        )
        .await
        {
            Ok(()) => ChunkOutcome::Indexed,
            Err(VectorDbError::Cancelled) => ChunkOutcome::Cancelled,
            Err(e) => {
                tracing::warn!("Failed to upsert {}: {}", label, e);
                ChunkOutcome::Failed(format!("{}: {}", label, e))
            }
        }
    }
}
