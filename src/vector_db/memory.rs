use super::{ChunkPayload, Distance, IndexedPoint, ScoredPoint, VectorStore};
use crate::error::VectorDbError;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

struct StoredPoint {
    vector: Vec<f32>,
    payload: ChunkPayload,
}

struct InMemoryCollection {
    dimension: usize,
    distance: Distance,
    points: HashMap<Uuid, StoredPoint>,
}

/// Process-local vector store; contents are lost on exit
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, InMemoryCollection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Vector size a collection was created with
    pub fn dimension_of(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| c.dimension)
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore").finish_non_exhaustive()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn poisoned(err: impl std::fmt::Display) -> String {
    format!("store lock poisoned: {}", err)
}

#[async_trait::async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn collection_exists(&self, collection: &str) -> Result<bool, VectorDbError> {
        let cols = self
            .collections
            .read()
            .map_err(|e| VectorDbError::CollectionCheckFailed {
                collection: collection.to_string(),
                reason: poisoned(e),
            })?;
        Ok(cols.contains_key(collection))
    }

    async fn create_collection(
        &self,
        collection: &str,
        dimension: usize,
        distance: Distance,
    ) -> Result<(), VectorDbError> {
        let mut cols =
            self.collections
                .write()
                .map_err(|e| VectorDbError::CollectionCreationFailed {
                    collection: collection.to_string(),
                    reason: poisoned(e),
                })?;

        if cols.contains_key(collection) {
            return Err(VectorDbError::CollectionCreationFailed {
                collection: collection.to_string(),
                reason: "already exists".to_string(),
            });
        }

        cols.insert(
            collection.to_string(),
            InMemoryCollection {
                dimension,
                distance,
                points: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        points: Vec<IndexedPoint>,
    ) -> Result<(), VectorDbError> {
        let mut cols = self
            .collections
            .write()
            .map_err(|e| VectorDbError::UpsertFailed(poisoned(e)))?;
        let col = cols
            .get_mut(collection)
            .ok_or_else(|| VectorDbError::CollectionNotFound(collection.to_string()))?;

        // Validate the whole batch before touching anything
        if let Some(bad) = points.iter().find(|p| p.vector.len() != col.dimension) {
            return Err(VectorDbError::DimensionMismatch {
                expected: col.dimension,
                actual: bad.vector.len(),
            });
        }

        for point in points {
            col.points.insert(
                point.id,
                StoredPoint {
                    vector: point.vector,
                    payload: point.payload,
                },
            );
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, VectorDbError> {
        let cols = self
            .collections
            .read()
            .map_err(|e| VectorDbError::QueryFailed(poisoned(e)))?;
        let col = cols
            .get(collection)
            .ok_or_else(|| VectorDbError::CollectionNotFound(collection.to_string()))?;

        if vector.len() != col.dimension {
            return Err(VectorDbError::DimensionMismatch {
                expected: col.dimension,
                actual: vector.len(),
            });
        }

        let score: fn(&[f32], &[f32]) -> f32 = match col.distance {
            Distance::Cosine => cosine_similarity,
            Distance::Dot => dot_product,
        };

        let mut scored: Vec<ScoredPoint> = col
            .points
            .iter()
            .map(|(id, sp)| ScoredPoint {
                id: id.to_string(),
                score: score(&vector, &sp.vector),
                payload: sp.payload.clone(),
            })
            .collect();

        // Ties broken by id so results are stable across calls
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn count(&self, collection: &str) -> Result<u64, VectorDbError> {
        let cols = self
            .collections
            .read()
            .map_err(|e| VectorDbError::StatisticsFailed(poisoned(e)))?;
        let col = cols
            .get(collection)
            .ok_or_else(|| VectorDbError::CollectionNotFound(collection.to_string()))?;
        Ok(col.points.len() as u64)
    }

    async fn list_collections(&self) -> Result<Vec<String>, VectorDbError> {
        let cols = self
            .collections
            .read()
            .map_err(|e| VectorDbError::ConnectionFailed(poisoned(e)))?;
        let mut names: Vec<String> = cols.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
