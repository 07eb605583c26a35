use super::{ChunkPayload, Distance, IndexedPoint, ScoredPoint, VectorStore};
use crate::config::VectorDbConfig;
use crate::error::VectorDbError;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    self, CountPointsBuilder, CreateCollectionBuilder, PointId, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashMap;
use std::time::Duration;

pub struct QdrantStore {
    client: Qdrant,
    url: String,
}

impl QdrantStore {
    /// Create a client for the configured host and port
    pub fn new(config: &VectorDbConfig) -> Result<Self, VectorDbError> {
        Self::with_url(&config.url(), Duration::from_secs(config.timeout_secs))
    }

    /// Create a new Qdrant client with a custom URL
    ///
    /// The gRPC channel connects lazily, so an unreachable server is only
    /// reported by the first call.
    pub fn with_url(url: &str, timeout: Duration) -> Result<Self, VectorDbError> {
        tracing::info!("Connecting to Qdrant at {}", url);

        let client = Qdrant::from_url(url)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| VectorDbError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn to_qdrant_distance(distance: Distance) -> qdrant::Distance {
    match distance {
        Distance::Cosine => qdrant::Distance::Cosine,
        Distance::Dot => qdrant::Distance::Dot,
    }
}

fn to_point_struct(point: IndexedPoint) -> Result<PointStruct, VectorDbError> {
    let value = serde_json::to_value(&point.payload)
        .map_err(|e| VectorDbError::UpsertFailed(format!("payload encoding: {}", e)))?;
    let payload = Payload::try_from(value)
        .map_err(|e| VectorDbError::UpsertFailed(format!("payload encoding: {}", e)))?;

    Ok(PointStruct::new(point.id.to_string(), point.vector, payload))
}

fn point_id_to_string(id: Option<PointId>) -> String {
    match id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Uuid(u)) => u,
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    }
}

/// Rebuild a payload; fields added later default so older points stay readable
fn payload_from_qdrant(payload: &HashMap<String, qdrant::Value>) -> Option<ChunkPayload> {
    let text = |key: &str| payload.get(key).and_then(|v| v.as_str()).cloned();
    let int = |key: &str| payload.get(key).and_then(|v| v.as_integer());

    Some(ChunkPayload {
        file_path: text("file_path")?,
        symbol_name: text("symbol_name").unwrap_or_default(),
        start_line: int("start_line")? as usize,
        end_line: int("end_line")? as usize,
        source_text: text("source_text")?,
        language: text("language").unwrap_or_default(),
        content_hash: text("content_hash").unwrap_or_default(),
        indexed_at: int("indexed_at").unwrap_or_default(),
    })
}

#[async_trait::async_trait]
impl VectorStore for QdrantStore {
    async fn collection_exists(&self, collection: &str) -> Result<bool, VectorDbError> {
        self.client
            .collection_exists(collection)
            .await
            .map_err(|e| VectorDbError::CollectionCheckFailed {
                collection: collection.to_string(),
                reason: e.to_string(),
            })
    }

    async fn create_collection(
        &self,
        collection: &str,
        dimension: usize,
        distance: Distance,
    ) -> Result<(), VectorDbError> {
        self.client
            .create_collection(CreateCollectionBuilder::new(collection).vectors_config(
                VectorParamsBuilder::new(dimension as u64, to_qdrant_distance(distance)),
            ))
            .await
            .map_err(|e| VectorDbError::CollectionCreationFailed {
                collection: collection.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        points: Vec<IndexedPoint>,
    ) -> Result<(), VectorDbError> {
        if points.is_empty() {
            return Ok(());
        }

        tracing::debug!("Upserting {} points into '{}'", points.len(), collection);

        let points = points
            .into_iter()
            .map(to_point_struct)
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| VectorDbError::UpsertFailed(e.to_string()))?;

        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, VectorDbError> {
        tracing::debug!("Querying '{}' with limit={}", collection, limit);

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector, limit as u64).with_payload(true),
            )
            .await
            .map_err(|e| VectorDbError::QueryFailed(e.to_string()))?;

        let results = response
            .result
            .into_iter()
            .filter_map(|point| {
                let Some(payload) = payload_from_qdrant(&point.payload) else {
                    tracing::warn!("Skipping point with incomplete payload in '{}'", collection);
                    return None;
                };
                Some(ScoredPoint {
                    id: point_id_to_string(point.id),
                    score: point.score,
                    payload,
                })
            })
            .collect();

        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<u64, VectorDbError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(|e| VectorDbError::StatisticsFailed(e.to_string()))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn list_collections(&self) -> Result<Vec<String>, VectorDbError> {
        let response = self
            .client
            .list_collections()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed(e.to_string()))?;

        Ok(response.collections.into_iter().map(|c| c.name).collect())
    }
}
