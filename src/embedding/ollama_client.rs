use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const EMBED_PATH: &str = "/api/embed";

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    model: String,
    embeddings: Vec<Vec<f64>>,
    #[serde(default)]
    total_duration: Option<u64>,
    #[serde(default)]
    load_duration: Option<u64>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
}

/// Embedding provider backed by an Ollama-compatible `/api/embed` endpoint
pub struct OllamaEmbedder {
    client: Client,
    endpoint: Url,
    model: String,
    dimension: usize,
    timeout_secs: u64,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let endpoint = resolve_endpoint(&config.url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::RequestFailed(e.to_string()))?;

        tracing::info!(
            "Using embedding model '{}' at {} ({} dimensions)",
            config.model_name,
            endpoint,
            config.dimension
        );

        Ok(Self {
            client,
            endpoint,
            model: config.model_name.clone(),
            dimension: config.dimension,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn map_send_error(&self, err: reqwest::Error) -> EmbeddingError {
        if err.is_timeout() {
            EmbeddingError::Timeout(self.timeout_secs)
        } else {
            EmbeddingError::RequestFailed(err.to_string())
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = EmbedRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::BadStatus(status.as_u16()));
        }

        let decoded: EmbedResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                EmbeddingError::Timeout(self.timeout_secs)
            } else {
                EmbeddingError::InvalidResponse(e.to_string())
            }
        })?;

        tracing::debug!(
            model = %decoded.model,
            total_duration_ns = ?decoded.total_duration,
            load_duration_ns = ?decoded.load_duration,
            prompt_tokens = ?decoded.prompt_eval_count,
            "Embedded {} bytes",
            text.len()
        );

        let first = decoded
            .embeddings
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResponse)?;

        if first.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: first.len(),
            });
        }

        Ok(first.into_iter().map(|v| v as f32).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Complete a bare base URL with the embed path; a URL with a path is used as-is
pub fn resolve_endpoint(url: &str) -> Result<Url, EmbeddingError> {
    let mut parsed = Url::parse(url.trim())
        .map_err(|e| EmbeddingError::RequestFailed(format!("invalid URL '{}': {}", url, e)))?;

    if parsed.path().is_empty() || parsed.path() == "/" {
        parsed.set_path(EMBED_PATH);
    }

    Ok(parsed)
}
