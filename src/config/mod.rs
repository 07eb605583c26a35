/// Configuration system for codebase-index
///
/// Supports loading from multiple sources with priority:
/// Environment variables > Config file > Defaults
use crate::error::{ConfigError, RagError};
use crate::indexer::SourceLanguage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector database configuration
    #[serde(default)]
    pub vector_db: VectorDbConfig,

    /// Indexing configuration
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Search configuration
    #[serde(default)]
    pub search: SearchConfig,
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL or full endpoint of the embedding service
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Exact length of every embedding vector
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Timeout in seconds for a single embedding request
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

/// Vector database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDbConfig {
    /// Store backend: "qdrant" or "memory"
    #[serde(default = "default_db_backend")]
    pub backend: String,

    /// Qdrant host
    #[serde(default = "default_qdrant_host")]
    pub host: String,

    /// Qdrant gRPC port
    #[serde(default = "default_qdrant_port")]
    pub port: u16,

    /// Collection name for vector storage
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Timeout in seconds for a single store call
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

/// Indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Source language to index ("go", "rust", "python", ...)
    #[serde(default = "default_language")]
    pub language: String,

    /// Maximum file size to index (in bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default result limit
    #[serde(default = "default_result_limit")]
    pub limit: usize,
}

fn default_embedding_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model_name() -> String {
    "qwen3-embedding:8b".to_string()
}

fn default_dimension() -> usize {
    4096
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_db_backend() -> String {
    "qdrant".to_string()
}

fn default_qdrant_host() -> String {
    "localhost".to_string()
}

fn default_qdrant_port() -> u16 {
    6334
}

fn default_collection_name() -> String {
    "codebase_index".to_string()
}

fn default_store_timeout() -> u64 {
    10
}

fn default_language() -> String {
    "go".to_string()
}

fn default_max_file_size() -> usize {
    1_048_576 // 1 MB
}

fn default_result_limit() -> usize {
    20
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model_name: default_model_name(),
            dimension: default_dimension(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            backend: default_db_backend(),
            host: default_qdrant_host(),
            port: default_qdrant_port(),
            collection_name: default_collection_name(),
            timeout_secs: default_store_timeout(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_result_limit(),
        }
    }
}

impl VectorDbConfig {
    /// gRPC URL of the Qdrant server
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl IndexingConfig {
    /// Resolve the configured language name
    pub fn source_language(&self) -> Result<SourceLanguage, ConfigError> {
        SourceLanguage::from_str(&self.language).map_err(|_| ConfigError::InvalidValue {
            key: "indexing.language".to_string(),
            reason: format!("unsupported language '{}'", self.language),
        })
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codebase-index")
            .join("config.toml")
    }

    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, RagError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the given file, or the default location, or defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, RagError> {
        if let Some(path) = path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let config_path = Self::default_path();
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), RagError> {
        if self.vector_db.backend != "qdrant" && self.vector_db.backend != "memory" {
            return Err(invalid(
                "vector_db.backend",
                format!(
                    "must be 'qdrant' or 'memory', got '{}'",
                    self.vector_db.backend
                ),
            ));
        }

        if self.vector_db.port == 0 {
            return Err(invalid("vector_db.port", "must be greater than 0"));
        }

        if self.vector_db.collection_name.trim().is_empty() {
            return Err(invalid("vector_db.collection_name", "must not be empty"));
        }

        if self.embedding.model_name.trim().is_empty() {
            return Err(invalid("embedding.model_name", "must not be empty"));
        }

        if self.embedding.dimension == 0 {
            return Err(invalid("embedding.dimension", "must be greater than 0"));
        }

        if self.embedding.timeout_secs == 0 {
            return Err(invalid("embedding.timeout_secs", "must be greater than 0"));
        }

        if self.vector_db.timeout_secs == 0 {
            return Err(invalid("vector_db.timeout_secs", "must be greater than 0"));
        }

        if self.indexing.max_file_size == 0 {
            return Err(invalid("indexing.max_file_size", "must be greater than 0"));
        }

        self.indexing.source_language()?;

        if self.search.limit == 0 {
            return Err(invalid("search.limit", "must be greater than 0"));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Numeric values that fail to parse are rejected instead of ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OLLAMA_URL") {
            self.embedding.url = url;
        }

        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding.model_name = model;
        }

        if let Some(host) = lookup("QDRANT_HOST") {
            self.vector_db.host = host;
        }

        if let Some(port) = lookup("QDRANT_PORT") {
            self.vector_db.port = parse_numeric("QDRANT_PORT", &port)?;
        }

        if let Some(backend) = lookup("CODEBASE_INDEX_BACKEND") {
            self.vector_db.backend = backend;
        }

        if let Some(collection) = lookup("CODEBASE_INDEX_COLLECTION") {
            self.vector_db.collection_name = collection;
        }

        if let Some(dimension) = lookup("CODEBASE_INDEX_DIMENSION") {
            self.embedding.dimension = parse_numeric("CODEBASE_INDEX_DIMENSION", &dimension)?;
        }

        if let Some(timeout) = lookup("CODEBASE_INDEX_EMBED_TIMEOUT") {
            self.embedding.timeout_secs = parse_numeric("CODEBASE_INDEX_EMBED_TIMEOUT", &timeout)?;
        }

        if let Some(timeout) = lookup("CODEBASE_INDEX_STORE_TIMEOUT") {
            self.vector_db.timeout_secs = parse_numeric("CODEBASE_INDEX_STORE_TIMEOUT", &timeout)?;
        }

        if let Some(language) = lookup("CODEBASE_INDEX_LANGUAGE") {
            self.indexing.language = language;
        }

        Ok(())
    }

    /// Create a new Config from file/defaults plus environment overrides
    pub fn new(path: Option<&Path>) -> Result<Self, RagError> {
        let mut config = Self::load_or_default(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_numeric<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("'{}': {}", value, e),
        })
}

fn invalid(key: &str, reason: impl Into<String>) -> RagError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
    .into()
}
