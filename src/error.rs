/// Centralized error types for codebase-index using thiserror
///
/// Trait seams (embedding, vector store) return their own domain error so the
/// pipelines can decide per item whether to count, skip or propagate.
use thiserror::Error;

/// Main error type for the indexing and search pipelines
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector database error: {0}")]
    VectorDb(#[from] VectorDbError),

    #[error("Indexing error: {0}")]
    Indexing(#[from] IndexingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors returned by an embedding provider
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Failed to call embedding service: {0}")]
    RequestFailed(String),

    #[error("Embedding service returned status: {0}")]
    BadStatus(u16),

    #[error("Failed to decode embedding response: {0}")]
    InvalidResponse(String),

    #[error("Embedding service returned an empty embeddings array")]
    EmptyResponse,

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Embedding request was cancelled")]
    Cancelled,
}

/// Errors returned by a vector store
#[derive(Error, Debug)]
pub enum VectorDbError {
    #[error("Failed to connect to vector database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to check collection '{collection}': {reason}")]
    CollectionCheckFailed { collection: String, reason: String },

    #[error("Failed to create collection '{collection}': {reason}")]
    CollectionCreationFailed { collection: String, reason: String },

    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("Failed to upsert points: {0}")]
    UpsertFailed(String),

    #[error("Failed to query points: {0}")]
    QueryFailed(String),

    #[error("Failed to get statistics: {0}")]
    StatisticsFailed(String),

    #[error("Vector dimension mismatch: collection expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector database call timed out after {0} seconds")]
    Timeout(u64),

    #[error("Vector database call was cancelled")]
    Cancelled,
}

/// Errors related to walking and parsing a project
#[derive(Error, Debug)]
pub enum IndexingError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Failed to build query for {language}: {reason}")]
    InvalidQuery { language: String, reason: String },

    #[error("Failed to parse '{0}'")]
    ParseFailed(String),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to tool and client input validation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    #[error("{field} must be {constraint}, got {actual}")]
    ConstraintViolation {
        field: String,
        constraint: String,
        actual: String,
    },

    #[error("Empty {0}")]
    Empty(String),
}

impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Other(format!("{:#}", err))
    }
}

impl RagError {
    /// Check if this is a caller error (bad arguments) vs a system error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RagError::Validation(_) | RagError::Config(ConfigError::InvalidValue { .. })
        )
    }

    /// Check if the operation stopped because its cancellation token fired
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            RagError::Embedding(EmbeddingError::Cancelled)
                | RagError::VectorDb(VectorDbError::Cancelled)
        )
    }
}

/// Errors that a deadline/cancellation guard can synthesize
pub(crate) trait BoundedCallError {
    fn timed_out(secs: u64) -> Self;
    fn cancelled() -> Self;
}

impl BoundedCallError for EmbeddingError {
    fn timed_out(secs: u64) -> Self {
        EmbeddingError::Timeout(secs)
    }

    fn cancelled() -> Self {
        EmbeddingError::Cancelled
    }
}

impl BoundedCallError for VectorDbError {
    fn timed_out(secs: u64) -> Self {
        VectorDbError::Timeout(secs)
    }

    fn cancelled() -> Self {
        VectorDbError::Cancelled
    }
}
