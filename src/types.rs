use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Returned by a search that matched nothing
pub const NO_RESULTS: &str = "No relevant code found.";

/// Upper bound on the error messages kept in one [`IndexingStats`]
pub const MAX_RECORDED_ERRORS: usize = 50;

/// Request to index a codebase
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IndexProjectRequest {
    /// Path to the root of the codebase to index
    pub path: String,
}

impl IndexProjectRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("path cannot be empty".to_string());
        }

        let path = Path::new(&self.path);
        if !path.exists() {
            return Err(format!("path does not exist: {}", self.path));
        }
        if !path.is_dir() {
            return Err(format!("path is not a directory: {}", self.path));
        }

        Ok(())
    }
}

/// Request to search the indexed codebase
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CodebaseSearchRequest {
    /// Natural-language description of the code to find
    pub query: String,
    /// Maximum number of results to return (default: 20)
    #[serde(default)]
    pub limit: Option<f64>,
}

impl CodebaseSearchRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("query cannot be empty".to_string());
        }
        self.effective_limit(1).map(|_| ())
    }

    /// Requested limit truncated to an integer, or `default` when absent
    pub fn effective_limit(&self, default: usize) -> Result<usize, String> {
        match self.limit {
            None => Ok(default),
            Some(limit) if !limit.is_finite() || limit < 1.0 => {
                Err(format!("limit must be at least 1, got {}", limit))
            }
            Some(limit) => Ok(limit.trunc() as usize),
        }
    }
}

/// Counters for one indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingStats {
    /// Source files that were read and handed to the parser
    pub files_scanned: usize,
    /// Chunks embedded and upserted
    pub chunks_indexed: usize,
    /// Files passed over without being read
    pub files_skipped: usize,
    /// Unreadable files, unparsable files, failed embeds and failed upserts
    pub failed: usize,
    /// First [`MAX_RECORDED_ERRORS`] failure messages
    #[serde(default)]
    pub errors: Vec<String>,
    pub duration_ms: u64,
    /// The run stopped early; counts cover only the work done before that
    #[serde(default)]
    pub cancelled: bool,
}

impl IndexingStats {
    /// Count one failure and keep its message while there is room
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failed += 1;
        if self.errors.len() < MAX_RECORDED_ERRORS {
            self.errors.push(message.into());
        }
    }

    /// Render the report returned to tool callers
    pub fn to_report(&self) -> String {
        let headline = if self.cancelled {
            "Indexing Cancelled."
        } else {
            "Indexing Complete."
        };
        format!(
            "{}\nFiles Scanned: {}\nFunctions Indexed: {}\nFailed/Skipped: {}/{}",
            headline, self.files_scanned, self.chunks_indexed, self.failed, self.files_skipped
        )
    }
}

/// A single search result
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchResult {
    /// Absolute path of the file containing the match
    pub file_path: String,
    /// Function or method name
    pub symbol_name: String,
    /// Starting line number in the file
    pub start_line: usize,
    /// Ending line number in the file
    pub end_line: usize,
    /// The declaration text
    pub source_text: String,
    /// Language tag used for the code fence
    pub language: String,
    /// Similarity score reported by the store
    pub score: f32,
}

impl SearchResult {
    fn write_block(&self, out: &mut String) {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "File: {} (Line: {})\nScore: {:.3}\n```{}\n{}\n```\n\n---\n",
            self.file_path, self.start_line, self.score, self.language, self.source_text
        );
    }
}

/// Render results in store order, or [`NO_RESULTS`] when there are none
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = String::new();
    for result in results {
        result.write_block(&mut out);
    }
    out
}
