/// End-to-end tests for indexing and search with an in-memory store
use anyhow::Result;
use async_trait::async_trait;
use codebase_index::config::Config;
use codebase_index::embedding::EmbeddingProvider;
use codebase_index::error::EmbeddingError;
use codebase_index::indexer::chunk_identity;
use codebase_index::types::NO_RESULTS;
use codebase_index::vector_db::{InMemoryVectorStore, VectorStore};
use codebase_index::RagClient;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const DIM: usize = 64;

/// Bag-of-tokens embedder: texts sharing identifiers end up close together
struct TokenHashEmbedder;

fn bucket(token: &str) -> usize {
    // FNV-1a
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in token.to_lowercase().bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % DIM as u64) as usize
}

#[async_trait]
impl EmbeddingProvider for TokenHashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; DIM];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            vector[bucket(token)] += 1.0;
        }
        // Keep empty inputs off the zero vector
        vector[0] += 0.01;
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn model_name(&self) -> &str {
        "token-hash"
    }
}

async fn create_client() -> Result<(RagClient, Arc<InMemoryVectorStore>)> {
    let mut config = Config::default();
    config.embedding.dimension = DIM;
    config.vector_db.backend = "memory".to_string();

    let store = Arc::new(InMemoryVectorStore::new());
    let client = RagClient::with_components(config, Arc::new(TokenHashEmbedder), store.clone())
        .await?;
    Ok((client, store))
}

const SCENARIO_SOURCE: &str = r#"package main

import "fmt"

func Foo() string {
	return "foo"
}

type Server struct{}

func (s *Server) Bar(port int) {
	fmt.Println("listening on", port)
}
"#;

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn root_arg(dir: &TempDir) -> String {
    dir.path().display().to_string()
}

#[tokio::test]
async fn test_function_and_method_are_indexed() -> Result<()> {
    let (client, store) = create_client().await?;
    let project = TempDir::new()?;
    write(project.path(), "main.go", SCENARIO_SOURCE);

    let stats = client.index_project(&root_arg(&project)).await?;

    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.chunks_indexed, 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.files_skipped, 0);
    assert_eq!(
        stats.to_report(),
        "Indexing Complete.\nFiles Scanned: 1\nFunctions Indexed: 2\nFailed/Skipped: 0/0"
    );
    assert_eq!(store.count("codebase_index").await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_search_with_limit_one_returns_single_block() -> Result<()> {
    let (client, _store) = create_client().await?;
    let project = TempDir::new()?;
    write(project.path(), "main.go", SCENARIO_SOURCE);
    client.index_project(&root_arg(&project)).await?;

    let text = client
        .codebase_search("Server Bar port listening", 1, &CancellationToken::new())
        .await?;

    assert_eq!(text.matches("File: ").count(), 1);
    assert_eq!(text.matches("\n---\n").count(), 1);
    assert!(text.contains("main.go (Line: 11)"));
    assert!(text.contains("```go\nfunc (s *Server) Bar(port int) {"));

    let score_line = text.lines().nth(1).unwrap();
    let score = score_line.strip_prefix("Score: ").unwrap();
    assert_eq!(score.split('.').nth(1).map(str::len), Some(3));

    Ok(())
}

#[tokio::test]
async fn test_reindexing_is_idempotent() -> Result<()> {
    let (client, store) = create_client().await?;
    let project = TempDir::new()?;
    write(project.path(), "main.go", SCENARIO_SOURCE);

    let first = client.index_project(&root_arg(&project)).await?;
    let second = client.index_project(&root_arg(&project)).await?;

    assert_eq!(first.chunks_indexed, 2);
    assert_eq!(second.chunks_indexed, 2);
    assert_eq!(store.count("codebase_index").await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_edited_body_overwrites_point() -> Result<()> {
    let (client, store) = create_client().await?;
    let project = TempDir::new()?;
    write(project.path(), "main.go", SCENARIO_SOURCE);
    client.index_project(&root_arg(&project)).await?;

    write(
        project.path(),
        "main.go",
        &SCENARIO_SOURCE.replace("return \"foo\"", "return \"changed\""),
    );
    client.index_project(&root_arg(&project)).await?;
    assert_eq!(store.count("codebase_index").await?, 2);

    let text = client
        .codebase_search("Foo string changed", 2, &CancellationToken::new())
        .await?;
    assert!(text.contains("return \"changed\""));
    assert!(!text.contains("return \"foo\""));

    Ok(())
}

#[tokio::test]
async fn test_renamed_symbol_leaves_stale_point() -> Result<()> {
    let (client, store) = create_client().await?;
    let project = TempDir::new()?;
    write(project.path(), "main.go", SCENARIO_SOURCE);
    client.index_project(&root_arg(&project)).await?;

    write(
        project.path(),
        "main.go",
        &SCENARIO_SOURCE.replace("func Foo()", "func Renamed()"),
    );
    client.index_project(&root_arg(&project)).await?;

    assert_eq!(store.count("codebase_index").await?, 3);
    Ok(())
}

#[tokio::test]
async fn test_point_ids_are_path_and_symbol_derived() -> Result<()> {
    let (client, store) = create_client().await?;
    let project = TempDir::new()?;
    write(project.path(), "main.go", SCENARIO_SOURCE);
    client.index_project(&root_arg(&project)).await?;

    let file_path = fs::canonicalize(project.path())?
        .join("main.go")
        .display()
        .to_string();
    let query = TokenHashEmbedder.embed("Foo").await?;
    let hits = store.query("codebase_index", query, 10).await?;

    let mut ids: Vec<String> = hits.iter().map(|h| h.id.clone()).collect();
    ids.sort();
    let mut expected = vec![
        chunk_identity(&file_path, "Foo").to_string(),
        chunk_identity(&file_path, "Bar").to_string(),
    ];
    expected.sort();
    assert_eq!(ids, expected);

    Ok(())
}

#[tokio::test]
async fn test_excluded_directories_at_any_depth() -> Result<()> {
    let (client, _store) = create_client().await?;
    let project = TempDir::new()?;
    write(project.path(), "main.go", "package main\n\nfunc Main() {}\n");
    write(project.path(), ".git/hooks/hook.go", "package hooks\n\nfunc Hook() {}\n");
    write(project.path(), "vendor/lib/lib.go", "package lib\n\nfunc Lib() {}\n");
    write(
        project.path(),
        "web/node_modules/pkg/pkg.go",
        "package pkg\n\nfunc Pkg() {}\n",
    );
    write(
        project.path(),
        "internal/deep/.cache/gen.go",
        "package gen\n\nfunc Gen() {}\n",
    );
    write(project.path(), "internal/deep/ok.go", "package deep\n\nfunc Ok() {}\n");

    let stats = client.index_project(&root_arg(&project)).await?;

    assert_eq!(stats.files_scanned, 2);
    assert_eq!(stats.chunks_indexed, 2);
    assert_eq!(stats.files_skipped, 0);

    Ok(())
}

#[tokio::test]
async fn test_other_extensions_are_skipped_unread() -> Result<()> {
    let (client, _store) = create_client().await?;
    let project = TempDir::new()?;
    write(project.path(), "main.go", "package main\n\nfunc Main() {}\n");
    write(project.path(), "README.md", "func NotGo() {}");
    write(project.path(), "script.py", "def not_go():\n    pass\n");

    let stats = client.index_project(&root_arg(&project)).await?;

    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.files_skipped, 2);
    assert_eq!(stats.chunks_indexed, 1);
    assert!(
        stats
            .to_report()
            .ends_with("Failed/Skipped: 0/2")
    );

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_file_does_not_abort_run() -> Result<()> {
    let (client, store) = create_client().await?;
    let project = TempDir::new()?;
    write(project.path(), "a.go", "package a\n\nfunc A() {}\n");
    write(project.path(), "c.go", "package c\n\nfunc C() {}\n");
    std::os::unix::fs::symlink(
        project.path().join("does-not-exist.go"),
        project.path().join("b.go"),
    )?;

    let stats = client.index_project(&root_arg(&project)).await?;

    assert_eq!(stats.files_scanned, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.chunks_indexed, 2);
    assert_eq!(store.count("codebase_index").await?, 2);
    assert!(stats.errors[0].contains("b.go"));

    Ok(())
}

#[tokio::test]
async fn test_search_on_empty_store() -> Result<()> {
    let (client, _store) = create_client().await?;
    let text = client
        .codebase_search("anything at all", 20, &CancellationToken::new())
        .await?;
    assert_eq!(text, NO_RESULTS);
    Ok(())
}

#[tokio::test]
async fn test_empty_directory_reports_zero() -> Result<()> {
    let (client, _store) = create_client().await?;
    let project = TempDir::new()?;

    let stats = client.index_project(&root_arg(&project)).await?;
    assert_eq!(
        stats.to_report(),
        "Indexing Complete.\nFiles Scanned: 0\nFunctions Indexed: 0\nFailed/Skipped: 0/0"
    );
    Ok(())
}

#[tokio::test]
async fn test_other_language_from_config() -> Result<()> {
    let mut config = Config::default();
    config.embedding.dimension = DIM;
    config.vector_db.backend = "memory".to_string();
    config.indexing.language = "python".to_string();

    let client = RagClient::with_components(
        config,
        Arc::new(TokenHashEmbedder),
        Arc::new(InMemoryVectorStore::new()),
    )
    .await?;

    let project = TempDir::new()?;
    write(
        project.path(),
        "app.py",
        "def handler(event):\n    return event\n\nclass A:\n    def run(self):\n        pass\n",
    );
    write(project.path(), "main.go", "package main\n\nfunc Main() {}\n");

    let stats = client.index_project(&root_arg(&project)).await?;
    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.chunks_indexed, 2);
    assert_eq!(stats.files_skipped, 1);

    let text = client
        .codebase_search("handler event", 1, &CancellationToken::new())
        .await?;
    assert!(text.contains("```python\ndef handler(event):"));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_init_functions_collapse_to_one_point() -> Result<()> {
    let (client, store) = create_client().await?;
    let project = TempDir::new()?;
    write(
        project.path(),
        "setup.go",
        "package main\n\nfunc init() { setupA() }\n\nfunc init() { setupB() }\n",
    );

    let stats = client.index_project(&root_arg(&project)).await?;

    assert_eq!(stats.chunks_indexed, 2);
    assert_eq!(store.count("codebase_index").await?, 1);
    Ok(())
}
