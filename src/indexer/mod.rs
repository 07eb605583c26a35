//! Code indexing: directory walking, language detection and chunk extraction
//!
//! The walker yields source files of one language, the extractor turns each
//! file into function/method chunks, and every chunk gets a stable identity
//! derived from where it lives so that re-indexing overwrites instead of
//! duplicating.

mod ast_parser;
mod file_walker;
mod language;

pub use ast_parser::{ChunkCandidate, ChunkExtractor, Chunks};
pub use file_walker::{FileWalker, SkipReason, SourceFile, WalkIter, WalkOutcome};
pub use language::SourceLanguage;

use crate::error::IndexingError;
use uuid::Uuid;

/// Represents a code chunk ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChunk {
    /// Deterministic point id, see [`chunk_identity`]
    pub identity: Uuid,
    /// Absolute path of the file the chunk came from
    pub file_path: String,
    /// Function or method name
    pub symbol_name: String,
    /// 1-based, inclusive
    pub start_line: usize,
    /// 1-based, inclusive
    pub end_line: usize,
    /// The declaration text exactly as it appears in the file
    pub source_text: String,
}

impl CodeChunk {
    pub fn new(file_path: impl Into<String>, candidate: ChunkCandidate) -> Self {
        let file_path = file_path.into();
        Self {
            identity: chunk_identity(&file_path, &candidate.symbol_name),
            file_path,
            symbol_name: candidate.symbol_name,
            start_line: candidate.start_line,
            end_line: candidate.end_line,
            source_text: candidate.source_text,
        }
    }
}

/// Identity of a chunk: UUID v5 (URL namespace) over `"{file_path}:{symbol_name}"`.
///
/// Text, span and embedding do not participate, so an edited body keeps its
/// id. Two methods with the same name in one file share an id and the later
/// one wins, as do several Go `init()` functions in one file. The run still
/// counts each of them as indexed, so the report can exceed the point count.
pub fn chunk_identity(file_path: &str, symbol_name: &str) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("{}:{}", file_path, symbol_name).as_bytes(),
    )
}

/// Parse one source file and turn every declaration into a [`CodeChunk`]
pub fn chunk_source_file(
    extractor: &mut ChunkExtractor,
    file: &SourceFile,
) -> Result<Vec<CodeChunk>, IndexingError> {
    let file_path = file.path.display().to_string();

    let tree = extractor
        .parse(&file.content)
        .ok_or_else(|| IndexingError::ParseFailed(file_path.clone()))?;

    let chunks = extractor
        .chunks(&tree, &file.content)
        .map(|candidate| CodeChunk::new(file_path.clone(), candidate))
        .collect();

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_identity_is_deterministic() {
        let a = chunk_identity("/src/main.go", "Foo");
        let b = chunk_identity("/src/main.go", "Foo");
        assert_eq!(a, b);
        assert_eq!(a.get_version_num(), 5);
    }

    #[test]
    fn test_identity_matches_url_namespace_v5() {
        let expected = Uuid::new_v5(&Uuid::NAMESPACE_URL, b"/src/main.go:Foo");
        assert_eq!(chunk_identity("/src/main.go", "Foo"), expected);
    }

    #[test]
    fn test_identity_differs_by_path_and_name() {
        let base = chunk_identity("/src/main.go", "Foo");
        assert_ne!(base, chunk_identity("/src/other.go", "Foo"));
        assert_ne!(base, chunk_identity("/src/main.go", "Bar"));
    }

    #[test]
    fn test_chunk_source_file() {
        let file = SourceFile {
            path: PathBuf::from("/project/main.go"),
            content: "package main\n\nfunc Foo() {}\n\nfunc (t *T) Bar() {}\n".to_string(),
        };

        let mut extractor = ChunkExtractor::new(SourceLanguage::Go).unwrap();
        let chunks = chunk_source_file(&mut extractor, &file).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].file_path, "/project/main.go");
        assert_eq!(chunks[0].symbol_name, "Foo");
        assert_eq!(chunks[0].start_line, 3);
        assert_eq!(chunks[0].source_text, "func Foo() {}");
        assert_eq!(
            chunks[0].identity,
            chunk_identity("/project/main.go", "Foo")
        );
        assert_eq!(chunks[1].symbol_name, "Bar");
    }

    #[test]
    fn test_edited_body_keeps_identity() {
        let mut extractor = ChunkExtractor::new(SourceLanguage::Go).unwrap();
        let before = SourceFile {
            path: PathBuf::from("/p/a.go"),
            content: "package a\n\nfunc Foo() { return }\n".to_string(),
        };
        let after = SourceFile {
            path: PathBuf::from("/p/a.go"),
            content: "package a\n\n\n// moved down\nfunc Foo() {\n\tprintln(1)\n}\n".to_string(),
        };

        let first = chunk_source_file(&mut extractor, &before).unwrap();
        let second = chunk_source_file(&mut extractor, &after).unwrap();
        assert_eq!(first[0].identity, second[0].identity);
        assert_ne!(first[0].source_text, second[0].source_text);
        assert_ne!(first[0].start_line, second[0].start_line);
    }

    #[test]
    fn test_same_name_methods_share_identity() {
        let file = SourceFile {
            path: PathBuf::from("/p/types.go"),
            content: "package p\n\nfunc (a A) String() string { return \"a\" }\n\nfunc (b B) String() string { return \"b\" }\n".to_string(),
        };
        let mut extractor = ChunkExtractor::new(SourceLanguage::Go).unwrap();
        let chunks = chunk_source_file(&mut extractor, &file).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].identity, chunks[1].identity);
    }

    #[test]
    fn test_multiple_init_functions_share_identity() {
        let file = SourceFile {
            path: PathBuf::from("/p/setup.go"),
            content: "package p\n\nfunc init() { a() }\n\nfunc init() { b() }\n".to_string(),
        };
        let mut extractor = ChunkExtractor::new(SourceLanguage::Go).unwrap();
        let chunks = chunk_source_file(&mut extractor, &file).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].symbol_name, "init");
        assert_eq!(chunks[0].identity, chunks[1].identity);
        assert_eq!(chunks[0].identity, chunk_identity("/p/setup.go", "init"));
    }
}
