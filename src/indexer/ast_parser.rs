use super::language::SourceLanguage;
use crate::error::IndexingError;
use tree_sitter::{Parser, Query, QueryCursor, QueryMatches, StreamingIterator, Tree};

/// A function or method declaration found in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkCandidate {
    pub symbol_name: String,
    pub start_byte: usize,
    pub end_byte: usize,
    /// 1-based, inclusive
    pub start_line: usize,
    /// 1-based, inclusive
    pub end_line: usize,
    pub source_text: String,
}

/// Extracts function/method chunks with a declarative tree-sitter query
pub struct ChunkExtractor {
    parser: Parser,
    query: Query,
    cursor: QueryCursor,
    chunk_capture: u32,
    name_capture: u32,
    language: SourceLanguage,
}

impl ChunkExtractor {
    /// Create an extractor for the given language
    pub fn new(language: SourceLanguage) -> Result<Self, IndexingError> {
        let ts_language = language.tree_sitter_language();

        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| IndexingError::InvalidQuery {
                language: language.to_string(),
                reason: e.to_string(),
            })?;

        let query = Query::new(&ts_language, language.declaration_query()).map_err(|e| {
            IndexingError::InvalidQuery {
                language: language.to_string(),
                reason: e.to_string(),
            }
        })?;

        let capture = |name: &str| {
            query
                .capture_index_for_name(name)
                .ok_or_else(|| IndexingError::InvalidQuery {
                    language: language.to_string(),
                    reason: format!("query has no @{} capture", name),
                })
        };
        let chunk_capture = capture("chunk")?;
        let name_capture = capture("name")?;

        Ok(Self {
            parser,
            query,
            cursor: QueryCursor::new(),
            chunk_capture,
            name_capture,
            language,
        })
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    /// Parse source text into a concrete syntax tree
    pub fn parse(&mut self, source: &str) -> Option<Tree> {
        self.parser.parse(source, None)
    }

    /// Iterate over the declarations in `tree`, one query match per step.
    ///
    /// Calling this again with the same tree starts over from the first match.
    pub fn chunks<'a>(&'a mut self, tree: &'a Tree, source: &'a str) -> Chunks<'a> {
        let Self {
            query,
            cursor,
            chunk_capture,
            name_capture,
            ..
        } = self;

        Chunks {
            matches: cursor.matches(query, tree.root_node(), source.as_bytes()),
            source,
            chunk_capture: *chunk_capture,
            name_capture: *name_capture,
        }
    }

    /// Parse `source` and collect every chunk candidate
    pub fn extract(&mut self, source: &str) -> Option<Vec<ChunkCandidate>> {
        let tree = self.parse(source)?;
        let chunks = self.chunks(&tree, source).collect();
        Some(chunks)
    }
}

/// Lazy iterator over the chunk candidates of one parsed file
pub struct Chunks<'a> {
    matches: QueryMatches<'a, 'a, &'a [u8], &'a [u8]>,
    source: &'a str,
    chunk_capture: u32,
    name_capture: u32,
}

impl Iterator for Chunks<'_> {
    type Item = ChunkCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(query_match) = self.matches.next() {
            let mut chunk_node = None;
            let mut name_node = None;

            for capture in query_match.captures {
                if capture.index == self.chunk_capture {
                    chunk_node = Some(capture.node);
                } else if capture.index == self.name_capture {
                    name_node = Some(capture.node);
                }
            }

            let (Some(chunk), Some(name)) = (chunk_node, name_node) else {
                continue;
            };

            let (Some(source_text), Some(symbol_name)) = (
                self.source.get(chunk.byte_range()),
                self.source.get(name.byte_range()),
            ) else {
                continue;
            };

            return Some(ChunkCandidate {
                symbol_name: symbol_name.to_string(),
                start_byte: chunk.start_byte(),
                end_byte: chunk.end_byte(),
                // Tree-sitter uses 0-indexed rows
                start_line: chunk.start_position().row + 1,
                end_line: chunk.end_position().row + 1,
                source_text: source_text.to_string(),
            });
        }

        None
    }
}
