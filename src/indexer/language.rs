//! Supported source languages and their declaration queries

use std::fmt;
use std::str::FromStr;
use tree_sitter::Language;

/// A language whose functions and methods can be extracted as chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Go,
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Java,
}

/// Go: top-level functions and methods with a receiver
const GO_QUERY: &str = r#"
(function_declaration
    name: (identifier) @name) @chunk
(method_declaration
    name: (field_identifier) @name) @chunk
"#;

/// Rust: free functions plus methods inside impl and trait blocks
const RUST_QUERY: &str = r#"
(function_item
    name: (identifier) @name) @chunk
"#;

const PYTHON_QUERY: &str = r#"
(function_definition
    name: (identifier) @name) @chunk
"#;

const JAVASCRIPT_QUERY: &str = r#"
(function_declaration
    name: (identifier) @name) @chunk
(generator_function_declaration
    name: (identifier) @name) @chunk
(method_definition
    name: (property_identifier) @name) @chunk
"#;

const TYPESCRIPT_QUERY: &str = r#"
(function_declaration
    name: (identifier) @name) @chunk
(method_definition
    name: (property_identifier) @name) @chunk
"#;

const JAVA_QUERY: &str = r#"
(method_declaration
    name: (identifier) @name) @chunk
(constructor_declaration
    name: (identifier) @name) @chunk
"#;

impl SourceLanguage {
    pub const ALL: [SourceLanguage; 6] = [
        SourceLanguage::Go,
        SourceLanguage::Rust,
        SourceLanguage::Python,
        SourceLanguage::JavaScript,
        SourceLanguage::TypeScript,
        SourceLanguage::Java,
    ];

    /// Display name, stored in the point payload and used as the code fence tag
    pub fn name(&self) -> &'static str {
        match self {
            SourceLanguage::Go => "go",
            SourceLanguage::Rust => "rust",
            SourceLanguage::Python => "python",
            SourceLanguage::JavaScript => "javascript",
            SourceLanguage::TypeScript => "typescript",
            SourceLanguage::Java => "java",
        }
    }

    /// File extensions (without the dot) that belong to this language
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SourceLanguage::Go => &["go"],
            SourceLanguage::Rust => &["rs"],
            SourceLanguage::Python => &["py"],
            SourceLanguage::JavaScript => &["js", "mjs", "cjs"],
            SourceLanguage::TypeScript => &["ts", "mts", "cts"],
            SourceLanguage::Java => &["java"],
        }
    }

    /// Case-sensitive, like the compilers themselves
    pub fn matches_extension(&self, extension: &str) -> bool {
        self.extensions().contains(&extension)
    }

    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SourceLanguage::Go => tree_sitter_go::LANGUAGE.into(),
            SourceLanguage::Rust => tree_sitter_rust::LANGUAGE.into(),
            SourceLanguage::Python => tree_sitter_python::LANGUAGE.into(),
            SourceLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Java => tree_sitter_java::LANGUAGE.into(),
        }
    }

    /// Query capturing each declaration as `@chunk` and its identifier as `@name`
    pub fn declaration_query(&self) -> &'static str {
        match self {
            SourceLanguage::Go => GO_QUERY,
            SourceLanguage::Rust => RUST_QUERY,
            SourceLanguage::Python => PYTHON_QUERY,
            SourceLanguage::JavaScript => JAVASCRIPT_QUERY,
            SourceLanguage::TypeScript => TYPESCRIPT_QUERY,
            SourceLanguage::Java => JAVA_QUERY,
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceLanguage {
    type Err = crate::error::IndexingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "go" | "golang" => Ok(SourceLanguage::Go),
            "rust" | "rs" => Ok(SourceLanguage::Rust),
            "python" | "py" => Ok(SourceLanguage::Python),
            "javascript" | "js" => Ok(SourceLanguage::JavaScript),
            "typescript" | "ts" => Ok(SourceLanguage::TypeScript),
            "java" => Ok(SourceLanguage::Java),
            other => Err(crate::error::IndexingError::UnsupportedLanguage(
                other.to_string(),
            )),
        }
    }
}
