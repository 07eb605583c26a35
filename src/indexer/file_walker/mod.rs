//! File walking functionality for directory traversal

use super::language::SourceLanguage;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// Directory names that are never descended into
const EXCLUDED_DIRS: &[&str] = &["node_modules", "vendor"];

/// A readable source file produced by the walker
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

/// Why a file was passed over without being read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Extension does not belong to the target language
    Extension,
    /// Larger than the configured limit (size in bytes)
    TooLarge(u64),
}

/// One step of a walk
#[derive(Debug)]
pub enum WalkOutcome {
    Source(SourceFile),
    Skipped { path: PathBuf, reason: SkipReason },
    Failed { path: PathBuf, reason: String },
}

pub struct FileWalker {
    pub(crate) root: PathBuf,
    pub(crate) language: SourceLanguage,
    pub(crate) max_file_size: u64,
}

impl FileWalker {
    pub fn new(root: impl AsRef<Path>, language: SourceLanguage) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            language,
            max_file_size: u64::MAX,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: usize) -> Self {
        self.max_file_size = max_file_size as u64;
        self
    }

    /// Start a fresh, lazy walk from the root.
    ///
    /// Entries are visited in file-name order so repeated walks over an
    /// unchanged tree yield the same sequence.
    pub fn iter(&self) -> WalkIter {
        let inner = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_walkable as fn(&DirEntry) -> bool);

        WalkIter {
            inner,
            language: self.language,
            max_file_size: self.max_file_size,
        }
    }
}

impl<'a> IntoIterator for &'a FileWalker {
    type Item = WalkOutcome;
    type IntoIter = WalkIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over the outcomes of one walk
pub struct WalkIter {
    inner: FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>,
    language: SourceLanguage,
    max_file_size: u64,
}

impl Iterator for WalkIter {
    type Item = WalkOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    tracing::warn!("Failed to read directory entry {:?}: {}", path, err);
                    return Some(WalkOutcome::Failed {
                        path,
                        reason: err.to_string(),
                    });
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            return Some(self.visit_file(entry.into_path()));
        }
    }
}

impl WalkIter {
    fn visit_file(&self, path: PathBuf) -> WalkOutcome {
        let matches_language = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.language.matches_extension(e));

        if !matches_language {
            return WalkOutcome::Skipped {
                path,
                reason: SkipReason::Extension,
            };
        }

        match fs::metadata(&path) {
            Ok(metadata) if metadata.len() > self.max_file_size => {
                tracing::debug!("Skipping large file: {:?}", path);
                return WalkOutcome::Skipped {
                    reason: SkipReason::TooLarge(metadata.len()),
                    path,
                };
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to stat {:?}: {}", path, e);
                return WalkOutcome::Failed {
                    path,
                    reason: e.to_string(),
                };
            }
        }

        match fs::read(&path) {
            Ok(bytes) => WalkOutcome::Source(SourceFile {
                content: String::from_utf8_lossy(&bytes).into_owned(),
                path,
            }),
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", path, e);
                WalkOutcome::Failed {
                    path,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Hidden and dependency directories below the root are pruned
fn is_walkable(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    !is_excluded_dir_name(&entry.file_name().to_string_lossy())
}

pub(crate) fn is_excluded_dir_name(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
}
