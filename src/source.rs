//! Document discovery.
//!
//! The index builder does not care where markdown comes from. A
//! [`DocumentSource`] hands it `(path, content)` pairs; [`FsSource`] walks a
//! content directory, [`MemorySource`] serves documents held in memory
//! (embedded assets, tests).

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Content root not found: {0}")]
    MissingRoot(PathBuf),
}

/// A markdown file as found by a source, before any parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path relative to the content root, `/`-separated (`01_guide/02_intro.md`).
    pub path: String,
    /// Raw file contents, frontmatter included.
    pub content: String,
}

impl SourceDocument {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Something that can enumerate markdown documents.
pub trait DocumentSource {
    fn discover(&self) -> Result<Vec<SourceDocument>, SourceError>;
}

/// Filesystem-backed source: every `.md` file below `root`.
///
/// Hidden files and directories are skipped. Results are sorted by relative
/// path so numeric ordering prefixes decide sibling order.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn markdown_files(&self) -> Result<Vec<PathBuf>, SourceError> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && is_markdown(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

impl DocumentSource for FsSource {
    fn discover(&self) -> Result<Vec<SourceDocument>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::MissingRoot(self.root.clone()));
        }

        let files = self.markdown_files()?;
        let mut documents = files
            .par_iter()
            .map(|file| {
                let content = fs::read_to_string(file).map_err(|source| SourceError::Io {
                    path: file.clone(),
                    source,
                })?;
                Ok(SourceDocument {
                    path: relative_path(&self.root, file),
                    content,
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        documents.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(
            root = %self.root.display(),
            count = documents.len(),
            "Discovered markdown documents"
        );
        Ok(documents)
    }
}

/// In-memory source; documents are returned sorted by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: Vec<SourceDocument>,
}

impl MemorySource {
    pub fn new(documents: Vec<SourceDocument>) -> Self {
        Self { documents }
    }

    #[must_use]
    pub fn with(mut self, path: &str, content: &str) -> Self {
        self.documents.push(SourceDocument::new(path, content));
        self
    }
}

impl DocumentSource for MemorySource {
    fn discover(&self) -> Result<Vec<SourceDocument>, SourceError> {
        let mut documents = self.documents.clone();
        documents.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(documents)
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn relative_path(root: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(root).unwrap_or(file);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
