//! Document discovery and index construction.
//!
//! Stage 1 of the build pipeline. Walks a [`DocumentSource`], parses every
//! markdown file into frontmatter + body and assembles the [`DocumentIndex`]
//! that every page render reads from.
//!
//! ## Content Layout
//!
//! ```text
//! content/
//! ├── config.toml                 # Site configuration (optional)
//! ├── 01_guide.md                 # /guide/        (index: true lists children)
//! ├── 01_guide/
//! │   ├── 01_install.md           # /guide/install/
//! │   └── 02_usage.md             # /guide/usage/
//! ├── 02_reference.md             # /reference/
//! └── about.md                    # /about/
//! ```
//!
//! Ordering prefixes (`NN_`) decide the order of [`DocumentIndex::paths`]
//! and are stripped from canonical paths (see [`crate::naming`]).
//!
//! ## Guarantees
//!
//! - The index is materialized fully before any render starts and is never
//!   mutated afterwards.
//! - One unparseable document fails the whole build. There is no partial
//!   index.
//! - Two raw paths that normalize to the same canonical path are not an
//!   error: the later document wins the mapping, the path keeps its first
//!   position, and a warning is logged.

use crate::config::{self, SiteConfig};
use crate::frontmatter::{self, Frontmatter, FrontmatterError};
use crate::naming;
use crate::source::{DocumentSource, FsSource, SourceDocument, SourceError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Failed to parse {path}: {source}")]
    Frontmatter {
        path: String,
        #[source]
        source: FrontmatterError,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    #[error("No document for canonical path {0}")]
    NotFound(String),
}

/// A parsed markdown document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Source path relative to the content root (`01_guide/02_intro.md`).
    pub source: String,
    pub frontmatter: Frontmatter,
    /// Raw markdown after the frontmatter block.
    pub body: String,
}

impl Document {
    /// Title from frontmatter, if declared.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter.title.as_deref()
    }

    /// Title from frontmatter, or a title derived from `path` as fallback.
    pub fn title_or_fallback(&self, path: &str) -> String {
        match self.title() {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => naming::display_title(path),
        }
    }

    pub fn is_index(&self) -> bool {
        self.frontmatter.index
    }
}

/// Canonical path → document, plus the ordered list of paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentIndex {
    paths: Vec<String>,
    documents: BTreeMap<String, Document>,
}

impl DocumentIndex {
    /// Assemble an index from `(canonical path, document)` pairs in order.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Document)>) -> Self {
        let mut index = Self::default();
        for (path, document) in entries {
            if let Some(previous) = index.documents.get(&path) {
                tracing::warn!(
                    path = %path,
                    kept = %document.source,
                    replaced = %previous.source,
                    "Two documents share a canonical path; the later one wins"
                );
            } else {
                index.paths.push(path.clone());
            }
            index.documents.insert(path, document);
        }
        index
    }

    /// Canonical paths in discovery order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.documents.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&Document> {
        self.documents.get(path)
    }

    /// Strict lookup, for callers that require the path to exist.
    pub fn lookup(&self, path: &str) -> Result<&Document, LookupError> {
        self.get(path)
            .ok_or_else(|| LookupError::NotFound(path.to_string()))
    }

    /// Documents in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.paths
            .iter()
            .filter_map(|p| self.documents.get(p).map(|d| (p.as_str(), d)))
    }

    /// Ancestors of `path` present in the index, outermost first.
    ///
    /// `/a/b/c/` checks `/a/` then `/a/b/`; missing ancestors are skipped.
    pub fn ancestors(&self, path: &str) -> Vec<(String, &Document)> {
        let segments = naming::segments(path);
        let mut found = Vec::new();
        for depth in 1..segments.len() {
            let prefix = naming::route_path(&segments[..depth]);
            if let Some(doc) = self.documents.get(&prefix) {
                found.push((prefix, doc));
            }
        }
        found
    }

    /// Immediate children of `path` in index order.
    ///
    /// A child extends `path` by exactly one segment; deeper descendants are
    /// not listed.
    pub fn children(&self, path: &str) -> Vec<(&str, &Document)> {
        self.iter()
            .filter(|(candidate, _)| is_immediate_child(path, candidate))
            .collect()
    }

    /// Documents with a single path segment (`/guide/`, `/about/`).
    pub fn top_level(&self) -> Vec<(&str, &Document)> {
        self.iter()
            .filter(|(p, _)| naming::segments(p).len() == 1)
            .collect()
    }
}

fn is_immediate_child(parent: &str, candidate: &str) -> bool {
    match candidate.strip_prefix(parent) {
        Some(rest) if !rest.is_empty() => {
            let rest = rest.strip_suffix('/').unwrap_or(rest);
            !rest.is_empty() && !rest.contains('/')
        }
        _ => false,
    }
}

/// Build the index from any document source.
pub fn build_index(source: &impl DocumentSource) -> Result<DocumentIndex, IndexError> {
    let discovered = source.discover()?;
    let parsed = discovered
        .par_iter()
        .map(parse_document)
        .collect::<Result<Vec<_>, IndexError>>()?;
    let index = DocumentIndex::from_entries(parsed);
    tracing::debug!(documents = index.len(), "Document index built");
    Ok(index)
}

fn parse_document(doc: &SourceDocument) -> Result<(String, Document), IndexError> {
    let parsed = frontmatter::parse(&doc.content).map_err(|source| IndexError::Frontmatter {
        path: doc.path.clone(),
        source,
    })?;
    let canonical = naming::canonical_path(&doc.path);
    Ok((
        canonical,
        Document {
            source: doc.path.clone(),
            frontmatter: parsed.frontmatter,
            body: parsed.body,
        },
    ))
}

/// Manifest output from the index stage.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub index: DocumentIndex,
    pub config: SiteConfig,
}

/// Index a content directory and load its site config.
pub fn scan(root: &Path) -> Result<Manifest, IndexError> {
    let config = config::load_config(root)?;
    scan_with_config(root, config)
}

/// Index a content directory with an already loaded config.
///
/// Lets callers size the worker pool from `config` before the parallel
/// parse starts.
pub fn scan_with_config(root: &Path, config: SiteConfig) -> Result<Manifest, IndexError> {
    let index = build_index(&FsSource::new(root))?;
    Ok(Manifest { index, config })
}
