//! Shared test utilities for the simple-docs test suite.
//!
//! Provides fixture setup plus lookup helpers that panic with a readable
//! message instead of a bare `unwrap` on `None`.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let install = find_document(&manifest, "/guide/install/");
//! assert_eq!(install.title(), Some("Installation"));
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::index::{Document, Manifest};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Manifest lookups: panic with a clear message on miss
// =========================================================================

/// Find a document by canonical path. Panics if not found.
pub fn find_document<'a>(manifest: &'a Manifest, path: &str) -> &'a Document {
    manifest.index.get(path).unwrap_or_else(|| {
        panic!(
            "document '{path}' not found. Available: {:?}",
            manifest.index.paths()
        )
    })
}

/// Titles of all documents in index order, with path fallbacks.
pub fn document_titles(manifest: &Manifest) -> Vec<String> {
    manifest
        .index
        .iter()
        .map(|(path, doc)| doc.title_or_fallback(path))
        .collect()
}
