//! Static site generation.
//!
//! Stage 2 of the build pipeline. Reads the manifest written by the index
//! stage, composes one page per canonical path and writes the site.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # Home listing (unless a document owns `/`)
//! ├── BUILD_ID                   # Build identifier
//! ├── guide/
//! │   ├── index.html             # /guide/
//! │   ├── install/index.html     # /guide/install/
//! │   └── usage/index.html       # /guide/usage/
//! └── about/
//!     └── index.html             # /about/
//! ```
//!
//! Every canonical path ends with a slash and maps to a directory holding an
//! `index.html`, so any static file server resolves `/guide/install/`
//! without rewrites.
//!
//! ## Build Identifier
//!
//! `git-sha-<revision>` when the environment supplies a revision (CI sets
//! `GITHUB_SHA`), otherwise `dev@<short hash>` from the compiled-in git hash,
//! or `dev@unknown` outside a git checkout. The identifier is written to
//! `BUILD_ID` and to a `<meta name="build-id">` tag on every page.

use crate::compose::{self, ComposeError, RenderedPage, SiteContext};
use crate::index::{DocumentIndex, Manifest};
use crate::naming;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable carrying the source revision in CI.
pub const REVISION_ENV: &str = "GITHUB_SHA";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),
}

/// One file written by the generate stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    pub path: String,
    pub title: String,
    /// Output file relative to the output directory.
    pub file: PathBuf,
}

/// Summary of a generate run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub site_title: String,
    pub build_id: String,
    pub pages: Vec<GeneratedPage>,
    /// Whether a home listing was generated for `/`.
    pub home_generated: bool,
}

/// Build identifier from an optional source revision.
pub fn derive_build_id(revision: Option<&str>) -> String {
    match revision.map(str::trim).filter(|r| !r.is_empty()) {
        Some(rev) => format!("git-sha-{rev}"),
        None => {
            let hash = env!("GIT_HASH");
            if hash.is_empty() {
                "dev@unknown".to_string()
            } else {
                format!("dev@{hash}")
            }
        }
    }
}

/// Build identifier from [`REVISION_ENV`].
pub fn build_id_from_env() -> String {
    derive_build_id(std::env::var(REVISION_ENV).ok().as_deref())
}

/// Compose every page of the site without writing anything.
///
/// Pages come back in index order, followed by the home listing when no
/// document owns `/`. Any lookup failure aborts the whole render.
pub fn render_site(
    index: &DocumentIndex,
    site: &SiteContext,
) -> Result<Vec<RenderedPage>, ComposeError> {
    let mut pages = index
        .paths()
        .par_iter()
        .map(|path| compose::compose_page(index, path, site))
        .collect::<Result<Vec<_>, _>>()?;
    if !index.contains("/") {
        pages.push(compose::compose_home(index, site));
    }
    Ok(pages)
}

/// Output file for a canonical path, relative to the output directory.
///
/// `/guide/install/` → `guide/install/index.html`; `/` → `index.html`.
pub fn page_file(path: &str) -> PathBuf {
    let mut file: PathBuf = naming::segments(path).into_iter().collect();
    file.push("index.html");
    file
}

/// Generate the site from a manifest file.
pub fn generate(
    manifest_path: &Path,
    output_dir: &Path,
    build_id: &str,
) -> Result<GenerateReport, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    generate_from_manifest(&manifest, output_dir, build_id)
}

/// Generate the site from an in-memory manifest.
pub fn generate_from_manifest(
    manifest: &Manifest,
    output_dir: &Path,
    build_id: &str,
) -> Result<GenerateReport, GenerateError> {
    let site = SiteContext::new(manifest.config.clone(), build_id);
    let pages = render_site(&manifest.index, &site)?;

    fs::create_dir_all(output_dir)?;
    let generated = pages
        .par_iter()
        .map(|page| write_page(output_dir, page))
        .collect::<Result<Vec<_>, GenerateError>>()?;

    fs::write(output_dir.join("BUILD_ID"), build_id)?;
    tracing::info!(
        pages = generated.len(),
        output = %output_dir.display(),
        build_id,
        "Site generated"
    );

    Ok(GenerateReport {
        site_title: manifest.config.site_title.clone(),
        build_id: build_id.to_string(),
        home_generated: !manifest.index.contains("/"),
        pages: generated,
    })
}

fn write_page(output_dir: &Path, page: &RenderedPage) -> Result<GeneratedPage, GenerateError> {
    let file = page_file(&page.path);
    let target = output_dir.join(&file);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &page.html)?;
    tracing::debug!(path = %page.path, file = %target.display(), "Wrote page");
    Ok(GeneratedPage {
        path: page.path.clone(),
        title: page.title.clone(),
        file,
    })
}

// ============================================================================
// Tests
// ============================================================================
