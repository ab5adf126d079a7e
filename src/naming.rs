//! Path and slug handling for the `NN_name` ordering convention.
//!
//! Documents are ordered on disk with a numeric prefix followed by an
//! underscore (`01_guide/02_intro.md`). The prefix controls sibling order
//! (discovery sorts by raw path) but never shows up in URLs: every segment
//! is stripped of its prefix when the raw slug is turned into a canonical
//! path.
//!
//! ```text
//! 01_guide/02_intro.md  →  /01_guide/02_intro/  →  /guide/intro/
//! about.md              →  /about/              →  /about/
//! ```

use regex::Regex;
use std::sync::LazyLock;

static ORDERING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[0-9]+_").expect("ordering prefix pattern is valid"));

/// Strip numeric ordering prefixes from every segment of a raw slug.
///
/// Repeatedly replaces the first `/<digits>_` with `/` until nothing matches,
/// so stacked prefixes (`/01_02_intro/`) collapse fully. The trailing slash
/// is preserved. Any string is accepted; there is no validation.
pub fn normalize(raw_path: &str) -> String {
    let mut path = raw_path.to_string();
    while let Some(m) = ORDERING_PREFIX.find(&path) {
        path.replace_range(m.range(), "/");
    }
    path
}

/// Raw slug for a document, from its path relative to the content root.
///
/// Drops the `.md` extension, uses `/` separators regardless of platform and
/// wraps the result in leading and trailing slashes.
pub fn raw_slug(relative_path: &str) -> String {
    let unified = relative_path.replace('\\', "/");
    let trimmed = unified.trim_start_matches("./").trim_matches('/');
    let stem = strip_markdown_extension(trimmed);
    format!("/{stem}/")
}

/// Canonical path for a document at `relative_path`.
///
/// Normalizes the raw slug and drops segments left empty by prefix
/// stripping, so `01_.md` maps to the site root `/` rather than `//`.
pub fn canonical_path(relative_path: &str) -> String {
    route_path(&segments(&normalize(&raw_slug(relative_path))))
}

/// Canonical path for a route made of path segments.
///
/// `["guide", "intro"]` → `/guide/intro/`; an empty route is the site root.
pub fn route_path<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    let joined = segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}/")
}

/// Split a canonical path into its segments (`/guide/intro/` → `["guide", "intro"]`).
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Fallback display title for a canonical path: last segment, underscores
/// and dashes turned into spaces.
pub fn display_title(path: &str) -> String {
    segments(path)
        .last()
        .map(|s| s.replace(['_', '-'], " "))
        .unwrap_or_default()
}

fn strip_markdown_extension(path: &str) -> &str {
    let len = path.len();
    if len >= 3 && path.is_char_boundary(len - 3) && path[len - 3..].eq_ignore_ascii_case(".md") {
        &path[..len - 3]
    } else {
        path
    }
}
