//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each document is
//! shown by its positional index and title, nested under its parent path,
//! with the canonical path and the source file as indented context lines.
//!
//! # Output Format
//!
//! ## Index
//!
//! ```text
//! Documents
//! 001 Guide (index)
//!     Path: /guide/
//!     Source: 01_guide.md
//!     001 Installation
//!         Path: /guide/install/
//!         Source: 01_guide/01_install.md
//! 002 About
//!     Path: /about/
//!     Source: about.md
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Generate
//!
//! ```text
//! 001 Guide → guide/index.html
//!     001 Installation → guide/install/index.html
//! 002 About → about/index.html
//! Home → index.html
//!
//! Generated 3 pages (build dev@1a2b3c4)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::compose::RenderedPage;
use crate::generate::GenerateReport;
use crate::index::Manifest;
use crate::naming;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional marker.
///
/// ```text
/// 001 Guide (index)
/// 002 About
/// ```
fn entity_header(index: usize, title: &str, marker: Option<&str>) -> String {
    match marker {
        Some(m) => format!("{} {} ({})", format_index(index), title, m),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Depth and 1-based sibling position for each canonical path, in order.
///
/// Depth is the segment count minus one. Positions restart whenever a
/// shallower path is seen, so siblings under different parents count
/// separately.
fn tree_positions<'a>(paths: impl IntoIterator<Item = &'a str>) -> Vec<(usize, usize)> {
    let mut counters: Vec<usize> = Vec::new();
    paths
        .into_iter()
        .map(|path| {
            let depth = naming::segments(path).len().saturating_sub(1);
            counters.resize(depth + 1, 0);
            counters[depth] += 1;
            (depth, counters[depth])
        })
        .collect()
}

// ============================================================================
// Index stage
// ============================================================================

/// Format index stage output.
pub fn format_index_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = vec!["Documents".to_string()];

    let index = &manifest.index;
    let positions = tree_positions(index.paths().iter().map(String::as_str));
    for ((path, doc), (depth, position)) in index.iter().zip(positions) {
        let base_indent = indent(depth);
        let marker = doc.is_index().then_some("index");
        let header = entity_header(position, &doc.title_or_fallback(path), marker);
        lines.push(format!("{}{}", base_indent, header));
        lines.push(format!("{}    Path: {}", base_indent, path));
        lines.push(format!("{}    Source: {}", base_indent, doc.source));
    }
    if index.is_empty() {
        lines.push("    (no documents)".to_string());
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push("    config.toml".to_string());
    } else {
        lines.push("    (defaults)".to_string());
    }

    lines
}

/// Print index stage output to stdout.
pub fn print_index_output(manifest: &Manifest, source_root: &Path) {
    for line in format_index_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate stage
// ============================================================================

/// Format generate stage output.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();

    let documents: Vec<_> = report.pages.iter().filter(|p| p.path != "/").collect();
    let positions = tree_positions(documents.iter().map(|p| p.path.as_str()));
    for (page, (depth, position)) in documents.iter().zip(positions) {
        lines.push(format!(
            "{}{} → {}",
            indent(depth),
            entity_header(position, &page.title, None),
            page.file.display()
        ));
    }
    if report.home_generated {
        lines.push("Home → index.html".to_string());
    }

    lines.push(String::new());
    let count = report.pages.len();
    lines.push(format!(
        "Generated {} page{} (build {})",
        count,
        if count == 1 { "" } else { "s" },
        report.build_id
    ));
    lines
}

/// Print generate stage output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the result of rendering every page in memory.
pub fn format_check_output(pages: &[RenderedPage]) -> Vec<String> {
    let outline_entries: usize = pages.iter().map(|p| p.outline.entries().len()).sum();
    let without_outline = pages.iter().filter(|p| p.outline.is_empty()).count();
    vec![format!(
        "Rendered {} pages, {} outline entries ({} pages without outline)",
        pages.len(),
        outline_entries,
        without_outline
    )]
}

/// Print check output to stdout.
pub fn print_check_output(pages: &[RenderedPage]) {
    for line in format_check_output(pages) {
        println!("{}", line);
    }
}

// ============================================================================
