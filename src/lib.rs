//! # Simple Docs
//!
//! A static documentation site generator. A directory of markdown files
//! becomes a browsable HTML site with breadcrumbs, an "On this page" outline
//! built from each page's headings, and child listings for index pages.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Index     content/  →  manifest.json    (markdown files → document index)
//! 2. Generate  manifest  →  dist/            (one HTML page per canonical path)
//! ```
//!
//! The manifest is human-readable JSON holding the whole document index and
//! the resolved site config. Once built, the index is never mutated; every
//! page render reads from it, so pages are composed in parallel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | `NN_name` ordering prefixes, raw slugs, canonical paths |
//! | [`source`] | Document discovery: filesystem walk or in-memory set |
//! | [`frontmatter`] | `---` YAML header parsing (`title`, `index`, extra keys) |
//! | [`index`] | Stage 1: builds the document index and the manifest |
//! | [`render`] | Markdown to HTML with custom code, inline code and heading renderers |
//! | [`outline`] | Heading slugs, the "On this page" outline, active-section logic |
//! | [`compose`] | One page: breadcrumbs, title, body, outline, doc index |
//! | [`generate`] | Stage 2: writes every page plus the home listing and `BUILD_ID` |
//! | [`config`] | `config.toml` loading, validation, worker pool sizing, and CSS generation |
//! | [`output`] | CLI output formatting for each stage |
//!
//! # Design Decisions
//!
//! ## Canonical Paths Without Ordering Prefixes
//!
//! Files are ordered on disk with a numeric prefix (`01_guide/02_usage.md`).
//! The prefix decides sibling order but is stripped from every segment of the
//! URL, so `01_guide/02_usage.md` is served at `/guide/usage/`. Reordering
//! pages never breaks links.
//!
//! ## Trailing-Slash Routing
//!
//! Every page is written as `<path>/index.html`. Any static file server
//! resolves `/guide/usage/` without rewrite rules.
//!
//! ## Static Outline, Scripted Highlighting
//!
//! The outline list is rendered into the page at build time. The only
//! script, `static/outline.js`, marks the entry of the last heading scrolled
//! past the fixed header. Pages are fully readable without JavaScript.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Templates are Rust expressions, interpolation is escaped by
//! default, and there is no template directory to ship.

pub mod compose;
pub mod config;
pub mod frontmatter;
pub mod generate;
pub mod index;
pub mod naming;
pub mod outline;
pub mod output;
pub mod render;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;
