//! Page composition.
//!
//! Turns one canonical path into a complete HTML page, reading only from the
//! immutable [`DocumentIndex`]. A page is laid out as:
//!
//! ```text
//! header.site-header          site title, links home
//! div.container-page
//! ├── main
//! │   ├── nav.breadcrumbs     home › ancestors present in the index › current
//! │   ├── h1                  frontmatter title
//! │   ├── hr
//! │   ├── div.page-body       rendered markdown
//! │   └── nav.doc-index       immediate children (only when `index: true`)
//! └── aside.page-outline      "On this page" links to the outline-level headings
//! ```
//!
//! Composition is pure: the same index, path and site context always give
//! the same markup, so pages can be rendered in parallel.

use crate::config::{self, SiteConfig};
use crate::index::{DocumentIndex, LookupError};
use crate::outline::Outline;
use crate::render::{ClassHighlighter, Highlighter, render_markdown};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use thiserror::Error;

const CSS_STATIC: &str = include_str!("../static/style.css");
const OUTLINE_JS: &str = include_str!("../static/outline.js");

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ComposeError {
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
}

/// Everything shared by all pages of one build.
pub struct SiteContext {
    pub config: SiteConfig,
    /// Full stylesheet: config-derived custom properties plus the static CSS.
    pub css: String,
    pub build_id: String,
    pub highlighter: Box<dyn Highlighter>,
}

impl SiteContext {
    pub fn new(config: SiteConfig, build_id: impl Into<String>) -> Self {
        let css = format!("{}\n\n{}", config::generate_css(&config), CSS_STATIC);
        Self {
            config,
            css,
            build_id: build_id.into(),
            highlighter: Box::new(ClassHighlighter),
        }
    }

    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }
}

/// One step of the breadcrumb trail. The current page has no link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub title: String,
    pub href: Option<String>,
}

/// Entry of a doc index listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLink {
    pub path: String,
    pub title: String,
}

/// A composed page, ready to write.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub path: String,
    pub title: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub outline: Outline,
    pub children: Vec<ChildLink>,
    pub html: String,
}

/// Compose the page for `path`.
///
/// The path must be a canonical path taken from the index; an unknown path
/// is an internal consistency error.
pub fn compose_page(
    index: &DocumentIndex,
    path: &str,
    site: &SiteContext,
) -> Result<RenderedPage, ComposeError> {
    let document = index.lookup(path)?;
    if document.title().is_none_or(|t| t.trim().is_empty()) {
        tracing::warn!(path, source = %document.source, "Document has no title; using its path");
    }
    let title = document.title_or_fallback(path);

    let trail = breadcrumbs(index, path, &title, &site.config.site_title);
    let body = render_markdown(&document.body, site.highlighter.as_ref());
    let outline_config = &site.config.outline;
    let outline = Outline::from_headings(&body.headings, outline_config.level);
    let children = if document.is_index() {
        doc_index(index, path)
    } else {
        Vec::new()
    };

    let content = html! {
        (site_header(&site.config.site_title))
        div.container-page {
            main {
                (render_breadcrumbs(&trail))
                h1 { (title) }
                hr;
                div.page-body {
                    (PreEscaped(&body.html))
                }
                @if document.is_index() {
                    (render_doc_index(&children))
                }
            }
            aside.page-outline {
                (outline.render(&outline_config.label, outline_config.level, outline_config.scroll_offset))
            }
        }
    };
    let page_title = format!("{} | {}", title, site.config.site_title);
    let html = base_document(&page_title, site, content).into_string();

    tracing::debug!(path, headings = body.headings.len(), "Composed page");
    Ok(RenderedPage {
        path: path.to_string(),
        title,
        breadcrumbs: trail,
        outline,
        children,
        html,
    })
}

/// Compose the site home page listing the top-level documents.
pub fn compose_home(index: &DocumentIndex, site: &SiteContext) -> RenderedPage {
    let site_title = &site.config.site_title;
    let children: Vec<ChildLink> = index
        .top_level()
        .into_iter()
        .map(|(path, doc)| ChildLink {
            path: path.to_string(),
            title: doc.title_or_fallback(path),
        })
        .collect();

    let content = html! {
        (site_header(site_title))
        div.container-page {
            main {
                h1 { (site_title) }
                hr;
                (render_doc_index(&children))
            }
        }
    };
    let html = base_document(site_title, site, content).into_string();

    RenderedPage {
        path: "/".to_string(),
        title: site_title.clone(),
        breadcrumbs: Vec::new(),
        outline: Outline::default(),
        children,
        html,
    }
}

/// Breadcrumb trail for `path`: the site home, then every ancestor prefix
/// that has a document, then the current page unlinked.
pub fn breadcrumbs(
    index: &DocumentIndex,
    path: &str,
    title: &str,
    site_title: &str,
) -> Vec<Breadcrumb> {
    let mut trail = vec![Breadcrumb {
        title: site_title.to_string(),
        href: Some("/".to_string()),
    }];
    trail.extend(index.ancestors(path).into_iter().map(|(prefix, doc)| {
        Breadcrumb {
            title: doc.title_or_fallback(&prefix),
            href: Some(prefix),
        }
    }));
    trail.push(Breadcrumb {
        title: title.to_string(),
        href: None,
    });
    trail
}

/// Immediate children of `path` in index order, with their titles.
pub fn doc_index(index: &DocumentIndex, path: &str) -> Vec<ChildLink> {
    index
        .children(path)
        .into_iter()
        .map(|(child, doc)| ChildLink {
            path: child.to_string(),
            title: doc.title_or_fallback(child),
        })
        .collect()
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(title: &str, site: &SiteContext, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="generator" content="simple-docs";
                meta name="build-id" content=(site.build_id);
                title { (title) }
                style { (PreEscaped(&site.css)) }
            }
            body {
                (content)
                script { (PreEscaped(OUTLINE_JS)) }
            }
        }
    }
}

fn site_header(site_title: &str) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (site_title) }
        }
    }
}

fn render_breadcrumbs(trail: &[Breadcrumb]) -> Markup {
    html! {
        nav.breadcrumbs aria-label="Breadcrumb" {
            ol {
                @for crumb in trail {
                    li {
                        @match &crumb.href {
                            Some(href) => {
                                a href=(href) { (crumb.title) }
                            }
                            None => {
                                span aria-current="page" { (crumb.title) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_doc_index(children: &[ChildLink]) -> Markup {
    html! {
        nav.doc-index {
            ul {
                @for child in children {
                    li {
                        a href=(child.path) { (child.title) }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
