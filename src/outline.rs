//! Heading anchors and the "On this page" outline.
//!
//! Three pieces share one slug function so that a heading's `id` and the
//! outline link pointing at it always agree:
//!
//! 1. **Anchor assignment** (render time): the heading's inline content is
//!    flattened to plain text ([`flatten`]) and slugified ([`slugify`]).
//! 2. **Outline construction**: every heading of the outline level, in
//!    document order, becomes an entry linking to `#<id>` ([`Outline::from_headings`]).
//! 3. **Active-section tracking**: on every scroll or load event the active
//!    entry is recomputed from heading positions ([`compute_active_heading`]).
//!    The browser side lives in `static/outline.js` and mirrors this logic;
//!    [`Outline::update`] is the Rust-side adapter.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// Separator that replaces runs of non-word characters in slugs.
pub const SLUG_SEPARATOR: char = '-';

/// Default distance from the viewport top, in pixels, past which a heading
/// counts as scrolled past. Accounts for the fixed site header.
pub const DEFAULT_SCROLL_OFFSET: u32 = 70;

/// Lowercase `text` and collapse each run of non-word characters into one
/// [`SLUG_SEPARATOR`]. Word characters are ASCII letters, digits and `_`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_separator = false;
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
            in_separator = false;
        } else if !in_separator {
            slug.push(SLUG_SEPARATOR);
            in_separator = true;
        }
    }
    slug
}

/// Rendered inline content of a heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    Text(String),
    Element {
        tag: String,
        children: Vec<InlineNode>,
    },
}

impl InlineNode {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn element(tag: impl Into<String>, children: Vec<InlineNode>) -> Self {
        Self::Element {
            tag: tag.into(),
            children,
        }
    }
}

/// Plain text of a node: text leaves as-is, elements fold their children
/// left to right.
pub fn flatten(node: &InlineNode) -> String {
    fold_text(String::new(), node)
}

/// Plain text of a sequence of sibling nodes.
pub fn flatten_all(nodes: &[InlineNode]) -> String {
    nodes.iter().fold(String::new(), fold_text)
}

fn fold_text(mut acc: String, node: &InlineNode) -> String {
    match node {
        InlineNode::Text(s) => {
            acc.push_str(s);
            acc
        }
        InlineNode::Element { children, .. } => children.iter().fold(acc, fold_text),
    }
}

/// A heading as it appears in a rendered body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    /// Flattened plain text.
    pub text: String,
    /// Anchor id; empty when the text has no content to slugify.
    pub id: String,
}

impl Heading {
    pub fn from_inline(level: u8, content: &[InlineNode]) -> Self {
        let text = flatten_all(content);
        let id = slugify(&text);
        Self { level, text, id }
    }
}

/// Where a heading currently sits relative to the viewport top.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingPosition {
    pub id: Option<String>,
    pub top: f64,
}

impl HeadingPosition {
    pub fn new(id: impl Into<String>, top: f64) -> Self {
        let id = id.into();
        Self {
            id: (!id.is_empty()).then_some(id),
            top,
        }
    }
}

/// The most recently scrolled-past heading.
///
/// Walks headings in document order, skipping those without an id. Every
/// heading whose top is at or above `threshold` replaces the candidate; the
/// first one still below it ends the scan. Returns `None` when no heading
/// has crossed yet.
pub fn compute_active_heading(positions: &[HeadingPosition], threshold: f64) -> Option<&str> {
    let mut last_crossed = None;
    for position in positions {
        let Some(id) = position.id.as_deref() else {
            continue;
        };
        if position.top <= threshold {
            last_crossed = Some(id);
        } else {
            break;
        }
    }
    last_crossed
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub id: String,
    pub label: String,
    pub active: bool,
}

impl OutlineEntry {
    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }
}

/// The on-page navigation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    entries: Vec<OutlineEntry>,
}

impl Outline {
    /// Entries for every heading at `level`, in document order.
    pub fn from_headings(headings: &[Heading], level: u8) -> Self {
        let entries = headings
            .iter()
            .filter(|h| h.level == level)
            .map(|h| OutlineEntry {
                id: h.id.clone(),
                label: h.text.clone(),
                active: false,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active(&self) -> Option<&OutlineEntry> {
        self.entries.iter().find(|e| e.active)
    }

    /// Recompute the active entry from current heading positions.
    ///
    /// Clears every mark first, so repeated calls never accumulate state.
    pub fn update(&mut self, positions: &[HeadingPosition], threshold: f64) -> Option<&str> {
        for entry in &mut self.entries {
            entry.active = false;
        }
        let active_id = compute_active_heading(positions, threshold)?;
        let entry = self.entries.iter_mut().find(|e| e.id == active_id)?;
        entry.active = true;
        Some(entry.id.as_str())
    }

    /// Static markup for the outline list.
    ///
    /// `offset` and `level` are carried as data attributes for the scroll
    /// tracker in `static/outline.js`.
    pub fn render(&self, label: &str, level: u8, offset: u32) -> Markup {
        html! {
            div.headers-overview {
                p { (label) }
                ol.headers-overview-elements data-offset=(offset) data-level={ "h" (level) } {
                    @for entry in &self.entries {
                        li {
                            a.headers-overview-element.headers-overview-element-active[entry.active] href=(entry.href()) {
                                (entry.label)
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(items: &[(&str, f64)]) -> Vec<HeadingPosition> {
        items
            .iter()
            .map(|(id, top)| HeadingPosition::new(*id, *top))
            .collect()
    }

    // =========================================================================
    // slugify
    // =========================================================================

    #[test]
    fn slugify_lowercases_and_separates() {
        assert_eq!(slugify("Getting Started!"), "getting-started-");
    }

    #[test]
    fn slugify_is_deterministic() {
        assert_eq!(slugify("Getting Started!"), slugify("Getting Started!"));
    }

    #[test]
    fn slugify_collapses_runs() {
        assert_eq!(slugify("What's   new?!"), "what-s-new-");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn slugify_keeps_word_characters() {
        assert_eq!(slugify("snake_case_Name2"), "snake_case_name2");
    }

    #[test]
    fn slugify_non_ascii_becomes_separator() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
    }

    #[test]
    fn slugify_empty() {
        assert_eq!(slugify(""), "");
    }

    // =========================================================================
    // flatten
    // =========================================================================

    #[test]
    fn flatten_text_leaf() {
        assert_eq!(flatten(&InlineNode::text("plain")), "plain");
    }

    #[test]
    fn flatten_nested_elements() {
        let node = InlineNode::element(
            "span",
            vec![
                InlineNode::text("Using "),
                InlineNode::element(
                    "strong",
                    vec![
                        InlineNode::text("very "),
                        InlineNode::element("em", vec![InlineNode::text("nested")]),
                    ],
                ),
                InlineNode::text(" text"),
            ],
        );
        assert_eq!(flatten(&node), "Using very nested text");
    }

    #[test]
    fn flatten_empty_element() {
        assert_eq!(flatten(&InlineNode::element("em", vec![])), "");
    }

    #[test]
    fn heading_id_matches_outline_href() {
        let content = vec![
            InlineNode::text("Install "),
            InlineNode::element("code", vec![InlineNode::text("cargo")]),
        ];
        let heading = Heading::from_inline(2, &content);
        let outline = Outline::from_headings(std::slice::from_ref(&heading), 2);
        assert_eq!(outline.entries()[0].href(), format!("#{}", heading.id));
        assert_eq!(heading.id, "install-cargo");
    }

    // =========================================================================
    // compute_active_heading
    // =========================================================================

    #[test]
    fn last_crossed_heading_is_active() {
        let pos = positions(&[("a", -300.0), ("b", 40.0), ("c", 500.0)]);
        assert_eq!(compute_active_heading(&pos, 70.0), Some("b"));
    }

    #[test]
    fn nothing_active_before_first_heading_crosses() {
        let pos = positions(&[("a", 120.0), ("b", 400.0), ("c", 900.0)]);
        assert_eq!(compute_active_heading(&pos, 70.0), None);
    }

    #[test]
    fn heading_exactly_at_threshold_counts() {
        let pos = positions(&[("a", 70.0), ("b", 71.0)]);
        assert_eq!(compute_active_heading(&pos, 70.0), Some("a"));
    }

    #[test]
    fn all_crossed_selects_last() {
        let pos = positions(&[("a", -900.0), ("b", -500.0), ("c", 10.0)]);
        assert_eq!(compute_active_heading(&pos, 70.0), Some("c"));
    }

    #[test]
    fn headings_without_id_are_skipped() {
        let pos = vec![
            HeadingPosition::new("a", -100.0),
            HeadingPosition { id: None, top: 0.0 },
            HeadingPosition::new("", 20.0),
            HeadingPosition::new("c", 600.0),
        ];
        assert_eq!(compute_active_heading(&pos, 70.0), Some("a"));
    }

    #[test]
    fn empty_positions_have_no_active() {
        assert_eq!(compute_active_heading(&[], 70.0), None);
    }

    // =========================================================================
    // Outline
    // =========================================================================

    fn headings() -> Vec<Heading> {
        vec![
            Heading { level: 1, text: "Title".into(), id: "title".into() },
            Heading { level: 2, text: "A".into(), id: "a".into() },
            Heading { level: 3, text: "A.1".into(), id: "a-1".into() },
            Heading { level: 2, text: "B".into(), id: "b".into() },
            Heading { level: 2, text: "C".into(), id: "c".into() },
        ]
    }

    #[test]
    fn outline_collects_only_outline_level() {
        let outline = Outline::from_headings(&headings(), 2);
        let labels: Vec<&str> = outline.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[test]
    fn outline_without_matches_is_empty() {
        let outline = Outline::from_headings(&headings(), 6);
        assert!(outline.is_empty());
        let html = outline.render("On this page", 6, 70).into_string();
        assert!(html.contains("headers-overview-elements"));
        assert!(!html.contains("<li>"));
    }

    #[test]
    fn update_marks_single_active_entry() {
        let mut outline = Outline::from_headings(&headings(), 2);
        let pos = positions(&[("a", -50.0), ("b", 30.0), ("c", 400.0)]);

        assert_eq!(outline.update(&pos, 70.0), Some("b"));
        assert_eq!(outline.active().map(|e| e.id.as_str()), Some("b"));
        assert_eq!(outline.entries().iter().filter(|e| e.active).count(), 1);
    }

    #[test]
    fn update_clears_previous_mark() {
        let mut outline = Outline::from_headings(&headings(), 2);
        outline.update(&positions(&[("a", 0.0), ("b", 30.0), ("c", 400.0)]), 70.0);
        outline.update(&positions(&[("a", 200.0), ("b", 500.0), ("c", 900.0)]), 70.0);
        assert!(outline.active().is_none());
    }

    #[test]
    fn update_is_idempotent() {
        let mut outline = Outline::from_headings(&headings(), 2);
        let pos = positions(&[("a", -50.0), ("b", 30.0), ("c", 400.0)]);
        outline.update(&pos, 70.0);
        let first = outline.clone();
        outline.update(&pos, 70.0);
        assert_eq!(outline, first);
    }

    #[test]
    fn render_marks_active_class() {
        let mut outline = Outline::from_headings(&headings(), 2);
        outline.update(&positions(&[("a", 0.0)]), 70.0);
        let html = outline.render("On this page", 2, 70).into_string();
        assert!(html.contains(r##"href="#a""##));
        assert!(html.contains("headers-overview-element-active"));
        assert!(html.contains(r#"data-offset="70""#));
        assert!(html.contains(r#"data-level="h2""#));
    }
}
