//! Markdown body rendering.
//!
//! Bodies go through pulldown-cmark with three elements routed through
//! custom renderers before the stock HTML writer sees them:
//!
//! - **Fenced code blocks** are handed to a [`Highlighter`].
//! - **Inline code** is emitted verbatim (escaped) inside `<code>`.
//! - **Headings** get an `id` computed from their flattened text, so outline
//!   links built later resolve to them (see [`crate::outline`]).
//!
//! Raw HTML in the markdown is passed through untouched.

use crate::outline::{Heading, InlineNode};
use maud::html;
use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html,
};
use std::fmt::Write;

/// Renders code for the page. Highlighting proper happens downstream; the
/// default implementation emits highlight.js-compatible class markup.
pub trait Highlighter: Send + Sync {
    fn code_block(&self, language: Option<&str>, code: &str) -> String;

    fn inline_code(&self, code: &str) -> String {
        html! { code { (code) } }.into_string()
    }
}

/// `<pre><code class="{language}">` markup, content escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassHighlighter;

impl Highlighter for ClassHighlighter {
    fn code_block(&self, language: Option<&str>, code: &str) -> String {
        html! {
            pre {
                code class=[language] { (code) }
            }
        }
        .into_string()
    }
}

/// HTML of a rendered body plus every heading it contains, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub html: String,
    pub headings: Vec<Heading>,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render a markdown body.
pub fn render_markdown(markdown: &str, highlighter: &dyn Highlighter) -> RenderedBody {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut headings = Vec::new();
    let mut parser = Parser::new_ext(markdown, parser_options());

    while let Some(event) = parser.next() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                let inner: Vec<Event<'_>> = parser
                    .by_ref()
                    .take_while(|e| !matches!(e, Event::End(TagEnd::Heading(_))))
                    .collect();
                let heading = Heading::from_inline(heading_level(level), &inline_tree(&inner));
                let markup = heading_html(&heading, inner, highlighter);
                events.push(Event::Html(CowStr::from(markup)));
                headings.push(heading);
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match &kind {
                    CodeBlockKind::Fenced(info) => fence_language(info),
                    CodeBlockKind::Indented => None,
                };
                let mut code = String::new();
                for inner in parser.by_ref() {
                    match inner {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => code.push_str(&text),
                        _ => {}
                    }
                }
                let markup = highlighter.code_block(language.as_deref(), &code);
                events.push(Event::Html(CowStr::from(markup)));
            }
            Event::Code(code) => {
                events.push(Event::InlineHtml(CowStr::from(highlighter.inline_code(&code))));
            }
            other => events.push(other),
        }
    }

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut html, events.into_iter());
    RenderedBody { html, headings }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn fence_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

fn heading_html(heading: &Heading, inner: Vec<Event<'_>>, highlighter: &dyn Highlighter) -> String {
    let inner = inner.into_iter().map(|e| match e {
        Event::Code(code) => Event::InlineHtml(CowStr::from(highlighter.inline_code(&code))),
        other => other,
    });
    let mut content = String::new();
    md_html::push_html(&mut content, inner);

    let mut out = String::with_capacity(content.len() + heading.id.len() + 20);
    let level = heading.level;
    if heading.id.is_empty() {
        let _ = write!(out, "<h{level}>");
    } else {
        let _ = write!(out, r#"<h{level} id="{}">"#, heading.id);
    }
    out.push_str(content.trim());
    let _ = writeln!(out, "</h{level}>");
    out
}

/// Build the inline node tree of a heading from its events.
fn inline_tree(events: &[Event<'_>]) -> Vec<InlineNode> {
    let mut root = Vec::new();
    let mut stack: Vec<(&'static str, Vec<InlineNode>)> = Vec::new();

    for event in events {
        let node = match event {
            Event::Start(tag) => {
                stack.push((inline_tag_name(tag), Vec::new()));
                continue;
            }
            Event::End(_) => match stack.pop() {
                Some((tag, children)) => InlineNode::element(tag, children),
                None => continue,
            },
            Event::Text(text) => InlineNode::text(text.as_ref()),
            Event::Code(code) => InlineNode::element("code", vec![InlineNode::text(code.as_ref())]),
            Event::SoftBreak | Event::HardBreak => InlineNode::text("\n"),
            _ => continue,
        };
        match stack.last_mut() {
            Some((_, children)) => children.push(node),
            None => root.push(node),
        }
    }

    // Unbalanced events: close whatever is still open.
    while let Some((tag, children)) = stack.pop() {
        let node = InlineNode::element(tag, children);
        match stack.last_mut() {
            Some((_, parent)) => parent.push(node),
            None => root.push(node),
        }
    }
    root
}

fn inline_tag_name(tag: &Tag<'_>) -> &'static str {
    match tag {
        Tag::Emphasis => "em",
        Tag::Strong => "strong",
        Tag::Strikethrough => "del",
        Tag::Link { .. } => "a",
        Tag::Image { .. } => "img",
        Tag::Superscript => "sup",
        Tag::Subscript => "sub",
        _ => "span",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> RenderedBody {
        render_markdown(md, &ClassHighlighter)
    }

    #[test]
    fn heading_gets_slug_id() {
        let body = render("## Getting Started!\n");
        assert!(body.html.contains(r#"<h2 id="getting-started-">Getting Started!</h2>"#));
        assert_eq!(body.headings[0].id, "getting-started-");
        assert_eq!(body.headings[0].level, 2);
    }

    #[test]
    fn nested_inline_formatting_flattened_for_id() {
        let body = render("## Using **bold _and_ italic** text\n");
        assert_eq!(body.headings[0].text, "Using bold and italic text");
        assert_eq!(body.headings[0].id, "using-bold-and-italic-text");
        assert!(body.html.contains("<strong>bold <em>and</em> italic</strong>"));
    }

    #[test]
    fn inline_code_in_heading_contributes_text() {
        let body = render("## Run `cargo build`\n");
        assert_eq!(body.headings[0].id, "run-cargo-build");
        assert!(body.html.contains("<code>cargo build</code>"));
    }

    #[test]
    fn link_in_heading_uses_link_text() {
        let body = render("## See [the docs](https://example.com)\n");
        assert_eq!(body.headings[0].text, "See the docs");
        assert!(body.html.contains(r#"href="https://example.com""#));
    }

    #[test]
    fn headings_collected_in_document_order() {
        let body = render("# One\n\n## Two\n\ntext\n\n### Three\n\n## Four\n");
        let ids: Vec<&str> = body.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["one", "two", "three", "four"]);
        let levels: Vec<u8> = body.headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 2, 3, 2]);
    }

    #[test]
    fn same_text_same_id() {
        let body = render("## Notes\n\n## Notes\n");
        assert_eq!(body.headings[0].id, body.headings[1].id);
    }

    #[test]
    fn setext_heading_gets_id() {
        let body = render("Overview\n--------\n");
        assert_eq!(body.headings[0].level, 2);
        assert!(body.html.contains(r#"<h2 id="overview">"#));
    }

    #[test]
    fn fenced_code_goes_through_highlighter() {
        let body = render("```rust\nfn main() {}\n```\n");
        assert!(body.html.contains(r#"<pre><code class="rust">fn main() {}"#));
    }

    #[test]
    fn fence_info_extra_words_ignored() {
        let body = render("```rust ignore\nlet x = 1;\n```\n");
        assert!(body.html.contains(r#"class="rust""#));
    }

    #[test]
    fn code_without_language_has_no_class() {
        let body = render("```\nplain\n```\n");
        assert!(body.html.contains("<pre><code>plain"));
    }

    #[test]
    fn code_block_content_escaped() {
        let body = render("```html\n<div>&</div>\n```\n");
        assert!(body.html.contains("&lt;div&gt;&amp;&lt;/div&gt;"));
    }

    #[test]
    fn indented_code_block_rendered() {
        let body = render("    indented code\n");
        assert!(body.html.contains("<pre><code>indented code"));
    }

    #[test]
    fn inline_code_rendered_verbatim() {
        let body = render("Use `a < b` here.\n");
        assert!(body.html.contains("<code>a &lt; b</code>"));
    }

    #[test]
    fn raw_html_passes_through() {
        let body = render("<div class=\"note\">Hi</div>\n");
        assert!(body.html.contains(r#"<div class="note">Hi</div>"#));
    }

    #[test]
    fn tables_enabled() {
        let body = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(body.html.contains("<table>"));
    }

    #[test]
    fn custom_highlighter_used() {
        struct Upper;
        impl Highlighter for Upper {
            fn code_block(&self, _language: Option<&str>, code: &str) -> String {
                format!("<pre>{}</pre>", code.to_uppercase())
            }
        }
        let body = render_markdown("```\nabc\n```\n", &Upper);
        assert!(body.html.contains("<pre>ABC\n</pre>"));
    }

    #[test]
    fn empty_heading_has_no_id() {
        let body = render("##\n");
        assert_eq!(body.headings.len(), 1);
        assert!(body.html.contains("<h2></h2>"));
    }
}
