//! YAML frontmatter parsing.
//!
//! A document may open with a metadata block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Installation
//! index: true
//! ---
//! Body markdown starts here.
//! ```
//!
//! Files without an opening delimiter have empty frontmatter and the whole
//! file as body. An opening delimiter without a closing one, or YAML that
//! does not parse, is an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("frontmatter block is not closed with `---`")]
    Unterminated,
    #[error("invalid YAML in frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Structured metadata from a document's header block.
///
/// `title` and `index` drive rendering; every other key is preserved in
/// `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// When set, the page lists its immediate child documents.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub index: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Frontmatter {
    pub fn from_yaml(yaml: &str) -> Result<Self, FrontmatterError> {
        let trimmed = yaml.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(trimmed)?)
    }
}

/// A markdown file split into its metadata and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub frontmatter: Frontmatter,
    pub body: String,
}

/// Parse a raw markdown file into frontmatter and body.
pub fn parse(raw: &str) -> Result<ParsedDocument, FrontmatterError> {
    let (yaml, body) = split(raw)?;
    let frontmatter = match yaml {
        Some(yaml) => Frontmatter::from_yaml(yaml)?,
        None => Frontmatter::default(),
    };
    Ok(ParsedDocument {
        frontmatter,
        body: body.to_string(),
    })
}

/// Split off the metadata block. Returns `(None, raw)` when there is none.
fn split(raw: &str) -> Result<(Option<&str>, &str), FrontmatterError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok((None, text));
    };
    if first.trim_end() != DELIMITER {
        return Ok((None, text));
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return Ok((Some(yaml), body));
        }
        offset += line.len();
    }
    Err(FrontmatterError::Unterminated)
}
