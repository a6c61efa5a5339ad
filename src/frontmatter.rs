//! Front-matter codec for content files.
//!
//! A content file may start with a YAML header wrapped in `---` lines:
//!
//! ```markdown
//! ---
//! title: Hello World
//! published: true
//! ---
//! Body text here.
//! ```
//!
//! Files without a leading delimiter are treated as all-body with a
//! default header.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Three-dash line wrapping the metadata block
pub const DELIMITER: &str = "---";

fn default_layout() -> String {
    "post.html".into()
}

/// Parsed front matter of a content file.
///
/// Unknown keys are rejected so typos in a header surface as errors
/// instead of silently dropped metadata. Timestamps stay strings; the
/// ISO-8601 format written by the scaffold sorts chronologically as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Template the post is rendered through.
    #[serde(default = "default_layout")]
    pub layout: String,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub published_at: Option<String>,

    /// A post is public only when this is exactly `true`.
    #[serde(default)]
    pub published: Option<bool>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            tags: None,
            layout: default_layout(),
            created_at: None,
            published_at: None,
            published: None,
        }
    }
}

/// Front-matter codec failures. Callers wrap these with the source path.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("front-matter block is not terminated")]
    UnterminatedBlock,

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Split a document into its header and body.
///
/// Text that does not begin with the delimiter is returned unchanged as
/// body under a default header. Otherwise the text is split on the first
/// two delimiter occurrences; everything after the second is body, with
/// leading and trailing blank lines trimmed.
pub fn parse(text: &str) -> Result<(Header, String), HeaderError> {
    if !text.starts_with(DELIMITER) {
        return Ok((Header::default(), text.to_owned()));
    }

    let mut parts = text.splitn(3, DELIMITER);
    parts.next();
    let (Some(block), Some(body)) = (parts.next(), parts.next()) else {
        return Err(HeaderError::UnterminatedBlock);
    };

    let header: Header = serde_yaml::from_str(block)?;
    Ok((header, body.trim_matches('\n').to_owned()))
}

/// Re-emit a document from its header and body.
///
/// All header fields are written, nulls included, so a parse/serialize
/// cycle is lossless. A `None` header omits the metadata block entirely.
pub fn serialize(header: Option<&Header>, body: &str) -> Result<String, HeaderError> {
    let Some(header) = header else {
        return Ok(format!("{body}\n"));
    };

    let block = serde_yaml::to_string(header)?;
    Ok(format!("{DELIMITER}\n{block}{DELIMITER}\n{body}\n"))
}
