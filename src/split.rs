//! Metadata block / body separation.
//!
//! A source document may open with a YAML metadata block. The block ends at
//! the first blank line; everything from that blank line on is the body:
//!
//! ```text
//! title: First Post          ┐
//! date: 2024-03-01           ┘ metadata
//!                            ┐
//! # Hello                    │ body (leading blank line kept)
//!                            │
//! Some *markdown*.           ┘
//! ```
//!
//! The body keeps its leading line terminators; both decoders skip leading
//! whitespace.
//!
//! A document has no metadata block, and the whole text is its body, when it
//! has no blank line at all or when the text before the first blank line holds
//! no YAML content (only comments and blank lines). The second case keeps a
//! Markdown document that opens with `# Heading` intact.

use crate::config::{self, ConfigError, Mapping};

/// A document split into its metadata mapping and its body text.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<'a> {
    pub metadata: Mapping,
    pub body: &'a str,
}

/// Split raw document text at its first blank line.
///
/// Fails when the metadata block is not valid YAML or is not a mapping.
pub fn split_content(content: &str) -> Result<Document<'_>, ConfigError> {
    let Some(boundary) = find_boundary(content) else {
        return Ok(Document {
            metadata: Mapping::new(),
            body: content,
        });
    };

    let head = &content[..boundary];
    if config::is_blank_document(head) {
        return Ok(Document {
            metadata: Mapping::new(),
            body: content,
        });
    }

    let metadata = config::parse_yaml_mapping(head)?;
    Ok(Document {
        metadata,
        body: &content[boundary..],
    })
}

/// Byte offset of the first pair of consecutive line terminators.
fn find_boundary(content: &str) -> Option<usize> {
    let unix = content.find("\n\n");
    let windows = content.find("\r\n\r\n");
    match (unix, windows) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
