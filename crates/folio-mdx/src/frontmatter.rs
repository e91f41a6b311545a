//! YAML frontmatter parsing.

use serde::{Deserialize, Serialize};

/// Parsed frontmatter from an MDX document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Document title (required)
    pub title: String,

    /// Description for the page's meta tag
    #[serde(default)]
    pub description: Option<String>,

    /// Order in navigation (lower = first)
    #[serde(default)]
    pub order: Option<i32>,

    /// Whether to show in navigation
    #[serde(default = "default_true")]
    pub nav: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            order: None,
            nav: true,
        }
    }
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Frontmatter opened with --- but never closed")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}

/// Split a document into its frontmatter block and body.
///
/// A block is fenced by `---` lines at the very start of the document; the
/// fences must stand alone on their lines. Documents without an opening fence
/// pass through untouched with no frontmatter.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let text = source.trim_start();
    let Some(block) = text.strip_prefix("---\n") else {
        return Ok((None, source));
    };

    let mut consumed = 0;
    for line in block.split_inclusive('\n') {
        let end = consumed + line.len();
        if line.trim_end() == "---" {
            let frontmatter = serde_yaml::from_str(&block[..consumed])
                .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;
            return Ok((Some(frontmatter), block[end..].trim_start()));
        }
        consumed = end;
    }

    Err(FrontmatterError::Unclosed)
}
