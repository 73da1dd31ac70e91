//! YAML front matter extraction.
//!
//! A content file may open with a `---` delimited YAML block:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-01-15
//! ---
//!
//! First post.
//! ```
//!
//! Files without a block (or without a closing delimiter) have empty front
//! matter and the whole text as body.

use crate::types::FrontMatter;
use serde_json::Value;
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter must be a mapping, got {0}")]
    NotAMapping(&'static str),
}

/// Split `text` into front matter and Markdown body.
pub fn parse_front_matter(text: &str) -> Result<(FrontMatter, String), FrontMatterError> {
    let text = text.trim_start_matches('\n');
    if !text.starts_with(DELIMITER) {
        return Ok((FrontMatter::new(), text.to_string()));
    }
    let Some(close) = text[DELIMITER.len()..].find("\n---") else {
        return Ok((FrontMatter::new(), text.to_string()));
    };
    // Index of the closing `---` itself.
    let end = DELIMITER.len() + close + 1;
    let block = text[DELIMITER.len()..end].trim();

    let rest = &text[end + DELIMITER.len()..];
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);
    let body = rest.trim_start_matches('\n').to_string();

    if block.is_empty() {
        return Ok((FrontMatter::new(), body));
    }
    let value: Value = serde_yaml::from_str(block)?;
    match value {
        Value::Object(map) => Ok((map, body)),
        Value::Null => Ok((FrontMatter::new(), body)),
        Value::Array(_) => Err(FrontMatterError::NotAMapping("a sequence")),
        _ => Err(FrontMatterError::NotAMapping("a scalar")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_block_and_body() {
        let (fm, body) =
            parse_front_matter("---\ntitle: Hello\ndate: 2024-01-15\n---\n\nFirst post.\n")
                .unwrap();
        assert_eq!(fm["title"], "Hello");
        // Dates stay strings; the item date is parsed later.
        assert_eq!(fm["date"], "2024-01-15");
        assert_eq!(body, "First post.\n");
    }

    #[test]
    fn no_block_means_empty_front_matter() {
        let (fm, body) = parse_front_matter("# Just markdown\n").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "# Just markdown\n");
    }

    #[test]
    fn unclosed_block_is_body() {
        let (fm, body) = parse_front_matter("---\ntitle: x\nno closing").unwrap();
        assert!(fm.is_empty());
        assert!(body.starts_with("---"));
    }

    #[test]
    fn leading_newlines_ignored() {
        let (fm, _) = parse_front_matter("\n\n---\ntitle: A\n---\nbody").unwrap();
        assert_eq!(fm["title"], "A");
    }

    #[test]
    fn empty_block() {
        let (fm, body) = parse_front_matter("---\n---\nbody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn nested_values_kept() {
        let (fm, _) = parse_front_matter("---\ntags: [a, b]\nextra:\n  k: 1\n---\n").unwrap();
        assert_eq!(fm["tags"], serde_json::json!(["a", "b"]));
        assert_eq!(fm["extra"]["k"], 1);
    }

    #[test]
    fn malformed_yaml_is_error() {
        let result = parse_front_matter("---\ntitle: [unclosed\n---\nbody");
        assert!(matches!(result, Err(FrontMatterError::Yaml(_))));
    }

    #[test]
    fn sequence_is_error() {
        let result = parse_front_matter("---\n- a\n- b\n---\nbody");
        assert!(matches!(result, Err(FrontMatterError::NotAMapping(_))));
    }
}
