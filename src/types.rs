//! Shared content types produced by discovery and consumed by the pipeline.
//!
//! A [`ContentItem`] is created fresh on every build and never mutated
//! afterwards. Only digests derived from it survive into the cache manifest.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Front matter as parsed from the YAML block: string keys, loosely-typed values.
pub type FrontMatter = serde_json::Map<String, Value>;

/// The two content collections. Kind-specific behavior (defaults, context key,
/// date sorting) hangs off this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Page,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Post, ContentKind::Page];

    /// Key under which the acting item is exposed to its template.
    pub fn context_key(self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Page => "page",
        }
    }

    /// Collection name in config and in the `collections` template value.
    pub fn collection_name(self) -> &'static str {
        match self {
            ContentKind::Post => "posts",
            ContentKind::Page => "pages",
        }
    }

    pub fn default_dir(self) -> &'static str {
        self.collection_name()
    }

    pub fn default_url_prefix(self) -> &'static str {
        match self {
            ContentKind::Post => "blog",
            ContentKind::Page => "",
        }
    }

    pub fn default_template(self) -> &'static str {
        match self {
            ContentKind::Post => "post.html",
            ContentKind::Page => "page.html",
        }
    }

    /// Whether filenames may carry a `YYYY-MM-DD-` prefix that is dropped from the slug.
    pub fn strips_date_prefix(self) -> bool {
        matches!(self, ContentKind::Post)
    }
}

/// One discovered Markdown source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub source_path: PathBuf,
    pub front_matter: FrontMatter,
    pub body_markdown: String,
    /// URL-safe identifier, derived once at discovery.
    pub slug: String,
    /// Site-rooted path without trailing slash (`/blog/hello`, `/about`).
    pub url_path: String,
    /// Only used for ordering posts.
    pub date: Option<NaiveDate>,
    /// Template override from front matter; `None` means the collection default.
    pub template: Option<String>,
}

impl ContentItem {
    /// Front-matter title, or empty when absent.
    pub fn title(&self) -> String {
        self.front_matter
            .get("title")
            .and_then(scalar_string)
            .unwrap_or_default()
    }

    /// Source path as recorded in messages and the cache manifest.
    pub fn source_key(&self) -> String {
        self.source_path.to_string_lossy().to_string()
    }
}

/// Render a scalar front-matter value as a string. Collections, null and
/// empty strings yield `None`.
pub fn scalar_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Whether a front-matter value counts as set: not null, false, zero, or empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
