//! Content discovery.
//!
//! Walks each collection directory under the content root and turns every
//! Markdown file into a [`ContentItem`]:
//!
//! ```text
//! content/
//! ├── posts/                       # ContentKind::Post, /blog/<slug>
//! │   ├── 2024-01-15-hello.md      # slug "hello" unless front matter says otherwise
//! │   └── drafts/                  # skipped when "drafts" is in build.ignore
//! │       └── wip.md
//! └── pages/                       # ContentKind::Page, /<slug>
//!     └── about.md
//! ```
//!
//! ## Failure isolation
//!
//! A file that cannot be read, or whose front matter is malformed, becomes a
//! [`DiscoveryError`] next to the items; the walk continues with the next file.
//!
//! ## Ordering
//!
//! Collections are walked posts first, then pages; within a collection files
//! are visited in file-name order. This discovery order is what the pipeline
//! renders in and what breaks ties between equally dated posts.

use crate::config::Collection;
use crate::frontmatter::{self, FrontMatterError};
use crate::naming;
use crate::routes;
use crate::types::{ContentItem, FrontMatter, scalar_string};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: Invalid front matter: {source}", path.display())]
    FrontMatter {
        path: PathBuf,
        source: FrontMatterError,
    },
    #[error("{0}")]
    Walk(#[from] walkdir::Error),
}

/// Items found by a walk, plus the files that could not become items.
#[derive(Debug, Default)]
pub struct Discovery {
    pub items: Vec<ContentItem>,
    pub errors: Vec<DiscoveryError>,
}

/// Discover every content item under `content_root`.
pub fn discover(content_root: &Path, collections: &[Collection], ignore: &[String]) -> Discovery {
    let mut discovery = Discovery::default();
    for collection in collections {
        let dir = content_root.join(&collection.path);
        if !dir.is_dir() {
            continue;
        }
        let walker = WalkDir::new(&dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_ignored(e.path(), content_root, ignore));
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    discovery.errors.push(e.into());
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            match load_item(entry.path(), collection) {
                Ok(item) => discovery.items.push(item),
                Err(e) => discovery.errors.push(e),
            }
        }
    }
    discovery
}

fn load_item(path: &Path, collection: &Collection) -> Result<ContentItem, DiscoveryError> {
    let raw = fs::read_to_string(path).map_err(|source| DiscoveryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let (front_matter, body) =
        frontmatter::parse_front_matter(&raw).map_err(|source| DiscoveryError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let slug = naming::derive_slug(&stem, &front_matter, collection.kind);
    let url_path = routes::url_path(&slug, &collection.url_prefix);
    let date = front_matter_date(&front_matter);
    let template = front_matter.get("template").and_then(scalar_string);

    Ok(ContentItem {
        kind: collection.kind,
        source_path: path.to_path_buf(),
        front_matter,
        body_markdown: body,
        slug,
        url_path,
        date,
        template,
    })
}

/// Parse the front-matter `date` as an ISO date or date-time. Anything
/// unparseable counts as no date.
pub fn front_matter_date(front_matter: &FrontMatter) -> Option<NaiveDate> {
    let raw = front_matter.get("date").and_then(scalar_string)?;
    let day = raw.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Whether any path segment below the content root equals an ignore pattern.
fn is_ignored(path: &Path, content_root: &Path, ignore: &[String]) -> bool {
    if ignore.is_empty() {
        return false;
    }
    let rel = path.strip_prefix(content_root).unwrap_or(path);
    rel.components().any(|c| {
        let segment = c.as_os_str().to_string_lossy();
        ignore.iter().any(|pattern| *pattern == segment)
    })
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::types::ContentKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn discover_default(root: &Path, ignore: &[String]) -> Discovery {
        discover(root, &SiteConfig::default().collections(), ignore)
    }

    #[test]
    fn finds_posts_then_pages() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pages/about.md", "---\ntitle: About\n---\nAbout.");
        write(
            tmp.path(),
            "posts/2024-01-15-hello.md",
            "---\ndate: 2024-01-15\n---\nFirst post.",
        );

        let d = discover_default(tmp.path(), &[]);
        assert!(d.errors.is_empty());
        assert_eq!(d.items.len(), 2);

        let post = &d.items[0];
        assert_eq!(post.kind, ContentKind::Post);
        assert_eq!(post.slug, "hello");
        assert_eq!(post.url_path, "/blog/hello");
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(post.body_markdown, "First post.");

        let page = &d.items[1];
        assert_eq!(page.kind, ContentKind::Page);
        assert_eq!(page.slug, "about");
        assert_eq!(page.url_path, "/about");
        assert_eq!(page.date, None);
    }

    #[test]
    fn walks_recursively_in_name_order() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pages/b.md", "b");
        write(tmp.path(), "pages/a.md", "a");
        write(tmp.path(), "pages/nested/c.md", "c");

        let d = discover_default(tmp.path(), &[]);
        let slugs: Vec<&str> = d.items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[test]
    fn only_markdown_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pages/a.md", "a");
        write(tmp.path(), "pages/B.MD", "b");
        write(tmp.path(), "pages/notes.txt", "nope");
        write(tmp.path(), "pages/image.png", "nope");

        let d = discover_default(tmp.path(), &[]);
        assert_eq!(d.items.len(), 2);
    }

    #[test]
    fn ignored_segments_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "posts/drafts/wip.md", "wip");
        write(tmp.path(), "posts/keep.md", "keep");
        write(tmp.path(), "posts/drafts-not-ignored.md", "kept");

        let d = discover_default(tmp.path(), &["drafts".to_string()]);
        let slugs: Vec<&str> = d.items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["drafts-not-ignored", "keep"]);
    }

    #[test]
    fn bad_front_matter_is_isolated() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pages/bad.md", "---\ntitle: [oops\n---\nbody");
        write(tmp.path(), "pages/good.md", "---\ntitle: Good\n---\nbody");

        let d = discover_default(tmp.path(), &[]);
        assert_eq!(d.items.len(), 1);
        assert_eq!(d.items[0].slug, "good");
        assert_eq!(d.errors.len(), 1);
        let msg = d.errors[0].to_string();
        assert!(msg.contains("bad.md"), "{msg}");
        assert!(msg.contains("Invalid front matter"), "{msg}");
    }

    #[test]
    fn unreadable_file_is_isolated() {
        let tmp = TempDir::new().unwrap();
        // Not valid UTF-8, so reading it as text fails.
        let path = tmp.path().join("pages/binary.md");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        write(tmp.path(), "pages/ok.md", "fine");

        let d = discover_default(tmp.path(), &[]);
        assert_eq!(d.items.len(), 1);
        assert!(matches!(d.errors[0], DiscoveryError::Read { .. }));
    }

    #[test]
    fn missing_collection_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let d = discover_default(tmp.path(), &[]);
        assert!(d.items.is_empty());
        assert!(d.errors.is_empty());
    }

    #[test]
    fn template_override_from_front_matter() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pages/landing.md", "---\ntemplate: landing.html\n---\n");
        write(tmp.path(), "pages/plain.md", "plain");

        let d = discover_default(tmp.path(), &[]);
        assert_eq!(d.items[0].template.as_deref(), Some("landing.html"));
        assert_eq!(d.items[1].template, None);
    }

    #[test]
    fn custom_collection_prefix() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "articles/x.md", "---\ntitle: Big News\n---\n");
        let collection = Collection {
            kind: ContentKind::Post,
            path: "articles".into(),
            url_prefix: "news/".into(),
            template: "post.html".into(),
        };
        let d = discover(tmp.path(), &[collection], &[]);
        assert_eq!(d.items[0].url_path, "/news/big-news");
    }

    // =========================================================================
    // Dates
    // =========================================================================

    fn date_of(value: serde_json::Value) -> Option<NaiveDate> {
        let mut fm = FrontMatter::new();
        fm.insert("date".into(), value);
        front_matter_date(&fm)
    }

    #[test]
    fn date_forms() {
        let jan15 = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(date_of(json!("2024-01-15")), jan15);
        assert_eq!(date_of(json!("2024-01-15T10:30:00Z")), jan15);
        assert_eq!(date_of(json!("2024-01-15 10:30")), jan15);
    }

    #[test]
    fn bad_dates_are_absent() {
        assert_eq!(date_of(json!("yesterday")), None);
        assert_eq!(date_of(json!("2024-13-40")), None);
        assert_eq!(date_of(json!(20240115)), None);
        assert_eq!(date_of(json!(null)), None);
        assert_eq!(front_matter_date(&FrontMatter::new()), None);
    }
}
