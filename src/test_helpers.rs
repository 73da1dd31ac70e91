//! Shared test utilities for unit tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = write_project();
//! let config = load_config(project.path()).unwrap();
//!
//! let item = sample_item(ContentKind::Post, "hello", "Hello");
//! assert_eq!(item.url_path, "/blog/hello");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::routes;
use crate::types::{ContentItem, ContentKind, FrontMatter};

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `content` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small project: one post, one page, three templates and a stylesheet.
pub fn write_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_file(
        root,
        "cobello.toml",
        "[site]\ntitle = \"Test Site\"\nbase_url = \"https://example.com\"\n",
    );
    write_file(
        root,
        "theme/templates/index.html",
        "<h1>{{ site.title }}</h1>\n\
         {% for p in collections.posts %}<a href=\"{{ p.url_path }}\">{{ p.title }}</a>\n{% endfor %}",
    );
    write_file(
        root,
        "theme/templates/post.html",
        "<h1>{{ post.title }}</h1>{{ post.content | safe }}",
    );
    write_file(
        root,
        "theme/templates/page.html",
        "<h1>{{ page.title }}</h1>{{ page.content | safe }}",
    );
    write_file(root, "theme/static/style.css", "body { margin: 0 }");
    write_file(
        root,
        "content/posts/2024-01-15-hello.md",
        "---\ntitle: Hello\ndate: 2024-01-15\n---\nFirst post. See [about](/about).\n",
    );
    write_file(
        root,
        "content/pages/about.md",
        "---\ntitle: About\n---\nBack to [hello](/blog/hello).\n",
    );
    tmp
}

// =========================================================================
// Item construction
// =========================================================================

/// An in-memory item with a `title` in its front matter (when non-empty) and
/// the default URL prefix for its kind.
pub fn sample_item(kind: ContentKind, slug: &str, title: &str) -> ContentItem {
    let mut front_matter = FrontMatter::new();
    if !title.is_empty() {
        front_matter.insert("title".into(), title.into());
    }
    ContentItem {
        kind,
        source_path: Path::new("content")
            .join(kind.default_dir())
            .join(format!("{slug}.md")),
        front_matter,
        body_markdown: String::new(),
        slug: slug.to_string(),
        url_path: routes::url_path(slug, kind.default_url_prefix()),
        date: None,
        template: None,
    }
}
