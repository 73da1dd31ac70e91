//! URL and output path derivation.
//!
//! | URL path | clean URLs | output key |
//! |----------|------------|------------|
//! | `/blog/hello` | yes | `blog/hello/index.html` |
//! | `/` | yes | `index/index.html` |
//! | `/about` | no | `about.html` |
//!
//! Output keys use `/` separators on every platform; they double as the
//! `outputs` keys of the cache manifest.

use std::path::{Path, PathBuf};

/// Site-rooted URL path for a slug under an optional prefix, without trailing slash.
pub fn url_path(slug: &str, url_prefix: &str) -> String {
    let prefix = url_prefix.trim_matches('/');
    let url = if prefix.is_empty() {
        format!("/{slug}/")
    } else {
        format!("/{prefix}/{slug}/")
    };
    let trimmed = url.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Output path relative to the output root, `/`-separated.
pub fn output_key(url_path: &str, clean_urls: bool) -> String {
    let path = url_path.trim_matches('/');
    let path = if path.is_empty() { "index" } else { path };
    if clean_urls {
        format!("{path}/index.html")
    } else {
        format!("{path}.html")
    }
}

/// Absolute output file for a URL path.
pub fn output_path(output_root: &Path, url_path: &str, clean_urls: bool) -> PathBuf {
    output_root.join(output_key(url_path, clean_urls))
}
