//! Project diagnostics for `cobello check`.
//!
//! Runs over a fresh discovery and reports, in order:
//!
//! 1. files discovery could not load
//! 2. items that resolve to the same URL
//! 3. posts without a `title` or `date`
//! 4. Markdown links to site paths no item produces
//!
//! Nothing is rendered or written.

use crate::config::SiteConfig;
use crate::scan;
use crate::types::{ContentItem, ContentKind, is_truthy};
use pulldown_cmark::{Event, Parser, Tag};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Every diagnostic message for the project at `root`.
pub fn run_checks(config: &SiteConfig, root: &Path) -> Vec<String> {
    let paths = config.paths(root);
    let discovery = scan::discover(&paths.content, &config.collections(), &config.build.ignore);
    let mut messages: Vec<String> = discovery.errors.iter().map(|e| e.to_string()).collect();
    messages.extend(check_duplicate_urls(&discovery.items));
    messages.extend(check_required_front_matter(&discovery.items));
    messages.extend(check_internal_links(&discovery.items));
    messages
}

pub fn check_duplicate_urls(items: &[ContentItem]) -> Vec<String> {
    let mut seen: HashMap<&str, String> = HashMap::new();
    let mut messages = Vec::new();
    for item in items {
        match seen.get(item.url_path.as_str()) {
            Some(first) => messages.push(format!(
                "Duplicate URL {}: {} and {}",
                item.url_path,
                first,
                item.source_key()
            )),
            None => {
                seen.insert(&item.url_path, item.source_key());
            }
        }
    }
    messages
}

pub fn check_required_front_matter(items: &[ContentItem]) -> Vec<String> {
    let mut messages = Vec::new();
    for item in items.iter().filter(|i| i.kind == ContentKind::Post) {
        for key in ["title", "date"] {
            if !item.front_matter.get(key).is_some_and(is_truthy) {
                messages.push(format!(
                    "{}: Post missing required '{key}' in front matter.",
                    item.source_key()
                ));
            }
        }
    }
    messages
}

pub fn check_internal_links(items: &[ContentItem]) -> Vec<String> {
    let mut known: BTreeSet<&str> = items.iter().map(|i| i.url_path.as_str()).collect();
    known.insert("/");

    let mut messages = Vec::new();
    for item in items {
        for href in link_destinations(&item.body_markdown) {
            if is_external(&href) || href.starts_with('#') {
                continue;
            }
            let target = resolve_link(&item.url_path, &href);
            if !known.contains(target.as_str()) {
                messages.push(format!(
                    "{}: Broken internal link to {href}",
                    item.source_key()
                ));
            }
        }
    }
    messages
}

fn link_destinations(markdown: &str) -> Vec<String> {
    Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::Link { dest_url, .. }) => Some(dest_url.to_string()),
            _ => None,
        })
        .filter(|href| !href.is_empty())
        .collect()
}

fn is_external(href: &str) -> bool {
    href.contains("://") || href.starts_with("mailto:") || href.starts_with("tel:")
}

/// Resolve `href` to a site-rooted URL path. Relative links resolve against
/// `base` as if it were a directory, so `other` from `/blog/hello` is
/// `/blog/hello/other`.
pub fn resolve_link(base: &str, href: &str) -> String {
    let path = href.split(['#', '?']).next().unwrap_or_default();
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{path}", base.trim_end_matches('/'))
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    if let Some(last) = segments.pop() {
        segments.push(last.strip_suffix(".md").unwrap_or(last));
    }
    format!("/{}", segments.join("/"))
}
