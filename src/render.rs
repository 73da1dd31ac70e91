//! Markdown conversion, template loading, and template contexts.
//!
//! Templates are [Tera](https://keats.github.io/tera/) files under
//! `theme/templates/`, addressed by their path relative to that directory
//! (`index.html`, `post.html`, `partials/nav.html`). Rendering is
//! deterministic: no clock or random values are exposed, so unchanged inputs
//! always produce identical bytes.
//!
//! ## Context
//!
//! Every render sees:
//!
//! - `site`: `title`, `base_url`, `author`
//! - `collections.posts`: newest first, undated last
//! - `collections.pages`: discovery order
//!
//! Each collection entry carries `title`, `slug`, `url_path`, `date`,
//! `content` (rendered HTML) and `front_matter`. Item renders add the acting
//! item as `post` or `page`. Globals registered by plugins are visible too,
//! under any key not already taken.
//!
//! ## Functions and filters
//!
//! - `url_for(path="static/style.css")`: `base_url` joined with a rooted path
//! - `date | datefmt(fmt="%d %b %Y")`: reformat an item date, empty when unset

use crate::config::SiteMeta;
use crate::hooks::HookRegistry;
use crate::types::{ContentItem, ContentKind, FrontMatter};
use chrono::NaiveDate;
use pulldown_cmark::{Parser, html as md_html};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::error::Error as _;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera, Value};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to read templates in {}: {message}", dir.display())]
    Load { dir: PathBuf, message: String },
    #[error("{0}")]
    Template(String),
}

impl From<tera::Error> for RenderError {
    fn from(err: tera::Error) -> Self {
        RenderError::Template(describe(&err))
    }
}

/// Tera error with its cause chain, `outer: inner: innermost`.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Render CommonMark to HTML.
pub fn markdown_to_html(text: &str) -> String {
    let parser = Parser::new(text);
    let mut html = String::with_capacity(text.len() * 3 / 2);
    md_html::push_html(&mut html, parser);
    html
}

/// Loaded templates plus the plugin globals merged into every render.
pub struct Renderer {
    tera: Tera,
    globals: Context,
    /// Templates that could not be loaded, by name. Rendering one of these
    /// fails with the recorded message; every other template still works.
    broken: BTreeMap<String, String>,
}

impl Renderer {
    /// Load every template file under `templates_dir`.
    ///
    /// Each file is added on its own, so an unreadable file or a template
    /// that does not parse only breaks renders that use it. Templates whose
    /// parent or imported macros come later in the walk are retried until
    /// nothing more loads. A missing directory gives an engine with no
    /// templates.
    pub fn load(
        templates_dir: &Path,
        site: &SiteMeta,
        hooks: &HookRegistry,
    ) -> Result<Self, RenderError> {
        let mut pending: Vec<(String, String)> = Vec::new();
        let mut broken = BTreeMap::new();
        if templates_dir.is_dir() {
            for entry in WalkDir::new(templates_dir).sort_by_file_name() {
                let entry = entry.map_err(|e| RenderError::Load {
                    dir: templates_dir.to_path_buf(),
                    message: e.to_string(),
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = template_name(templates_dir, entry.path());
                match fs::read_to_string(entry.path()) {
                    Ok(source) => pending.push((name, source)),
                    Err(e) => {
                        broken.insert(name, e.to_string());
                    }
                }
            }
        }

        let mut tera = Tera::default();
        loop {
            let mut failed = Vec::new();
            let mut progressed = false;
            for (name, source) in pending {
                // A failed add can leave the template half-registered, so
                // only keep engines where the add succeeded.
                let mut trial = tera.clone();
                match trial.add_raw_template(&name, &source) {
                    Ok(()) => {
                        tera = trial;
                        progressed = true;
                    }
                    Err(e) => failed.push((name, source, describe(&e))),
                }
            }
            if failed.is_empty() || !progressed {
                for (name, _, message) in failed {
                    broken.insert(name, message);
                }
                break;
            }
            pending = failed.into_iter().map(|(n, s, _)| (n, s)).collect();
        }
        for (name, message) in &broken {
            warn!(template = %name, "template failed to load: {message}");
        }

        let mut renderer = Self::with_engine(tera, site, hooks);
        renderer.broken = broken;
        Ok(renderer)
    }

    /// Build from in-memory `(name, source)` templates.
    pub fn from_templates(
        templates: &[(&str, &str)],
        site: &SiteMeta,
        hooks: &HookRegistry,
    ) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())?;
        Ok(Self::with_engine(tera, site, hooks))
    }

    fn with_engine(mut tera: Tera, site: &SiteMeta, hooks: &HookRegistry) -> Self {
        let base = site.base_url.trim_end_matches('/').to_string();
        tera.register_function("url_for", move |args: &HashMap<String, Value>| {
            let path = args
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| tera::Error::msg("url_for requires a `path` string argument"))?;
            Ok(Value::String(join_url(&base, path)))
        });
        tera.register_filter("datefmt", datefmt);
        for (name, filter) in hooks.filters() {
            let filter = filter.clone();
            tera.register_filter(name, move |value: &Value, args: &HashMap<String, Value>| {
                filter(value, args)
            });
        }
        let mut globals = Context::new();
        for (key, value) in hooks.globals() {
            globals.insert(key.as_str(), value);
        }
        Self {
            tera,
            globals,
            broken: BTreeMap::new(),
        }
    }

    /// Render `template` with `context` layered over the plugin globals.
    pub fn render(&self, template: &str, context: &Context) -> Result<String, RenderError> {
        if let Some(message) = self.broken.get(template) {
            return Err(RenderError::Template(format!(
                "Template '{template}' failed to load: {message}"
            )));
        }
        let mut full = self.globals.clone();
        full.extend(context.clone());
        Ok(self.tera.render(template, &full)?)
    }
}

/// Template name: path relative to the templates directory, `/`-separated.
fn template_name(templates_dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(templates_dir).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `{{ post.date | datefmt(fmt="%B %-d, %Y") }}`. Null renders empty, an ISO
/// date is formatted (default `%Y-%m-%d`), anything else passes through.
fn datefmt(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = match value {
        Value::Null => return Ok(Value::String(String::new())),
        Value::String(s) => s,
        other => return Ok(other.clone()),
    };
    let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
        return Ok(value.clone());
    };
    let fmt = args.get("fmt").and_then(Value::as_str).unwrap_or("%Y-%m-%d");
    let mut out = String::new();
    write!(out, "{}", date.format(fmt))
        .map_err(|_| tera::Error::msg(format!("datefmt: invalid format string `{fmt}`")))?;
    Ok(Value::String(out))
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

// =============================================================================
// Context assembly
// =============================================================================

/// Template view of one content item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemView<'a> {
    pub title: String,
    pub slug: &'a str,
    pub url_path: &'a str,
    pub date: Option<String>,
    pub content: &'a str,
    pub front_matter: &'a FrontMatter,
}

impl<'a> ItemView<'a> {
    pub fn new(item: &'a ContentItem, html: &'a str) -> Self {
        Self {
            title: item.title(),
            slug: &item.slug,
            url_path: &item.url_path,
            date: item.date.map(|d| d.to_string()),
            content: html,
            front_matter: &item.front_matter,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionsView<'a> {
    pub posts: Vec<ItemView<'a>>,
    pub pages: Vec<ItemView<'a>>,
}

/// Site-wide context shared by the index and every item render.
pub fn site_context(site: &SiteMeta, collections: &CollectionsView<'_>) -> Context {
    let mut context = Context::new();
    context.insert("site", site);
    context.insert("collections", collections);
    context
}

/// Site context plus the acting item under `post` or `page`.
pub fn item_context(site: &Context, kind: ContentKind, item: &ItemView<'_>) -> Context {
    let mut context = site.clone();
    context.insert(kind.context_key(), item);
    context
}
