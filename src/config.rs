//! Project configuration.
//!
//! Loaded from `cobello.toml` in the project root. Every key is optional; user
//! values are merged over the stock defaults, so a partial table only
//! overrides what it names:
//!
//! ```toml
//! [site]
//! title = "My Site"
//! base_url = ""
//! author = ""
//!
//! [build]
//! content_dir = "content"
//! theme_dir = "theme"       # templates/ and static/ live here
//! static_dir = "static"     # user assets, copied after the theme's
//! output_dir = "dist"
//! clean_urls = true         # /about → about/index.html instead of about.html
//! ignore = []               # path segments to skip during discovery
//!
//! [collections.posts]
//! path = "posts"
//! url_prefix = "blog"
//! template = "post.html"
//!
//! [collections.pages]
//! path = "pages"
//! url_prefix = ""
//! template = "page.html"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::cache;
use crate::types::ContentKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name inside the project root.
pub const CONFIG_FILENAME: &str = "cobello.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteMeta,
    pub build: BuildConfig,
    pub collections: CollectionsConfig,
}

/// Site metadata, exposed to templates as `site`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub base_url: String,
    pub author: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            base_url: String::new(),
            author: String::new(),
        }
    }
}

/// Directory layout and output options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub content_dir: String,
    pub theme_dir: String,
    pub static_dir: String,
    pub output_dir: String,
    pub clean_urls: bool,
    pub ignore: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: "content".to_string(),
            theme_dir: "theme".to_string(),
            static_dir: "static".to_string(),
            output_dir: "dist".to_string(),
            clean_urls: true,
            ignore: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionsConfig {
    pub posts: CollectionConfig,
    pub pages: CollectionConfig,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            posts: CollectionConfig::stock(ContentKind::Post),
            pages: CollectionConfig::stock(ContentKind::Page),
        }
    }
}

/// One content collection: where its files live, how its URLs look, and the
/// template used when an item has no override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    pub path: String,
    pub url_prefix: String,
    pub template: String,
}

impl CollectionConfig {
    fn stock(kind: ContentKind) -> Self {
        Self {
            path: kind.default_dir().to_string(),
            url_prefix: kind.default_url_prefix().to_string(),
            template: kind.default_template().to_string(),
        }
    }
}

/// A collection bound to its kind, as handed to discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub kind: ContentKind,
    pub path: String,
    pub url_prefix: String,
    pub template: String,
}

/// Absolute locations derived from a project root and its config.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    pub content: PathBuf,
    pub output: PathBuf,
    pub templates: PathBuf,
    pub theme_static: PathBuf,
    pub user_static: PathBuf,
    pub output_static: PathBuf,
    pub cache: PathBuf,
}

impl SiteConfig {
    /// Validate values that would otherwise fail late or destructively.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let output = self.build.output_dir.trim().trim_end_matches('/');
        if output.is_empty() || output == "." {
            return Err(ConfigError::Validation(
                "build.output_dir must name a subdirectory".into(),
            ));
        }
        if output == self.build.content_dir.trim().trim_end_matches('/') {
            return Err(ConfigError::Validation(
                "build.output_dir must differ from build.content_dir".into(),
            ));
        }
        for kind in ContentKind::ALL {
            let coll = self.collection_config(kind);
            let name = kind.collection_name();
            if coll.path.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "collections.{name}.path must not be empty"
                )));
            }
            if coll.template.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "collections.{name}.template must not be empty"
                )));
            }
        }
        Ok(())
    }

    fn collection_config(&self, kind: ContentKind) -> &CollectionConfig {
        match kind {
            ContentKind::Post => &self.collections.posts,
            ContentKind::Page => &self.collections.pages,
        }
    }

    pub fn collection(&self, kind: ContentKind) -> Collection {
        let c = self.collection_config(kind);
        Collection {
            kind,
            path: c.path.clone(),
            url_prefix: c.url_prefix.clone(),
            template: c.template.clone(),
        }
    }

    /// Both collections, posts first.
    pub fn collections(&self) -> Vec<Collection> {
        ContentKind::ALL.iter().map(|k| self.collection(*k)).collect()
    }

    /// Default template for items of `kind` without an override.
    pub fn template_for(&self, kind: ContentKind) -> &str {
        &self.collection_config(kind).template
    }

    pub fn paths(&self, root: &Path) -> ProjectPaths {
        let output = root.join(&self.build.output_dir);
        let theme = root.join(&self.build.theme_dir);
        ProjectPaths {
            content: root.join(&self.build.content_dir),
            templates: theme.join("templates"),
            theme_static: theme.join("static"),
            user_static: root.join(&self.build.static_dir),
            output_static: output.join("static"),
            cache: cache::manifest_path(root),
            output,
        }
    }
}

// =============================================================================
// Config loading
// =============================================================================

/// Stock defaults as a TOML table, the base layer for user overrides.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `cobello.toml` from the project root, falling back to stock defaults
/// when the file does not exist.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    parse_config(&content)
}

/// Parse config text, merge it over the defaults, and validate.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}
