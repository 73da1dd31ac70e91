//! Build orchestration.
//!
//! One [`build`] call is a single linear pass over the project:
//!
//! ```text
//! clean? → load cache → config_loaded → discover → sources_discovered
//!        → item_parsed (per item) → index.html → items (discovery order)
//!        → static assets → save cache → post_build
//! ```
//!
//! ## Failure isolation
//!
//! Discovery failures, template failures and hook failures are recorded in
//! [`BuildResult::errors`] and the run moves on to the next item. A failed
//! item leaves its previous cache entry alone, so its last good output stays
//! valid. Output-side filesystem failures (cleaning, writing, copying assets,
//! saving the manifest) abort the run with a [`BuildError`].
//!
//! ## Write avoidance
//!
//! Every output goes through [`writer::write_if_changed`] with the digest the
//! manifest holds for its path. A digest is only trusted while the file it
//! describes still exists, so deleting `dist/` regenerates everything. The
//! manifest is saved exactly once, after assets, whatever the error count.

use crate::cache::{self, CacheManifest, FileRecord};
use crate::config::SiteConfig;
use crate::hooks::{HookEvent, HookFailure, HookRegistry};
use crate::render::{self, CollectionsView, ItemView, Renderer};
use crate::routes;
use crate::scan;
use crate::types::{ContentItem, ContentKind};
use crate::{assets, writer};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Template rendered once per run with the site-wide context.
pub const INDEX_TEMPLATE: &str = "index.html";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Cache(#[from] crate::cache::CacheError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Delete the output directory and start from an empty manifest.
    pub clean: bool,
}

/// Summary of one run. Paths are full output paths in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildResult {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
    pub errors: Vec<String>,
    /// Static assets copied into the output tree.
    pub copied: Vec<PathBuf>,
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Build the project rooted at `root`.
pub fn build(
    config: &SiteConfig,
    root: &Path,
    options: BuildOptions,
    hooks: &HookRegistry,
) -> Result<BuildResult, BuildError> {
    let paths = config.paths(root);
    let mut result = BuildResult::default();

    if options.clean && paths.output.exists() {
        info!(path = %paths.output.display(), "cleaning output directory");
        fs::remove_dir_all(&paths.output).map_err(|source| BuildError::Io {
            path: paths.output.clone(),
            source,
        })?;
    }
    let mut manifest = if options.clean {
        CacheManifest::default()
    } else {
        load_manifest(&paths.cache)
    };

    record_run_failures(
        &mut result,
        hooks.emit(&HookEvent::ConfigLoaded { config }),
    );

    let discovery = scan::discover(&paths.content, &config.collections(), &config.build.ignore);
    result
        .errors
        .extend(discovery.errors.iter().map(|e| e.to_string()));
    let discovered = discovery.items;
    debug!(count = discovered.len(), "discovered content items");
    record_run_failures(
        &mut result,
        hooks.emit(&HookEvent::SourcesDiscovered { items: &discovered }),
    );

    let mut items: Vec<ContentItem> = Vec::with_capacity(discovered.len());
    for item in discovered {
        let failures = hooks.emit(&HookEvent::ItemParsed { item: &item });
        if record_item_failures(&mut result, &item, failures) {
            items.push(item);
        }
    }

    match Renderer::load(&paths.templates, &config.site, hooks) {
        Ok(renderer) => {
            let output = RenderTarget {
                project_root: root,
                root: &paths.output,
                clean_urls: config.build.clean_urls,
            };
            render_all(config, &renderer, &items, hooks, output, &mut manifest, &mut result)?;
        }
        Err(e) => result.errors.push(e.to_string()),
    }

    result.copied =
        assets::sync_assets(&paths.theme_static, &paths.user_static, &paths.output_static)
            .map_err(|source| BuildError::Io {
                path: paths.output_static.clone(),
                source,
            })?;
    for path in &result.copied {
        debug!(path = %path.display(), "copied asset");
    }

    manifest.save(&paths.cache)?;

    let failures = hooks.emit(&HookEvent::PostBuild { result: &result });
    record_run_failures(&mut result, failures);

    info!(
        written = result.written.len(),
        skipped = result.skipped.len(),
        errors = result.errors.len(),
        assets = result.copied.len(),
        "build finished"
    );
    Ok(result)
}

/// Load the manifest, treating an unusable one as a first run.
fn load_manifest(path: &Path) -> CacheManifest {
    match CacheManifest::load(path) {
        Ok(m) => m,
        Err(e) => {
            warn!("{e}; starting from an empty cache");
            CacheManifest::default()
        }
    }
}

#[derive(Clone, Copy)]
struct RenderTarget<'a> {
    /// Source paths are recorded in the manifest relative to this.
    project_root: &'a Path,
    /// Output root.
    root: &'a Path,
    clean_urls: bool,
}

/// Render the index and every item. Only write failures escape.
fn render_all(
    config: &SiteConfig,
    renderer: &Renderer,
    items: &[ContentItem],
    hooks: &HookRegistry,
    output: RenderTarget<'_>,
    manifest: &mut CacheManifest,
    result: &mut BuildResult,
) -> Result<(), BuildError> {
    let htmls: Vec<String> = items
        .iter()
        .map(|i| render::markdown_to_html(&i.body_markdown))
        .collect();
    let views: Vec<ItemView<'_>> = items
        .iter()
        .zip(&htmls)
        .map(|(item, html)| ItemView::new(item, html))
        .collect();

    let mut posts: Vec<(&ContentItem, &ItemView<'_>)> = items
        .iter()
        .zip(&views)
        .filter(|(i, _)| i.kind == ContentKind::Post)
        .collect();
    // Stable, so equal dates keep discovery order; undated posts sort last.
    posts.sort_by(|(a, _), (b, _)| b.date.cmp(&a.date));
    let collections = CollectionsView {
        posts: posts.into_iter().map(|(_, v)| v.clone()).collect(),
        pages: items
            .iter()
            .zip(&views)
            .filter(|(i, _)| i.kind == ContentKind::Page)
            .map(|(_, v)| v.clone())
            .collect(),
    };
    let site = render::site_context(&config.site, &collections);

    match renderer.render(INDEX_TEMPLATE, &site) {
        Ok(html) => emit_output(
            &output.root.join(INDEX_TEMPLATE),
            INDEX_TEMPLATE.to_string(),
            html.as_bytes(),
            manifest,
            result,
        )?,
        Err(e) => result.errors.push(format!("{INDEX_TEMPLATE}: {e}")),
    }

    for (item, view) in items.iter().zip(&views) {
        let source = item.source_key();
        let template = item
            .template
            .as_deref()
            .unwrap_or_else(|| config.template_for(item.kind));

        let failures = hooks.emit(&HookEvent::PreRender { item, template });
        if !record_item_failures(result, item, failures) {
            continue;
        }
        let context = render::item_context(&site, item.kind, view);
        let html = match renderer.render(template, &context) {
            Ok(html) => html,
            Err(e) => {
                result.errors.push(format!("{source}: {e}"));
                continue;
            }
        };
        let failures = hooks.emit(&HookEvent::PostRender { item, html: &html });
        if !record_item_failures(result, item, failures) {
            continue;
        }

        let key = routes::output_key(&item.url_path, output.clean_urls);
        let path = routes::output_path(output.root, &item.url_path, output.clean_urls);
        emit_output(&path, key.clone(), html.as_bytes(), manifest, result)?;

        let record_key = cache::relative_key(output.project_root, &item.source_path);
        manifest.record_source(record_key.clone(), key);
        match FileRecord::capture(&item.source_path) {
            Ok(record) => manifest.record_file(record_key, record),
            Err(e) => warn!(source = %source, "could not record source state: {e}"),
        }
    }
    Ok(())
}

/// Write one output through write avoidance and record its digest under
/// `key`, the path relative to the output root.
fn emit_output(
    path: &Path,
    key: String,
    content: &[u8],
    manifest: &mut CacheManifest,
    result: &mut BuildResult,
) -> Result<(), BuildError> {
    let cached = manifest.output_digest(&key).filter(|_| path.is_file());
    let outcome = writer::write_if_changed(path, content, cached).map_err(|source| {
        BuildError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let shown = path.display().to_string();
    if outcome.written {
        debug!(path = %shown, "wrote");
        result.written.push(shown);
    } else {
        debug!(path = %shown, "unchanged");
        result.skipped.push(shown);
    }
    manifest.record_output(key, outcome.digest);
    Ok(())
}

fn record_run_failures(result: &mut BuildResult, failures: Vec<HookFailure>) {
    result.errors.extend(failures.iter().map(|f| f.to_string()));
}

/// Record item-scoped hook failures. Returns whether the item may proceed.
fn record_item_failures(
    result: &mut BuildResult,
    item: &ContentItem,
    failures: Vec<HookFailure>,
) -> bool {
    let ok = failures.is_empty();
    let source = item.source_key();
    result
        .errors
        .extend(failures.iter().map(|f| format!("{source}: {f}")));
    ok
}
