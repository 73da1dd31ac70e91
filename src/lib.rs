//! # Cobello
//!
//! A static site generator for Markdown blogs and pages with an incremental,
//! write-avoiding build.
//!
//! # Architecture: One Pass, One Manifest
//!
//! Every build re-reads all content and re-renders every template, then
//! compares each output's SHA-256 against the digest recorded on the previous
//! run. Only outputs whose bytes changed are written:
//!
//! ```text
//! content/ + theme/templates/ → render → digest → dist/   (changed bytes only)
//!                                           ↕
//!                                .pycobello/cache.json    (saved once per run)
//! ```
//!
//! Rendering is cheap next to the churn an unconditional rewrite causes for
//! file watchers, rsync and CDN uploads, so correctness rests on output
//! digests alone: there is no dependency graph to get wrong.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Orchestrates one build: discovery, rendering, writes, assets, cache save |
//! | [`scan`] | Walks collection directories and loads Markdown files into items |
//! | [`frontmatter`] | Splits a `---` YAML block from the Markdown body |
//! | [`naming`] | Slug derivation: front matter, date-prefixed stems, slugify |
//! | [`routes`] | URL path and output path derivation |
//! | [`render`] | Tera templates, Markdown to HTML, template contexts |
//! | [`writer`] | Digest-compare write avoidance |
//! | [`cache`] | SHA-256 hashing and the persistent JSON manifest |
//! | [`assets`] | mtime+size static asset sync |
//! | [`hooks`] | Lifecycle hook registry, template filters and globals |
//! | [`check`] | `cobello check` diagnostics: duplicates, required fields, links |
//! | [`config`] | `cobello.toml` loading, stock defaults, validation |
//! | [`types`] | Content items and kinds shared by every stage |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Failure Isolation
//!
//! A broken file never stops a build. Malformed front matter, unknown
//! templates and failing hooks become entries in
//! [`pipeline::BuildResult::errors`]; everything else still renders, and the
//! manifest is still saved. Only a failing output filesystem aborts the run.
//!
//! ## Explicit Hook Registry
//!
//! Plugins attach to the build through a [`hooks::HookRegistry`] the caller
//! constructs and passes into [`pipeline::build`]. There is no process-wide
//! registration, so two builds in one process never see each other's hooks.
//!
//! ## Content Kinds
//!
//! Posts and pages are the two cases of [`types::ContentKind`]. Kind-specific
//! behavior (date-prefix stripping, date sorting, the template context key)
//! is a `match`, not a trait object.

pub mod assets;
pub mod cache;
pub mod check;
pub mod config;
pub mod frontmatter;
pub mod hooks;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod scan;
pub mod types;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_helpers;
