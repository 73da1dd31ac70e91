//! Content hashing and the persistent build cache.
//!
//! # Design
//!
//! Every generated output is passed through the write-avoidance writer, which
//! compares the SHA-256 of the new bytes against the digest recorded for that
//! output on the previous run. Identical bytes are never rewritten, so file
//! modification times in `dist/` only move when content actually changed.
//!
//! The manifest has three maps:
//!
//! - **`outputs`**: output path (relative to the output root) → digest of the
//!   bytes last written there. This is the map the writer's decisions rest on.
//! - **`source_to_output`**: source path (relative to the project root) →
//!   output path it produced.
//! - **`files`**: source path → last seen mtime, size and digest. Recorded
//!   for traceability; rendering does not short-circuit on it.
//!
//! ## Storage
//!
//! One JSON file per project at `<project>/.pycobello/cache.json`:
//!
//! ```text
//! {
//!   "files":   { "<source>": {"mtime": 1705312800.0, "size": 42, "sha256": "…"} },
//!   "outputs": { "blog/hello/index.html": {"sha256": "…"} },
//!   "source_to_output": { "<source>": "blog/hello/index.html" }
//! }
//! ```
//!
//! Maps are ordered, so an unchanged run serializes to identical bytes. Saves
//! go through a temp file in the same directory followed by a rename; a crash
//! mid-save leaves the previous manifest intact.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;
use thiserror::Error;

/// Cache directory inside the project root.
pub const CACHE_DIR: &str = ".pycobello";

/// Name of the manifest file within [`CACHE_DIR`].
const MANIFEST_FILENAME: &str = "cache.json";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache IO error at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("corrupt cache manifest {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Last seen state of a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Seconds since the Unix epoch.
    pub mtime: f64,
    pub size: u64,
    pub sha256: String,
}

impl FileRecord {
    /// Stat and hash a file.
    pub fn capture(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        let mtime = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map_err(io::Error::other)?
            .as_secs_f64();
        Ok(Self {
            mtime,
            size: meta.len(),
            sha256: hash_file(path)?,
        })
    }
}

/// Digest of the bytes last written to an output path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub sha256: String,
}

/// On-disk cache manifest. Absent maps load as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheManifest {
    pub files: BTreeMap<String, FileRecord>,
    pub outputs: BTreeMap<String, OutputRecord>,
    pub source_to_output: BTreeMap<String, String>,
}

impl CacheManifest {
    /// Load a manifest. A missing file is a first run and yields an empty
    /// manifest; anything unreadable or unparsable is an error the caller
    /// decides about.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| CacheError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist atomically, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(io_err)?;
        let json = serde_json::to_string_pretty(self).map_err(|e| io_err(io::Error::other(e)))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Digest recorded for an output key, if any.
    pub fn output_digest(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).map(|r| r.sha256.as_str())
    }

    pub fn record_output(&mut self, key: String, sha256: String) {
        self.outputs.insert(key, OutputRecord { sha256 });
    }

    pub fn record_source(&mut self, source: String, output_key: String) {
        self.source_to_output.insert(source, output_key);
    }

    pub fn record_file(&mut self, source: String, record: FileRecord) {
        self.files.insert(source, record);
    }
}

/// SHA-256 of `bytes` as 64 lowercase hex characters.
pub fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of a file's contents.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(digest(&bytes))
}

/// Manifest location for a project root.
pub fn manifest_path(project_root: &Path) -> PathBuf {
    project_root.join(CACHE_DIR).join(MANIFEST_FILENAME)
}

/// Manifest key for a source file: its path relative to `project_root`,
/// `/`-separated, so the same project spelled two ways shares one key.
pub fn relative_key(project_root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(project_root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
