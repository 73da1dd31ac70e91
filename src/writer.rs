//! Write-avoidance for generated output.
//!
//! [`write_if_changed`] never touches the manifest; the caller records the
//! returned digest so all cache mutations stay in one place.

use crate::cache;
use std::fs;
use std::io;
use std::path::Path;

/// Result of one write decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Whether the file was written.
    pub written: bool,
    /// Digest of the new content, to record as the output's cache entry.
    pub digest: String,
}

/// Write `content` to `path` unless it hashes to `cached_digest`.
pub fn write_if_changed(
    path: &Path,
    content: &[u8],
    cached_digest: Option<&str>,
) -> io::Result<WriteOutcome> {
    let digest = cache::digest(content);
    if cached_digest == Some(digest.as_str()) {
        return Ok(WriteOutcome {
            written: false,
            digest,
        });
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(WriteOutcome {
        written: true,
        digest,
    })
}
