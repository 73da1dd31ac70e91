//! Static asset sync.
//!
//! Copies `theme/static/` and then `static/` into `dist/static/`. A file is
//! copied when the destination is missing or differs in modification time or
//! size; copies carry the source mtime so unchanged assets stay skipped next
//! run. User files land after theme files with the same relative path and
//! therefore replace them.
//!
//! Destination files whose source disappeared are left in place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Sync both static roots into `output_static`, returning destinations copied.
pub fn sync_assets(
    theme_static: &Path,
    user_static: &Path,
    output_static: &Path,
) -> io::Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    fs::create_dir_all(output_static)?;
    for src_dir in [theme_static, user_static] {
        if !src_dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(src_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(src_dir)
                .map_err(io::Error::other)?;
            let dst = output_static.join(rel);
            let meta = entry.metadata()?;
            let mtime = meta.modified()?;
            if is_stale(&dst, mtime, meta.len())? {
                if let Some(parent) = dst.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &dst)?;
                fs::OpenOptions::new()
                    .write(true)
                    .open(&dst)?
                    .set_modified(mtime)?;
                copied.push(dst);
            }
        }
    }
    Ok(copied)
}

fn is_stale(dst: &Path, src_mtime: SystemTime, src_size: u64) -> io::Result<bool> {
    let meta = match fs::metadata(dst) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    };
    Ok(meta.modified()? != src_mtime || meta.len() != src_size)
}
