//! File-system helpers shared by resources and the workspace initialiser.
//!
//! Failures are reported as [`ProvisionError::Filesystem`](crate::error::ProvisionError).
use anyhow::Result;
use std::path::Path;

use crate::error::IoResultExt as _;
use crate::logging::Log;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).fs_context("create directory", parent)?;
    }
    Ok(())
}

/// Remove an existing file or symlink at `path`, including broken symlinks.
/// Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    if path.symlink_metadata().is_ok() {
        std::fs::remove_file(path).fs_context("remove", path)?;
    }
    Ok(())
}

/// Best-effort removal of a partially written download.
///
/// A failure is logged at debug level and otherwise ignored, so the
/// original download error is the one reported.
pub fn discard_partial(path: &Path, log: &dyn Log) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        log.debug(&format!("could not remove {}: {e}", path.display()));
    }
}

/// Delete `dir` and everything under it if present, then create it empty.
///
/// A symlink at `dir` is removed rather than followed.
///
/// # Errors
///
/// Returns an error if removal or creation fails.
pub fn recreate_dir(dir: &Path) -> Result<()> {
    match dir.symlink_metadata() {
        Ok(meta) if meta.is_dir() => {
            std::fs::remove_dir_all(dir).fs_context("remove directory", dir)?;
        }
        Ok(_) => remove_existing(dir)?,
        Err(_) => {}
    }
    std::fs::create_dir_all(dir).fs_context("create directory", dir)?;
    Ok(())
}

/// Whether `dir` holds any entry other than those named in `ignore`.
///
/// A missing directory counts as empty.
///
/// # Errors
///
/// Returns an error if `dir` exists but cannot be listed.
pub fn has_entries_besides(dir: &Path, ignore: &[&str]) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    for entry in std::fs::read_dir(dir).fs_context("read directory", dir)? {
        let entry = entry.fs_context("read directory", dir)?;
        if !ignore.iter().any(|name| entry.file_name() == **name) {
            return Ok(true);
        }
    }
    Ok(false)
}
