//! Temp-path writes and rename-based replacement

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, Result};

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Read text content, treating a missing file as `None`.
pub fn read_text_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Temp file path next to `target`, so the final rename stays on one filesystem.
///
/// The name is `.<file>.<pid><suffix>`.
pub fn temp_path_for(target: &Path, suffix: &str) -> PathBuf {
    let temp_name = format!(
        ".{}.{}{}",
        target
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id(),
        suffix
    );
    target.with_file_name(temp_name)
}

/// Write `content` to `dest` under an exclusive advisory lock.
///
/// `dest` is expected to be a temp path chosen by the caller. Failures are
/// reported as [`Error::Write`]; the file the temp path stands in for is never
/// touched.
pub fn write_text(dest: &Path, content: &str) -> Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)
        .map_err(|e| Error::write(dest, e))?;

    file.lock_exclusive()
        .map_err(|_| Error::LockFailed { path: dest.to_path_buf() })?;

    file.write_all(content.as_bytes())
        .map_err(|e| Error::write(dest, e))?;
    file.sync_all().map_err(|e| Error::write(dest, e))?;

    file.unlock()
        .map_err(|_| Error::LockFailed { path: dest.to_path_buf() })?;

    tracing::debug!(path = %dest.display(), bytes = content.len(), "wrote temp file");
    Ok(())
}

/// Rename `temp` over `target`, carrying over the target's permissions.
pub fn replace(temp: &Path, target: &Path) -> Result<()> {
    if let Ok(meta) = fs::metadata(target) {
        fs::set_permissions(temp, meta.permissions()).map_err(|e| Error::io(temp, e))?;
    }
    fs::rename(temp, target).map_err(|e| Error::io(target, e))?;
    tracing::debug!(from = %temp.display(), to = %target.display(), "replaced file");
    Ok(())
}

/// Plain copy of `src` onto `dest`, creating parent directories.
///
/// Not atomic: a failure part-way leaves `dest` in an unknown state.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::copy(src, dest).map_err(|e| Error::io(dest, e))?;
    Ok(())
}
