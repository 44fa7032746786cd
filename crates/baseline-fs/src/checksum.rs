//! SHA-256 checksum utilities
//!
//! Checksums use the `sha256:<hex>` form and back the byte-identical file
//! comparison used for snapshot matching.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::{Error, Result};

const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of a file's contents.
pub fn compute_file_checksum(path: &Path) -> Result<String> {
    let content = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

/// True when both files exist and hold the same bytes.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let len_a = std::fs::metadata(a).map_err(|e| Error::io(a, e))?.len();
    let len_b = std::fs::metadata(b).map_err(|e| Error::io(b, e))?.len();
    if len_a != len_b {
        return Ok(false);
    }
    Ok(compute_file_checksum(a)? == compute_file_checksum(b)?)
}
