//! Atomic file replacement.

use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Write `bytes` to `path` so that readers only ever see the old or the new
/// contents.
///
/// The data goes to a temporary file in the destination directory, is synced,
/// then renamed over `path`. On failure the temporary file is removed and any
/// existing file at `path` is left as it was.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| crate::error::FxStackError::Serialization(e.to_string()))?;
    atomic_write(path, &bytes)
}
