use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn ledgerlift_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ledgerlift"))
}

pub fn ensure_ledgerlift_home() -> Result<PathBuf> {
    let dir = ledgerlift_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Read a statement file, refusing anything above `max_bytes`.
///
/// The engine holds the whole workbook in memory, so the size cap lives here.
pub fn read_statement(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let len = fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    if len > max_bytes {
        anyhow::bail!(
            "{} is {} bytes; the limit is {} (set max_file_bytes in config.toml)",
            path.display(),
            len,
            max_bytes
        );
    }
    fs::read(path).with_context(|| format!("read {}", path.display()))
}
