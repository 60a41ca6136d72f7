use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::debug;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BACKUP_EXTENSION: &str = ".bak";

const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Backup file already exists: '{0}'")]
    AlreadyExists(PathBuf),
    #[error("Not a file name: '{0}'")]
    NoFileName(PathBuf),
}

/// Builds the backup path for `path`, e.g. `dir/a.txt` -> `dir/a-2024_07_04_173256.txt.bak`.
pub fn backup_name(
    path: impl AsRef<Path>,
    backup_extension: &str,
    timestamp: &DateTime<Local>,
) -> Result<PathBuf> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .ok_or_else(|| BackupError::NoFileName(path.to_path_buf()))?
        .to_string_lossy();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let file_name = format!(
        "{stem}-{}{extension}{backup_extension}",
        timestamp.format(TIMESTAMP_FORMAT)
    );
    Ok(path.with_file_name(file_name))
}

/// Copies `path` next to itself under a timestamped `.bak` name and returns the new path.
pub fn backup_file(path: impl AsRef<Path>) -> Result<PathBuf> {
    backup_file_with_extension(path, DEFAULT_BACKUP_EXTENSION)
}

pub fn backup_file_with_extension(
    path: impl AsRef<Path>,
    backup_extension: &str,
) -> Result<PathBuf> {
    let path = path.as_ref();
    let backup = backup_name(path, backup_extension, &Local::now())?;
    if backup.exists() {
        return Err(BackupError::AlreadyExists(backup).into());
    }
    std::fs::copy(path, &backup)
        .with_context(|| format!("Failed to back up '{}'", path.display()))?;
    debug!("Backed up '{}' to '{}'", path.display(), backup.display());
    Ok(backup)
}

/// Lowercase hex SHA-256 of the file contents.
pub fn checksum(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let contents =
        std::fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))?;
    Ok(format!("{:x}", Sha256::digest(&contents)))
}
