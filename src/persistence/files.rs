use super::error::StoreError;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Directory name used under the platform data/config locations
pub const APP_DIR_NAME: &str = "tasklist";

/// Task file used when no user is active
pub const DEFAULT_TASKS_FILE: &str = "tasks.json";

/// Platform data directory for task files (e.g. ~/.local/share/tasklist)
pub fn default_data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine data directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Platform config directory for settings (e.g. ~/.config/tasklist)
pub fn default_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`
pub fn sanitize_username(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name holding a user's tasks ("tasks.json" when no user is active)
pub fn tasks_file_name(username: &str) -> String {
    if username.is_empty() {
        DEFAULT_TASKS_FILE.to_string()
    } else {
        format!("tasks_{}.json", sanitize_username(username))
    }
}

/// Full path of a user's task file inside `data_dir`
pub fn tasks_file(data_dir: &Path, username: &str) -> PathBuf {
    data_dir.join(tasks_file_name(username))
}

/// Atomically write content to a file using temp file + rename.
///
/// The parent directory is created if missing. On failure the previous file
/// content is left as it was.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<(), StoreError> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .ok_or_else(|| StoreError::NoParent {
            path: path.to_path_buf(),
        })?;

    let write_err = |source: std::io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(write_err)?;

    // Temp file must live in the same directory for the rename to be atomic
    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(content.as_bytes()).map_err(write_err)?;
    temp_file.as_file().sync_all().map_err(write_err)?;
    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Read file content; `None` when the file doesn't exist
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Option<String>, StoreError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })
}
