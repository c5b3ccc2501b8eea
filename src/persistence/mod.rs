//! Save/load persistence for JSON documents
//!
//! Features:
//! - Pretty-printed JSON via serde
//! - Parent directory creation on save
//! - Replace-on-write (tmp → target) so a crash never leaves a torn file
//!
//! Callers decide what a failure means; maps, settings and records all fall
//! back to defaults and only log.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised by the JSON file helpers
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PersistError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True when the file simply does not exist yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;

/// Read and decode a JSON document
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
    let value = serde_json::from_str(&text).map_err(|e| PersistError::json(path, e))?;
    log::debug!("Loaded {}", path.display());
    Ok(value)
}

/// Encode and write a JSON document, creating parent directories as needed
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|e| PersistError::json(path, e))?;

    let tmp = tmp_path(path);
    fs::write(&tmp, json).map_err(|e| PersistError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| PersistError::io(path, e))?;

    log::debug!("Saved {}", path.display());
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
