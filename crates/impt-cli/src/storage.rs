//! JSON file persistence shared by the auth and project configs
//!
//! Files are read whole and rewritten whole. Writes go to a sibling temporary
//! file that is renamed over the target, so a crashed write never leaves a
//! half-written config behind.

use crate::error::{CliError, ConfigKind, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read and parse a JSON config file.
///
/// Returns `Ok(None)` when the file does not exist. A file that exists but
/// cannot be read or parsed as `T` is a corrupted config.
pub async fn read_json_file<T: DeserializeOwned>(
    path: &Path,
    kind: ConfigKind,
) -> Result<Option<T>> {
    if !path.exists() {
        debug!("{} config not found at {}", kind, path.display());
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| corrupted(kind, path, e.to_string()))?;

    let value = serde_json::from_str(&content).map_err(|e| corrupted(kind, path, e.to_string()))?;

    debug!("Loaded {} config from {}", kind, path.display());
    Ok(Some(value))
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it
pub async fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(value)?;
    let tmp_path = temporary_path(path);

    tokio::fs::write(&tmp_path, content).await?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }

    debug!("Saved config to {}", path.display());
    Ok(())
}

/// Remove a config file; a missing file is not an error
pub async fn remove_file(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

fn corrupted(kind: ConfigKind, path: &Path, reason: String) -> CliError {
    CliError::CorruptedConfig {
        kind,
        path: path.to_path_buf(),
        reason,
    }
}
