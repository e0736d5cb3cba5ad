//! Resolves the directory a download is written to, confined to the workspace root.

use crate::error::{PersistError, PersistErrorCode};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Validates `target_path` against `workspace_path` and makes sure the directory exists.
///
/// The raw `..` prefix check runs before any path handling. The join is then
/// normalized lexically and must stay under the workspace root. Existence check and
/// creation are not atomic; a concurrent delete in between surfaces as
/// `DIRECTORY_CREATE_FAILED`.
pub async fn prepare_target_path(workspace_path: &str, target_path: &str) -> Result<PathBuf, PersistError> {
    let full_path = resolve_target_path(workspace_path, target_path)?;

    match tokio::fs::metadata(&full_path).await {
        Ok(meta) if meta.is_dir() => return Ok(full_path),
        Ok(_) => debug!("{} exists but is not a directory", full_path.display()),
        Err(e) => debug!("{} not accessible ({e}), creating", full_path.display()),
    }

    tokio::fs::create_dir_all(&full_path).await.map_err(|e| {
        PersistError::new(
            PersistErrorCode::DirectoryCreateFailed,
            format!("Failed to create directory: {e}"),
        )
    })?;

    Ok(full_path)
}

/// Pure half of [`prepare_target_path`]; never touches the filesystem.
pub fn resolve_target_path(workspace_path: &str, target_path: &str) -> Result<PathBuf, PersistError> {
    if target_path.starts_with("..") {
        return Err(outside_workspace());
    }

    let workspace = Path::new(workspace_path);
    if !workspace.is_absolute() {
        return Err(PersistError::new(
            PersistErrorCode::InvalidPath,
            "Workspace path must be absolute",
        ));
    }

    let target = Path::new(target_path);
    if target.has_root() {
        return Err(outside_workspace());
    }

    let root = normalize(workspace);
    let full = normalize(&workspace.join(target));
    if !full.starts_with(&root) {
        return Err(outside_workspace());
    }
    Ok(full)
}

fn outside_workspace() -> PersistError {
    PersistError::new(
        PersistErrorCode::InvalidPath,
        "Target path must be within the project directory",
    )
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
