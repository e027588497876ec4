//! Filename resolution under the store's base directory.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::{Result, StoreError};

/// Resolves `filename` against `base`, normalizing `.` and `..` lexically.
///
/// Root and prefix components of `filename` are ignored, so absolute names
/// still land under `base`. A `..` that would climb out of `base` is rejected.
pub(crate) fn resolve(base: &Path, filename: &Path) -> Result<PathBuf> {
    if filename.as_os_str().is_empty() {
        return Err(StoreError::InvalidPath("empty filename".to_string()));
    }
    if filename.to_string_lossy().contains('\0') {
        warn!(
            path = %filename.to_string_lossy().replace('\0', "\\0"),
            reason = "null_byte",
            "Rejected persistence filename"
        );
        return Err(StoreError::InvalidPath(
            "filename contains a null byte".to_string(),
        ));
    }

    let mut relative = PathBuf::new();
    for component in filename.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                if !relative.pop() {
                    warn!(
                        path = %filename.display(),
                        reason = "directory_escape",
                        "Rejected persistence filename"
                    );
                    return Err(StoreError::InvalidPath(format!(
                        "{} escapes the base directory",
                        filename.display()
                    )));
                }
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(StoreError::InvalidPath(format!(
            "{} does not name a file",
            filename.display()
        )));
    }

    Ok(normalize(base).join(relative))
}

/// Lexically cleans a base directory: drops `.` and folds `..` where possible.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
