//! Flattened tree reads: every regular file under a root, as one map from
//! absolute path to normalized content.

use rigg_types::{normalize_value, TargetError, TargetResult, TreeValues};

use crate::pathops::{path_kind, PathKind};
use crate::session::Session;
use crate::shell::sh_quote;

/// Read one file's raw content from the backend.
pub(crate) async fn read_value_raw(
    session: &dyn Session,
    path: &str,
    as_root: bool,
) -> TargetResult<String> {
    session
        .execute(&format!("cat {}", sh_quote(path)), as_root)
        .await
}

/// Read every regular file under `root` into a path → value map.
///
/// Keys are the full paths as enumerated on the backend (callers needing
/// basenames derive them), so identically-named files in different
/// subdirectories do not collide. Values are stripped of leading and
/// trailing whitespace; interior blank lines survive.
///
/// A `root` that is itself a regular file degenerates to a single-entry
/// map. Directories and symlinks are excluded from the values. Any entry
/// that cannot be read fails the whole call with `ReadError`: a partial
/// tree is a backend integrity failure, not a result. Transport-level
/// failures propagate unchanged.
pub async fn read_tree_values_flat(session: &dyn Session, root: &str) -> TargetResult<TreeValues> {
    match path_kind(session, root).await? {
        PathKind::Missing => Err(TargetError::PathNotFound(root.to_string())),
        PathKind::Other => Err(TargetError::Read(format!(
            "{root}: not a regular file or directory"
        ))),
        PathKind::File => {
            let raw = read_entry(session, root).await?;
            let mut values = TreeValues::new();
            values.insert(root.to_string(), normalize_value(&raw));
            Ok(values)
        }
        PathKind::Directory => {
            let listing = session
                .execute(&format!("find {} -type f", sh_quote(root)), false)
                .await?;

            let mut values = TreeValues::new();
            for path in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let raw = read_entry(session, path).await?;
                values.insert(path.to_string(), normalize_value(&raw));
            }
            tracing::debug!(root, entries = values.len(), "tree read complete");
            Ok(values)
        }
    }
}

/// Read one entry during a tree scan.
///
/// An entry that vanished mid-scan or is unreadable aborts the scan as
/// `ReadError`; transport failures keep their own variants.
async fn read_entry(session: &dyn Session, path: &str) -> TargetResult<String> {
    match read_value_raw(session, path, false).await {
        Ok(raw) => Ok(raw),
        Err(TargetError::PermissionDenied(detail)) | Err(TargetError::PathNotFound(detail)) => {
            Err(TargetError::Read(detail))
        }
        Err(e) => Err(e),
    }
}
