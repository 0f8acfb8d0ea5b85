//! Directory creation and recursive removal, delegated through a session.

use rigg_types::{TargetError, TargetResult};

use crate::session::Session;
use crate::shell::sh_quote;

/// What a path on the backend currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathKind {
    Missing,
    Directory,
    File,
    Other,
}

/// Probe a path with one round trip.
pub(crate) async fn path_kind(session: &dyn Session, path: &str) -> TargetResult<PathKind> {
    let q = sh_quote(path);
    let cmd = format!(
        "if [ -d {q} ]; then echo directory; \
         elif [ -f {q} ]; then echo file; \
         elif [ -e {q} ] || [ -L {q} ]; then echo other; \
         else echo missing; fi"
    );
    let out = session.execute(&cmd, false).await?;
    match out.trim() {
        "directory" => Ok(PathKind::Directory),
        "file" => Ok(PathKind::File),
        "other" => Ok(PathKind::Other),
        "missing" => Ok(PathKind::Missing),
        unexpected => Err(TargetError::Transport(format!(
            "unexpected probe output for {path}: {unexpected:?}"
        ))),
    }
}

/// True if `path` exists on the backend, whatever its kind.
pub async fn exists(session: &dyn Session, path: &str) -> TargetResult<bool> {
    Ok(path_kind(session, path).await? != PathKind::Missing)
}

/// Create `path` and all missing parents.
///
/// Idempotent: an existing directory succeeds silently. A path that exists
/// as anything else fails with `PathConflict`.
pub async fn makedirs(session: &dyn Session, path: &str) -> TargetResult<()> {
    match path_kind(session, path).await? {
        PathKind::Directory => Ok(()),
        PathKind::File | PathKind::Other => Err(TargetError::PathConflict(path.to_string())),
        PathKind::Missing => {
            session
                .execute(&format!("mkdir -p {}", sh_quote(path)), false)
                .await?;
            Ok(())
        }
    }
}

/// Recursively delete `path` and everything beneath it.
///
/// Removing a missing path is an error, not a no-op: double-removal
/// surfaces as a bug instead of being masked. Callers wanting idempotent
/// delete check `exists` first.
pub async fn remove(session: &dyn Session, path: &str) -> TargetResult<()> {
    if !exists(session, path).await? {
        return Err(TargetError::PathNotFound(path.to_string()));
    }
    session
        .execute(&format!("rm -rf -- {}", sh_quote(path)), false)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::ScriptedSession;
    use rigg_types::TargetKind;

    #[tokio::test]
    async fn test_makedirs_skips_mkdir_for_existing_directory() {
        let session = ScriptedSession::new(TargetKind::RemoteHost);
        session.push_ok("directory\n");

        makedirs(&session, "/tmp/rigg-target").await.unwrap();
        assert_eq!(session.executed().len(), 1);
    }

    #[tokio::test]
    async fn test_makedirs_conflict_on_file() {
        let session = ScriptedSession::new(TargetKind::Device);
        session.push_ok("file\n");

        let err = makedirs(&session, "/data/local/tmp/f").await.unwrap_err();
        assert!(matches!(err, TargetError::PathConflict(_)));
        // The probe ran; mkdir never did.
        assert_eq!(session.executed().len(), 1);
    }

    #[tokio::test]
    async fn test_makedirs_creates_missing_path() {
        let session = ScriptedSession::new(TargetKind::RemoteHost);
        session.push_ok("missing\n");
        session.push_ok("");

        makedirs(&session, "/tmp/new dir").await.unwrap();
        let executed = session.executed();
        assert_eq!(executed[1].command, "mkdir -p '/tmp/new dir'");
    }

    #[tokio::test]
    async fn test_remove_missing_path_is_an_error() {
        let session = ScriptedSession::new(TargetKind::LocalHost);
        session.push_ok("missing\n");

        let err = remove(&session, "/tmp/gone").await.unwrap_err();
        assert!(matches!(err, TargetError::PathNotFound(_)));
        assert_eq!(session.executed().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_existing_path_issues_rm() {
        let session = ScriptedSession::new(TargetKind::VirtualizedHost);
        session.push_ok("directory\n");
        session.push_ok("");

        remove(&session, "/tmp/rigg-target").await.unwrap();
        let executed = session.executed();
        assert_eq!(executed[1].command, "rm -rf -- /tmp/rigg-target");
    }
}
