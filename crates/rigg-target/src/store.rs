//! Single-value writes with optional verification and elevation.

use rigg_types::{normalize_value, TargetError, TargetResult};

use crate::pathops::{path_kind, PathKind};
use crate::session::Session;
use crate::shell::{posix_parent, sh_quote};
use crate::tree::read_value_raw;

/// Write `content` to `path`, creating or overwriting exactly one file.
///
/// With `verify`, the value is immediately read back and compared after
/// the same normalization a tree read applies; a mismatch fails with
/// `VerificationError`. With `as_root`, the write runs elevated; sessions
/// without that capability fail with `PermissionDenied` before anything
/// touches the backend.
pub async fn write_value(
    session: &dyn Session,
    path: &str,
    content: &str,
    verify: bool,
    as_root: bool,
) -> TargetResult<()> {
    if as_root && !session.supports_elevation() {
        return Err(TargetError::PermissionDenied(format!(
            "{} session cannot elevate to write {path}",
            session.kind()
        )));
    }

    if let Some(parent) = posix_parent(path) {
        if path_kind(session, parent).await? != PathKind::Directory {
            return Err(TargetError::PathNotFound(parent.to_string()));
        }
    }

    let cmd = format!("printf '%s' {} > {}", sh_quote(content), sh_quote(path));
    session.execute(&cmd, as_root).await?;

    if verify {
        let raw = read_value_raw(session, path, as_root).await?;
        let actual = normalize_value(&raw);
        let expected = normalize_value(content);
        if actual != expected {
            return Err(TargetError::Verification {
                path: path.to_string(),
                expected,
                actual,
            });
        }
        tracing::debug!(path, "write verified");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::ScriptedSession;
    use rigg_types::TargetKind;

    #[tokio::test]
    async fn test_write_renders_printf_redirect() {
        let session = ScriptedSession::new(TargetKind::RemoteHost);
        session.push_ok("directory\n");
        session.push_ok("");

        write_value(&session, "/tmp/d/test2", "2\n\n", false, false)
            .await
            .unwrap();

        let executed = session.executed();
        assert_eq!(executed[1].command, "printf '%s' '2\n\n' > /tmp/d/test2");
        assert!(!executed[1].as_root);
    }

    #[tokio::test]
    async fn test_as_root_without_elevation_writes_nothing() {
        let session = ScriptedSession::new(TargetKind::LocalHost);

        let err = write_value(&session, "/tmp/d/f", "v", false, true)
            .await
            .unwrap_err();
        assert!(matches!(err, TargetError::PermissionDenied(_)));
        // Fails fast: no probe, no write reached the backend.
        assert!(session.executed().is_empty());
    }

    #[tokio::test]
    async fn test_as_root_writes_through_elevated_session() {
        let session = ScriptedSession::new(TargetKind::Device).with_elevation();
        session.push_ok("directory\n");
        session.push_ok("");

        write_value(&session, "/data/local/tmp/f", "v", false, true)
            .await
            .unwrap();

        let executed = session.executed();
        assert!(executed[1].as_root);
    }

    #[tokio::test]
    async fn test_missing_parent_fails() {
        let session = ScriptedSession::new(TargetKind::RemoteHost);
        session.push_ok("missing\n");

        let err = write_value(&session, "/tmp/nope/f", "v", false, false)
            .await
            .unwrap_err();
        match err {
            TargetError::PathNotFound(parent) => assert_eq!(parent, "/tmp/nope"),
            other => panic!("expected PathNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_verify_round_trip() {
        let session = ScriptedSession::new(TargetKind::RemoteHost);
        session.push_ok("directory\n");
        session.push_ok("");
        // Read-back carries the trailing padding the file really has.
        session.push_ok("2\n\n");

        write_value(&session, "/tmp/d/test2", "2\n\n", true, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_verify_mismatch_fails() {
        let session = ScriptedSession::new(TargetKind::RemoteHost);
        session.push_ok("directory\n");
        session.push_ok("");
        session.push_ok("corrupted");

        let err = write_value(&session, "/tmp/d/test1", "1", true, false)
            .await
            .unwrap_err();
        match err {
            TargetError::Verification {
                path,
                expected,
                actual,
            } => {
                assert_eq!(path, "/tmp/d/test1");
                assert_eq!(expected, "1");
                assert_eq!(actual, "corrupted");
            }
            other => panic!("expected verification failure, got {other:?}"),
        }
    }
}
