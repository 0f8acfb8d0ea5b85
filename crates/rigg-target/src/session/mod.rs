//! Session trait for abstracting rigg's transport layer.
//!
//! A session executes one shell command on its backend and returns the
//! command's stdout. Four implementations are provided:
//!
//! - `LocalSession`: local processes through `sh -c`
//! - `SshSession`: a remote host through the `ssh` binary
//! - `AdbSession`: a device through `adb shell`
//! - `QemuSession`: a virtualized guest through a forwarded SSH port
//!
//! # Architecture
//!
//! ```text
//! Target (makedirs, write_value, read_tree_values_flat, remove, execute)
//!     ↓
//! store / tree / pathops over &dyn Session
//!     ↓
//! ┌──────────────┬─────────────┬─────────────┬──────────────────────┐
//! │ LocalSession │ SshSession  │ AdbSession  │ QemuSession          │
//! │ sh -c        │ ssh binary  │ adb shell   │ ssh + guest lifetime │
//! └──────────────┴─────────────┴─────────────┴──────────────────────┘
//! ```

mod adb;
mod local;
mod qemu;
mod ssh;

pub use adb::AdbSession;
pub use local::LocalSession;
pub use qemu::QemuSession;
pub use ssh::SshSession;

#[cfg(test)]
pub mod testing;

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use rigg_types::{TargetConfig, TargetError, TargetKind, TargetResult};

use crate::shell::sh_quote;

/// Abstract command-execution channel to one backend.
///
/// Sessions are `Send + Sync` so independent targets can be driven from
/// separate tasks; a single session does not serialize concurrent callers
/// and must be driven one operation at a time.
#[async_trait]
pub trait Session: Send + Sync {
    /// Execute a shell command on the backend and return its stdout.
    ///
    /// With `as_root` the command runs elevated; sessions without that
    /// capability fail with `PermissionDenied` before running anything.
    async fn execute(&self, command: &str, as_root: bool) -> TargetResult<String>;

    /// Which backend kind this session drives.
    fn kind(&self) -> TargetKind;

    /// True when the session's commands already run as uid 0.
    fn connected_as_root(&self) -> bool;

    /// True when `as_root` requests can be honored.
    fn supports_elevation(&self) -> bool {
        self.connected_as_root()
    }
}

/// Build and probe a session for the configured backend.
///
/// Probing runs `id -u` through the fresh session (and, for devices that
/// are not already root, checks for `su`), so the caller learns the real
/// privilege state instead of trusting the config.
pub async fn connect(config: &TargetConfig) -> TargetResult<Box<dyn Session>> {
    let timeout = config.timeout();
    match &config.connection {
        rigg_types::ConnectionConfig::Local(local) => {
            let mut session = LocalSession::new(local.clone(), timeout);
            let as_root = probe_root(&session).await?;
            session.set_connected_as_root(as_root);
            Ok(Box::new(session))
        }
        rigg_types::ConnectionConfig::Ssh(ssh) => {
            let mut session = SshSession::new(ssh.clone(), timeout);
            let as_root = probe_root(&session).await?;
            session.set_connected_as_root(as_root);
            Ok(Box::new(session))
        }
        rigg_types::ConnectionConfig::Adb(adb) => {
            let mut session = AdbSession::new(adb.clone(), timeout);
            let as_root = probe_root(&session).await?;
            session.set_connected_as_root(as_root);
            if !as_root {
                let has_su = probe_su(&session).await?;
                session.set_has_su(has_su);
            }
            Ok(Box::new(session))
        }
        rigg_types::ConnectionConfig::Qemu(qemu) => {
            let mut ssh = SshSession::new(qemu.ssh.clone(), timeout);
            let as_root = probe_root(&ssh).await?;
            ssh.set_connected_as_root(as_root);
            Ok(Box::new(QemuSession::new(ssh)))
        }
    }
}

async fn probe_root(session: &dyn Session) -> TargetResult<bool> {
    let uid = session.execute("id -u", false).await?;
    Ok(uid.trim() == "0")
}

async fn probe_su(session: &dyn Session) -> TargetResult<bool> {
    let out = session
        .execute("command -v su >/dev/null 2>&1 && echo yes || echo no", false)
        .await?;
    Ok(out.trim() == "yes")
}

/// Wrap a command for passwordless sudo elevation on host-style backends.
pub(crate) fn sudo_wrap(command: &str) -> String {
    format!("sudo -n -- sh -c {}", sh_quote(command))
}

/// Wrap a command for `su`-based elevation on device backends.
pub(crate) fn su_wrap(command: &str) -> String {
    format!("su 0 sh -c {}", sh_quote(command))
}

/// Run a transport process to completion and classify the result.
///
/// The deadline covers the whole command; on expiry the child is killed and
/// the caller gets `TransportTimeout` unchanged (no retry at this layer).
pub(crate) async fn run_command(
    mut cmd: Command,
    rendered: &str,
    deadline: Duration,
) -> TargetResult<String> {
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);

    let output = match tokio::time::timeout(deadline, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(TargetError::Transport(format!(
                "failed to spawn transport for {rendered:?}: {e}"
            )))
        }
        Err(_) => return Err(TargetError::TransportTimeout(deadline)),
    };

    finish_output(rendered, output)
}

fn finish_output(command: &str, output: std::process::Output) -> TargetResult<String> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(classify_failure(command, output.status.code(), stderr.trim()))
}

/// Map a failed command to the shared taxonomy from its stderr.
///
/// Backends disagree on exit codes but POSIX tools agree on these phrases,
/// which keeps classification uniform across kinds.
fn classify_failure(command: &str, code: Option<i32>, stderr: &str) -> TargetError {
    if stderr.contains("Permission denied") || stderr.contains("Operation not permitted") {
        TargetError::PermissionDenied(format!("{command}: {stderr}"))
    } else if stderr.contains("No such file or directory") {
        TargetError::PathNotFound(format!("{command}: {stderr}"))
    } else {
        let code = code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        TargetError::Transport(format!("{command:?} exited {code}: {stderr}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permission_denied() {
        let err = classify_failure("touch /root/x", Some(1), "touch: /root/x: Permission denied");
        assert!(matches!(err, TargetError::PermissionDenied(_)));
    }

    #[test]
    fn test_classify_path_not_found() {
        let err = classify_failure("cat /gone", Some(1), "cat: /gone: No such file or directory");
        assert!(matches!(err, TargetError::PathNotFound(_)));
    }

    #[test]
    fn test_classify_other_failure() {
        let err = classify_failure("false", Some(1), "");
        match err {
            TargetError::Transport(detail) => assert!(detail.contains("exited 1")),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn test_elevation_wrappers_quote_the_command() {
        assert_eq!(
            sudo_wrap("printf '%s' x > /etc/f"),
            "sudo -n -- sh -c 'printf '\\''%s'\\'' x > /etc/f'"
        );
        assert_eq!(su_wrap("id -u"), "su 0 sh -c 'id -u'");
    }
}
