//! Device backend: commands run through `adb shell`.
//!
//! Requires an adb new enough to propagate the remote exit status (shell
//! protocol v2); with older servers every remote command looks successful.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use rigg_types::{AdbConfig, TargetError, TargetKind, TargetResult};

use super::{run_command, su_wrap, Session};

/// Session driving a device over the adb bridge.
#[derive(Debug)]
pub struct AdbSession {
    config: AdbConfig,
    timeout: Duration,
    connected_as_root: bool,
    has_su: bool,
}

impl AdbSession {
    pub fn new(config: AdbConfig, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            connected_as_root: false,
            has_su: false,
        }
    }

    pub(crate) fn set_connected_as_root(&mut self, connected_as_root: bool) {
        self.connected_as_root = connected_as_root;
    }

    pub(crate) fn set_has_su(&mut self, has_su: bool) {
        self.has_su = has_su;
    }

    fn argv(&self, remote: &str) -> Vec<String> {
        vec![
            "adb".to_string(),
            "-s".to_string(),
            self.config.serial.clone(),
            "shell".to_string(),
            remote.to_string(),
        ]
    }

    fn render(&self, command: &str, as_root: bool) -> TargetResult<String> {
        if as_root && !self.connected_as_root {
            if !self.has_su {
                return Err(TargetError::PermissionDenied(format!(
                    "device {} has no su binary",
                    self.config.serial
                )));
            }
            return Ok(su_wrap(command));
        }
        Ok(command.to_string())
    }
}

#[async_trait]
impl Session for AdbSession {
    async fn execute(&self, command: &str, as_root: bool) -> TargetResult<String> {
        let rendered = self.render(command, as_root)?;
        tracing::debug!(kind = %self.kind(), serial = %self.config.serial, command = %rendered, "executing");

        let argv = self.argv(&rendered);
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]);
        run_command(cmd, &rendered, self.timeout).await
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Device
    }

    fn connected_as_root(&self) -> bool {
        self.connected_as_root
    }

    fn supports_elevation(&self) -> bool {
        self.connected_as_root || self.has_su
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AdbSession {
        AdbSession::new(
            AdbConfig {
                serial: "0123456789A".to_string(),
            },
            Duration::from_secs(10),
        )
    }

    #[test]
    fn test_argv_targets_serial() {
        let argv = session().argv("id -u");
        assert_eq!(argv, ["adb", "-s", "0123456789A", "shell", "id -u"]);
    }

    #[test]
    fn test_render_uses_su_when_available() {
        let mut s = session();
        s.set_has_su(true);
        assert_eq!(s.render("id -u", true).unwrap(), "su 0 sh -c 'id -u'");
    }

    #[test]
    fn test_render_without_su_is_denied() {
        let err = session().render("id -u", true).unwrap_err();
        assert!(matches!(err, TargetError::PermissionDenied(_)));
    }

    #[test]
    fn test_rooted_device_needs_no_wrapper() {
        let mut s = session();
        s.set_connected_as_root(true);
        assert_eq!(s.render("id -u", true).unwrap(), "id -u");
        assert!(s.supports_elevation());
    }
}
