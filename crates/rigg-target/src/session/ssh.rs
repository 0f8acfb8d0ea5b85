//! Remote-host backend: commands run over SSH.
//!
//! The transport shells out to the `ssh` binary rather than speaking the
//! wire protocol itself; password auth routes through `sshpass`. Connection
//! establishment and key management stay with the ssh client config.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use rigg_types::{SshConfig, TargetError, TargetKind, TargetResult};

use super::{run_command, sudo_wrap, Session};

/// Session driving a remote host over SSH.
#[derive(Debug)]
pub struct SshSession {
    config: SshConfig,
    timeout: Duration,
    connected_as_root: bool,
}

impl SshSession {
    pub fn new(config: SshConfig, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            connected_as_root: false,
        }
    }

    pub(crate) fn set_connected_as_root(&mut self, connected_as_root: bool) {
        self.connected_as_root = connected_as_root;
    }

    /// Full argv for running `remote` on the host; first element is the
    /// program to spawn.
    fn argv(&self, remote: &str) -> Vec<String> {
        let mut argv: Vec<String> = Vec::new();
        if let Some(password) = &self.config.password {
            argv.extend(["sshpass".to_string(), "-p".to_string(), password.clone()]);
        }
        argv.push("ssh".to_string());
        argv.extend(["-p".to_string(), self.config.port.to_string()]);
        if self.config.password.is_none() {
            // Without sshpass there is nobody to answer a prompt.
            argv.extend(["-o".to_string(), "BatchMode=yes".to_string()]);
        }
        if !self.config.strict_host_check {
            argv.extend([
                "-o".to_string(),
                "StrictHostKeyChecking=no".to_string(),
                "-o".to_string(),
                "UserKnownHostsFile=/dev/null".to_string(),
            ]);
        }
        if let Some(keyfile) = &self.config.keyfile {
            argv.extend(["-i".to_string(), keyfile.clone()]);
        }
        argv.push(format!("{}@{}", self.config.username, self.config.host));
        argv.push("--".to_string());
        argv.push(remote.to_string());
        argv
    }

    fn render(&self, command: &str, as_root: bool) -> TargetResult<String> {
        if as_root && !self.connected_as_root {
            if !self.config.sudo {
                return Err(TargetError::PermissionDenied(format!(
                    "{}@{} has no elevation support",
                    self.config.username, self.config.host
                )));
            }
            return Ok(sudo_wrap(command));
        }
        Ok(command.to_string())
    }
}

#[async_trait]
impl Session for SshSession {
    async fn execute(&self, command: &str, as_root: bool) -> TargetResult<String> {
        let rendered = self.render(command, as_root)?;
        tracing::debug!(kind = %self.kind(), host = %self.config.host, command = %rendered, "executing");

        let argv = self.argv(&rendered);
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]);
        run_command(cmd, &rendered, self.timeout).await
    }

    fn kind(&self) -> TargetKind {
        TargetKind::RemoteHost
    }

    fn connected_as_root(&self) -> bool {
        self.connected_as_root
    }

    fn supports_elevation(&self) -> bool {
        self.connected_as_root || self.config.sudo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SshConfig {
        SshConfig::new("example.com", "username")
    }

    #[test]
    fn test_argv_key_auth() {
        let mut cfg = config();
        cfg.keyfile = Some("/home/user/.ssh/id_ed25519".to_string());
        let session = SshSession::new(cfg, Duration::from_secs(10));

        let argv = session.argv("uname -n");
        assert_eq!(argv[0], "ssh");
        assert!(argv.contains(&"BatchMode=yes".to_string()));
        assert!(argv.windows(2).any(|w| w[0] == "-i"));
        assert_eq!(argv[argv.len() - 3], "username@example.com");
        assert_eq!(argv.last().unwrap(), "uname -n");
    }

    #[test]
    fn test_argv_password_auth_uses_sshpass() {
        let mut cfg = config();
        cfg.password = Some("password".to_string());
        cfg.port = 8022;
        cfg.strict_host_check = false;
        let session = SshSession::new(cfg, Duration::from_secs(10));

        let argv = session.argv("id -u");
        assert_eq!(argv[0], "sshpass");
        assert_eq!(argv[1], "-p");
        assert_eq!(argv[2], "password");
        assert!(argv.windows(2).any(|w| w[0] == "-p" && w[1] == "8022"));
        assert!(argv.contains(&"StrictHostKeyChecking=no".to_string()));
        assert!(!argv.contains(&"BatchMode=yes".to_string()));
    }

    #[test]
    fn test_render_elevation() {
        let mut cfg = config();
        cfg.sudo = true;
        let session = SshSession::new(cfg, Duration::from_secs(10));
        assert_eq!(
            session.render("cat /etc/shadow", true).unwrap(),
            "sudo -n -- sh -c 'cat /etc/shadow'"
        );

        let plain = SshSession::new(config(), Duration::from_secs(10));
        assert!(matches!(
            plain.render("cat /etc/shadow", true),
            Err(TargetError::PermissionDenied(_))
        ));
    }
}
