//! Local backend: commands run on this machine through `sh -c`.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use rigg_types::{LocalConfig, TargetError, TargetKind, TargetResult};

use super::{run_command, sudo_wrap, Session};

/// Session driving the local machine.
///
/// The "transport" is a child `sh` per command, so the local backend obeys
/// exactly the same contract as the remote ones.
#[derive(Debug)]
pub struct LocalSession {
    config: LocalConfig,
    timeout: Duration,
    connected_as_root: bool,
}

impl LocalSession {
    pub fn new(config: LocalConfig, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            connected_as_root: false,
        }
    }

    pub(crate) fn set_connected_as_root(&mut self, connected_as_root: bool) {
        self.connected_as_root = connected_as_root;
    }

    fn render(&self, command: &str, as_root: bool) -> TargetResult<String> {
        if as_root && !self.connected_as_root {
            if !self.config.sudo {
                return Err(TargetError::PermissionDenied(
                    "local session has no elevation support".to_string(),
                ));
            }
            return Ok(sudo_wrap(command));
        }
        Ok(command.to_string())
    }
}

#[async_trait]
impl Session for LocalSession {
    async fn execute(&self, command: &str, as_root: bool) -> TargetResult<String> {
        let rendered = self.render(command, as_root)?;
        tracing::debug!(kind = %self.kind(), command = %rendered, "executing");

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&rendered);
        run_command(cmd, &rendered, self.timeout).await
    }

    fn kind(&self) -> TargetKind {
        TargetKind::LocalHost
    }

    fn connected_as_root(&self) -> bool {
        self.connected_as_root
    }

    fn supports_elevation(&self) -> bool {
        self.connected_as_root || self.config.sudo
    }
}
