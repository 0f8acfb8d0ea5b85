//! Virtualized-guest backend.
//!
//! The guest is reached over a host-forwarded SSH port; booting the image
//! is the embedder's job. What this session adds on top of plain SSH is
//! the guest lifecycle: `poweroff` is a terminal operation, and every call
//! after it fails with `TargetError::Unavailable`.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use rigg_types::{TargetError, TargetKind, TargetResult};

use super::{Session, SshSession};

/// Session driving an emulated guest behind a forwarded SSH port.
pub struct QemuSession {
    inner: Box<dyn Session>,
    alive: AtomicBool,
}

impl QemuSession {
    pub fn new(ssh: SshSession) -> Self {
        Self::wrapping(Box::new(ssh))
    }

    pub(crate) fn wrapping(inner: Box<dyn Session>) -> Self {
        Self {
            inner,
            alive: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl Session for QemuSession {
    async fn execute(&self, command: &str, as_root: bool) -> TargetResult<String> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(TargetError::Unavailable(
                "guest has been powered off".to_string(),
            ));
        }

        if command.trim() == "poweroff" {
            tracing::info!("powering off guest");
            // The guest drops the connection while halting; a transport
            // failure here is the expected shape of success. A rejected
            // poweroff (e.g. not root) leaves the guest alive.
            return match self.inner.execute(command, as_root).await {
                Ok(_) => {
                    self.alive.store(false, Ordering::SeqCst);
                    Ok(String::new())
                }
                Err(TargetError::Transport(_)) | Err(TargetError::TransportTimeout(_)) => {
                    self.alive.store(false, Ordering::SeqCst);
                    Ok(String::new())
                }
                Err(e) => Err(e),
            };
        }

        self.inner.execute(command, as_root).await
    }

    fn kind(&self) -> TargetKind {
        TargetKind::VirtualizedHost
    }

    fn connected_as_root(&self) -> bool {
        self.inner.connected_as_root()
    }

    fn supports_elevation(&self) -> bool {
        self.inner.supports_elevation()
    }
}
