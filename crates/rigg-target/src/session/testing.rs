//! Test utilities for the session layer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use rigg_types::{TargetError, TargetKind, TargetResult};

use super::Session;

/// One command the scripted session was asked to run.
#[derive(Debug, Clone)]
pub struct ExecutedCommand {
    pub command: String,
    pub as_root: bool,
}

/// Session replaying canned responses, recording every command it is
/// given. Used to drive the core layers against any backend kind without a
/// real transport.
pub struct ScriptedSession {
    kind: TargetKind,
    connected_as_root: bool,
    elevation: bool,
    responses: Mutex<VecDeque<TargetResult<String>>>,
    log: Arc<Mutex<Vec<ExecutedCommand>>>,
}

impl ScriptedSession {
    pub fn new(kind: TargetKind) -> Self {
        Self {
            kind,
            connected_as_root: false,
            elevation: false,
            responses: Mutex::new(VecDeque::new()),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pretend the session can honor `as_root` requests.
    pub fn with_elevation(mut self) -> Self {
        self.elevation = true;
        self
    }

    /// Pretend the session already runs as uid 0.
    pub fn with_root(mut self) -> Self {
        self.connected_as_root = true;
        self.elevation = true;
        self
    }

    /// Queue a successful response.
    pub fn push_ok(&self, stdout: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(stdout.to_string()));
    }

    /// Queue a failure response.
    pub fn push_err(&self, err: TargetError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    /// Everything executed so far.
    pub fn executed(&self) -> Vec<ExecutedCommand> {
        self.log.lock().unwrap().clone()
    }

    /// Handle to the command log that survives moving the session into a
    /// target.
    pub fn log_handle(&self) -> Arc<Mutex<Vec<ExecutedCommand>>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn execute(&self, command: &str, as_root: bool) -> TargetResult<String> {
        self.log.lock().unwrap().push(ExecutedCommand {
            command: command.to_string(),
            as_root,
        });

        if as_root && !self.elevation {
            return Err(TargetError::PermissionDenied(
                "scripted session has no elevation support".to_string(),
            ));
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TargetError::Transport(format!(
                    "script exhausted at {command:?}"
                )))
            })
    }

    fn kind(&self) -> TargetKind {
        self.kind
    }

    fn connected_as_root(&self) -> bool {
        self.connected_as_root
    }

    fn supports_elevation(&self) -> bool {
        self.elevation
    }
}
