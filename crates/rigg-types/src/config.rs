//! Connection descriptors and target configuration.
//!
//! The backend kind is fixed at construction: a config deserializes to one
//! concrete connection variant and never transitions to another kind at
//! runtime.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The four backend kinds a target can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A physical device behind a device bridge (adb).
    Device,
    /// A remote machine reached over SSH.
    RemoteHost,
    /// This machine, driven through a local shell.
    LocalHost,
    /// An emulated guest reached over a host-forwarded SSH port.
    VirtualizedHost,
}

impl TargetKind {
    /// Human-readable OS identifier for this kind.
    pub fn os(&self) -> &'static str {
        match self {
            TargetKind::Device => "android",
            _ => "linux",
        }
    }

    /// Stable lowercase name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Device => "device",
            TargetKind::RemoteHost => "remote_host",
            TargetKind::LocalHost => "local_host",
            TargetKind::VirtualizedHost => "virtualized_host",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local shell connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Allow elevation through passwordless sudo.
    #[serde(default)]
    pub sudo: bool,
}

/// SSH connection to a remote host (or to a forwarded guest port).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshConfig {
    pub host: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    pub username: String,
    /// Password auth routes the ssh invocation through sshpass.
    #[serde(default)]
    pub password: Option<String>,
    /// Identity file passed as `ssh -i`.
    #[serde(default)]
    pub keyfile: Option<String>,
    /// When false, host key checking is disabled entirely.
    #[serde(default = "default_true")]
    pub strict_host_check: bool,
    /// Allow elevation through passwordless sudo on the remote side.
    #[serde(default)]
    pub sudo: bool,
}

impl SshConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_ssh_port(),
            username: username.into(),
            password: None,
            keyfile: None,
            strict_host_check: true,
            sudo: false,
        }
    }
}

/// Device bridge connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdbConfig {
    /// Device serial as shown by `adb devices`.
    pub serial: String,
}

/// Virtualized guest connection. Booting the image is the embedder's job;
/// this only describes the forwarded SSH endpoint of an already-running
/// guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QemuConfig {
    pub ssh: SshConfig,
}

/// One connection descriptor per backend kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConnectionConfig {
    Local(LocalConfig),
    Ssh(SshConfig),
    Adb(AdbConfig),
    Qemu(QemuConfig),
}

impl ConnectionConfig {
    /// The backend kind this connection binds to.
    pub fn kind(&self) -> TargetKind {
        match self {
            ConnectionConfig::Local(_) => TargetKind::LocalHost,
            ConnectionConfig::Ssh(_) => TargetKind::RemoteHost,
            ConnectionConfig::Adb(_) => TargetKind::Device,
            ConnectionConfig::Qemu(_) => TargetKind::VirtualizedHost,
        }
    }
}

/// Full target configuration: how to reach the backend plus where the
/// target may write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub connection: ConnectionConfig,
    /// Scratch directory on the backend filesystem. Created at connect time
    /// if missing; must be writable.
    pub working_directory: String,
    /// Per-command transport deadline, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TargetConfig {
    pub fn new(connection: ConnectionConfig, working_directory: impl Into<String>) -> Self {
        Self {
            connection,
            working_directory: working_directory.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// The transport deadline as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_ssh_port() -> u16 {
    22
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    120
}
