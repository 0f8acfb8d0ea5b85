//! rigg-target: one surface over many execution backends.
//!
//! This crate provides:
//!
//! - **Session**: the transport trait (run a shell command on a backend,
//!   get its stdout) with local, SSH, adb, and virtualized-guest backends
//! - **Target**: the facade composing path operations, the value store, and
//!   the tree reader behind a kind-independent API
//! - **store / tree / pathops**: the filesystem operations themselves,
//!   written against `&dyn Session` so every backend shares one semantics
//! - **shell**: POSIX quoting for embedding values and paths in commands
//! - **naming**: deterministic unique-name generation for scratch paths

pub mod naming;
pub mod pathops;
pub mod session;
pub mod shell;
pub mod store;
pub mod target;
pub mod tree;

pub use session::{AdbSession, LocalSession, QemuSession, Session, SshSession};
pub use target::Target;

// Re-export the data crate so embedders can depend on rigg-target alone.
pub use rigg_types::{
    normalize_value, AdbConfig, ConnectionConfig, LocalConfig, QemuConfig, SshConfig,
    TargetConfig, TargetError, TargetKind, TargetResult, TreeValues,
};
