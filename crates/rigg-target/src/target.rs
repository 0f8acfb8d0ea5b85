//! The Target facade: one surface, many backends.
//!
//! A Target owns one session exclusively and composes the value store, the
//! tree reader, and the path operations behind a kind-independent API. The
//! backend kind is fixed at construction; the same calling code runs
//! unmodified against a device, a remote host, the local machine, or a
//! virtualized guest.

use rigg_types::{TargetConfig, TargetKind, TargetResult, TreeValues};

use crate::pathops;
use crate::session::{self, Session};
use crate::shell::sh_quote;
use crate::store;
use crate::tree;

/// Handle to one controllable execution environment.
///
/// Operations block the caller until the backend responds. A Target does
/// not serialize concurrent callers; drive it one operation at a time.
/// Independent Targets are fully isolated and may run from separate tasks.
pub struct Target {
    session: Box<dyn Session>,
    kind: TargetKind,
    working_directory: String,
    os: String,
    hostname: String,
    owns_workdir: bool,
}

impl Target {
    /// Connect to the backend described by `config`.
    ///
    /// Probes the privilege state and hostname, then creates the working
    /// directory if missing and verifies it is writable. Every later
    /// store or tree call relies on that directory existing.
    #[tracing::instrument(level = "info", skip(config), fields(kind = %config.connection.kind(), workdir = %config.working_directory))]
    pub async fn connect(config: TargetConfig) -> TargetResult<Self> {
        let session = session::connect(&config).await?;
        let kind = session.kind();
        let os = kind.os().to_string();
        let hostname = probe_hostname(session.as_ref(), kind).await?;

        let working_directory = normalize_dir(&config.working_directory);
        let existed = pathops::exists(session.as_ref(), &working_directory).await?;
        pathops::makedirs(session.as_ref(), &working_directory).await?;
        probe_writable(session.as_ref(), &working_directory).await?;

        tracing::info!(%kind, %hostname, "connected");
        Ok(Self {
            session,
            kind,
            working_directory,
            os,
            hostname,
            owns_workdir: !existed,
        })
    }

    /// Which backend kind this target is bound to.
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Scratch directory on the backend filesystem.
    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    /// Human-readable OS identifier ("android" or "linux").
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Hostname probed at connect time.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// True when the underlying session already runs as uid 0.
    pub fn connected_as_root(&self) -> bool {
        self.session.connected_as_root()
    }

    /// Resolve a working-directory-relative path to an absolute one.
    fn resolve(&self, path: &str) -> String {
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("{}/{}", self.working_directory, path)
        }
    }

    /// Create a directory and all missing parents. Idempotent.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn makedirs(&self, path: &str) -> TargetResult<()> {
        pathops::makedirs(self.session.as_ref(), &self.resolve(path)).await
    }

    /// True if `path` exists on the backend.
    pub async fn exists(&self, path: &str) -> TargetResult<bool> {
        pathops::exists(self.session.as_ref(), &self.resolve(path)).await
    }

    /// Write one value to one file, optionally verifying the write and
    /// optionally elevating.
    #[tracing::instrument(level = "debug", skip(self, content), err)]
    pub async fn write_value(
        &self,
        path: &str,
        content: &str,
        verify: bool,
        as_root: bool,
    ) -> TargetResult<()> {
        store::write_value(
            self.session.as_ref(),
            &self.resolve(path),
            content,
            verify,
            as_root,
        )
        .await
    }

    /// Read every regular file under `root` as a flat path → value map.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn read_tree_values_flat(&self, root: &str) -> TargetResult<TreeValues> {
        tree::read_tree_values_flat(self.session.as_ref(), &self.resolve(root)).await
    }

    /// Recursively delete `path`. Strict: a missing path is an error.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn remove(&self, path: &str) -> TargetResult<()> {
        pathops::remove(self.session.as_ref(), &self.resolve(path)).await
    }

    /// Run a raw command on the backend and return its stdout.
    pub async fn execute(&self, command: &str) -> TargetResult<String> {
        self.session.execute(command, false).await
    }

    /// Tear the target down by removing the working directory, but only
    /// if this target created it at connect time. Cleanup is explicit;
    /// dropping a Target removes nothing.
    #[tracing::instrument(level = "info", skip(self), err)]
    pub async fn teardown(&self) -> TargetResult<()> {
        if !self.owns_workdir {
            tracing::debug!(workdir = %self.working_directory, "pre-existing working directory left in place");
            return Ok(());
        }
        if pathops::exists(self.session.as_ref(), &self.working_directory).await? {
            pathops::remove(self.session.as_ref(), &self.working_directory).await?;
            tracing::info!(workdir = %self.working_directory, "removed working directory");
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        session: Box<dyn Session>,
        working_directory: &str,
        owns_workdir: bool,
    ) -> Self {
        let kind = session.kind();
        Self {
            os: kind.os().to_string(),
            hostname: "testhost".to_string(),
            session,
            kind,
            working_directory: normalize_dir(working_directory),
            owns_workdir,
        }
    }
}

/// Strip trailing slashes so resolved paths never double up separators.
fn normalize_dir(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

async fn probe_hostname(session: &dyn Session, kind: TargetKind) -> TargetResult<String> {
    if kind == TargetKind::Device {
        let out = session.execute("getprop net.hostname", false).await?;
        let name = out.trim();
        if !name.is_empty() {
            return Ok(name.to_string());
        }
    }
    let out = session
        .execute("hostname 2>/dev/null || uname -n", false)
        .await?;
    let name = out.trim();
    if name.is_empty() {
        Ok("unknown".to_string())
    } else {
        Ok(name.to_string())
    }
}

/// Touch-and-remove a probe file so an unwritable working directory fails
/// at connect time instead of on the first store call.
async fn probe_writable(session: &dyn Session, workdir: &str) -> TargetResult<()> {
    let probe = sh_quote(&format!("{workdir}/.rigg-writable"));
    session
        .execute(&format!("touch {probe} && rm -f {probe}"), false)
        .await?;
    Ok(())
}
