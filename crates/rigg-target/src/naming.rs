//! Unique name generation for scratch paths.
//!
//! Names combine a prefix, this process's id, and an atomic counter, so
//! repeated runs on the same backend do not collide and a single run is
//! fully deterministic. No random strings.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generator of unique names under a fixed prefix.
///
/// `UniqueNames::new("rigg-test")` yields `rigg-test-<pid>-0`,
/// `rigg-test-<pid>-1`, and so on.
#[derive(Debug)]
pub struct UniqueNames {
    prefix: String,
    pid: u32,
    counter: AtomicU64,
}

impl UniqueNames {
    /// Create a generator with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            pid: std::process::id(),
            counter: AtomicU64::new(0),
        }
    }

    /// Produce the next unique name.
    pub fn next_name(&self) -> String {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}-{}", self.prefix, self.pid, id)
    }
}
