//! Pure data types for rigg: errors, connection configs, value normalization.
//!
//! This crate is a leaf dependency with no async runtime and no I/O. It
//! exists so that embedders can work with rigg's configuration and error
//! types without pulling rigg-target's transitive deps.

pub mod config;
pub mod error;
pub mod value;

// Flat re-exports for convenience
pub use config::*;
pub use error::*;
pub use value::*;
