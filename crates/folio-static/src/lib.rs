//! Ahead-of-time site export.
//!
//! Compiles every document in a posts directory once per build and writes the
//! artifacts the static host serves: compiled-unit JSON, per-document HTML
//! shells, and the default stylesheet.

pub mod assets;
pub mod builder;
pub mod templates;

pub use builder::{BuildError, BuildResult, ExportBuilder, ExportConfig};
