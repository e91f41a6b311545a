//! MDX document compiler.
//!
//! This crate turns an MDX source (markdown with embedded capability tags and
//! YAML frontmatter) into a [`CompiledUnit`]: an immutable, serializable render
//! program that the runtime evaluates at request time. Compilation is pure and
//! deterministic; no I/O happens here.

pub mod compiler;
pub mod frontmatter;
pub mod node;

pub use compiler::{compile_source, CompileError, CompiledUnit};
pub use frontmatter::Frontmatter;
pub use node::Node;
