//! Client render lifecycle for compiled documents.
//!
//! This crate owns everything between "a navigation event happened" and "the
//! new document is on screen with its side effects applied": the asynchronous
//! compile/evaluate boundary, the render lifecycle controller, the post-render
//! effect appliers (copy widgets, link normalization, scroll restoration), and
//! the session-lived scroll memory.

pub mod compile;
pub mod controller;
pub mod effects;
pub mod evaluate;
pub mod host;
pub mod navigation;
pub mod scroll;

#[cfg(test)]
pub(crate) mod testutil;

pub use compile::{DocumentCompiler, DocumentError, FileCompiler};
pub use controller::{RenderController, RenderOptions, RenderOutcome};
pub use effects::{inject_copy_widgets, normalize_links, restore_scroll, CopyAffordance};
pub use evaluate::{evaluate, Capabilities, EvaluationError, RenderableUnit};
pub use host::{Clipboard, Viewport};
pub use navigation::{NavigationHub, Subscription};
pub use scroll::ScrollMemory;
