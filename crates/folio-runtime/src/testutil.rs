//! Shared test doubles for the host traits and the compiler boundary.

use std::collections::HashMap;
use std::sync::Mutex;

use folio_mdx::{compile_source, CompiledUnit};

use crate::compile::{DocumentCompiler, DocumentError};
use crate::host::{Clipboard, Viewport};

/// In-memory viewport recording every scroll it is asked to perform.
#[derive(Debug, Default)]
pub struct FakeViewport {
    offset: Mutex<f64>,
    fragment: Mutex<Option<String>>,
    fragment_jumps: Mutex<Vec<String>>,
}

impl FakeViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fragment(fragment: &str) -> Self {
        let viewport = Self::default();
        *viewport.fragment.lock().unwrap() = Some(fragment.to_string());
        viewport
    }

    /// Simulate the user scrolling.
    pub fn set_offset(&self, offset: f64) {
        *self.offset.lock().unwrap() = offset;
    }

    pub fn offset(&self) -> f64 {
        *self.offset.lock().unwrap()
    }

    pub fn fragment_jumps(&self) -> Vec<String> {
        self.fragment_jumps.lock().unwrap().clone()
    }
}

impl Viewport for FakeViewport {
    fn scroll_offset(&self) -> f64 {
        self.offset()
    }

    fn scroll_to(&self, offset: f64) {
        *self.offset.lock().unwrap() = offset;
    }

    fn scroll_to_fragment(&self, id: &str) {
        self.fragment_jumps.lock().unwrap().push(id.to_string());
    }

    fn fragment(&self) -> Option<String> {
        self.fragment.lock().unwrap().clone()
    }
}

/// Clipboard that records every write.
#[derive(Debug, Default)]
pub struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn write_text(&self, text: &str) {
        self.writes.lock().unwrap().push(text.to_string());
    }
}

/// Compiler over an in-memory map of MDX sources.
#[derive(Debug, Default)]
pub struct MemoryCompiler {
    docs: HashMap<String, String>,
}

impl MemoryCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, id: &str, source: &str) -> Self {
        self.docs.insert(id.to_string(), source.to_string());
        self
    }
}

impl DocumentCompiler for MemoryCompiler {
    async fn compile(&self, id: &str) -> Result<CompiledUnit, DocumentError> {
        let source = self
            .docs
            .get(id)
            .ok_or_else(|| DocumentError::NotFound(id.to_string()))?;
        compile_source(id, source).map_err(|e| DocumentError::Compile {
            id: id.to_string(),
            message: e.to_string(),
        })
    }
}
