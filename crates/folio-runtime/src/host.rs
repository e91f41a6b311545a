//! Host-side capabilities the lifecycle depends on but does not own.
//!
//! The controller never touches a window or a clipboard directly; the
//! embedding shell injects implementations of these traits. Tests inject
//! recording fakes.

/// The scrollable viewport the mounted document lives in.
pub trait Viewport: Send + Sync {
    /// Current vertical scroll offset.
    fn scroll_offset(&self) -> f64;

    /// Jump to an exact offset. Must be instantaneous, no smooth animation.
    fn scroll_to(&self, offset: f64);

    /// Jump to the element carrying the given id. Instantaneous.
    fn scroll_to_fragment(&self, id: &str);

    /// Fragment identifier of the current URL, without the leading `#`.
    fn fragment(&self) -> Option<String>;
}

/// Write access to the system clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str);
}
