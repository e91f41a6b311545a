//! Post-render effect appliers.
//!
//! Three independent, idempotent passes run over the mounted tree once content
//! has settled, in this order: copy-widget injection, internal-link
//! normalization, scroll restoration. Each is a pure function of the current
//! subtree plus the injected hosts; none performs network I/O.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use folio_mdx::Node;

use crate::host::{Clipboard, Viewport};
use crate::scroll::ScrollMemory;

/// Marker class that guards widget injection against duplicates.
pub const COPY_BUTTON_CLASS: &str = "copy-button";

/// Resting label of a copy affordance.
pub const COPY_LABEL: &str = "Copy";

/// Label shown while a copy is acknowledged.
pub const COPIED_LABEL: &str = "Copied";

/// Interactive state behind one injected copy button.
///
/// The DOM node is inert markup; activation, labeling and the cool-down revert
/// live here.
pub struct CopyAffordance {
    text: String,
    cooldown: Duration,
    clipboard: Arc<dyn Clipboard>,
    acknowledged: Mutex<bool>,
}

impl CopyAffordance {
    fn new(text: String, cooldown: Duration, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            text,
            cooldown,
            clipboard,
            acknowledged: Mutex::new(false),
        }
    }

    /// Current label: `Copy` at rest, `Copied` during the cool-down.
    pub fn label(&self) -> &'static str {
        if *self.acknowledged.lock().unwrap() {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }

    /// Activate the affordance.
    ///
    /// Copies the code text to the clipboard, flips the label to `Copied`, and
    /// schedules the revert after the cool-down. Activating again while
    /// acknowledged is a no-op: the cool-down window copies at most once.
    pub fn activate(self: &Arc<Self>) {
        {
            let mut acknowledged = self.acknowledged.lock().unwrap();
            if *acknowledged {
                return;
            }
            self.clipboard.write_text(&self.text);
            *acknowledged = true;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(this.cooldown).await;
            *this.acknowledged.lock().unwrap() = false;
        });
    }
}

impl std::fmt::Debug for CopyAffordance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyAffordance")
            .field("label", &self.label())
            .finish()
    }
}

/// Pass 1: inject one copy affordance into each qualifying code block.
///
/// A block qualifies when it is a `pre` whose sole element child is a `code`.
/// Blocks that already carry the marker are skipped, so re-running this pass
/// never duplicates widgets. Returns the affordances created by this run.
pub fn inject_copy_widgets(
    root: &mut Node,
    clipboard: &Arc<dyn Clipboard>,
    cooldown: Duration,
) -> Vec<Arc<CopyAffordance>> {
    let mut widgets = Vec::new();

    root.walk_mut(&mut |node| {
        if node.tag() != Some("pre") {
            return;
        }

        let elements: Vec<&Node> = node
            .children()
            .iter()
            .filter(|c| matches!(c, Node::Element { .. }))
            .collect();

        let already_injected = elements
            .iter()
            .any(|c| c.attr("class") == Some(COPY_BUTTON_CLASS));
        let sole_code_child = elements.len() == 1 && elements[0].tag() == Some("code");
        if already_injected || !sole_code_child {
            return;
        }

        let text = elements[0].text_content();

        let mut button = Node::element("button");
        button.set_attr("class", COPY_BUTTON_CLASS);
        button.push(Node::text(COPY_LABEL));
        node.push(button);

        widgets.push(Arc::new(CopyAffordance::new(
            text,
            cooldown,
            Arc::clone(clipboard),
        )));
    });

    widgets
}

/// Pass 2: normalize internal links.
///
/// Document bodies link to physical `.mdx` files so they stay readable in a
/// raw-file viewer; at render time the suffix is stripped so the hrefs become
/// navigation paths. Fragment-aware (`about.mdx#setup` -> `about#setup`) and
/// idempotent: an href without the suffix is untouched.
pub fn normalize_links(root: &mut Node, suffix: &str) {
    root.walk_mut(&mut |node| {
        if node.tag() != Some("a") {
            return;
        }
        let Some(href) = node.attr("href") else {
            return;
        };

        let (path, fragment) = match href.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment.to_string())),
            None => (href, None),
        };

        if let Some(stripped) = path.strip_suffix(suffix) {
            let new_href = match fragment {
                Some(fragment) => format!("{stripped}#{fragment}"),
                None => stripped.to_string(),
            };
            node.set_attr("href", new_href);
        }
    });
}

/// Pass 3: restore the scroll position.
///
/// A remembered offset for this document wins and is restored exactly,
/// instantaneously. A zero entry means the document was last left at its
/// natural top and counts as absent, so it never shadows a fragment visit.
/// Otherwise, if the URL carries a fragment naming an element present in the
/// mounted tree, that element is scrolled into view. Otherwise the page stays
/// at its natural top. An absent fragment target is a silent no-op, not an
/// error.
pub fn restore_scroll(memory: &ScrollMemory, viewport: &dyn Viewport, root: &Node, id: &str) {
    if let Some(offset) = memory.restore(id).filter(|offset| *offset != 0.0) {
        tracing::debug!(id, offset, "restoring remembered scroll offset");
        viewport.scroll_to(offset);
        return;
    }

    if let Some(fragment) = viewport.fragment() {
        if root.contains_id(&fragment) {
            tracing::debug!(id, fragment, "scrolling to fragment target");
            viewport.scroll_to_fragment(&fragment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeViewport, RecordingClipboard};
    use pretty_assertions::assert_eq;

    fn code_block(source: &str) -> Node {
        let mut pre = Node::element("pre");
        let mut code = Node::element("code");
        code.push(Node::text(source));
        pre.push(code);
        pre
    }

    fn count_buttons(root: &Node) -> usize {
        let mut count = 0;
        root.walk(&mut |n| {
            if n.attr("class") == Some(COPY_BUTTON_CLASS) {
                count += 1;
            }
        });
        count
    }

    #[tokio::test]
    async fn injects_one_widget_per_code_block() {
        let mut root = Node::element("article");
        root.push(code_block("fn a() {}"));
        root.push(code_block("fn b() {}"));

        let clipboard: Arc<dyn Clipboard> = Arc::new(RecordingClipboard::new());
        let widgets = inject_copy_widgets(&mut root, &clipboard, Duration::from_secs(1));

        assert_eq!(widgets.len(), 2);
        assert_eq!(count_buttons(&root), 2);
    }

    #[tokio::test]
    async fn injection_is_idempotent() {
        let mut root = Node::element("article");
        root.push(code_block("fn main() {}"));

        let clipboard: Arc<dyn Clipboard> = Arc::new(RecordingClipboard::new());
        inject_copy_widgets(&mut root, &clipboard, Duration::from_secs(1));
        let second = inject_copy_widgets(&mut root, &clipboard, Duration::from_secs(1));

        assert!(second.is_empty());
        assert_eq!(count_buttons(&root), 1);
    }

    #[tokio::test]
    async fn skips_pre_without_sole_code_child() {
        let mut root = Node::element("article");
        // A pre with no code child, and a pre with two element children.
        root.push(Node::element("pre"));
        let mut crowded = Node::element("pre");
        crowded.push(Node::element("code"));
        crowded.push(Node::element("span"));
        root.push(crowded);

        let clipboard: Arc<dyn Clipboard> = Arc::new(RecordingClipboard::new());
        let widgets = inject_copy_widgets(&mut root, &clipboard, Duration::from_secs(1));

        assert!(widgets.is_empty());
        assert_eq!(count_buttons(&root), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn affordance_copies_once_per_cooldown_window() {
        let clipboard = Arc::new(RecordingClipboard::new());
        let dyn_clipboard: Arc<dyn Clipboard> = clipboard.clone();

        let mut root = Node::element("article");
        root.push(code_block("let x = 1;"));
        let widgets = inject_copy_widgets(&mut root, &dyn_clipboard, Duration::from_millis(1000));
        let widget = &widgets[0];

        assert_eq!(widget.label(), COPY_LABEL);

        widget.activate();
        assert_eq!(widget.label(), COPIED_LABEL);
        assert_eq!(clipboard.writes(), vec!["let x = 1;".to_string()]);

        // Second activation inside the cool-down is a no-op.
        widget.activate();
        assert_eq!(clipboard.writes().len(), 1);
        assert_eq!(widget.label(), COPIED_LABEL);

        // After the cool-down the label reverts and activation works again.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(widget.label(), COPY_LABEL);

        widget.activate();
        assert_eq!(clipboard.writes().len(), 2);
    }

    #[test]
    fn strips_document_suffix_from_hrefs() {
        let mut root = Node::element("article");
        let mut plain = Node::element("a");
        plain.set_attr("href", "about.mdx");
        root.push(plain);
        let mut with_fragment = Node::element("a");
        with_fragment.set_attr("href", "about.mdx#setup");
        root.push(with_fragment);
        let mut untouched = Node::element("a");
        untouched.set_attr("href", "about");
        root.push(untouched);

        normalize_links(&mut root, ".mdx");

        assert_eq!(root.children()[0].attr("href"), Some("about"));
        assert_eq!(root.children()[1].attr("href"), Some("about#setup"));
        assert_eq!(root.children()[2].attr("href"), Some("about"));
    }

    #[test]
    fn link_normalization_is_idempotent() {
        let mut root = Node::element("article");
        let mut anchor = Node::element("a");
        anchor.set_attr("href", "quick-start.mdx");
        root.push(anchor);

        normalize_links(&mut root, ".mdx");
        normalize_links(&mut root, ".mdx");

        assert_eq!(root.children()[0].attr("href"), Some("quick-start"));
    }

    #[test]
    fn remembered_offset_wins_over_fragment() {
        let memory = ScrollMemory::new();
        memory.record("home", 400.0);
        let viewport = FakeViewport::with_fragment("setup");

        let mut root = Node::element("article");
        let mut heading = Node::element("h2");
        heading.set_attr("id", "setup");
        root.push(heading);

        restore_scroll(&memory, &viewport, &root, "home");

        assert_eq!(viewport.offset(), 400.0);
        assert!(viewport.fragment_jumps().is_empty());
    }

    #[test]
    fn fragment_target_is_used_when_no_memory_entry() {
        let memory = ScrollMemory::new();
        let viewport = FakeViewport::with_fragment("setup");

        let mut root = Node::element("article");
        let mut heading = Node::element("h2");
        heading.set_attr("id", "setup");
        root.push(heading);

        restore_scroll(&memory, &viewport, &root, "home");

        assert_eq!(viewport.fragment_jumps(), vec!["setup".to_string()]);
        assert_eq!(viewport.offset(), 0.0);
    }

    #[test]
    fn zero_entry_counts_as_absent_and_yields_to_fragment() {
        let memory = ScrollMemory::new();
        memory.record("home", 0.0);
        let viewport = FakeViewport::with_fragment("setup");

        let mut root = Node::element("article");
        let mut heading = Node::element("h2");
        heading.set_attr("id", "setup");
        root.push(heading);

        restore_scroll(&memory, &viewport, &root, "home");

        assert_eq!(viewport.fragment_jumps(), vec!["setup".to_string()]);
        assert_eq!(viewport.offset(), 0.0);
    }

    #[test]
    fn absent_fragment_target_is_silent_noop() {
        let memory = ScrollMemory::new();
        let viewport = FakeViewport::with_fragment("nowhere");
        let root = Node::element("article");

        restore_scroll(&memory, &viewport, &root, "home");

        assert!(viewport.fragment_jumps().is_empty());
        assert_eq!(viewport.offset(), 0.0);
    }

    #[test]
    fn no_memory_and_no_fragment_leaves_page_at_top() {
        let memory = ScrollMemory::new();
        let viewport = FakeViewport::new();
        let root = Node::element("article");

        restore_scroll(&memory, &viewport, &root, "home");

        assert_eq!(viewport.offset(), 0.0);
        assert!(viewport.fragment_jumps().is_empty());
    }
}
