//! Render lifecycle controller.
//!
//! Orchestrates one render cycle per navigation: tear down the previous
//! cycle's listener, compile and evaluate the new document, mount it, and run
//! the post-render effect appliers once the content has settled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use folio_mdx::Node;

use crate::compile::DocumentCompiler;
use crate::effects::{inject_copy_widgets, normalize_links, restore_scroll, CopyAffordance};
use crate::evaluate::{evaluate, Capabilities, RenderableUnit};
use crate::host::{Clipboard, Viewport};
use crate::navigation::{NavigationHub, Subscription};
use crate::scroll::ScrollMemory;

/// Tunable parameters of the lifecycle.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Wait between "evaluation resolved" and the post-render pass.
    ///
    /// The evaluation boundary exposes no render-finished signal, so the
    /// controller waits this long for the rendering layer to commit before
    /// mutating the tree. The constant is a margin, not load-bearing.
    pub settle_delay: Duration,

    /// How long a copy affordance stays in its acknowledged state.
    pub copy_cooldown: Duration,

    /// Document-file suffix stripped from internal links.
    pub link_suffix: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(50),
            copy_cooldown: Duration::from_millis(1000),
            link_suffix: ".mdx".to_string(),
        }
    }
}

/// How a navigation concluded. Errors never escape the controller; a failed
/// compile or evaluation mounts an empty fallback instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The document mounted and post-render effects were applied.
    Rendered,
    /// The document could not be produced; an empty article was mounted and
    /// no post-render effects ran.
    Fallback,
}

/// The active render cycle.
struct Mounted {
    generation: u64,
    unit: RenderableUnit,
    widgets: Vec<Arc<CopyAffordance>>,
    settled: bool,
    /// Held for the lifetime of the cycle; dropping it releases the
    /// navigation-start listener.
    _listener: Subscription,
}

/// Per-container render lifecycle controller.
///
/// At most one cycle is mounted at a time; a new navigation first releases the
/// previous cycle's navigation listener, then begins its own. That ordering is
/// a correctness requirement: scroll offsets are keyed by the identifier that
/// was active at navigation-start time, and a stale listener would attribute
/// an offset to the wrong document.
pub struct RenderController<C> {
    compiler: C,
    capabilities: Capabilities,
    navigation: Arc<NavigationHub>,
    scroll: Arc<ScrollMemory>,
    viewport: Arc<dyn Viewport>,
    clipboard: Arc<dyn Clipboard>,
    options: RenderOptions,
    mounted: Mutex<Option<Mounted>>,
    generation: AtomicU64,
}

impl<C: DocumentCompiler> RenderController<C> {
    pub fn new(
        compiler: C,
        capabilities: Capabilities,
        navigation: Arc<NavigationHub>,
        scroll: Arc<ScrollMemory>,
        viewport: Arc<dyn Viewport>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self::with_options(
            compiler,
            capabilities,
            navigation,
            scroll,
            viewport,
            clipboard,
            RenderOptions::default(),
        )
    }

    pub fn with_options(
        compiler: C,
        capabilities: Capabilities,
        navigation: Arc<NavigationHub>,
        scroll: Arc<ScrollMemory>,
        viewport: Arc<dyn Viewport>,
        clipboard: Arc<dyn Clipboard>,
        options: RenderOptions,
    ) -> Self {
        Self {
            compiler,
            capabilities,
            navigation,
            scroll,
            viewport,
            clipboard,
            options,
            mounted: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Run one full render cycle for `id`.
    ///
    /// Performs, in order: teardown of the previous cycle, registration of the
    /// navigation-start listener, compile, evaluate, mount, settling delay,
    /// post-render effects. Compile and evaluation failures mount an empty
    /// fallback and skip the effects; they are logged, never propagated.
    pub async fn navigate(&self, id: &str) -> RenderOutcome {
        // Release the previous listener before acquiring the next one.
        self.mounted.lock().unwrap().take();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // The listener's only effect: persist the offset under the identifier
        // that is current when navigation leaves this document.
        let listener = {
            let current = id.to_string();
            let scroll = Arc::clone(&self.scroll);
            let viewport = Arc::clone(&self.viewport);
            self.navigation.on_start(move |_to| {
                scroll.record(&current, viewport.scroll_offset());
            })
        };

        let unit = match self.compiler.compile(id).await {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(id, error = %e, "document failed to compile, mounting fallback");
                self.mount_fallback(id, generation, listener);
                return RenderOutcome::Fallback;
            }
        };

        let renderable = match evaluate(&unit, &self.capabilities).await {
            Ok(renderable) => renderable,
            Err(e) => {
                tracing::warn!(id, error = %e, "unit failed to evaluate, mounting fallback");
                self.mount_fallback(id, generation, listener);
                return RenderOutcome::Fallback;
            }
        };

        tracing::debug!(id, "mounted, settling in {:?}", self.options.settle_delay);
        {
            let mut mounted = self.mounted.lock().unwrap();
            *mounted = Some(Mounted {
                generation,
                unit: renderable,
                widgets: Vec::new(),
                settled: false,
                _listener: listener,
            });
        }

        tokio::time::sleep(self.options.settle_delay).await;
        self.settle(generation);

        RenderOutcome::Rendered
    }

    /// Tear down the active cycle. A settle still pending against the old
    /// cycle becomes a no-op.
    pub fn unmount(&self) {
        self.mounted.lock().unwrap().take();
    }

    /// Whether a cycle is currently mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted.lock().unwrap().is_some()
    }

    /// Snapshot of the mounted content tree.
    pub fn mounted_root(&self) -> Option<Node> {
        self.mounted
            .lock()
            .unwrap()
            .as_ref()
            .map(|m| m.unit.root.clone())
    }

    /// Copy affordances created by the settled cycle.
    pub fn widgets(&self) -> Vec<Arc<CopyAffordance>> {
        self.mounted
            .lock()
            .unwrap()
            .as_ref()
            .map(|m| m.widgets.clone())
            .unwrap_or_default()
    }

    /// A fallback mount carries an empty article and counts as already
    /// settled, so no post-render effects run for a document that never
    /// rendered.
    fn mount_fallback(&self, id: &str, generation: u64, listener: Subscription) {
        let mut mounted = self.mounted.lock().unwrap();
        *mounted = Some(Mounted {
            generation,
            unit: RenderableUnit {
                id: id.to_string(),
                title: None,
                root: Node::element("article"),
            },
            widgets: Vec::new(),
            settled: true,
            _listener: listener,
        });
    }

    /// Run the post-render effect appliers, at most once per mounted cycle.
    ///
    /// A fired settle against an unmounted container, a superseded generation,
    /// or an already-settled cycle is a no-op.
    fn settle(&self, generation: u64) {
        let mut guard = self.mounted.lock().unwrap();
        let Some(mounted) = guard.as_mut() else {
            return;
        };
        if mounted.generation != generation || mounted.settled {
            return;
        }

        mounted.widgets = inject_copy_widgets(
            &mut mounted.unit.root,
            &self.clipboard,
            self.options.copy_cooldown,
        );
        normalize_links(&mut mounted.unit.root, &self.options.link_suffix);
        restore_scroll(
            &self.scroll,
            self.viewport.as_ref(),
            &mounted.unit.root,
            &mounted.unit.id,
        );

        mounted.settled = true;
        tracing::debug!(id = %mounted.unit.id, widgets = mounted.widgets.len(), "settled");
    }
}
