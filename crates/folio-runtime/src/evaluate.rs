//! Unit evaluation: turning a compiled unit into a renderable unit.

use std::collections::HashMap;
use std::sync::Arc;

use folio_mdx::{CompiledUnit, Node};

/// A capability implementation: given the attributes and already-resolved
/// children of a capability reference, produce the node to render in its place.
pub type CapabilityFn = Arc<dyn Fn(&[(String, String)], Vec<Node>) -> Node + Send + Sync>;

/// Named symbols a document body may reference during evaluation.
#[derive(Clone, Default)]
pub struct Capabilities {
    entries: HashMap<String, CapabilityFn>,
}

impl Capabilities {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard table every page gets: currently just `Link`, the
    /// internal-navigation anchor component.
    pub fn standard() -> Self {
        let mut caps = Self::new();
        caps.register("Link", |attrs, children| {
            let mut anchor = Node::element("a");
            if let Some((_, href)) = attrs.iter().find(|(k, _)| k == "href") {
                anchor.set_attr("href", href.clone());
            }
            anchor.set_attr("class", "nav-link");
            for child in children {
                anchor.push(child);
            }
            anchor
        });
        caps
    }

    /// Register a capability under a name, replacing any existing entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&[(String, String)], Vec<Node>) -> Node + Send + Sync + 'static,
    ) {
        self.entries.insert(name.into(), Arc::new(f));
    }

    /// Whether a capability is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&CapabilityFn> {
        self.entries.get(name)
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The evaluated, mountable form of a compiled unit.
///
/// Owned exclusively by the render cycle that produced it; the next navigation
/// discards it.
#[derive(Debug, Clone)]
pub struct RenderableUnit {
    /// Document identifier the unit was evaluated for.
    pub id: String,

    /// Title from frontmatter, if any.
    pub title: Option<String>,

    /// Resolved content tree, rooted at an `article` element.
    pub root: Node,
}

/// Errors that can occur when evaluating a compiled unit.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Malformed unit body: {0}")]
    MalformedBody(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),
}

/// Evaluate a compiled unit against a capability table.
///
/// Resolves every capability reference in the unit's body; fails if the body
/// does not deserialize or references a name missing from the table. The
/// caller must await this before scheduling any post-render work.
pub async fn evaluate(
    unit: &CompiledUnit,
    capabilities: &Capabilities,
) -> Result<RenderableUnit, EvaluationError> {
    let nodes: Vec<Node> = serde_json::from_str(&unit.body)
        .map_err(|e| EvaluationError::MalformedBody(e.to_string()))?;

    let mut root = Node::element("article");
    for node in nodes {
        root.push(resolve(node, capabilities)?);
    }

    Ok(RenderableUnit {
        id: unit.id.clone(),
        title: unit.frontmatter.as_ref().map(|f| f.title.clone()),
        root,
    })
}

fn resolve(node: Node, capabilities: &Capabilities) -> Result<Node, EvaluationError> {
    match node {
        Node::Text { .. } => Ok(node),

        Node::Element { tag, attrs, children } => {
            let children = children
                .into_iter()
                .map(|c| resolve(c, capabilities))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::Element { tag, attrs, children })
        }

        Node::Capability { name, attrs, children } => {
            let children = children
                .into_iter()
                .map(|c| resolve(c, capabilities))
                .collect::<Result<Vec<_>, _>>()?;
            let f = capabilities
                .get(&name)
                .ok_or(EvaluationError::UnknownCapability(name))?;
            Ok(f(&attrs, children))
        }
    }
}
