//! The node program: the serializable tree a compiled document evaluates to.

use serde::{Deserialize, Serialize};

/// One node of a compiled render program.
///
/// `Capability` nodes are placeholders for named symbols the document body may
/// reference (a navigation link component, for example). They are resolved by
/// the evaluator against a capability table; everything else renders as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Element {
        tag: String,
        #[serde(default)]
        attrs: Vec<(String, String)>,
        #[serde(default)]
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
    Capability {
        name: String,
        #[serde(default)]
        attrs: Vec<(String, String)>,
        #[serde(default)]
        children: Vec<Node>,
    },
}

impl Node {
    /// Create an element node with no attributes or children.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// The element tag, if this is an element.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Look up an attribute value on an element or capability node.
    pub fn attr(&self, name: &str) -> Option<&str> {
        let attrs = match self {
            Self::Element { attrs, .. } | Self::Capability { attrs, .. } => attrs,
            Self::Text { .. } => return None,
        };
        attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let attrs = match self {
            Self::Element { attrs, .. } | Self::Capability { attrs, .. } => attrs,
            Self::Text { .. } => return,
        };
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value.into(),
            None => attrs.push((name.to_string(), value.into())),
        }
    }

    /// Append a child to an element or capability node.
    pub fn push(&mut self, child: Node) {
        if let Self::Element { children, .. } | Self::Capability { children, .. } = self {
            children.push(child);
        }
    }

    /// Children of this node, empty for text.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Element { children, .. } | Self::Capability { children, .. } => children,
            Self::Text { .. } => &[],
        }
    }

    /// Concatenated text content of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { text } => out.push_str(text),
            Self::Element { children, .. } | Self::Capability { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Depth-first walk over every node in the subtree, self included.
    pub fn walk(&self, visit: &mut dyn FnMut(&Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Depth-first mutable walk. The visitor may rewrite attributes or append
    /// children; it sees parents before their children.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Node)) {
        visit(self);
        if let Self::Element { children, .. } | Self::Capability { children, .. } = self {
            for child in children {
                child.walk_mut(visit);
            }
        }
    }

    /// Whether any element in the subtree carries the given `id` attribute.
    pub fn contains_id(&self, id: &str) -> bool {
        let mut found = false;
        self.walk(&mut |node| {
            if node.attr("id") == Some(id) {
                found = true;
            }
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Node {
        let mut pre = Node::element("pre");
        let mut code = Node::element("code");
        code.push(Node::text("let x = 1;"));
        pre.push(code);

        let mut root = Node::element("article");
        let mut heading = Node::element("h2");
        heading.set_attr("id", "setup");
        heading.push(Node::text("Setup"));
        root.push(heading);
        root.push(pre);
        root
    }

    #[test]
    fn collects_text_content() {
        let root = sample();
        assert_eq!(root.text_content(), "Setuplet x = 1;");
    }

    #[test]
    fn finds_ids_anywhere_in_subtree() {
        let root = sample();
        assert!(root.contains_id("setup"));
        assert!(!root.contains_id("missing"));
    }

    #[test]
    fn set_attr_overwrites_existing() {
        let mut node = Node::element("a");
        node.set_attr("href", "about.mdx");
        node.set_attr("href", "about");
        assert_eq!(node.attr("href"), Some("about"));
    }

    #[test]
    fn serde_round_trips_tagged_representation() {
        let root = sample();
        let json = serde_json::to_string(&root).unwrap();
        assert!(json.contains("\"kind\":\"element\""));

        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, root);
    }
}
