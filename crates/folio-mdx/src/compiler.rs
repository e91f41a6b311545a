//! Compilation of MDX source into a serializable render program.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
use crate::node::Node;

/// The compiler's output: an immutable, serializable executable form of one
/// document. Produced once per identifier per build, consumed many times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledUnit {
    /// Document identifier this unit was compiled from.
    pub id: String,

    /// Parsed frontmatter (if present).
    pub frontmatter: Option<Frontmatter>,

    /// Pre-serialized executable body: a JSON-encoded `Vec<Node>` render
    /// program. Opaque to everything except the evaluator.
    pub body: String,
}

/// Errors that can occur when compiling a document.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("Unclosed <{0}> tag in document body")]
    UnclosedTag(String),

    #[error("Closing </{found}> does not match open <{expected}>")]
    MismatchedTag { expected: String, found: String },

    #[error("Failed to serialize render program: {0}")]
    Serialize(String),
}

/// Compile MDX source text into a [`CompiledUnit`].
///
/// Pure and deterministic: identical source always yields an identical unit.
/// Embedded tags whose name starts with an uppercase letter become capability
/// references resolved later by the evaluator; lowercase raw tags pass through
/// as plain elements.
pub fn compile_source(id: &str, source: &str) -> Result<CompiledUnit, CompileError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(content, options);

    let mut builder = ProgramBuilder::new();
    for event in parser {
        builder.push_event(event)?;
    }
    let nodes = builder.finish()?;

    let body =
        serde_json::to_string(&nodes).map_err(|e| CompileError::Serialize(e.to_string()))?;

    Ok(CompiledUnit {
        id: id.to_string(),
        frontmatter,
        body,
    })
}

/// Incremental tree builder over pulldown-cmark events.
struct ProgramBuilder {
    /// Finished top-level nodes.
    done: Vec<Node>,
    /// Open containers, innermost last.
    stack: Vec<Node>,
    /// Slugs already assigned to headings, for `-2`, `-3` deduplication.
    used_slugs: Vec<String>,
    /// Inside a table header row (emit `th` instead of `td`).
    in_table_head: bool,
}

impl ProgramBuilder {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            stack: Vec::new(),
            used_slugs: Vec::new(),
            in_table_head: false,
        }
    }

    fn push_event(&mut self, event: Event<'_>) -> Result<(), CompileError> {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),

            Event::Text(text) => {
                self.append(Node::text(text.to_string()));
                Ok(())
            }

            Event::Code(code) => {
                let mut el = Node::element("code");
                el.push(Node::text(code.to_string()));
                self.append(el);
                Ok(())
            }

            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),

            Event::SoftBreak => {
                self.append(Node::text("\n"));
                Ok(())
            }

            Event::HardBreak => {
                self.append(Node::element("br"));
                Ok(())
            }

            Event::Rule => {
                self.append(Node::element("hr"));
                Ok(())
            }

            Event::TaskListMarker(checked) => {
                let mut el = Node::element("input");
                el.set_attr("type", "checkbox");
                el.set_attr("disabled", "");
                if checked {
                    el.set_attr("checked", "");
                }
                self.append(el);
                Ok(())
            }

            Event::FootnoteReference(name) => {
                let mut sup = Node::element("sup");
                let mut link = Node::element("a");
                link.set_attr("href", format!("#fn-{name}"));
                link.push(Node::text(name.to_string()));
                sup.push(link);
                self.append(sup);
                Ok(())
            }

            // Metadata blocks are handled by frontmatter extraction upstream.
            _ => Ok(()),
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) -> Result<(), CompileError> {
        match tag {
            Tag::Paragraph => self.open(Node::element("p")),

            Tag::Heading { level, id, .. } => {
                let mut el = Node::element(heading_tag(level));
                if let Some(id) = id {
                    el.set_attr("id", id.to_string());
                }
                self.open(el);
            }

            Tag::BlockQuote(_) => self.open(Node::element("blockquote")),

            Tag::CodeBlock(kind) => {
                let mut code = Node::element("code");
                if let CodeBlockKind::Fenced(info) = &kind {
                    if let Some(lang) = info.split_whitespace().next() {
                        if !lang.is_empty() {
                            code.set_attr("class", format!("language-{lang}"));
                        }
                    }
                }
                self.open(Node::element("pre"));
                self.open(code);
            }

            Tag::List(Some(_)) => self.open(Node::element("ol")),
            Tag::List(None) => self.open(Node::element("ul")),
            Tag::Item => self.open(Node::element("li")),

            Tag::Emphasis => self.open(Node::element("em")),
            Tag::Strong => self.open(Node::element("strong")),
            Tag::Strikethrough => self.open(Node::element("del")),

            Tag::Link { dest_url, title, .. } => {
                let mut el = Node::element("a");
                el.set_attr("href", dest_url.to_string());
                if !title.is_empty() {
                    el.set_attr("title", title.to_string());
                }
                self.open(el);
            }

            Tag::Image { dest_url, title, .. } => {
                let mut el = Node::element("img");
                el.set_attr("src", dest_url.to_string());
                if !title.is_empty() {
                    el.set_attr("title", title.to_string());
                }
                self.open(el);
            }

            Tag::Table(_) => self.open(Node::element("table")),
            Tag::TableHead => {
                self.in_table_head = true;
                self.open(Node::element("tr"));
            }
            Tag::TableRow => self.open(Node::element("tr")),
            Tag::TableCell => {
                let tag = if self.in_table_head { "th" } else { "td" };
                self.open(Node::element(tag));
            }

            Tag::FootnoteDefinition(name) => {
                let mut el = Node::element("div");
                el.set_attr("id", format!("fn-{name}"));
                el.set_attr("class", "footnote");
                self.open(el);
            }

            // HTML blocks have no container of their own; their contents arrive
            // as Html events.
            Tag::HtmlBlock => {}

            _ => self.open(Node::element("div")),
        }
        Ok(())
    }

    fn end_tag(&mut self, tag: TagEnd) -> Result<(), CompileError> {
        match tag {
            TagEnd::CodeBlock => {
                // Close both the code element and its pre wrapper.
                self.close();
                self.close();
            }
            TagEnd::Heading(_) => self.close_heading(),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.close();
            }
            TagEnd::HtmlBlock => {}
            _ => self.close(),
        }
        Ok(())
    }

    /// Raw HTML inside the document: capability tags (uppercase) become
    /// capability references, ordinary lowercase tags pass through.
    fn raw_html(&mut self, html: &str) -> Result<(), CompileError> {
        for fragment in split_tags(html) {
            match fragment {
                TagFragment::Text(text) => {
                    if !text.trim().is_empty() {
                        self.append(Node::text(text));
                    }
                }
                TagFragment::Open { name, attrs } => {
                    self.open(make_raw_node(&name, attrs));
                }
                TagFragment::SelfClose { name, attrs } => {
                    self.append(make_raw_node(&name, attrs));
                }
                TagFragment::Close { name } => {
                    let Some(open) = self.stack.pop() else {
                        return Err(CompileError::MismatchedTag {
                            expected: String::new(),
                            found: name,
                        });
                    };
                    let open_name = raw_node_name(&open);
                    if !open_name.eq_ignore_ascii_case(&name) {
                        return Err(CompileError::MismatchedTag {
                            expected: open_name,
                            found: name,
                        });
                    }
                    self.append(open);
                }
            }
        }
        Ok(())
    }

    fn open(&mut self, node: Node) {
        self.stack.push(node);
    }

    fn close(&mut self) {
        if let Some(node) = self.stack.pop() {
            self.append(node);
        }
    }

    /// Pop a heading and assign it a slug id (unless the source set one).
    fn close_heading(&mut self) {
        let Some(mut heading) = self.stack.pop() else {
            return;
        };
        if heading.attr("id").is_none() {
            let base = slugify(&heading.text_content());
            if !base.is_empty() {
                let slug = self.dedupe_slug(base);
                heading.set_attr("id", slug);
            }
        }
        self.append(heading);
    }

    fn dedupe_slug(&mut self, base: String) -> String {
        let mut slug = base.clone();
        let mut n = 1;
        while self.used_slugs.contains(&slug) {
            n += 1;
            slug = format!("{base}-{n}");
        }
        self.used_slugs.push(slug.clone());
        slug
    }

    fn append(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.push(node),
            None => self.done.push(node),
        }
    }

    fn finish(mut self) -> Result<Vec<Node>, CompileError> {
        if let Some(open) = self.stack.pop() {
            return Err(CompileError::UnclosedTag(raw_node_name(&open)));
        }
        Ok(self.done)
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn make_raw_node(name: &str, attrs: Vec<(String, String)>) -> Node {
    if name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
        Node::Capability {
            name: name.to_string(),
            attrs,
            children: Vec::new(),
        }
    } else {
        Node::Element {
            tag: name.to_string(),
            attrs,
            children: Vec::new(),
        }
    }
}

fn raw_node_name(node: &Node) -> String {
    match node {
        Node::Element { tag, .. } => tag.clone(),
        Node::Capability { name, .. } => name.clone(),
        Node::Text { .. } => String::new(),
    }
}

/// A lexed fragment of a raw HTML event.
#[derive(Debug, PartialEq)]
enum TagFragment {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
    },
    SelfClose {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Close {
        name: String,
    },
    Text(String),
}

/// Split a raw HTML string into tags and interleaved text.
///
/// This is deliberately not a full HTML parser: document bodies embed simple
/// capability tags and plain anchors, nothing more exotic.
fn split_tags(html: &str) -> Vec<TagFragment> {
    let mut out = Vec::new();
    let mut rest = html;

    while let Some(open_idx) = rest.find('<') {
        if open_idx > 0 {
            out.push(TagFragment::Text(rest[..open_idx].to_string()));
        }
        let after = &rest[open_idx..];
        let Some(close_idx) = after.find('>') else {
            out.push(TagFragment::Text(after.to_string()));
            return out;
        };
        let inner = &after[1..close_idx];
        if let Some(fragment) = parse_tag(inner) {
            out.push(fragment);
        }
        rest = &after[close_idx + 1..];
    }

    if !rest.is_empty() {
        out.push(TagFragment::Text(rest.to_string()));
    }
    out
}

/// Parse the inside of one `<...>` pair.
fn parse_tag(inner: &str) -> Option<TagFragment> {
    let inner = inner.trim();

    // Comments and doctype-ish content are dropped.
    if inner.starts_with('!') || inner.starts_with('?') {
        return None;
    }

    if let Some(name) = inner.strip_prefix('/') {
        let name = name.trim();
        if is_tag_name(name) {
            return Some(TagFragment::Close {
                name: name.to_string(),
            });
        }
        return None;
    }

    let (inner, self_close) = match inner.strip_suffix('/') {
        Some(stripped) => (stripped.trim_end(), true),
        None => (inner, false),
    };

    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    let name = &inner[..name_end];
    if !is_tag_name(name) {
        return None;
    }

    let attrs = parse_attrs(&inner[name_end..]);
    let name = name.to_string();
    Some(if self_close {
        TagFragment::SelfClose { name, attrs }
    } else {
        TagFragment::Open { name, attrs }
    })
}

fn is_tag_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Parse `name="value"`, `name='value'` and bare `name` attribute pairs.
fn parse_attrs(mut rest: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (value, remaining) = match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    match body.find(quote) {
                        Some(end) => (&body[..end], &body[end + 1..]),
                        None => (body, ""),
                    }
                }
                _ => {
                    let end = after_eq
                        .find(|c: char| c.is_whitespace())
                        .unwrap_or(after_eq.len());
                    (&after_eq[..end], &after_eq[end..])
                }
            };
            if !name.is_empty() {
                attrs.push((name.to_string(), value.to_string()));
            }
            rest = remaining;
        } else if !name.is_empty() {
            attrs.push((name.to_string(), String::new()));
        }
    }

    attrs
}

/// Convert a heading to a URL-safe slug.
fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
