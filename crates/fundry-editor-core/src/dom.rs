//! The surface: an owned arena tree standing in for the editable DOM subtree.
//!
//! Nodes live in a flat arena addressed by stable [`NodeId`]s; detaching a
//! node orphans it without invalidating other ids. The tree round-trips
//! through HTML via the shared editor lexer, so controllers can do local
//! surgery while the content pipeline reads and rewrites the whole surface.

use smol_str::SmolStr;

use fundry_editor_html::escape_html;
use fundry_editor_html::lexer::{self, Token};

/// Stable handle to a node in the surface arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena slot, stable for the surface's lifetime. Usable as a marker
    /// value in bookkeeping attributes.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Element payload: tag, attributes, and parsed inline styles.
///
/// The `style` attribute is kept decomposed so controllers can tweak single
/// properties; it is reassembled on serialization.
#[derive(Clone, Debug, Default)]
pub struct ElementData {
    pub tag: SmolStr,
    attrs: Vec<(SmolStr, String)>,
    styles: Vec<(SmolStr, String)>,
}

/// A node is either an element or a text run.
#[derive(Clone, Debug)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeEntry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The editable root and its subtree.
#[derive(Clone, Debug)]
pub struct Surface {
    nodes: Vec<NodeEntry>,
    root: NodeId,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        let root = NodeEntry {
            data: NodeData::Element(ElementData {
                tag: SmolStr::new_static("div"),
                attrs: Vec::new(),
                styles: Vec::new(),
            }),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The editable root. Never serialized itself; `to_html` emits its children.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn entry(&self, id: NodeId) -> &NodeEntry {
        &self.nodes[id.0 as usize]
    }

    fn entry_mut(&mut self, id: NodeId) -> &mut NodeEntry {
        &mut self.nodes[id.0 as usize]
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeEntry {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    // === Construction ===

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeData::Element(ElementData {
            tag: SmolStr::new(tag),
            attrs: Vec::new(),
            styles: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeData::Text(text.to_string()))
    }

    // === Structure ===

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.entry(id).children
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.entry_mut(child).parent = Some(parent);
        self.entry_mut(parent).children.push(child);
    }

    pub fn insert_child_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.entry_mut(child).parent = Some(parent);
        let children = &mut self.entry_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        if let (Some(parent), Some(index)) =
            (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert_child_at(parent, index, new);
        }
    }

    pub fn insert_after(&mut self, reference: NodeId, new: NodeId) {
        if let (Some(parent), Some(index)) =
            (self.parent(reference), self.index_in_parent(reference))
        {
            self.insert_child_at(parent, index + 1, new);
        }
    }

    /// Detach a node from its parent. The node and its subtree stay in the
    /// arena (ids remain valid) but no longer serialize.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.entry(id).parent {
            self.entry_mut(parent).children.retain(|&c| c != id);
            self.entry_mut(id).parent = None;
        }
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index_in_parent(id)?;
        if index == 0 {
            return None;
        }
        Some(self.children(self.parent(id)?)[index - 1])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Walk from `id` to the root, `id` included.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// True if `node` is inside the subtree of `ancestor` (or is it).
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }

    /// Preorder walk of the subtree under `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Child indices from the root down to `id` (empty for the root).
    /// Detached nodes yield their path from their detached subtree top.
    pub fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(index) = self.index_in_parent(current) {
            path.push(index);
            current = self.parent(current).expect("indexed node has parent");
        }
        path.reverse();
        path
    }

    // === Node data ===

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.entry(id).data, NodeData::Element(_))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.entry(id).data, NodeData::Text(_))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.entry(id).data {
            NodeData::Element(el) => Some(&el.tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.entry(id).data {
            NodeData::Text(t) => Some(t),
            NodeData::Element(_) => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let NodeData::Text(t) = &mut self.entry_mut(id).data {
            *t = text.to_string();
        }
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.entry(id).data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.entry_mut(id).data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    // === Attributes, classes, styles ===

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => el.attrs.push((SmolStr::new(name), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|(n, _)| n != name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let value = match self.attr(id, "class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &value);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(existing) = self.attr(id, "class") {
            let value = existing
                .split_whitespace()
                .filter(|c| *c != class)
                .collect::<Vec<_>>()
                .join(" ");
            self.set_attr(id, "class", &value);
        }
    }

    pub fn style(&self, id: NodeId, prop: &str) -> Option<&str> {
        self.element(id)?
            .styles
            .iter()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, id: NodeId, prop: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            match el.styles.iter_mut().find(|(p, _)| p == prop) {
                Some((_, v)) => *v = value.to_string(),
                None => el.styles.push((SmolStr::new(prop), value.to_string())),
            }
        }
    }

    pub fn remove_style(&mut self, id: NodeId, prop: &str) {
        if let Some(el) = self.element_mut(id) {
            el.styles.retain(|(p, _)| p != prop);
        }
    }

    // === Queries ===

    /// All attached elements bearing `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.has_class(id, class))
            .collect()
    }

    /// All attached elements with the given tag, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.tag(id) == Some(tag))
            .collect()
    }

    /// Concatenated text of the subtree under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(t) = self.text(id) {
            out.push_str(t);
        }
        for child in self.descendants(id) {
            if let Some(t) = self.text(child) {
                out.push_str(t);
            }
        }
        out
    }

    /// True when the surface holds no content (no children, or only
    /// whitespace text).
    pub fn is_empty_content(&self) -> bool {
        self.children(self.root).iter().all(|&c| {
            self.text(c)
                .map(|t| t.trim().is_empty())
                .unwrap_or(false)
        })
    }

    /// Split a text node at a char offset; returns the trailing node, which
    /// is inserted right after `id`. Splitting at the ends still creates the
    /// (possibly empty) trailing node.
    pub fn split_text(&mut self, id: NodeId, char_offset: usize) -> NodeId {
        let (head, tail) = match self.text(id) {
            Some(t) => {
                let byte = t
                    .char_indices()
                    .nth(char_offset)
                    .map(|(b, _)| b)
                    .unwrap_or(t.len());
                (t[..byte].to_string(), t[byte..].to_string())
            }
            None => (String::new(), String::new()),
        };
        self.set_text(id, &head);
        let tail_node = self.create_text(&tail);
        self.insert_after(id, tail_node);
        tail_node
    }

    // === HTML round-trip ===

    /// Serialize the root's children.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root) {
            self.write_node(&mut out, child);
        }
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId) {
        match &self.entry(id).data {
            NodeData::Text(t) => escape_html(out, t),
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_html(out, value);
                    out.push('"');
                }
                if !el.styles.is_empty() {
                    out.push_str(" style=\"");
                    let style = el
                        .styles
                        .iter()
                        .map(|(p, v)| format!("{p}: {v}"))
                        .collect::<Vec<_>>()
                        .join("; ");
                    escape_html(out, &style);
                    out.push('"');
                }
                out.push('>');
                if lexer::is_void(&el.tag) {
                    return;
                }
                for &child in &self.entry(id).children {
                    self.write_node(out, child);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }

    /// Replace the surface content by parsing an HTML fragment. Forgiving:
    /// stray closers are ignored, unclosed tags close at the end.
    pub fn set_html(&mut self, html: &str) {
        let children: Vec<NodeId> = self.children(self.root).to_vec();
        for child in children {
            self.detach(child);
        }
        let mut open_stack = vec![self.root];
        for token in lexer::tokenize(html) {
            match token {
                Token::Text(text) => {
                    // Inter-element whitespace from pretty-printed source
                    // carries no content; keeping it would break the mode
                    // round-trip.
                    if text.contains('\n') && text.trim().is_empty() {
                        continue;
                    }
                    let node = self.create_text(&text);
                    let parent = *open_stack.last().expect("root always open");
                    self.append_child(parent, node);
                }
                Token::Comment => {}
                Token::Open {
                    tag,
                    attrs,
                    self_closing,
                } => {
                    let node = self.create_element(&tag);
                    for attr in &attrs {
                        if attr.name == "style" {
                            for decl in attr.value.split(';') {
                                if let Some((prop, value)) = decl.split_once(':') {
                                    let prop = prop.trim().to_ascii_lowercase();
                                    let value = value.trim();
                                    if !prop.is_empty() && !value.is_empty() {
                                        self.set_style(node, &prop, value);
                                    }
                                }
                            }
                        } else {
                            self.set_attr(node, &attr.name, &attr.value);
                        }
                    }
                    let parent = *open_stack.last().expect("root always open");
                    self.append_child(parent, node);
                    if !lexer::is_void(&tag) && !self_closing {
                        open_stack.push(node);
                    }
                }
                Token::Close { tag } => {
                    // Match against open elements (never the root); stray
                    // closers are ignored.
                    if let Some(pos) = open_stack[1..]
                        .iter()
                        .rposition(|&id| self.tag(id) == Some(tag.as_str()))
                    {
                        open_stack.truncate(pos + 1);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_serialize() {
        let mut surface = Surface::new();
        let p = surface.create_element("p");
        let text = surface.create_text("hello");
        surface.append_child(p, text);
        surface.append_child(surface.root(), p);
        assert_eq!(surface.to_html(), "<p>hello</p>");
    }

    #[test]
    fn test_round_trip() {
        let mut surface = Surface::new();
        let html = "<p>hello <b>world</b></p><ul><li>a</li></ul>";
        surface.set_html(html);
        assert_eq!(surface.to_html(), html);
    }

    #[test]
    fn test_forgiving_parse() {
        let mut surface = Surface::new();
        surface.set_html("<b>hello</i>");
        assert_eq!(surface.to_html(), "<b>hello</b>");
    }

    #[test]
    fn test_styles_round_trip() {
        let mut surface = Surface::new();
        surface.set_html("<p style=\"text-align: center\">x</p>");
        let p = surface.find_by_tag("p")[0];
        assert_eq!(surface.style(p, "text-align"), Some("center"));
        assert_eq!(surface.to_html(), "<p style=\"text-align: center\">x</p>");
    }

    #[test]
    fn test_classes() {
        let mut surface = Surface::new();
        let img = surface.create_element("img");
        surface.append_child(surface.root(), img);
        surface.add_class(img, "resizable");
        surface.add_class(img, "resizable");
        assert!(surface.has_class(img, "resizable"));
        assert_eq!(surface.attr(img, "class"), Some("resizable"));
        surface.add_class(img, "wide");
        surface.remove_class(img, "resizable");
        assert_eq!(surface.attr(img, "class"), Some("wide"));
    }

    #[test]
    fn test_insert_before_after() {
        let mut surface = Surface::new();
        let a = surface.create_element("p");
        let b = surface.create_element("p");
        let c = surface.create_element("p");
        surface.append_child(surface.root(), b);
        surface.insert_before(b, a);
        surface.insert_after(b, c);
        assert_eq!(surface.children(surface.root()), &[a, b, c]);
        assert_eq!(surface.prev_sibling(b), Some(a));
        assert_eq!(surface.next_sibling(b), Some(c));
    }

    #[test]
    fn test_detach_keeps_ids_valid(){
        let mut surface = Surface::new();
        let p = surface.create_element("p");
        surface.append_child(surface.root(), p);
        surface.detach(p);
        assert_eq!(surface.to_html(), "");
        assert_eq!(surface.tag(p), Some("p"));
        assert!(surface.parent(p).is_none());
    }

    #[test]
    fn test_split_text() {
        let mut surface = Surface::new();
        let p = surface.create_element("p");
        let text = surface.create_text("hello world");
        surface.append_child(p, text);
        surface.append_child(surface.root(), p);
        let tail = surface.split_text(text, 5);
        assert_eq!(surface.text(text), Some("hello"));
        assert_eq!(surface.text(tail), Some(" world"));
        assert_eq!(surface.to_html(), "<p>hello world</p>");
    }

    #[test]
    fn test_text_content_and_empty() {
        let mut surface = Surface::new();
        assert!(surface.is_empty_content());
        surface.set_html("<p>a<b>b</b></p>c");
        assert_eq!(surface.text_content(surface.root()), "abc");
        assert!(!surface.is_empty_content());
    }

    #[test]
    fn test_pretty_printed_whitespace_dropped() {
        let mut surface = Surface::new();
        surface.set_html("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>");
        assert_eq!(surface.to_html(), "<ul><li>a</li><li>b</li></ul>");
        // Inline spacing without a newline is content.
        surface.set_html("<b>a</b> <i>b</i>");
        assert_eq!(surface.to_html(), "<b>a</b> <i>b</i>");
    }

    #[test]
    fn test_escaped_text_round_trip() {
        let mut surface = Surface::new();
        surface.set_html("<p>a &amp; b</p>");
        let p = surface.find_by_tag("p")[0];
        assert_eq!(surface.text_content(p), "a & b");
        assert_eq!(surface.to_html(), "<p>a &amp; b</p>");
    }
}
