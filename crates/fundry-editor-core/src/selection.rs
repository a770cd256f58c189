//! Selection and range handling over the surface tree.
//!
//! A position addresses a point inside a node: a char offset in a text node,
//! or a child index in an element. Ranges carry anchor/head in selection
//! order; use [`DomRange::ordered`] for document-order bounds.
//!
//! The saved range captured before a dialog opens is held by the editor as a
//! one-shot value: dialogs steal focus and destroy the live selection, so
//! insertion re-anchors on the snapshot and consumes it.

use crate::dom::{NodeId, Surface};

/// A point in the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A selection: where it started and where the cursor is now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomRange {
    pub anchor: Position,
    pub head: Position,
}

impl DomRange {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    pub fn caret(at: Position) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Collapse onto the anchor position.
    pub fn collapsed(&self) -> Self {
        Self::caret(self.anchor)
    }

    /// Anchor and head in document order.
    pub fn ordered(&self, surface: &Surface) -> (Position, Position) {
        if position_le(surface, &self.anchor, &self.head) {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }
}

/// Document-order comparison via root paths; offsets break ties.
fn position_le(surface: &Surface, a: &Position, b: &Position) -> bool {
    if a.node == b.node {
        return a.offset <= b.offset;
    }
    let mut path_a = surface.path(a.node);
    let mut path_b = surface.path(b.node);
    path_a.push(a.offset);
    path_b.push(b.offset);
    path_a <= path_b
}

/// The plain text covered by a range, used to pre-fill dialog fields.
///
/// Handles the shapes local editing produces: a span within one text node,
/// or a run of siblings under a common parent. Anything wider degrades to
/// the anchor node's text.
pub fn range_text(surface: &Surface, range: &DomRange) -> String {
    if range.is_collapsed() {
        return String::new();
    }
    let (start, end) = range.ordered(surface);
    if start.node == end.node {
        if let Some(text) = surface.text(start.node) {
            return text
                .chars()
                .skip(start.offset)
                .take(end.offset.saturating_sub(start.offset))
                .collect();
        }
        // Element range: concatenate the covered children.
        let children = surface.children(start.node);
        return children[start.offset.min(children.len())..end.offset.min(children.len())]
            .iter()
            .map(|&c| surface.text_content(c))
            .collect();
    }
    if surface.parent(start.node) == surface.parent(end.node) {
        let mut out: String = surface
            .text(start.node)
            .map(|t| t.chars().skip(start.offset).collect())
            .unwrap_or_default();
        let mut current = surface.next_sibling(start.node);
        while let Some(node) = current {
            if node == end.node {
                if let Some(t) = surface.text(node) {
                    out.extend(t.chars().take(end.offset));
                }
                break;
            }
            out.push_str(&surface.text_content(node));
            current = surface.next_sibling(node);
        }
        return out;
    }
    surface.text_content(range.anchor.node)
}

/// Delete the contents of a range and return the collapsed position where
/// the deleted content used to start.
///
/// Covers the same shapes as [`range_text`]; ranges spanning unrelated
/// subtrees collapse to the start without deleting.
pub fn delete_contents(surface: &mut Surface, range: &DomRange) -> Position {
    let (start, end) = range.ordered(surface);
    if range.is_collapsed() {
        return start;
    }

    if start.node == end.node {
        if surface.text(start.node).is_some() {
            let tail = surface.split_text(start.node, end.offset);
            surface.split_text(start.node, start.offset);
            // Middle segment is the node between start and tail.
            if let Some(middle) = surface.next_sibling(start.node) {
                if middle != tail {
                    surface.detach(middle);
                }
            }
            return Position::new(start.node, start.offset);
        }
        let children: Vec<NodeId> = surface.children(start.node).to_vec();
        for &child in children
            .iter()
            .skip(start.offset)
            .take(end.offset.saturating_sub(start.offset))
        {
            surface.detach(child);
        }
        return start;
    }

    if surface.parent(start.node) == surface.parent(end.node) {
        // Trim the boundary text nodes, drop everything between.
        if surface.text(end.node).is_some() {
            surface.split_text(end.node, end.offset);
            // end.node now holds only the selected head; remove it below by
            // walking from start.
        }
        if surface.text(start.node).is_some() {
            surface.split_text(start.node, start.offset);
        }
        let mut doomed = Vec::new();
        let mut current = surface.next_sibling(start.node);
        while let Some(node) = current {
            current = surface.next_sibling(node);
            doomed.push(node);
            if node == end.node {
                break;
            }
        }
        for node in doomed {
            surface.detach(node);
        }
        return Position::new(start.node, start.offset);
    }

    start
}

/// Insert a node at a position, splitting text as needed. Returns nothing;
/// the caret belongs immediately after the inserted node, see [`caret_after`].
pub fn insert_node_at(surface: &mut Surface, at: Position, node: NodeId) {
    if surface.text(at.node).is_some() {
        let tail = surface.split_text(at.node, at.offset);
        surface.insert_before(tail, node);
        return;
    }
    surface.insert_child_at(at.node, at.offset, node);
}

/// The caret position immediately after a node, in its parent.
pub fn caret_after(surface: &Surface, node: NodeId) -> Option<Position> {
    let parent = surface.parent(node)?;
    let index = surface.index_in_parent(node)?;
    Some(Position::new(parent, index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_surface(html: &str) -> Surface {
        let mut surface = Surface::new();
        surface.set_html(html);
        surface
    }

    #[test]
    fn test_range_text_within_text_node() {
        let surface = make_surface("<p>hello world</p>");
        let p = surface.find_by_tag("p")[0];
        let text = surface.children(p)[0];
        let range = DomRange::new(Position::new(text, 0), Position::new(text, 5));
        assert_eq!(range_text(&surface, &range), "hello");
    }

    #[test]
    fn test_range_text_backwards() {
        let surface = make_surface("<p>hello world</p>");
        let text = surface.children(surface.find_by_tag("p")[0])[0];
        let range = DomRange::new(Position::new(text, 11), Position::new(text, 6));
        assert_eq!(range_text(&surface, &range), "world");
    }

    #[test]
    fn test_delete_contents_middle_of_text() {
        let mut surface = make_surface("<p>foo bar baz</p>");
        let text = surface.children(surface.find_by_tag("p")[0])[0];
        let range = DomRange::new(Position::new(text, 3), Position::new(text, 7));
        let at = delete_contents(&mut surface, &range);
        assert_eq!(surface.text_content(surface.root()), "foo baz");
        assert_eq!(at, Position::new(text, 3));
    }

    #[test]
    fn test_delete_contents_across_siblings() {
        let mut surface = make_surface("<p>ab<b>cd</b>ef</p>");
        let p = surface.find_by_tag("p")[0];
        let first = surface.children(p)[0];
        let last = surface.children(p)[2];
        let range = DomRange::new(Position::new(first, 1), Position::new(last, 1));
        delete_contents(&mut surface, &range);
        assert_eq!(surface.to_html(), "<p>af</p>");
    }

    #[test]
    fn test_insert_at_splits_text() {
        let mut surface = make_surface("<p>hello world</p>");
        let text = surface.children(surface.find_by_tag("p")[0])[0];
        let b = surface.create_element("b");
        let inner = surface.create_text("X");
        surface.append_child(b, inner);
        insert_node_at(&mut surface, Position::new(text, 5), b);
        assert_eq!(surface.to_html(), "<p>hello<b>X</b> world</p>");
        let caret = caret_after(&surface, b).expect("inserted node has parent");
        assert_eq!(caret.node, surface.find_by_tag("p")[0]);
    }

    #[test]
    fn test_ordering_across_nodes() {
        let surface = make_surface("<p>a</p><p>b</p>");
        let first = surface.children(surface.find_by_tag("p")[0])[0];
        let second = surface.children(surface.find_by_tag("p")[1])[0];
        let range = DomRange::new(Position::new(second, 0), Position::new(first, 0));
        let (start, _) = range.ordered(&surface);
        assert_eq!(start.node, first);
    }
}
