//! Dialog-driven insertion: links, buttons, tables, and videos.
//!
//! Link and Button preserve the cursor across the dialog via the saved
//! range; Table and Video always append to the end of the content. The
//! saved range is a one-shot snapshot: consumed when insertion uses it,
//! so a reused dialog cannot insert at a stale location.

mod button;
mod link;
mod table;
mod video;

pub use button::ButtonSpec;
pub use link::{LinkPrefill, LinkSpec};
pub use video::video_embed_src;

use crate::dom::NodeId;
use crate::editor::Editor;
use crate::selection::{Position, caret_after, delete_contents, insert_node_at};

impl<C> Editor<C> {
    /// Snapshot the live selection before a dialog steals focus.
    pub fn save_selection(&mut self) {
        self.saved_range = self.live_selection;
    }

    /// Where dialog-confirmed content goes. Tried in order:
    /// live non-collapsed selection, saved non-collapsed range, saved
    /// collapsed range, live caret, end of content. Non-collapsed ranges
    /// have their contents deleted first; the saved range is consumed.
    pub(crate) fn resolve_insertion_point(&mut self) -> Position {
        if let Some(range) = self.live_selection.filter(|r| !r.is_collapsed()) {
            return delete_contents(&mut self.surface, &range);
        }
        if let Some(saved) = self.saved_range.take() {
            if !saved.is_collapsed() {
                return delete_contents(&mut self.surface, &saved);
            }
            return saved.collapsed().anchor;
        }
        if let Some(range) = self.live_selection {
            return range.collapsed().anchor;
        }
        let root = self.surface.root();
        Position::new(root, self.surface.children(root).len())
    }

    /// Insert at the resolved point and park the cursor right after the
    /// new element.
    pub(crate) fn insert_at_resolved_point(&mut self, node: NodeId) {
        let at = self.resolve_insertion_point();
        insert_node_at(&mut self.surface, at, node);
        if let Some(caret) = caret_after(&self.surface, node) {
            self.select_caret(caret);
        }
    }

    /// Append a node after everything else, cursor after it.
    pub(crate) fn append_to_surface(&mut self, node: NodeId) {
        let root = self.surface.root();
        self.surface.append_child(root, node);
        if let Some(caret) = caret_after(&self.surface, node) {
            self.select_caret(caret);
        }
    }
}

#[cfg(test)]
mod tests {
    use fundry_editor_html::HtmlPipeline;

    use super::*;
    use crate::selection::DomRange;

    fn make_editor(html: &str) -> Editor<HtmlPipeline> {
        let mut editor = Editor::new(HtmlPipeline);
        editor.surface.set_html(html);
        editor
    }

    #[test]
    fn test_live_selection_wins() {
        let mut editor = make_editor("<p>abcdef</p>");
        let text = editor.surface.children(editor.surface.find_by_tag("p")[0])[0];
        editor.set_selection(DomRange::new(
            Position::new(text, 1),
            Position::new(text, 3),
        ));
        let at = editor.resolve_insertion_point();
        assert_eq!(editor.surface.text(text), Some("a"));
        assert_eq!(at, Position::new(text, 1));
    }

    #[test]
    fn test_saved_range_is_one_shot() {
        let mut editor = make_editor("<p>hello</p>");
        let text = editor.surface.children(editor.surface.find_by_tag("p")[0])[0];
        editor.select_caret(Position::new(text, 2));
        editor.save_selection();
        editor.clear_selection();

        let at = editor.resolve_insertion_point();
        assert_eq!(at, Position::new(text, 2));

        // Consumed: the next resolution falls through to append.
        let root = editor.surface.root();
        let at = editor.resolve_insertion_point();
        assert_eq!(at.node, root);
    }

    #[test]
    fn test_fallback_appends_to_end() {
        let mut editor = make_editor("<p>a</p><p>b</p>");
        let at = editor.resolve_insertion_point();
        assert_eq!(at, Position::new(editor.surface.root(), 2));
    }
}
