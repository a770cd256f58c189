//! Toolbar command dispatch.
//!
//! Commands arrive as the host toolkit's command names and route to edit
//! primitives on the surface tree. Lists and justification get custom logic
//! instead of a generic toggle: list toggling is rebuilt as "wrap in a
//! one-item list", and justification walks to the nearest block ancestor
//! and styles it directly.

use web_time::Instant;

use fundry_editor_html::{Formatter, Sanitizer};

use crate::dom::NodeId;
use crate::editor::Editor;
use crate::selection::{Position, caret_after, delete_contents, insert_node_at, range_text};
use crate::types::Mode;

/// Elements that justification can attach to.
const BLOCK_TAGS: &[&str] = &[
    "blockquote", "div", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "li", "p", "pre", "td",
    "th",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

/// A routed toolbar command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorCommand {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    UnorderedList,
    OrderedList,
    Justify(Alignment),
    HorizontalRule,
}

impl EditorCommand {
    /// Parse a host-toolkit command name. Names follow the legacy editing
    /// API, compared case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Some(match name.as_str() {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "underline" => Self::Underline,
            "strikethrough" => Self::Strikethrough,
            "code" => Self::Code,
            "insertunorderedlist" => Self::UnorderedList,
            "insertorderedlist" => Self::OrderedList,
            "justifyleft" => Self::Justify(Alignment::Left),
            "justifycenter" => Self::Justify(Alignment::Center),
            "justifyright" => Self::Justify(Alignment::Right),
            "justifyfull" => Self::Justify(Alignment::Justify),
            "inserthorizontalrule" => Self::HorizontalRule,
            _ => return None,
        })
    }
}

impl<C: Sanitizer + Formatter> Editor<C> {
    /// Execute a toolbar command. Every dispatch ends by refocusing the
    /// surface and running the input pipeline, so the change is picked up
    /// for delivery even when the edit raised no input event itself.
    pub fn exec_command(&mut self, command: EditorCommand, now: Instant) {
        if !self.config.active || self.mode != Mode::Structured {
            return;
        }
        match command {
            EditorCommand::Bold => self.wrap_selection_inline("b"),
            EditorCommand::Italic => self.wrap_selection_inline("i"),
            EditorCommand::Underline => self.wrap_selection_inline("u"),
            EditorCommand::Strikethrough => self.wrap_selection_inline("s"),
            EditorCommand::Code => self.wrap_selection_inline("code"),
            EditorCommand::UnorderedList => self.wrap_selection_in_list("ul"),
            EditorCommand::OrderedList => self.wrap_selection_in_list("ol"),
            EditorCommand::Justify(alignment) => self.justify(alignment),
            EditorCommand::HorizontalRule => self.insert_rule(),
        }
        self.focus();
        self.handle_input(now);
    }

    /// Wrap the selected text in an inline element, or insert an empty pair
    /// at the caret with the cursor inside it.
    fn wrap_selection_inline(&mut self, tag: &str) {
        match self.live_selection.filter(|r| !r.is_collapsed()) {
            Some(range) => {
                let text = range_text(&self.surface, &range);
                let at = delete_contents(&mut self.surface, &range);
                let element = self.surface.create_element(tag);
                let inner = self.surface.create_text(&text);
                self.surface.append_child(element, inner);
                insert_node_at(&mut self.surface, at, element);
                if let Some(caret) = caret_after(&self.surface, element) {
                    self.select_caret(caret);
                }
            }
            None => {
                let element = self.surface.create_element(tag);
                let at = self.caret_or_end();
                insert_node_at(&mut self.surface, at, element);
                // Empty pair: typing should land inside it.
                self.select_caret(Position::new(element, 0));
            }
        }
    }

    /// Build a one-item list from the selection instead of relying on a
    /// generic list toggle, which behaves differently depending on the
    /// surrounding content.
    fn wrap_selection_in_list(&mut self, list_tag: &str) {
        let item_text = match self.live_selection.filter(|r| !r.is_collapsed()) {
            Some(range) => {
                let text = range_text(&self.surface, &range);
                let at = delete_contents(&mut self.surface, &range);
                self.select_caret(at);
                text
            }
            None => String::new(),
        };
        let list = self.surface.create_element(list_tag);
        let item = self.surface.create_element("li");
        if !item_text.is_empty() {
            let text = self.surface.create_text(&item_text);
            self.surface.append_child(item, text);
        }
        self.surface.append_child(list, item);
        let at = self.caret_or_end();
        insert_node_at(&mut self.surface, at, list);
        self.select_caret(Position::new(item, 0));
    }

    /// Align the nearest block ancestor of the selection anchor. When the
    /// selection sits at the surface root, a fresh block wrapper is created
    /// at the caret and aligned instead.
    fn justify(&mut self, alignment: Alignment) {
        let anchor = self.live_selection.map(|r| r.anchor);
        if let Some(block) = anchor.and_then(|a| self.nearest_block(a.node)) {
            self.surface.set_style(block, "text-align", alignment.as_css());
            return;
        }
        let wrapper = self.surface.create_element("div");
        let at = self.caret_or_end();
        insert_node_at(&mut self.surface, at, wrapper);
        self.surface
            .set_style(wrapper, "text-align", alignment.as_css());
        self.select_caret(Position::new(wrapper, 0));
    }

    fn insert_rule(&mut self) {
        let rule = self.surface.create_element("hr");
        let at = self.caret_or_end();
        insert_node_at(&mut self.surface, at, rule);
        if let Some(caret) = caret_after(&self.surface, rule) {
            self.select_caret(caret);
        }
    }

    /// Nearest block-level ancestor strictly below the root, self included.
    fn nearest_block(&self, node: NodeId) -> Option<NodeId> {
        let root = self.surface.root();
        self.surface
            .ancestors(node)
            .into_iter()
            .take_while(|&id| id != root)
            .find(|&id| self.surface.tag(id).is_some_and(|t| BLOCK_TAGS.contains(&t)))
    }

    /// Where edits without an explicit target land: the collapsed live
    /// selection anchor, or the end of the surface.
    pub(crate) fn caret_or_end(&self) -> Position {
        if let Some(range) = self.live_selection {
            return range.collapsed().anchor;
        }
        let root = self.surface.root();
        Position::new(root, self.surface.children(root).len())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use fundry_editor_html::HtmlPipeline;

    use super::*;
    use crate::selection::DomRange;

    fn make_editor(html: &str) -> Editor<HtmlPipeline> {
        let mut editor = Editor::new(HtmlPipeline);
        editor.surface.set_html(html);
        editor
    }

    fn select_text(editor: &mut Editor<HtmlPipeline>, node: NodeId, from: usize, to: usize) {
        editor.set_selection(DomRange::new(
            Position::new(node, from),
            Position::new(node, to),
        ));
    }

    #[test]
    fn test_code_wraps_selection() {
        let mut editor = make_editor("<p>run the build now</p>");
        let text = editor.surface.children(editor.surface.find_by_tag("p")[0])[0];
        select_text(&mut editor, text, 8, 13);
        editor.exec_command(EditorCommand::Code, Instant::now());
        assert_eq!(
            editor.surface().to_html(),
            "<p>run the <code>build</code> now</p>"
        );
    }

    #[test]
    fn test_code_without_selection_inserts_empty_pair() {
        let mut editor = make_editor("");
        editor.exec_command(EditorCommand::Code, Instant::now());
        assert_eq!(editor.surface().to_html(), "<code></code>");
        // Caret parked inside the pair.
        let code = editor.surface.find_by_tag("code")[0];
        assert_eq!(editor.selection().map(|r| r.anchor.node), Some(code));
    }

    #[test]
    fn test_list_wraps_selection_as_single_item() {
        let mut editor = make_editor("<p>milk</p>");
        let text = editor.surface.children(editor.surface.find_by_tag("p")[0])[0];
        select_text(&mut editor, text, 0, 4);
        editor.exec_command(EditorCommand::UnorderedList, Instant::now());
        assert!(editor.surface().to_html().contains("<ul><li>milk</li></ul>"));
    }

    #[test]
    fn test_ordered_list_without_selection() {
        let mut editor = make_editor("");
        editor.exec_command(EditorCommand::OrderedList, Instant::now());
        assert_eq!(editor.surface().to_html(), "<ol><li></li></ol>");
    }

    #[test]
    fn test_justify_styles_block_ancestor() {
        let mut editor = make_editor("<p>hello <b>world</b></p>");
        let b = editor.surface.find_by_tag("b")[0];
        let inner = editor.surface.children(b)[0];
        editor.select_caret(Position::new(inner, 2));
        editor.exec_command(
            EditorCommand::Justify(Alignment::Center),
            Instant::now(),
        );
        let p = editor.surface.find_by_tag("p")[0];
        assert_eq!(editor.surface().style(p, "text-align"), Some("center"));
    }

    #[test]
    fn test_justify_at_root_creates_wrapper() {
        let mut editor = make_editor("");
        editor.exec_command(EditorCommand::Justify(Alignment::Right), Instant::now());
        assert_eq!(
            editor.surface().to_html(),
            "<div style=\"text-align: right\"></div>"
        );
    }

    #[test]
    fn test_horizontal_rule_at_caret() {
        let mut editor = make_editor("<p>a</p><p>b</p>");
        let root = editor.surface.root();
        editor.select_caret(Position::new(root, 1));
        editor.exec_command(EditorCommand::HorizontalRule, Instant::now());
        assert_eq!(editor.surface().to_html(), "<p>a</p><hr><p>b</p>");
    }

    #[test]
    fn test_dispatch_refocuses_and_notifies() {
        let mut editor = make_editor("");
        let count = Rc::new(RefCell::new(0usize));
        let counter = count.clone();
        editor.set_on_content_update(move || *counter.borrow_mut() += 1);
        editor.exec_command(EditorCommand::HorizontalRule, Instant::now());
        assert!(editor.is_focused());
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_parse_command_names() {
        assert_eq!(EditorCommand::parse("bold"), Some(EditorCommand::Bold));
        assert_eq!(
            EditorCommand::parse("strikeThrough"),
            Some(EditorCommand::Strikethrough)
        );
        assert_eq!(
            EditorCommand::parse("insertUnorderedList"),
            Some(EditorCommand::UnorderedList)
        );
        assert_eq!(
            EditorCommand::parse("justifyFull"),
            Some(EditorCommand::Justify(Alignment::Justify))
        );
        assert_eq!(EditorCommand::parse("unknownCommand"), None);
    }

    #[test]
    fn test_source_mode_ignores_commands() {
        let mut editor = make_editor("<p>x</p>");
        editor.toggle_mode(Instant::now());
        editor.exec_command(EditorCommand::Bold, Instant::now());
        assert!(!editor.current_content().contains("<b>"));
    }
}
