//! Link insertion.

use web_time::Instant;

use fundry_editor_html::{Formatter, Sanitizer};

use crate::editor::Editor;
use crate::selection::range_text;
use crate::types::Mode;

/// Values pre-filled into the link dialog when it opens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkPrefill {
    pub text: String,
    pub url: String,
    pub target: Option<String>,
}

/// Confirmed dialog values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkSpec {
    pub text: String,
    pub url: String,
    pub target: Option<String>,
}

impl<C> Editor<C> {
    /// The link dialog is opening: snapshot the selection, then pre-fill.
    /// Editing an existing link reads its attributes verbatim (so relative
    /// URLs survive); otherwise the selected text seeds the label field.
    pub fn open_link_dialog(&mut self) -> LinkPrefill {
        self.save_selection();
        let Some(range) = self.live_selection else {
            return LinkPrefill::default();
        };
        if let Some(anchor) = self.closest_by_tag(range.anchor.node, "a") {
            return LinkPrefill {
                text: self.surface.text_content(anchor),
                url: self
                    .surface
                    .attr(anchor, "href")
                    .unwrap_or_default()
                    .to_string(),
                target: self.surface.attr(anchor, "target").map(str::to_string),
            };
        }
        LinkPrefill {
            text: range_text(&self.surface, &range),
            url: String::new(),
            target: None,
        }
    }
}

impl<C: Sanitizer + Formatter> Editor<C> {
    /// Insert a link at the resolved point. In source mode the link is
    /// appended as markdown-style literal text instead.
    pub fn insert_link(&mut self, spec: &LinkSpec, now: Instant) {
        if !self.config.active {
            return;
        }
        match self.mode {
            Mode::Structured => {
                let anchor = self.surface.create_element("a");
                self.surface.set_attr(anchor, "href", &spec.url);
                if let Some(target) = &spec.target {
                    self.surface.set_attr(anchor, "target", target);
                }
                let label = if spec.text.is_empty() {
                    &spec.url
                } else {
                    &spec.text
                };
                let text = self.surface.create_text(label);
                self.surface.append_child(anchor, text);
                self.insert_at_resolved_point(anchor);
            }
            Mode::Source => {
                self.source
                    .push(&format!("[{}]({})", spec.text, spec.url));
            }
        }
        self.focus();
        self.handle_input(now);
    }
}

#[cfg(test)]
mod tests {
    use fundry_editor_html::HtmlPipeline;

    use super::*;
    use crate::selection::{DomRange, Position};

    fn make_editor(html: &str) -> Editor<HtmlPipeline> {
        let mut editor = Editor::new(HtmlPipeline);
        editor.surface.set_html(html);
        editor
    }

    #[test]
    fn test_selection_replaced_by_link() {
        let mut editor = make_editor("<p>see foo here</p>");
        let text = editor.surface.children(editor.surface.find_by_tag("p")[0])[0];
        editor.set_selection(DomRange::new(
            Position::new(text, 4),
            Position::new(text, 7),
        ));
        let prefill = editor.open_link_dialog();
        assert_eq!(prefill.text, "foo");
        assert_eq!(prefill.url, "");

        editor.clear_selection();
        editor.insert_link(
            &LinkSpec {
                text: "bar".into(),
                url: "/projects/1".into(),
                target: None,
            },
            Instant::now(),
        );
        let html = editor.surface().to_html();
        assert!(!editor.surface().text_content(editor.surface().root()).contains("foo"));
        assert!(html.contains("<a href=\"/projects/1\">bar</a>"));

        // Cursor sits right after the new anchor.
        let anchor = editor.surface().find_by_tag("a")[0];
        let caret = editor.selection().expect("caret set").anchor;
        assert_eq!(Some(caret.node), editor.surface().parent(anchor));
    }

    #[test]
    fn test_prefill_from_existing_anchor_keeps_relative_url() {
        let mut editor = make_editor("<p><a href=\"/donate\" target=\"_blank\">give</a></p>");
        let anchor = editor.surface.find_by_tag("a")[0];
        let text = editor.surface.children(anchor)[0];
        editor.select_caret(Position::new(text, 2));
        let prefill = editor.open_link_dialog();
        assert_eq!(prefill.url, "/donate");
        assert_eq!(prefill.text, "give");
        assert_eq!(prefill.target.as_deref(), Some("_blank"));
    }

    #[test]
    fn test_source_mode_appends_markdown_literal() {
        let mut editor = make_editor("<p>x</p>");
        editor.toggle_mode(Instant::now());
        editor.insert_link(
            &LinkSpec {
                text: "bar".into(),
                url: "https://example.com".into(),
                target: None,
            },
            Instant::now(),
        );
        assert!(
            editor
                .current_content()
                .ends_with("[bar](https://example.com)")
        );
    }

    #[test]
    fn test_empty_label_falls_back_to_url() {
        let mut editor = make_editor("");
        editor.insert_link(
            &LinkSpec {
                text: String::new(),
                url: "https://example.com".into(),
                target: None,
            },
            Instant::now(),
        );
        assert!(
            editor
                .surface()
                .to_html()
                .contains(">https://example.com</a>")
        );
    }
}
