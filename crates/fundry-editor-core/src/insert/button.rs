//! Button insertion: an anchor styled as a call-to-action button.

use web_time::Instant;

use fundry_editor_html::{Formatter, Sanitizer};

use crate::editor::Editor;
use crate::insert::link::LinkPrefill;
use crate::types::Mode;

/// Confirmed button dialog values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonSpec {
    pub text: String,
    pub url: String,
}

impl<C> Editor<C> {
    /// The button dialog is opening. Same capture shape as the link dialog;
    /// editing an existing button pre-fills from its anchor.
    pub fn open_button_dialog(&mut self) -> LinkPrefill {
        self.open_link_dialog()
    }
}

impl<C: Sanitizer + Formatter> Editor<C> {
    /// Insert a button at the resolved point. In source mode the button is
    /// appended as a raw HTML literal, unlike the link's markdown form.
    pub fn insert_button(&mut self, spec: &ButtonSpec, now: Instant) {
        if !self.config.active {
            return;
        }
        match self.mode {
            Mode::Structured => {
                let anchor = self.surface.create_element("a");
                self.surface.set_attr(anchor, "href", &spec.url);
                self.surface.set_attr(anchor, "class", "rte-button");
                let text = self.surface.create_text(&spec.text);
                self.surface.append_child(anchor, text);
                self.insert_at_resolved_point(anchor);
            }
            Mode::Source => {
                self.source.push(&format!(
                    "<a href=\"{}\" class=\"rte-button\">{}</a>",
                    spec.url, spec.text
                ));
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
    use crate::selection::Position;

    fn make_editor(html: &str) -> Editor<HtmlPipeline> {
        let mut editor = Editor::new(HtmlPipeline);
        editor.surface.set_html(html);
        editor
    }

    #[test]
    fn test_button_inserted_at_saved_caret() {
        let mut editor = make_editor("<p>donate below</p>");
        let text = editor.surface.children(editor.surface.find_by_tag("p")[0])[0];
        editor.select_caret(Position::new(text, 6));
        editor.open_button_dialog();
        editor.clear_selection();

        editor.insert_button(
            &ButtonSpec {
                text: "Give now".into(),
                url: "/donate".into(),
            },
            Instant::now(),
        );
        assert_eq!(
            editor.surface().to_html(),
            "<p>donate<a href=\"/donate\" class=\"rte-button\">Give now</a> below</p>"
        );
    }

    #[test]
    fn test_source_mode_appends_html_literal() {
        let mut editor = make_editor("");
        editor.toggle_mode(Instant::now());
        editor.insert_button(
            &ButtonSpec {
                text: "Give".into(),
                url: "/donate".into(),
            },
            Instant::now(),
        );
        assert_eq!(
            editor.current_content(),
            "<a href=\"/donate\" class=\"rte-button\">Give</a>"
        );
    }
}
