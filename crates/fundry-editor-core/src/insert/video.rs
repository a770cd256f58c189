//! Video insertion: known providers become embedded iframes, anything else
//! degrades to a labeled link box. Always appended to the end.

use web_time::Instant;

use fundry_editor_html::{Formatter, Sanitizer};

use crate::editor::Editor;
use crate::types::Mode;

const EMBED_WIDTH: &str = "560";
const EMBED_HEIGHT: &str = "315";

/// Map a video page URL to an embeddable player URL. Recognizes the common
/// YouTube shapes (watch, short link, embed, shorts) and numeric Vimeo ids.
pub fn video_embed_src(url: &str) -> Option<String> {
    if url.contains("youtube.com") || url.contains("youtu.be") {
        let id = if let Some(idx) = url.find("v=") {
            id_segment(&url[idx + 2..])
        } else if let Some(idx) = url.find("youtu.be/") {
            id_segment(&url[idx + "youtu.be/".len()..])
        } else if let Some(idx) = url.find("/embed/") {
            id_segment(&url[idx + "/embed/".len()..])
        } else if let Some(idx) = url.find("/shorts/") {
            id_segment(&url[idx + "/shorts/".len()..])
        } else {
            ""
        };
        if id.is_empty() {
            return None;
        }
        return Some(format!("https://www.youtube.com/embed/{id}"));
    }
    if let Some(idx) = url.find("vimeo.com/") {
        let id = id_segment(&url[idx + "vimeo.com/".len()..]);
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            return Some(format!("https://player.vimeo.com/video/{id}"));
        }
    }
    None
}

/// The id runs until the next URL delimiter.
fn id_segment(s: &str) -> &str {
    s.split(['&', '?', '#', '/']).next().unwrap_or("")
}

impl<C: Sanitizer + Formatter> Editor<C> {
    /// Append a video embed for the URL. Cursor position is not preserved.
    pub fn insert_video(&mut self, url: &str, now: Instant) {
        if !self.config.active || url.trim().is_empty() {
            return;
        }
        let url = url.trim();
        let embed = video_embed_src(url);
        match self.mode {
            Mode::Structured => {
                let node = match &embed {
                    Some(src) => {
                        let iframe = self.surface.create_element("iframe");
                        self.surface.set_attr(iframe, "src", src);
                        self.surface.set_attr(iframe, "width", EMBED_WIDTH);
                        self.surface.set_attr(iframe, "height", EMBED_HEIGHT);
                        self.surface.set_attr(iframe, "frameborder", "0");
                        self.surface.set_attr(iframe, "allowfullscreen", "true");
                        iframe
                    }
                    None => {
                        let wrapper = self.surface.create_element("div");
                        let anchor = self.surface.create_element("a");
                        self.surface.set_attr(anchor, "href", url);
                        self.surface.set_attr(anchor, "target", "_blank");
                        let label = self.surface.create_text(&format!("Video: {url}"));
                        self.surface.append_child(anchor, label);
                        self.surface.append_child(wrapper, anchor);
                        wrapper
                    }
                };
                self.append_to_surface(node);
            }
            Mode::Source => {
                let markup = match &embed {
                    Some(src) => format!(
                        "<iframe src=\"{src}\" width=\"{EMBED_WIDTH}\" height=\"{EMBED_HEIGHT}\" \
                         frameborder=\"0\" allowfullscreen=\"true\"></iframe>"
                    ),
                    None => format!("<div><a href=\"{url}\" target=\"_blank\">Video: {url}</a></div>"),
                };
                self.source.push(&markup);
            }
        }
        self.focus();
        self.handle_input(now);
    }
}
