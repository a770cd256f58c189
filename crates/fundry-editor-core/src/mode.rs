//! Switching between the structured surface and the raw-markup view.
//!
//! Going to source, the surface markup is cleaned, validated, and
//! pretty-printed into the text buffer; any corrections are surfaced as an
//! alert. Coming back, the buffer text is parsed into the surface verbatim
//! and resizable images get their handle sets repaired, since serialization
//! flattens the affordance overlays.

use tracing::debug;
use web_time::Instant;

use fundry_editor_html::{Formatter, Sanitizer};

use crate::editor::Editor;
use crate::resize::HANDLE_SET_SIZE;
use crate::types::Mode;

impl<C: Sanitizer + Formatter> Editor<C> {
    /// Toggle between structured and source rendering.
    pub fn toggle_mode(&mut self, now: Instant) {
        if !self.config.active {
            return;
        }
        match self.mode {
            Mode::Structured => self.enter_source_mode(),
            Mode::Source => self.enter_structured_mode(),
        }
        self.repair_image_handles();
        self.handle_input(now);
    }

    fn enter_source_mode(&mut self) {
        let raw = self.surface.to_html();
        let report = self.caps.clean_and_validate(&raw, self.config.is_admin);
        if !report.is_valid {
            let mut message = String::from("The HTML contained problems that were corrected:");
            for error in &report.errors {
                message.push_str("\n- ");
                message.push_str(error);
            }
            self.push_alert(message);
        }
        let pretty = self.caps.format(&report.cleaned);
        self.source.set_text(&pretty);
        self.live_selection = None;
        self.mode = Mode::Source;
        debug!(corrections = report.errors.len(), "switched to source mode");
    }

    fn enter_structured_mode(&mut self) {
        // The buffer goes in as written; sanitization happens in the input
        // pipeline, not here, so the user sees their markup interpreted
        // before it is corrected.
        let text = self.source.to_string();
        self.surface.set_html(&text);
        self.live_selection = None;
        self.mode = Mode::Structured;
        debug!("switched to structured mode");
    }

    /// Re-attach handle sets lost to the markup round-trip. Only images with
    /// an incomplete set are touched, so a surviving full set is not torn
    /// down and rebuilt.
    fn repair_image_handles(&mut self) {
        let images: Vec<_> = self
            .surface
            .find_by_class("resizable")
            .into_iter()
            .filter(|&id| self.surface.tag(id) == Some("img"))
            .collect();
        for image in images {
            if self.handle_count(image) < HANDLE_SET_SIZE {
                self.initialize_image(image);
            }
        }
    }
}
