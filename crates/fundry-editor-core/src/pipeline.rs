//! The content pipeline: sanitize → clean → debounce → deliver.
//!
//! Single source of truth for "what changed, and what should be persisted".
//! Every surface mutation funnels through [`Editor::handle_input`]; delivery
//! to the owning form is deduplicated against the last snapshot and
//! coalesced behind a trailing debounce, with force-flush on blur, submit,
//! and teardown.

use std::time::Duration;

use tracing::debug;
use web_time::Instant;

use fundry_editor_html::{Formatter, Sanitizer};

use crate::debounce::Debounced;
use crate::editor::Editor;
use crate::types::{EDITING_FLAG_TTL, Mode};

/// Pipeline bookkeeping owned by the editor.
pub(crate) struct PipelineState {
    pub(crate) debounced: Debounced<String>,
    /// Last clean content handed to the owning form.
    pub(crate) last_delivered: Option<String>,
    /// Non-debounced callback fired on every raw input event.
    pub(crate) on_content_update: Option<Box<dyn FnMut()>>,
    /// Set on every input; blocks external overwrites while live.
    pub(crate) user_editing: bool,
    /// When the most recent external value change happened; the editing
    /// flag is cleared a short interval after it.
    external_synced_at: Option<Instant>,
}

impl PipelineState {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            debounced: Debounced::new(delay, |_| {}),
            last_delivered: None,
            on_content_update: None,
            user_editing: false,
            external_synced_at: None,
        }
    }

    pub(crate) fn set_delay(&mut self, delay: Duration) {
        self.debounced.set_delay(delay);
    }

    pub(crate) fn set_sink(&mut self, sink: impl FnMut(String) + 'static) {
        self.debounced.set_sink(sink);
    }

    pub(crate) fn note_external_sync(&mut self, now: Instant) {
        self.external_synced_at = Some(now);
    }

    pub(crate) fn expire_editing_flag(&mut self, now: Instant) {
        if let Some(synced) = self.external_synced_at {
            if now >= synced + EDITING_FLAG_TTL {
                self.user_editing = false;
                self.external_synced_at = None;
            }
        }
    }

    fn notify_content_update(&mut self) {
        if let Some(callback) = self.on_content_update.as_mut() {
            callback();
        }
    }
}

impl<C: Sanitizer + Formatter> Editor<C> {
    /// Handle a surface mutation event.
    ///
    /// In structured mode the surface is re-read and sanitized; if
    /// sanitization changed anything and no resize handles or media dialog
    /// are live, the surface itself is rewritten from the sanitized markup
    /// (rewriting mid-interaction would destroy the handle overlays).
    /// Either way the sanitized string is what goes on toward delivery.
    pub fn handle_input(&mut self, now: Instant) {
        if !self.config.active {
            return;
        }
        self.pipeline.user_editing = true;

        let content = match self.mode {
            Mode::Structured => {
                let raw = self.surface.to_html();
                let sanitized = self.caps.sanitize(&raw, self.config.is_admin);
                if sanitized != raw && !self.has_live_handles() && !self.media_dialog_open {
                    self.surface.set_html(&sanitized);
                }
                sanitized
            }
            Mode::Source => self.source.to_string(),
        };

        self.deliver(content, now);
        self.pipeline.notify_content_update();
    }

    /// Run clean content toward the owning form, debounced and deduplicated.
    fn deliver(&mut self, content: String, now: Instant) {
        let clean = self.caps.clean_for_output(&content, self.config.is_admin);
        if self.pipeline.last_delivered.as_deref() == Some(clean.as_str()) {
            return;
        }
        debug!(len = clean.len(), "content changed, scheduling delivery");
        self.pipeline.last_delivered = Some(clean.clone());
        self.pipeline.debounced.call(clean, now);
    }

    /// Immediate delivery from current content, bypassing the coalescing
    /// delay but still passing through sanitize + clean.
    pub(crate) fn force_delivery(&mut self, now: Instant) {
        let content = match self.mode {
            Mode::Structured => {
                let raw = self.surface.to_html();
                self.caps.sanitize(&raw, self.config.is_admin)
            }
            Mode::Source => self.source.to_string(),
        };
        self.deliver(content, now);
        self.pipeline.debounced.flush();
    }

    /// Focus loss: flush pending content immediately.
    pub fn handle_blur(&mut self, now: Instant) {
        self.focused = false;
        if !self.config.active {
            return;
        }
        self.force_delivery(now);
    }

    /// The owning form is submitting (capture phase — runs before native
    /// submission): flush so the form sees current content.
    pub fn handle_submit(&mut self, now: Instant) {
        if !self.config.active {
            return;
        }
        self.force_delivery(now);
    }

    /// Accept an externally supplied value (server-provided initial content
    /// or a later update).
    ///
    /// An empty surface is seeded unconditionally. Otherwise the surface is
    /// overwritten unless the user is mid-edit or resize handles are live —
    /// destroying an in-progress interaction loses work.
    pub fn sync_external(&mut self, value: &str, now: Instant) {
        let overwrite = match self.mode {
            Mode::Structured => self.surface.is_empty_content(),
            Mode::Source => self.source.is_empty(),
        } || (!self.pipeline.user_editing && !self.has_live_handles());

        if overwrite {
            match self.mode {
                Mode::Structured => self.surface.set_html(value),
                Mode::Source => self.source.set_text(value),
            }
            let clean = self.caps.clean_for_output(value, self.config.is_admin);
            self.pipeline.last_delivered = Some(clean);
        } else {
            debug!("external sync skipped: user mid-edit or handles live");
        }
        self.pipeline.note_external_sync(now);
    }

    /// Whether any resize affordances are currently in the surface.
    pub(crate) fn has_live_handles(&self) -> bool {
        !self.surface.find_by_class("rte-handle").is_empty()
    }
}
