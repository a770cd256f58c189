//! The editor instance: shared state for the controller suite.
//!
//! `Editor` owns the surface tree, the source-mode buffer, selection state,
//! and the content pipeline. The interaction controllers (resize, mode
//! switch, insertion, upload, commands) are `impl` blocks in their own
//! modules, all operating on this one struct — they cooperate through
//! shared state, not through each other.

use web_time::Instant;

use fundry_editor_html::{Formatter, Sanitizer};

use crate::dom::{NodeId, Surface};
use crate::pipeline::PipelineState;
use crate::resize::ResizeState;
use crate::selection::{DomRange, Position};
use crate::source::SourceBuffer;
use crate::types::{EditorConfig, Mode};

pub struct Editor<C> {
    pub(crate) caps: C,
    pub(crate) surface: Surface,
    pub(crate) source: SourceBuffer,
    pub(crate) mode: Mode,
    pub(crate) config: EditorConfig,
    /// Host-reported live selection, if any.
    pub(crate) live_selection: Option<DomRange>,
    /// Snapshot captured when a dialog opens; consumed on use.
    pub(crate) saved_range: Option<DomRange>,
    pub(crate) pipeline: PipelineState,
    pub(crate) resize: ResizeState,
    /// Raised while the media settings dialog is open; the pipeline will not
    /// rewrite the surface under it.
    pub(crate) media_dialog_open: bool,
    pub(crate) focused: bool,
    alerts: Vec<String>,
}

impl<C> Editor<C> {
    /// Create an editor over the given sanitizer/formatter capability.
    pub fn new(caps: C) -> Self {
        let config = EditorConfig::default();
        Self {
            caps,
            surface: Surface::new(),
            source: SourceBuffer::new(),
            mode: Mode::Structured,
            pipeline: PipelineState::new(config.debounce_delay),
            config,
            live_selection: None,
            saved_range: None,
            resize: ResizeState::default(),
            media_dialog_open: false,
            focused: false,
            alerts: Vec::new(),
        }
    }

    pub fn with_config(caps: C, config: EditorConfig) -> Self {
        let mut editor = Self::new(caps);
        editor.pipeline.set_delay(config.debounce_delay);
        editor.config = config;
        editor
    }

    // === Configuration ===

    pub fn set_active(&mut self, active: bool) {
        self.config.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.config.active
    }

    pub fn set_admin(&mut self, is_admin: bool) {
        self.config.is_admin = is_admin;
    }

    /// Register the persistence callback. Invoked per the pipeline's
    /// delivery rules (debounced, deduplicated, force-flushed on blur,
    /// submit, and teardown).
    pub fn set_on_change(&mut self, on_change: impl FnMut(String) + 'static) {
        self.pipeline.set_sink(on_change);
    }

    /// Register the raw-input callback, fired after every input event
    /// regardless of whether delivery occurred (word counts and similar).
    pub fn set_on_content_update(&mut self, on_update: impl FnMut() + 'static) {
        self.pipeline.on_content_update = Some(Box::new(on_update));
    }

    // === State access ===

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn source_buffer(&self) -> &SourceBuffer {
        &self.source
    }

    pub fn source_buffer_mut(&mut self) -> &mut SourceBuffer {
        &mut self.source
    }

    /// Current content as markup text, whichever mode is active.
    pub fn current_content(&self) -> String {
        match self.mode {
            Mode::Structured => self.surface.to_html(),
            Mode::Source => self.source.to_string(),
        }
    }

    /// Word count over the visible content.
    pub fn word_count(&self) -> usize {
        let text = match self.mode {
            Mode::Structured => self.surface.text_content(self.surface.root()),
            Mode::Source => self.source.to_string(),
        };
        text.split_whitespace().count()
    }

    // === Selection ===

    pub fn set_selection(&mut self, range: DomRange) {
        self.live_selection = Some(range);
    }

    pub fn select_caret(&mut self, at: Position) {
        self.live_selection = Some(DomRange::caret(at));
    }

    pub fn clear_selection(&mut self) {
        self.live_selection = None;
    }

    pub fn selection(&self) -> Option<DomRange> {
        self.live_selection
    }

    // === Focus ===

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    // === Alerts ===

    /// Queue a user-facing alert. The host drains these and decides how to
    /// present them (the web host uses blocking dialogs).
    pub(crate) fn push_alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    // === Convenience queries shared by controllers ===

    /// Nearest ancestor (self included) matching `tag`, within the surface.
    pub(crate) fn closest_by_tag(&self, from: NodeId, tag: &str) -> Option<NodeId> {
        let root = self.surface.root();
        self.surface
            .ancestors(from)
            .into_iter()
            .take_while(|&id| id != root)
            .find(|&id| self.surface.tag(id) == Some(tag))
    }
}

impl<C: Sanitizer + Formatter> Editor<C> {
    /// Drive time-based behavior: debounce deadlines and the user-editing
    /// flag expiry. Hosts call this from their frame/timer loop.
    pub fn poll(&mut self, now: Instant) {
        self.pipeline.expire_editing_flag(now);
        self.pipeline.debounced.poll(now);
    }

    /// Teardown: flush pending content, then cancel timers.
    pub fn dispose(&mut self, now: Instant) {
        self.force_delivery(now);
        self.pipeline.debounced.cancel();
    }
}
