//! Shared editor types: rendering mode and instance configuration.

use std::time::Duration;

/// Which of the two surface renderings is active.
///
/// In structured mode the surface holds an interpreted markup tree; in
/// source mode the underlying markup is shown and edited as literal text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Structured,
    Source,
}

/// Delay before coalesced edits are delivered to the owning form.
pub const CONTENT_DEBOUNCE: Duration = Duration::from_millis(150);

/// How long the user-editing flag lives past an external value change.
pub const EDITING_FLAG_TTL: Duration = Duration::from_millis(200);

/// Per-instance configuration.
#[derive(Clone, Debug)]
pub struct EditorConfig {
    /// Admin trust level for sanitization (relaxed tag/attribute allowlist).
    pub is_admin: bool,
    /// Inactive editors suppress input handling, commands, and mode toggles.
    pub active: bool,
    /// Delivery coalescing delay.
    pub debounce_delay: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            is_admin: false,
            active: true,
            debounce_delay: CONTENT_DEBOUNCE,
        }
    }
}
