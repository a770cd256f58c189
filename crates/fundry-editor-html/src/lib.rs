//! fundry-editor-html: HTML handling for the Fundry rich text editor.
//!
//! This crate owns the HTML string contract between the editor core and the
//! rest of the platform:
//! - `Sanitizer` / `Formatter` capability traits consumed by the editor core
//! - a forgiving tokenizer (`lexer`) shared with the core's surface parser
//! - `HtmlPipeline`, the reference implementation: allowlist sanitization,
//!   tag balancing with error reporting, artifact stripping, pretty-printing
//!
//! Everything here is pure string-to-string; no I/O, no DOM.

pub mod escape;
pub mod format;
pub mod lexer;
pub mod sanitize;

pub use escape::escape_html;
pub use format::format;
pub use lexer::{Attr, Token, tokenize};
pub use sanitize::{CleanReport, clean_and_validate, clean_for_output, sanitize};

/// Sanitization capability, as consumed by the editor core.
///
/// Both operations must be idempotent: running them over their own output
/// yields the same string.
pub trait Sanitizer {
    /// Enforce the tag/attribute allowlist and close unbalanced markup.
    /// The admin trust level relaxes the allowlist (iframes, `id`).
    fn sanitize(&self, html: &str, is_admin: bool) -> String;

    /// Strip editor-only artifacts, sanitize, and report what was corrected.
    fn clean_and_validate(&self, html: &str, is_admin: bool) -> CleanReport;
}

/// Formatting capability, as consumed by the editor core.
pub trait Formatter {
    /// Pretty-print markup with indentation for source-mode display.
    fn format(&self, html: &str) -> String;

    /// Produce persistable content: artifacts stripped, markup sanitized.
    fn clean_for_output(&self, html: &str, is_admin: bool) -> String;
}

/// Reference implementation of both capabilities over this crate's passes.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlPipeline;

impl Sanitizer for HtmlPipeline {
    fn sanitize(&self, html: &str, is_admin: bool) -> String {
        sanitize(html, is_admin)
    }

    fn clean_and_validate(&self, html: &str, is_admin: bool) -> CleanReport {
        clean_and_validate(html, is_admin)
    }
}

impl Formatter for HtmlPipeline {
    fn format(&self, html: &str) -> String {
        format(html)
    }

    fn clean_for_output(&self, html: &str, is_admin: bool) -> String {
        clean_for_output(html, is_admin)
    }
}
