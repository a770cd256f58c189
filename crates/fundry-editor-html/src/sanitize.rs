//! Allowlist sanitization and tag balancing.
//!
//! One pass drives all three public operations: `sanitize` (allowlist +
//! balancing, editor artifacts kept), `clean_and_validate` (artifacts
//! stripped, corrections reported), and `clean_for_output` (the former with
//! the report discarded). All are idempotent over their own output.

use tracing::debug;

use crate::escape::escape_html;
use crate::lexer::{Attr, Token, is_void, tokenize};

/// Result of `clean_and_validate`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Sanitized, balanced markup.
    pub cleaned: String,
    /// True when no corrections were needed.
    pub is_valid: bool,
    /// Human-readable descriptions of every correction made.
    pub errors: Vec<String>,
}

/// Tags allowed at either trust level.
const BASE_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "caption", "code", "div", "em", "figcaption", "figure", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "li", "ol", "p", "pre", "s", "small", "span",
    "strike", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "u",
    "ul",
];

/// Tags additionally allowed for admin-trusted content.
const ADMIN_TAGS: &[&str] = &["iframe"];

/// Attributes allowed on every tag.
const GLOBAL_ATTRS: &[&str] = &["class", "style", "title", "contenteditable", "draggable"];

/// Inline style properties that survive sanitization.
const STYLE_PROPS: &[&str] = &[
    "width",
    "height",
    "max-width",
    "text-align",
    "position",
    "display",
    "float",
    "top",
    "right",
    "bottom",
    "left",
    "margin",
    "margin-left",
    "margin-right",
    "margin-top",
    "margin-bottom",
    "padding",
    "cursor",
    "vertical-align",
    "background",
    "border-radius",
    "pointer-events",
    "user-select",
    "-webkit-user-select",
    "-moz-user-select",
    "-ms-user-select",
    "-webkit-user-drag",
];

/// Classes marking transient editing affordances; subtrees carrying one are
/// removed from cleaned output.
const ARTIFACT_CLASSES: &[&str] = &["rte-handle", "rte-settings", "rte-tooltip", "image-edit-area"];

/// Editor bookkeeping attributes, stripped from cleaned output.
const BOOKKEEPING_PREFIX: &str = "data-rte-";

/// Enforce the allowlist and balance tags. Editor affordances (handles,
/// tooltips, edit areas) are preserved; this runs on live surface content.
pub fn sanitize(html: &str, is_admin: bool) -> String {
    run(html, is_admin, false).0
}

/// Strip editor artifacts, sanitize, balance, and report every correction.
pub fn clean_and_validate(html: &str, is_admin: bool) -> CleanReport {
    let (cleaned, errors) = run(html, is_admin, true);
    CleanReport {
        cleaned,
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Persistable content: `clean_and_validate` with the report discarded.
pub fn clean_for_output(html: &str, is_admin: bool) -> String {
    let report = clean_and_validate(html, is_admin);
    if !report.is_valid {
        debug!(corrections = report.errors.len(), "cleaned invalid markup for output");
    }
    report.cleaned
}

/// How an element is treated by the current pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Disposition {
    /// Emit the element with filtered attributes.
    Keep,
    /// Skip the tags, keep the children.
    Unwrap,
    /// Skip the whole subtree.
    Drop,
}

struct StackEntry {
    tag: smol_str::SmolStr,
    disposition: Disposition,
}

fn run(html: &str, is_admin: bool, strip_artifacts: bool) -> (String, Vec<String>) {
    let mut out = String::with_capacity(html.len());
    let mut errors = Vec::new();
    let mut stack: Vec<StackEntry> = Vec::new();
    let mut drop_depth = 0usize;

    for token in tokenize(html) {
        match token {
            Token::Text(text) => {
                if drop_depth == 0 {
                    escape_html(&mut out, &text);
                }
            }
            Token::Comment => {}
            Token::Open {
                tag,
                attrs,
                self_closing,
            } => {
                if drop_depth > 0 {
                    // Children of a dropped subtree are tracked only so the
                    // matching close tags are consumed.
                    if !is_void(&tag) && !self_closing {
                        stack.push(StackEntry {
                            tag,
                            disposition: Disposition::Drop,
                        });
                        drop_depth += 1;
                    }
                    continue;
                }

                let disposition = classify(&tag, &attrs, is_admin, strip_artifacts);
                if is_void(&tag) {
                    if disposition == Disposition::Keep {
                        emit_open(&mut out, &tag, &attrs, is_admin, strip_artifacts);
                    }
                    continue;
                }
                if self_closing {
                    // XML-style empty element: emit balanced so re-lexing is stable.
                    if disposition == Disposition::Keep {
                        emit_open(&mut out, &tag, &attrs, is_admin, strip_artifacts);
                        out.push_str("</");
                        out.push_str(&tag);
                        out.push('>');
                    }
                    continue;
                }
                match disposition {
                    Disposition::Keep => {
                        emit_open(&mut out, &tag, &attrs, is_admin, strip_artifacts)
                    }
                    Disposition::Unwrap => {}
                    Disposition::Drop => drop_depth += 1,
                }
                stack.push(StackEntry { tag, disposition });
            }
            Token::Close { tag } => {
                let Some(idx) = stack.iter().rposition(|e| e.tag == tag) else {
                    if drop_depth == 0 {
                        errors.push(format!("stray closing </{}> tag", tag));
                    }
                    continue;
                };
                // Implicitly close anything opened inside the matched element.
                while stack.len() > idx + 1 {
                    let entry = stack.pop().expect("stack entry above match");
                    close_entry(&mut out, &mut drop_depth, &entry);
                    if entry.disposition != Disposition::Drop {
                        errors.push(format!(
                            "<{}> closed implicitly by </{}>",
                            entry.tag, tag
                        ));
                    }
                }
                let entry = stack.pop().expect("matched stack entry");
                close_entry(&mut out, &mut drop_depth, &entry);
            }
        }
    }

    // Close whatever is still open at end of input.
    while let Some(entry) = stack.pop() {
        close_entry(&mut out, &mut drop_depth, &entry);
        if entry.disposition != Disposition::Drop {
            errors.push(format!("unclosed <{}> tag", entry.tag));
        }
    }

    (out, errors)
}

fn close_entry(out: &mut String, drop_depth: &mut usize, entry: &StackEntry) {
    match entry.disposition {
        Disposition::Keep => {
            out.push_str("</");
            out.push_str(&entry.tag);
            out.push('>');
        }
        Disposition::Unwrap => {}
        Disposition::Drop => *drop_depth -= 1,
    }
}

fn classify(tag: &str, attrs: &[Attr], is_admin: bool, strip_artifacts: bool) -> Disposition {
    if matches!(tag, "script" | "style") {
        return Disposition::Drop;
    }
    if strip_artifacts && has_artifact_class(attrs) {
        return Disposition::Drop;
    }
    if BASE_TAGS.contains(&tag) || (is_admin && ADMIN_TAGS.contains(&tag)) {
        Disposition::Keep
    } else {
        Disposition::Unwrap
    }
}

fn has_artifact_class(attrs: &[Attr]) -> bool {
    attrs
        .iter()
        .find(|a| a.name == "class")
        .is_some_and(|a| {
            a.value
                .split_whitespace()
                .any(|c| ARTIFACT_CLASSES.contains(&c))
        })
}

fn emit_open(out: &mut String, tag: &str, attrs: &[Attr], is_admin: bool, strip_bookkeeping: bool) {
    out.push('<');
    out.push_str(tag);
    for attr in attrs {
        if !attr_allowed(tag, &attr.name, is_admin, strip_bookkeeping) {
            continue;
        }
        let value = if attr.name == "style" {
            let filtered = filter_style(&attr.value);
            if filtered.is_empty() {
                continue;
            }
            filtered
        } else {
            attr.value.clone()
        };
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        escape_html(out, &value);
        out.push('"');
    }
    out.push('>');
}

fn attr_allowed(tag: &str, name: &str, is_admin: bool, strip_bookkeeping: bool) -> bool {
    if GLOBAL_ATTRS.contains(&name) {
        return true;
    }
    if name.starts_with(BOOKKEEPING_PREFIX) {
        return !strip_bookkeeping;
    }
    if name == "id" {
        return is_admin;
    }
    match tag {
        "a" => matches!(name, "href" | "target" | "rel" | "name"),
        "img" => matches!(name, "src" | "alt" | "width" | "height"),
        "iframe" => {
            is_admin
                && matches!(
                    name,
                    "src" | "width" | "height" | "frameborder" | "allowfullscreen" | "allow"
                )
        }
        "th" | "td" => matches!(name, "colspan" | "rowspan" | "scope"),
        "table" => matches!(name, "border" | "cellpadding" | "cellspacing"),
        "ol" => name == "start",
        _ => false,
    }
}

/// Keep only allowlisted style properties, normalized to `prop: value`
/// pairs joined by `; `.
fn filter_style(style: &str) -> String {
    let mut kept = Vec::new();
    for decl in style.split(';') {
        let Some((prop, value)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() || !STYLE_PROPS.contains(&prop.as_str()) {
            continue;
        }
        kept.push(format!("{}: {}", prop, value));
    }
    kept.join("; ")
}
