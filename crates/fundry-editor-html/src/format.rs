//! Pretty-printer for source-mode display.
//!
//! Block-level elements go on their own lines, indented two spaces per
//! depth. Inline runs stay in flow, so `<p>hello <b>x</b></p>` remains a
//! single line while nested lists and tables fan out.

use crate::escape::escape_html;
use crate::lexer::{Token, is_void, tokenize};

const INDENT: &str = "  ";

/// Tags printed on their own lines.
const BLOCK_TAGS: &[&str] = &[
    "blockquote", "caption", "div", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6",
    "hr", "iframe", "li", "ol", "p", "pre", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    "ul",
];

fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Pretty-print an HTML fragment with indentation.
pub fn format(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut depth = 0usize;
    // Per open block: whether a nested block forced its content onto new lines.
    let mut block_stack: Vec<bool> = Vec::new();

    for token in tokenize(html) {
        match token {
            Token::Text(text) => {
                let trimmed_is_empty = text.trim().is_empty();
                if !trimmed_is_empty {
                    escape_html(&mut out, &text);
                } else if !out.ends_with('>') && !out.is_empty() {
                    // Preserve a single space inside inline flow.
                    if !out.ends_with(char::is_whitespace) {
                        out.push(' ');
                    }
                }
            }
            Token::Comment => {}
            Token::Open {
                tag,
                attrs,
                self_closing,
            } => {
                if is_block(&tag) {
                    if let Some(top) = block_stack.last_mut() {
                        *top = true;
                    }
                    new_line(&mut out, depth);
                }
                write_open(&mut out, &tag, &attrs);
                if is_void(&tag) || self_closing {
                    if self_closing && !is_void(&tag) {
                        out.push_str("</");
                        out.push_str(&tag);
                        out.push('>');
                    }
                    continue;
                }
                if is_block(&tag) {
                    depth += 1;
                    block_stack.push(false);
                }
            }
            Token::Close { tag } => {
                if is_void(&tag) {
                    continue;
                }
                if is_block(&tag) {
                    depth = depth.saturating_sub(1);
                    let had_block_child = block_stack.pop().unwrap_or(false);
                    if had_block_child {
                        new_line(&mut out, depth);
                    }
                }
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
            }
        }
    }
    out
}

fn new_line(out: &mut String, depth: usize) {
    if out.is_empty() {
        return;
    }
    // Drop trailing inline spacing before breaking the line.
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_open(out: &mut String, tag: &str, attrs: &[crate::lexer::Attr]) {
    out.push('<');
    out.push_str(tag);
    for attr in attrs {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        escape_html(out, &attr.value);
        out.push('"');
    }
    out.push('>');
}
