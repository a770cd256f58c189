//! Forgiving HTML tokenizer.
//!
//! Editor surfaces hold user-typed markup, so the lexer never fails: malformed
//! input degrades to text tokens. Tag and attribute names are lowercased,
//! entities in text and attribute values are decoded (re-escaped on output by
//! the serialization passes).

use smol_str::SmolStr;

use crate::escape::decode_entities;

/// A single lexed token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Open {
        tag: SmolStr,
        attrs: Vec<Attr>,
        self_closing: bool,
    },
    Close {
        tag: SmolStr,
    },
    Text(String),
    Comment,
}

/// A decoded attribute. Value-less attributes carry an empty value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: SmolStr,
    pub value: String,
}

/// Tags that never take children or a closing tag.
pub const VOID_TAGS: [&str; 10] = [
    "area", "br", "col", "embed", "hr", "img", "input", "source", "track", "wbr",
];

/// Check whether a (lowercase) tag name is a void element.
pub fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Elements whose content is raw text up to the matching close tag.
fn is_raw_text(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Tokenize an HTML fragment.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }

        // Try to lex a markup construct at `pos`; on failure the `<` is text.
        let lexed = if input[pos..].starts_with("<!--") {
            let end = input[pos + 4..]
                .find("-->")
                .map(|i| pos + 4 + i + 3)
                .unwrap_or(input.len());
            Some((Token::Comment, end))
        } else if input[pos..].starts_with("</") {
            lex_close(input, pos)
        } else {
            lex_open(input, pos)
        };

        match lexed {
            Some((token, end)) => {
                flush_text(&mut tokens, &input[text_start..pos]);
                let raw = match &token {
                    Token::Open { tag, self_closing, .. } if !self_closing && is_raw_text(tag) => {
                        Some(tag.clone())
                    }
                    _ => None,
                };
                tokens.push(token);
                pos = end;
                text_start = end;

                // Raw-text content is swallowed whole so `<` inside scripts
                // does not derail the lexer.
                if let Some(tag) = raw {
                    let closer = format!("</{}", tag);
                    let rest = &input[pos..];
                    let (content_len, consumed) = match find_ci(rest, &closer) {
                        Some(i) => {
                            let after = rest[i..].find('>').map(|j| i + j + 1).unwrap_or(rest.len());
                            (i, after)
                        }
                        None => (rest.len(), rest.len()),
                    };
                    if content_len > 0 {
                        tokens.push(Token::Text(rest[..content_len].to_string()));
                    }
                    tokens.push(Token::Close { tag });
                    pos += consumed;
                    text_start = pos;
                }
            }
            None => pos += 1,
        }
    }
    flush_text(&mut tokens, &input[text_start..]);
    tokens
}

fn flush_text(tokens: &mut Vec<Token>, raw: &str) {
    if !raw.is_empty() {
        tokens.push(Token::Text(decode_entities(raw)));
    }
}

/// Case-insensitive substring search (ASCII).
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.to_ascii_lowercase();
    let lower = haystack.to_ascii_lowercase();
    lower.find(&needle)
}

/// Lex `</tag>` starting at `pos`. Returns the token and the end offset.
fn lex_close(input: &str, pos: usize) -> Option<(Token, usize)> {
    let rest = &input[pos + 2..];
    let name_len = tag_name_len(rest)?;
    let tag = SmolStr::new(rest[..name_len].to_ascii_lowercase());
    let close = rest[name_len..].find('>')?;
    Some((Token::Close { tag }, pos + 2 + name_len + close + 1))
}

/// Lex `<tag attr="v" ...>` starting at `pos`.
fn lex_open(input: &str, pos: usize) -> Option<(Token, usize)> {
    let rest = &input[pos + 1..];
    let name_len = tag_name_len(rest)?;
    let tag = SmolStr::new(rest[..name_len].to_ascii_lowercase());

    let mut cursor = name_len;
    let bytes = rest.as_bytes();
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if cursor >= bytes.len() {
            return None;
        }
        match bytes[cursor] {
            b'>' => {
                cursor += 1;
                break;
            }
            b'/' => {
                self_closing = true;
                cursor += 1;
            }
            _ => {
                let (attr, consumed) = lex_attr(&rest[cursor..])?;
                attrs.push(attr);
                cursor += consumed;
            }
        }
    }

    Some((
        Token::Open {
            tag,
            attrs,
            self_closing,
        },
        pos + 1 + cursor,
    ))
}

/// Lex one attribute: `name`, `name=bare`, `name="quoted"`, `name='quoted'`.
fn lex_attr(input: &str) -> Option<(Attr, usize)> {
    let bytes = input.as_bytes();
    let mut cursor = 0;
    while cursor < bytes.len()
        && !bytes[cursor].is_ascii_whitespace()
        && !matches!(bytes[cursor], b'=' | b'>' | b'/')
    {
        cursor += 1;
    }
    if cursor == 0 {
        return None;
    }
    let name = SmolStr::new(input[..cursor].to_ascii_lowercase());

    if bytes.get(cursor) != Some(&b'=') {
        return Some((
            Attr {
                name,
                value: String::new(),
            },
            cursor,
        ));
    }
    cursor += 1;

    let value;
    match bytes.get(cursor) {
        Some(&q @ (b'"' | b'\'')) => {
            cursor += 1;
            let end = input[cursor..].find(q as char)?;
            value = decode_entities(&input[cursor..cursor + end]);
            cursor += end + 1;
        }
        _ => {
            let start = cursor;
            while cursor < bytes.len()
                && !bytes[cursor].is_ascii_whitespace()
                && !matches!(bytes[cursor], b'>' | b'/')
            {
                cursor += 1;
            }
            value = decode_entities(&input[start..cursor]);
        }
    }
    Some((Attr { name, value }, cursor))
}

/// Length of a tag name at the start of `s`, or None if it isn't one.
fn tag_name_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || !bytes[0].is_ascii_alphabetic() {
        return None;
    }
    let mut len = 1;
    while len < bytes.len() && (bytes[len].is_ascii_alphanumeric() || bytes[len] == b'-') {
        len += 1;
    }
    Some(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(tag: &str) -> Token {
        Token::Open {
            tag: tag.into(),
            attrs: vec![],
            self_closing: false,
        }
    }

    fn close(tag: &str) -> Token {
        Token::Close { tag: tag.into() }
    }

    #[test]
    fn test_simple_element() {
        let tokens = tokenize("<p>hello</p>");
        assert_eq!(
            tokens,
            vec![open("p"), Token::Text("hello".into()), close("p")]
        );
    }

    #[test]
    fn test_attributes() {
        let tokens = tokenize(r#"<a href="/x" target=_blank download>go</a>"#);
        match &tokens[0] {
            Token::Open { tag, attrs, .. } => {
                assert_eq!(tag, "a");
                assert_eq!(attrs[0].name, "href");
                assert_eq!(attrs[0].value, "/x");
                assert_eq!(attrs[1].name, "target");
                assert_eq!(attrs[1].value, "_blank");
                assert_eq!(attrs[2].name, "download");
                assert_eq!(attrs[2].value, "");
            }
            other => panic!("expected open tag, got {:?}", other),
        }
    }

    #[test]
    fn test_case_folding() {
        let tokens = tokenize("<DIV CLASS=\"x\">t</DIV>");
        match &tokens[0] {
            Token::Open { tag, attrs, .. } => {
                assert_eq!(tag, "div");
                assert_eq!(attrs[0].name, "class");
            }
            other => panic!("expected open tag, got {:?}", other),
        }
        assert_eq!(tokens[2], close("div"));
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let tokens = tokenize("a < b");
        assert_eq!(tokens, vec![Token::Text("a < b".into())]);
    }

    #[test]
    fn test_entities_decoded() {
        let tokens = tokenize("x &amp; y");
        assert_eq!(tokens, vec![Token::Text("x & y".into())]);
    }

    #[test]
    fn test_comment_skipped() {
        let tokens = tokenize("a<!-- note -->b");
        assert_eq!(
            tokens,
            vec![
                Token::Text("a".into()),
                Token::Comment,
                Token::Text("b".into())
            ]
        );
    }

    #[test]
    fn test_script_raw_text() {
        let tokens = tokenize("<script>if (a<b) { x(); }</script>after");
        assert_eq!(
            tokens,
            vec![
                open("script"),
                Token::Text("if (a<b) { x(); }".into()),
                close("script"),
                Token::Text("after".into()),
            ]
        );
    }

    #[test]
    fn test_self_closing() {
        let tokens = tokenize("<br/><img src=\"x\"/>");
        match &tokens[0] {
            Token::Open {
                tag, self_closing, ..
            } => {
                assert_eq!(tag, "br");
                assert!(self_closing);
            }
            other => panic!("expected open tag, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_tag_is_text() {
        let tokens = tokenize("<p foo");
        assert_eq!(tokens, vec![Token::Text("<p foo".into())]);
    }
}
