//! Minimal HTML entity escaping for text and attribute values.

/// Append `text` to `out`, escaping the characters that are unsafe in
/// element content and double-quoted attribute values.
pub fn escape_html(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Decode the entities [`escape_html`] produces, plus the handful of named
/// and numeric entities that show up in pasted editor content.
///
/// Unknown entities are left verbatim, ampersand included, so decoding is
/// loss-free on already-plain text.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match decode_one(rest) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode a single entity at the start of `s` (which begins with `&`).
/// Returns the decoded char and the byte length consumed.
fn decode_one(s: &str) -> Option<(char, usize)> {
    let end = s[1..].find(';').map(|i| i + 1)?;
    if end > 10 {
        return None;
    }
    let body = &s[1..end];
    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((ch, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(s: &str) -> String {
        let mut out = String::new();
        escape_html(&mut out, s);
        out
    }

    #[test]
    fn test_escape_basic() {
        assert_eq!(escaped("a < b & c > \"d\""), "a &lt; b &amp; c &gt; &quot;d&quot;");
        assert_eq!(escaped("plain"), "plain");
    }

    #[test]
    fn test_decode_round_trip() {
        let original = "x < y & \"z\"";
        assert_eq!(decode_entities(&escaped(original)), original);
    }

    #[test]
    fn test_decode_numeric() {
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("&nbsp;"), "\u{a0}");
    }

    #[test]
    fn test_decode_unknown_left_verbatim() {
        assert_eq!(decode_entities("AT&T; &bogus; & plain"), "AT&T; &bogus; & plain");
    }
}
