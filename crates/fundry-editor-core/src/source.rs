//! Source-mode text buffer.
//!
//! When the editor shows raw markup, edits land here instead of the surface
//! tree. Ropey keeps char-indexed editing cheap; offsets are in Unicode
//! scalar values, not bytes.

use std::ops::Range;

use smol_str::{SmolStr, ToSmolStr};

/// Ropey-backed buffer holding the literal markup text.
#[derive(Clone, Default)]
pub struct SourceBuffer {
    rope: ropey::Rope,
}

impl SourceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn insert(&mut self, char_offset: usize, text: &str) {
        let offset = char_offset.min(self.rope.len_chars());
        self.rope.insert(offset, text);
    }

    pub fn push(&mut self, text: &str) {
        let end = self.rope.len_chars();
        self.rope.insert(end, text);
    }

    pub fn delete(&mut self, char_range: Range<usize>) {
        if char_range.end <= self.rope.len_chars() {
            self.rope.remove(char_range);
        }
    }

    pub fn replace(&mut self, char_range: Range<usize>, text: &str) {
        self.delete(char_range.clone());
        self.insert(char_range.start, text);
    }

    pub fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.end > self.rope.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    pub fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.rope.len_chars() {
            return None;
        }
        Some(self.rope.char(char_offset))
    }

    /// Replace the entire content.
    pub fn set_text(&mut self, text: &str) {
        self.rope = ropey::Rope::from_str(text);
    }
}

impl std::fmt::Display for SourceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut buf = SourceBuffer::from_str("hello world");
        assert_eq!(buf.len_chars(), 11);

        buf.insert(5, " beautiful");
        assert_eq!(buf.to_string(), "hello beautiful world");

        buf.delete(5..15);
        assert_eq!(buf.to_string(), "hello world");

        buf.replace(6..11, "rust");
        assert_eq!(buf.to_string(), "hello rust");
    }

    #[test]
    fn test_push_appends() {
        let mut buf = SourceBuffer::from_str("<p>x</p>");
        buf.push("[text](url)");
        assert_eq!(buf.to_string(), "<p>x</p>[text](url)");
    }

    #[test]
    fn test_char_offsets_not_bytes() {
        let buf = SourceBuffer::from_str("héllo");
        assert_eq!(buf.len_chars(), 5);
        assert_eq!(buf.char_at(1), Some('é'));
        assert_eq!(buf.slice(0..2).as_deref(), Some("hé"));
        assert_eq!(buf.slice(0..100), None);
    }
}
