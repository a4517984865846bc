//! Char-offset helpers for text projections.
//!
//! Matches and edits are expressed in chars while Rust strings index by
//! byte, so every slice operation goes through these helpers.

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the char at `char_idx`. `char_idx == char_len(s)` maps to
/// `s.len()`; anything past the end is `None`.
pub fn byte_offset(s: &str, char_idx: usize) -> Option<usize> {
    if char_idx == 0 {
        return Some(0);
    }
    match s.char_indices().nth(char_idx) {
        Some((byte, _)) => Some(byte),
        None if char_len(s) == char_idx => Some(s.len()),
        None => None,
    }
}

/// Chars `[start, start + len)` of `s`.
pub fn char_slice(s: &str, start: usize, len: usize) -> Option<&str> {
    let from = byte_offset(s, start)?;
    let to = byte_offset(s, start + len)?;
    Some(&s[from..to])
}

/// Replaces chars `[start, start + len)` of `s` with `replacement`.
pub fn splice_chars(s: &str, start: usize, len: usize, replacement: &str) -> Option<String> {
    let from = byte_offset(s, start)?;
    let to = byte_offset(s, start + len)?;
    let mut out = String::with_capacity(s.len() - (to - from) + replacement.len());
    out.push_str(&s[..from]);
    out.push_str(replacement);
    out.push_str(&s[to..]);
    Some(out)
}

/// Converts ascending byte offsets of one string into char offsets without
/// rescanning from the start each time.
#[derive(Debug)]
pub struct CharCursor<'a> {
    text: &'a str,
    byte_pos: usize,
    char_pos: usize,
}

impl<'a> CharCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            byte_pos: 0,
            char_pos: 0,
        }
    }

    /// Char offset of `byte`. Offsets lower than the previous call restart
    /// the scan.
    pub fn char_index(&mut self, byte: usize) -> usize {
        if byte < self.byte_pos {
            self.byte_pos = 0;
            self.char_pos = 0;
        }
        self.char_pos += char_len(&self.text[self.byte_pos..byte]);
        self.byte_pos = byte;
        self.char_pos
    }
}
