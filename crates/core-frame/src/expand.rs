//! Double-click expansion.
//!
//! The byte just before the click decides what gets selected:
//!
//! * start of content or a newline: the rest of the line
//! * a quote: everything up to the matching quote
//! * an opening bracket: everything up to its partner, honouring nesting
//! * a closing bracket: everything back to its partner
//! * a word byte: the surrounding word
//!
//! The delimiters themselves stay outside the returned range.

use std::ops::Range;

const QUOTES: &[u8] = b"\"'`";
const LEFT: &[u8] = b"({[<";
const RIGHT: &[u8] = b")}]>";

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"*&!%-_".contains(&b)
}

/// Region to select for a double click at `offset` in `text`, or `None` if
/// the click lands on nothing expandable.
pub fn expand(text: &[u8], offset: usize) -> Option<Range<usize>> {
    let i = offset.min(text.len());
    if i == 0 {
        return Some(0..line_end(text, 0));
    }
    let prev = text[i - 1];
    if prev == b'\n' {
        return Some(i..line_end(text, i));
    }
    if QUOTES.contains(&prev) {
        let j = text[i..].iter().position(|&b| b == prev)?;
        return Some(i..i + j);
    }
    if let Some(k) = LEFT.iter().position(|&b| b == prev) {
        let j = match_forward(text, i, prev, RIGHT[k])?;
        return Some(i..j);
    }
    if let Some(k) = RIGHT.iter().position(|&b| b == prev) {
        let j = match_backward(text, i - 1, LEFT[k], prev)?;
        return Some(j + 1..i - 1);
    }
    if is_word(prev) {
        let start = text[..i]
            .iter()
            .rposition(|&b| !is_word(b))
            .map_or(0, |p| p + 1);
        let end = text[i..]
            .iter()
            .position(|&b| !is_word(b))
            .map_or(text.len(), |p| i + p);
        return Some(start..end);
    }
    None
}

fn line_end(text: &[u8], from: usize) -> usize {
    text[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(text.len(), |p| from + p)
}

/// Offset of the `close` that balances an `open` just before `from`.
fn match_forward(text: &[u8], from: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 1usize;
    for (k, &b) in text[from..].iter().enumerate() {
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(from + k);
            }
        }
    }
    None
}

/// Offset of the `open` that balances the `close` at `at`.
fn match_backward(text: &[u8], at: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 1usize;
    for k in (0..at).rev() {
        let b = text[k];
        if b == close {
            depth += 1;
        } else if b == open {
            depth -= 1;
            if depth == 0 {
                return Some(k);
            }
        }
    }
    None
}
