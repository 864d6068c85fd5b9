//! Position-based helpers over a wikitext buffer.
//!
//! Every function here is total: an index at or past the end of the text,
//! or one that falls inside a multi-byte character, is treated as
//! "no match" / "not found" rather than panicking.

/// Returns the index right after `literal` if the text at `index` starts with it.
pub fn match_literal(text: &str, index: usize, literal: &str) -> Option<usize> {
    let rest = text.as_bytes().get(index..)?;
    rest.starts_with(literal.as_bytes())
        .then_some(index + literal.len())
}

/// Skips spaces, tabs and line breaks starting at `index`.
///
/// The returned index is never past the end of the text.
pub fn skip_whitespace(text: &str, index: usize) -> usize {
    skip_while(text, index, |b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}

/// Skips spaces only (no tabs, no line breaks).
pub fn skip_spaces(text: &str, index: usize) -> usize {
    skip_while(text, index, |b| b == b' ')
}

fn skip_while(text: &str, index: usize, pred: impl Fn(u8) -> bool) -> usize {
    let bytes = text.as_bytes();
    let mut i = index.min(bytes.len());
    while i < bytes.len() && pred(bytes[i]) {
        i += 1;
    }
    i
}

/// Finds the first occurrence of `literal` at or after `from`.
pub fn find_next(text: &str, from: usize, literal: &str) -> Option<usize> {
    if literal.is_empty() {
        return None;
    }
    let haystack = text.as_bytes().get(from..)?;
    let needle = literal.as_bytes();
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

/// Finds the first occurrence of `byte` in `[from, until)`.
pub fn find_byte_before(text: &str, from: usize, until: usize, byte: u8) -> Option<usize> {
    let until = until.min(text.len());
    text.as_bytes()
        .get(from..until)?
        .iter()
        .position(|&b| b == byte)
        .map(|p| from + p)
}

/// Index of the character following the one at `index`.
///
/// Past the end of the text this returns `index + 1` so that scan loops
/// always make progress.
pub fn next_char_index(text: &str, index: usize) -> usize {
    match text.get(index..).and_then(|rest| rest.chars().next()) {
        Some(c) => index + c.len_utf8(),
        None => index + 1,
    }
}

/// True when `index` is the start of the text or follows a line break.
pub fn is_line_start(text: &str, index: usize) -> bool {
    index == 0 || text.as_bytes().get(index - 1) == Some(&b'\n')
}

/// Index of the end of the line containing `index` (the `\n` position, or the text length).
pub fn line_end(text: &str, index: usize) -> usize {
    find_next(text, index, "\n").unwrap_or(text.len()).max(index.min(text.len()))
}

/// Byte at `index`, if any.
pub fn byte_at(text: &str, index: usize) -> Option<u8> {
    text.as_bytes().get(index).copied()
}

/// Returns the substring `[begin, end)` or `None` if the range is not valid.
pub fn slice(text: &str, begin: usize, end: usize) -> Option<&str> {
    if begin > end {
        return None;
    }
    text.get(begin..end)
}

/// Skips an HTML comment starting at `index`, returning the index after `-->`.
///
/// An unterminated comment swallows the rest of the text.
pub fn skip_comment(text: &str, index: usize) -> Option<usize> {
    let inner = match_literal(text, index, "<!--")?;
    Some(find_next(text, inner, "-->").map_or(text.len(), |end| end + 3))
}
