use super::scanner::{byte_at, match_literal, slice};
use super::types::Isbn;

/// Detect an `ISBN` magic link starting exactly at `index`.
///
/// Malformed numbers are still detected so that they can be reported;
/// [`Isbn::is_correct`] tells them apart. The keyword alone, without any
/// digit after it, is plain prose.
pub fn detect(text: &str, index: usize) -> Option<Isbn> {
    let mut cursor = match_literal(text, index, "ISBN")?;
    if index > 0 && byte_at(text, index - 1).is_some_and(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    if byte_at(text, cursor).is_some_and(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    let mut clean_syntax = true;
    if let Some(after) =
        match_literal(text, cursor, "-10").or_else(|| match_literal(text, cursor, "-13"))
    {
        cursor = after;
        clean_syntax = false;
    }
    let prefix_end = cursor;
    cursor = skip_separators(text, cursor);
    if byte_at(text, cursor) == Some(b':') {
        clean_syntax = false;
        cursor = skip_separators(text, cursor + 1);
    }
    if cursor == prefix_end {
        // "ISBN978..." without any separator
        clean_syntax = false;
    }

    let mut number = String::new();
    let mut number_end = cursor;
    while let Some(b) = byte_at(text, cursor) {
        match b {
            b'0'..=b'9' | b'X' | b'x' => {
                number.push(char::from(b).to_ascii_uppercase());
                cursor += 1;
                number_end = cursor;
            }
            b'-' if byte_at(text, cursor + 1).is_some_and(is_number_char) => cursor += 1,
            // a complete number followed by a space ends the link
            b' ' if byte_at(text, cursor + 1).is_some_and(is_number_char)
                && number.len() < 13
                && !is_valid_number(&number) =>
            {
                cursor += 1
            }
            _ => break,
        }
    }
    if !number.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if byte_at(text, number_end).is_some_and(|b| b.is_ascii_alphabetic()) {
        clean_syntax = false;
    }

    Some(Isbn {
        begin: index,
        end: number_end,
        raw: slice(text, prefix_end, number_end)?.to_string(),
        valid_number: is_valid_number(&number),
        clean_syntax,
        number,
    })
}

fn is_number_char(b: u8) -> bool {
    b.is_ascii_digit() || b == b'X' || b == b'x'
}

fn skip_separators(text: &str, index: usize) -> usize {
    let mut cursor = index;
    loop {
        if let Some(after) = match_literal(text, cursor, "&nbsp;") {
            cursor = after;
        } else if matches!(byte_at(text, cursor), Some(b' ' | b'\t')) {
            cursor += 1;
        } else if let Some(after) = match_literal(text, cursor, "\u{a0}") {
            cursor = after;
        } else {
            return cursor;
        }
    }
}

/// Length and checksum check for ISBN-10 and ISBN-13 numbers.
pub fn is_valid_number(number: &str) -> bool {
    let digits: Vec<u32> = number
        .chars()
        .map(|c| if c == 'X' { 10 } else { c.to_digit(10).unwrap_or(99) })
        .collect();
    let x_only_last = digits.iter().rev().skip(1).all(|&d| d < 10);
    match digits.len() {
        10 if x_only_last => {
            let sum: u32 = digits
                .iter()
                .zip((1..=10).rev())
                .map(|(d, weight)| d * weight)
                .sum();
            sum % 11 == 0
        }
        13 if digits.iter().all(|&d| d < 10) => {
            let sum: u32 = digits
                .iter()
                .enumerate()
                .map(|(i, d)| if i % 2 == 0 { *d } else { d * 3 })
                .sum();
            sum % 10 == 0
        }
        _ => false,
    }
}

impl Isbn {
    pub fn is_correct(&self) -> bool {
        self.valid_number && self.clean_syntax
    }
}
