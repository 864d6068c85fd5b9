//! Element detectors for wikitext constructs.
//!
//! Each submodule exposes a `detect(text, index)` function that either
//! recognizes its construct starting exactly at `index` or returns `None`.
//! Detectors never panic on out-of-range indexes.

pub mod category;
pub mod external_link;
pub mod internal_link;
pub mod isbn;
pub mod scanner;
pub mod tag;
pub mod template;
pub mod title;
pub mod title_case;
pub mod types;

use types::Spanned;

/// Scan the whole text left to right with `detect`.
///
/// After a match the cursor jumps to the end of the element; after a miss
/// (or a zero-length match, which is discarded) it moves forward by one
/// character. The result is sorted by begin index and never overlaps.
pub fn scan_all<T, F>(text: &str, mut detect: F) -> Vec<T>
where
    T: Spanned,
    F: FnMut(&str, usize) -> Option<T>,
{
    let mut elements = Vec::new();
    let mut cursor = 0;
    while cursor < text.len() {
        match detect(text, cursor) {
            Some(element) if element.begin() == cursor && element.end() > cursor => {
                cursor = element.end();
                elements.push(element);
            }
            _ => cursor = scanner::next_char_index(text, cursor),
        }
    }
    elements
}

/// Like [`scan_all`] but only tries `detect` where `trigger` occurs.
///
/// Every detector requires a fixed literal at its start, so jumping between
/// occurrences of that literal visits the same positions a character-by-character
/// scan would try successfully.
pub fn scan_from_trigger<T, F>(text: &str, trigger: &str, mut detect: F) -> Vec<T>
where
    T: Spanned,
    F: FnMut(&str, usize) -> Option<T>,
{
    let mut elements = Vec::new();
    let mut cursor = 0;
    while let Some(candidate) = scanner::find_next(text, cursor, trigger) {
        match detect(text, candidate) {
            Some(element) if element.begin() == candidate && element.end() > candidate => {
                cursor = element.end();
                elements.push(element);
            }
            _ => cursor = scanner::next_char_index(text, candidate),
        }
    }
    elements
}
