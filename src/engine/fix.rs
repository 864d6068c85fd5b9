//! Rewriting a page from accepted findings.

use thiserror::Error;
use tracing::{debug, warn};

use super::analysis::TextBuffer;
use crate::types::Finding;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixError {
    #[error("edit span {begin}..{end} is outside the text (length {len}) or splits a character")]
    InvalidSpan { begin: usize, end: usize, len: usize },
}

/// Replace `[begin, end)` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub begin: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    pub fn new(begin: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            begin,
            end,
            replacement: replacement.into(),
        }
    }
}

/// Apply `edits` to `buffer`, producing a new buffer.
///
/// Edits are applied from the highest begin offset down so that every
/// offset still refers to the original text. When two edits overlap, the
/// one starting later is kept. Returns the new buffer and the number of
/// edits applied.
pub fn apply_edits(buffer: &TextBuffer, edits: &[Edit]) -> Result<(TextBuffer, usize), FixError> {
    let text = buffer.as_str();
    for edit in edits {
        let valid = edit.begin <= edit.end
            && edit.end <= text.len()
            && text.is_char_boundary(edit.begin)
            && text.is_char_boundary(edit.end);
        if !valid {
            return Err(FixError::InvalidSpan {
                begin: edit.begin,
                end: edit.end,
                len: text.len(),
            });
        }
    }

    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.begin.cmp(&a.begin).then(b.end.cmp(&a.end)));

    let mut result = text.to_string();
    let mut applied = 0;
    let mut lowest_begin = usize::MAX;
    for edit in ordered {
        if edit.end > lowest_begin {
            warn!(begin = edit.begin, end = edit.end, "skipping overlapping edit");
            continue;
        }
        result.replace_range(edit.begin..edit.end, &edit.replacement);
        lowest_begin = edit.begin;
        applied += 1;
    }
    debug!(applied, requested = edits.len(), "applied edits");
    Ok((TextBuffer::new(result), applied))
}

/// One edit per finding, using its first replacement that may be applied
/// without review (or in bot mode, when `bot` is set).
pub fn automatic_edits(findings: &[Finding], bot: bool) -> Vec<Edit> {
    findings
        .iter()
        .filter_map(|finding| {
            finding
                .replacements
                .iter()
                .find(|r| r.automatic || (bot && r.automatic_bot))
                .map(|r| Edit::new(finding.begin, finding.end, r.text.clone()))
        })
        .collect()
}
