use std::fmt;

use super::scanner::{find_byte_before, find_next, match_literal, skip_spaces, slice};
use super::title_case::{same_title, uc_first};
use super::types::{InternalLink, RawLinkParts};

/// Detect an internal link `[[link#anchor|text]]` starting exactly at `index`.
///
/// The closing `]]` is the first one after the opening, without any
/// awareness of nested brackets.
pub fn detect(text: &str, index: usize) -> Option<InternalLink> {
    let inner_begin = match_literal(text, index, "[[")?;
    let content = skip_spaces(text, inner_begin);
    if content >= text.len() {
        return None;
    }
    let close = find_next(text, content, "]]")?;
    let anchor = find_byte_before(text, content, close, b'#');
    let pipe = find_byte_before(text, content, close, b'|');

    let part = |from: usize, to: usize| slice(text, from, to).map(str::to_string);

    let raw = match (pipe, anchor) {
        (Some(pipe), Some(anchor)) if anchor < pipe => RawLinkParts {
            link: part(inner_begin, anchor)?,
            anchor: part(anchor + 1, pipe),
            text: part(pipe + 1, close),
        },
        (Some(pipe), _) => RawLinkParts {
            link: part(inner_begin, pipe)?,
            anchor: None,
            text: part(pipe + 1, close),
        },
        (None, Some(anchor)) => RawLinkParts {
            link: part(inner_begin, anchor)?,
            anchor: part(anchor + 1, close),
            text: None,
        },
        (None, None) => RawLinkParts {
            link: part(inner_begin, close)?,
            anchor: None,
            text: None,
        },
    };

    Some(InternalLink {
        begin: index,
        end: close + 2,
        link: uc_first(raw.link.trim()),
        anchor: raw.anchor.as_deref().map(|a| a.trim().to_string()),
        text: raw.text.as_deref().map(|t| t.trim().to_string()),
        raw,
    })
}

impl InternalLink {
    /// Target including the anchor, `link#anchor`.
    pub fn full_link(&self) -> String {
        match &self.anchor {
            Some(anchor) => format!("{}#{}", self.link, anchor),
            None => self.link.clone(),
        }
    }

    /// Text shown to the reader: the explicit text, or the target itself.
    pub fn displayed_text(&self) -> String {
        self.text.clone().unwrap_or_else(|| self.full_link())
    }
}

/// Renders the link exactly as it was written.
impl fmt::Display for InternalLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[[{}", self.raw.link)?;
        if let Some(anchor) = &self.raw.anchor {
            write!(f, "#{anchor}")?;
        }
        if let Some(text) = &self.raw.text {
            write!(f, "|{text}")?;
        }
        f.write_str("]]")
    }
}

/// Build the markup for a link to `target` displayed as `text`.
pub fn create_internal_link(target: &str, text: &str) -> String {
    if text.is_empty() {
        format!("[[{target}]]")
    } else if same_title(target, text) {
        format!("[[{text}]]")
    } else {
        format!("[[{target}|{text}]]")
    }
}
