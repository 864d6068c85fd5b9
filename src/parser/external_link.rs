use super::scanner::{byte_at, find_next, match_literal, slice};
use super::types::ExternalLink;

const PROTOCOLS: &[&str] = &["http://", "https://", "ftp://", "//"];

/// Detect a bracketed external link `[url text]` starting exactly at `index`.
pub fn detect(text: &str, index: usize) -> Option<ExternalLink> {
    let url_begin = match_literal(text, index, "[")?;
    if byte_at(text, url_begin) == Some(b'[') {
        return None;
    }
    let protocol_end = PROTOCOLS
        .iter()
        .find_map(|p| match_literal_ignore_case(text, url_begin, p))?;

    let close = find_next(text, url_begin, "]")?;
    let line_break = find_next(text, url_begin, "\n");
    if line_break.is_some_and(|lb| lb < close) {
        return None;
    }

    let inner = slice(text, url_begin, close)?;
    let url_len = inner
        .find(|c: char| c.is_whitespace() || c == '<' || c == '"')
        .unwrap_or(inner.len());
    if url_begin + url_len <= protocol_end {
        return None;
    }
    let url = inner[..url_len].to_string();
    let rest = inner[url_len..].trim();

    Some(ExternalLink {
        begin: index,
        end: close + 1,
        url,
        text: (!rest.is_empty()).then(|| rest.to_string()),
    })
}

fn match_literal_ignore_case(text: &str, index: usize, literal: &str) -> Option<usize> {
    let candidate = text.as_bytes().get(index..index + literal.len())?;
    candidate
        .eq_ignore_ascii_case(literal.as_bytes())
        .then_some(index + literal.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_with_text() {
        let link = detect("[https://example.org/a Example site]", 0).unwrap();
        assert_eq!(link.url, "https://example.org/a");
        assert_eq!(link.text.as_deref(), Some("Example site"));
        assert_eq!(link.end, 36);
    }

    #[test]
    fn test_link_without_text() {
        let link = detect("[http://example.org]", 0).unwrap();
        assert_eq!(link.url, "http://example.org");
        assert_eq!(link.text, None);
    }

    #[test]
    fn test_protocol_relative_and_case() {
        assert!(detect("[//example.org x]", 0).is_some());
        assert!(detect("[HTTPS://example.org x]", 0).is_some());
    }

    #[test]
    fn test_not_external_links() {
        assert!(detect("[[Foo]]", 0).is_none());
        assert!(detect("[example.org]", 0).is_none());
        assert!(detect("[http:// text]", 0).is_none());
        assert!(detect("[http://a.org\nb]", 0).is_none());
        assert!(detect("[http://a.org", 0).is_none());
    }

    #[test]
    fn test_boundaries() {
        assert!(detect("[http://a.org]", 14).is_none());
        assert!(detect("[http://a.org]", 100).is_none());
        assert!(detect("[htt", 0).is_none());
    }
}
