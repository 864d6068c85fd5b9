use super::scanner::{byte_at, find_next, match_literal, skip_whitespace, slice};
use super::types::{Tag, TagAttribute, TagKind};

/// Detect an HTML-like tag starting exactly at `index`: `<ref name="a">`,
/// `</ref>` or `<br/>`. Comments (`<!--`) are not tags.
pub fn detect(text: &str, index: usize) -> Option<Tag> {
    let mut cursor = match_literal(text, index, "<")?;
    let closing = match match_literal(text, cursor, "/") {
        Some(after) => {
            cursor = after;
            true
        }
        None => false,
    };

    let name_begin = cursor;
    while byte_at(text, cursor).is_some_and(|b| b.is_ascii_alphanumeric()) {
        cursor += 1;
    }
    if cursor == name_begin || !byte_at(text, name_begin)?.is_ascii_alphabetic() {
        return None;
    }
    let name = slice(text, name_begin, cursor)?.to_ascii_lowercase();

    let close = find_next(text, cursor, ">")?;
    let inner = slice(text, cursor, close)?;
    if inner.contains('<') || inner.contains("\n\n") {
        return None;
    }
    if !inner.is_empty() && !inner.starts_with(|c: char| c.is_whitespace() || c == '/') {
        return None;
    }

    let trimmed = inner.trim_end();
    let self_closing = trimmed.ends_with('/');
    let kind = match (closing, self_closing) {
        (true, false) => TagKind::Close,
        (true, true) => return None,
        (false, true) => TagKind::SelfClosing,
        (false, false) => TagKind::Open,
    };
    let attributes_text = trimmed.strip_suffix('/').unwrap_or(trimmed);
    let attributes = parse_attributes(attributes_text);
    if closing && !attributes.is_empty() {
        return None;
    }

    Some(Tag {
        begin: index,
        end: close + 1,
        name,
        kind,
        attributes,
    })
}

fn parse_attributes(text: &str) -> Vec<TagAttribute> {
    let mut attributes = Vec::new();
    let mut cursor = skip_whitespace(text, 0);
    while cursor < text.len() {
        let name_begin = cursor;
        while byte_at(text, cursor).is_some_and(|b| !b.is_ascii_whitespace() && b != b'=') {
            cursor += 1;
        }
        let Some(name) = slice(text, name_begin, cursor) else {
            break;
        };
        cursor = skip_whitespace(text, cursor);

        let mut value = None;
        if let Some(after_equal) = match_literal(text, cursor, "=") {
            cursor = skip_whitespace(text, after_equal);
            let (parsed, after) = attribute_value(text, cursor);
            value = Some(parsed);
            cursor = after;
        }
        if !name.is_empty() {
            attributes.push(TagAttribute {
                name: name.to_ascii_lowercase(),
                value,
            });
        }
        cursor = skip_whitespace(text, cursor);
        if cursor == name_begin {
            cursor += 1;
        }
    }
    attributes
}

fn attribute_value(text: &str, index: usize) -> (String, usize) {
    match byte_at(text, index) {
        Some(quote @ (b'"' | b'\'')) => {
            let quote = char::from(quote).to_string();
            match find_next(text, index + 1, &quote) {
                Some(end) => (text[index + 1..end].to_string(), end + 1),
                None => (text[index + 1..].to_string(), text.len()),
            }
        }
        _ => {
            let rest = text.get(index..).unwrap_or_default();
            let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
            (rest[..len].to_string(), index + len)
        }
    }
}

impl Tag {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_tag_with_attributes() {
        let tag = detect(r#"<ref name="smith" group=notes>"#, 0).unwrap();
        assert_eq!(tag.name, "ref");
        assert_eq!(tag.kind, TagKind::Open);
        assert_eq!(tag.attribute("name"), Some("smith"));
        assert_eq!(tag.attribute("group"), Some("notes"));
    }

    #[test]
    fn test_close_tag() {
        let tag = detect("</REF>", 0).unwrap();
        assert_eq!(tag.name, "ref");
        assert_eq!(tag.kind, TagKind::Close);
        assert_eq!(tag.end, 6);
    }

    #[test]
    fn test_self_closing_tag() {
        let tag = detect("<br />", 0).unwrap();
        assert_eq!(tag.kind, TagKind::SelfClosing);
        let tag = detect("<references/>", 0).unwrap();
        assert_eq!(tag.kind, TagKind::SelfClosing);
    }

    #[test]
    fn test_single_quoted_and_bare_attribute() {
        let tag = detect("<div class='a b' hidden>", 0).unwrap();
        assert_eq!(tag.attribute("class"), Some("a b"));
        assert_eq!(tag.attributes[1].name, "hidden");
        assert_eq!(tag.attributes[1].value, None);
    }

    #[test]
    fn test_not_tags() {
        assert!(detect("<!-- comment -->", 0).is_none());
        assert!(detect("a < b", 2).is_none());
        assert!(detect("<1>", 0).is_none());
        assert!(detect("<ref", 0).is_none());
        assert!(detect("<refx<b>", 0).is_none());
        assert!(detect("</ref/>", 0).is_none());
    }

    #[test]
    fn test_boundaries() {
        assert!(detect("<b>", 3).is_none());
        assert!(detect("<b>", 50).is_none());
        assert!(detect("<", 0).is_none());
    }
}
