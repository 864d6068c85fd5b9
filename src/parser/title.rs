use super::scanner::{is_line_start, line_end, slice};
use super::types::Title;

const MAX_LEVEL: usize = 6;

/// Detect a section title `== text ==` starting exactly at `index`.
///
/// Titles must start a line. When the opening and closing runs of `=`
/// differ, the level is the shorter run and the surplus `=` belong to
/// the text.
pub fn detect(text: &str, index: usize) -> Option<Title> {
    if !is_line_start(text, index) || index >= text.len() {
        return None;
    }
    let end = line_end(text, index);
    let line = slice(text, index, end)?;
    let content = line.trim_end_matches([' ', '\t', '\r']);

    let opening = content.bytes().take_while(|&b| b == b'=').count();
    if opening == 0 || opening == content.len() {
        return None;
    }
    let closing = content.bytes().rev().take_while(|&b| b == b'=').count();
    if closing == 0 {
        return None;
    }

    let level = opening.min(closing).min(MAX_LEVEL);
    let inner = &content[level..content.len() - level];
    let title_text = inner.trim();
    if title_text.is_empty() {
        return None;
    }

    Some(Title {
        begin: index,
        end: index + content.len(),
        level: level as u8,
        opening: opening.min(u8::MAX as usize) as u8,
        closing: closing.min(u8::MAX as usize) as u8,
        text: title_text.to_string(),
    })
}

impl Title {
    /// Same number of `=` on both sides, within the supported levels.
    pub fn is_balanced(&self) -> bool {
        self.opening == self.closing && usize::from(self.level) == usize::from(self.opening)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_two_title() {
        let t = detect("== History ==\ntext", 0).unwrap();
        assert_eq!(t.level, 2);
        assert_eq!(t.text, "History");
        assert_eq!((t.begin, t.end), (0, 13));
        assert!(t.is_balanced());
    }

    #[test]
    fn test_unbalanced_title() {
        let t = detect("=== Works ==", 0).unwrap();
        assert_eq!(t.level, 2);
        assert_eq!(t.text, "= Works");
        assert!(!t.is_balanced());
    }

    #[test]
    fn test_trailing_spaces_excluded() {
        let t = detect("== A ==  \nb", 0).unwrap();
        assert_eq!(t.end, 7);
    }

    #[test]
    fn test_title_on_later_line() {
        let text = "intro\n==B==\n";
        let t = detect(text, 6).unwrap();
        assert_eq!(t.text, "B");
        assert_eq!(t.end, 11);
    }

    #[test]
    fn test_not_titles() {
        assert!(detect("a == b ==", 2).is_none());
        assert!(detect("====", 0).is_none());
        assert!(detect("== a", 0).is_none());
        assert!(detect("= =", 0).is_none());
        assert!(detect("plain", 0).is_none());
    }

    #[test]
    fn test_boundaries() {
        assert!(detect("", 0).is_none());
        assert!(detect("== a ==", 7).is_none());
        assert!(detect("== a ==\n", 8).is_none());
        assert!(detect("== a ==", 99).is_none());
    }
}
