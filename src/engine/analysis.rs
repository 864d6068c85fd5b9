use std::cell::OnceCell;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::parser::types::{
    CategoryLink, ElementKind, ElementRef, ExternalLink, InternalLink, Isbn, Spanned, Tag,
    Template, Title,
};
use crate::parser::{self, category, external_link, internal_link, isbn, tag, template, title};
use crate::parser::title_case::normalize_title;

/// Immutable wikitext for one analysis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// 1-based line and column (in characters) of a byte offset.
    ///
    /// Offsets past the end map to the position right after the last character.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &self.text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |p| p + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

impl From<String> for TextBuffer {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// MediaWiki namespace number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Namespace(pub i32);

impl Namespace {
    pub const MAIN: Namespace = Namespace(0);
    pub const TALK: Namespace = Namespace(1);
    pub const USER: Namespace = Namespace(2);
    pub const USER_TALK: Namespace = Namespace(3);
    pub const PROJECT: Namespace = Namespace(4);
    pub const PROJECT_TALK: Namespace = Namespace(5);
    pub const FILE: Namespace = Namespace(6);
    pub const FILE_TALK: Namespace = Namespace(7);
    pub const MEDIAWIKI: Namespace = Namespace(8);
    pub const TEMPLATE: Namespace = Namespace(10);
    pub const TEMPLATE_TALK: Namespace = Namespace(11);
    pub const HELP: Namespace = Namespace(12);
    pub const CATEGORY: Namespace = Namespace(14);
    pub const CATEGORY_TALK: Namespace = Namespace(15);

    const PREFIXES: &'static [(&'static str, Namespace)] = &[
        ("Talk", Namespace::TALK),
        ("User", Namespace::USER),
        ("User talk", Namespace::USER_TALK),
        ("Wikipedia", Namespace::PROJECT),
        ("Project", Namespace::PROJECT),
        ("Wikipedia talk", Namespace::PROJECT_TALK),
        ("Project talk", Namespace::PROJECT_TALK),
        ("File", Namespace::FILE),
        ("Image", Namespace::FILE),
        ("File talk", Namespace::FILE_TALK),
        ("MediaWiki", Namespace::MEDIAWIKI),
        ("Template", Namespace::TEMPLATE),
        ("Template talk", Namespace::TEMPLATE_TALK),
        ("Help", Namespace::HELP),
        ("Category", Namespace::CATEGORY),
        ("Category talk", Namespace::CATEGORY_TALK),
    ];

    /// Namespace a title belongs to, from its prefix.
    pub fn of_title(title: &str) -> Namespace {
        let Some((prefix, _)) = title.split_once(':') else {
            return Namespace::MAIN;
        };
        let prefix = normalize_title(prefix);
        Self::PREFIXES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&prefix))
            .map_or(Namespace::MAIN, |(_, ns)| *ns)
    }

    pub fn is_talk(self) -> bool {
        self.0 > 0 && self.0 % 2 == 1
    }
}

/// Identity of the page whose text is analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Page {
    pub title: String,
    pub namespace: Namespace,
}

impl Page {
    pub fn new(title: &str) -> Self {
        let title = normalize_title(title);
        Self {
            namespace: Namespace::of_title(&title),
            title,
        }
    }

    pub fn is_article(&self) -> bool {
        !self.namespace.is_talk()
    }

    pub fn is_in_main_namespace(&self) -> bool {
        self.namespace == Namespace::MAIN
    }
}

/// Element index of one page's text.
///
/// Each construct kind is detected the first time it is requested, then
/// cached for the lifetime of the analysis. The analysis owns its buffer
/// and is never updated: a modified text gets a fresh analysis.
#[derive(Debug)]
pub struct PageAnalysis {
    page: Page,
    buffer: TextBuffer,
    category_aliases: Vec<String>,
    internal_links: OnceCell<Vec<InternalLink>>,
    templates: OnceCell<Vec<Template>>,
    external_links: OnceCell<Vec<ExternalLink>>,
    titles: OnceCell<Vec<Title>>,
    isbns: OnceCell<Vec<Isbn>>,
    tags: OnceCell<Vec<Tag>>,
    categories: OnceCell<Vec<CategoryLink>>,
}

impl PageAnalysis {
    pub fn new(page: Page, buffer: impl Into<TextBuffer>) -> Self {
        Self {
            page,
            buffer: buffer.into(),
            category_aliases: Vec::new(),
            internal_links: OnceCell::new(),
            templates: OnceCell::new(),
            external_links: OnceCell::new(),
            titles: OnceCell::new(),
            isbns: OnceCell::new(),
            tags: OnceCell::new(),
            categories: OnceCell::new(),
        }
    }

    /// Localized category namespace names accepted besides `Category`.
    pub fn with_category_aliases(mut self, aliases: &[String]) -> Self {
        self.category_aliases = aliases.to_vec();
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn contents(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn internal_links(&self) -> &[InternalLink] {
        self.internal_links.get_or_init(|| {
            let found = parser::scan_from_trigger(self.contents(), "[[", internal_link::detect);
            self.log_computed(ElementKind::InternalLink, found.len());
            found
        })
    }

    pub fn templates(&self) -> &[Template] {
        self.templates.get_or_init(|| {
            let found = parser::scan_from_trigger(self.contents(), "{{", template::detect);
            self.log_computed(ElementKind::Template, found.len());
            found
        })
    }

    pub fn external_links(&self) -> &[ExternalLink] {
        self.external_links.get_or_init(|| {
            let found = parser::scan_from_trigger(self.contents(), "[", external_link::detect);
            self.log_computed(ElementKind::ExternalLink, found.len());
            found
        })
    }

    pub fn titles(&self) -> &[Title] {
        self.titles.get_or_init(|| {
            let found = parser::scan_from_trigger(self.contents(), "=", title::detect);
            self.log_computed(ElementKind::Title, found.len());
            found
        })
    }

    pub fn isbns(&self) -> &[Isbn] {
        self.isbns.get_or_init(|| {
            let found = parser::scan_from_trigger(self.contents(), "ISBN", isbn::detect);
            self.log_computed(ElementKind::Isbn, found.len());
            found
        })
    }

    pub fn tags(&self) -> &[Tag] {
        self.tags.get_or_init(|| {
            let found = parser::scan_from_trigger(self.contents(), "<", tag::detect);
            self.log_computed(ElementKind::Tag, found.len());
            found
        })
    }

    pub fn categories(&self) -> &[CategoryLink] {
        self.categories.get_or_init(|| {
            let aliases = &self.category_aliases;
            let found = parser::scan_from_trigger(self.contents(), "[[", |text, index| {
                category::detect(text, index, aliases)
            });
            self.log_computed(ElementKind::Category, found.len());
            found
        })
    }

    /// All elements of one kind, sorted by begin index.
    pub fn elements(&self, kind: ElementKind) -> Vec<ElementRef<'_>> {
        match kind {
            ElementKind::InternalLink => self.internal_links().iter().map(ElementRef::InternalLink).collect(),
            ElementKind::Template => self.templates().iter().map(ElementRef::Template).collect(),
            ElementKind::ExternalLink => self.external_links().iter().map(ElementRef::ExternalLink).collect(),
            ElementKind::Title => self.titles().iter().map(ElementRef::Title).collect(),
            ElementKind::Isbn => self.isbns().iter().map(ElementRef::Isbn).collect(),
            ElementKind::Tag => self.tags().iter().map(ElementRef::Tag).collect(),
            ElementKind::Category => self.categories().iter().map(ElementRef::Category).collect(),
        }
    }

    /// True once the elements of `kind` have been detected.
    pub fn is_computed(&self, kind: ElementKind) -> bool {
        match kind {
            ElementKind::InternalLink => self.internal_links.get().is_some(),
            ElementKind::Template => self.templates.get().is_some(),
            ElementKind::ExternalLink => self.external_links.get().is_some(),
            ElementKind::Title => self.titles.get().is_some(),
            ElementKind::Isbn => self.isbns.get().is_some(),
            ElementKind::Tag => self.tags.get().is_some(),
            ElementKind::Category => self.categories.get().is_some(),
        }
    }

    /// Elements of every kind whose span contains `index`, outermost first.
    pub fn elements_at(&self, index: usize) -> Vec<ElementRef<'_>> {
        let mut found: Vec<_> = ElementKind::ALL
            .iter()
            .filter_map(|&kind| element_containing(self.elements(kind), index))
            .collect();
        found.sort_by_key(|e| (e.begin(), std::cmp::Reverse(e.end())));
        found
    }

    /// The template whose span contains `index`, if any.
    pub fn template_at(&self, index: usize) -> Option<&Template> {
        find_containing(self.templates(), index)
    }

    fn log_computed(&self, kind: ElementKind, count: usize) {
        debug!(page = %self.page.title, %kind, count, "detected elements");
    }
}

fn element_containing(elements: Vec<ElementRef<'_>>, index: usize) -> Option<ElementRef<'_>> {
    let pos = elements.partition_point(|e| e.begin() <= index);
    pos.checked_sub(1)
        .map(|p| elements[p])
        .filter(|e| e.contains(index))
}

fn find_containing<T: Spanned>(elements: &[T], index: usize) -> Option<&T> {
    let pos = elements.partition_point(|e| e.begin() <= index);
    pos.checked_sub(1)
        .and_then(|p| elements.get(p))
        .filter(|e| e.contains(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(text: &str) -> PageAnalysis {
        PageAnalysis::new(Page::new("Test page"), text)
    }

    #[test]
    fn test_lazy_and_memoized() {
        let a = analysis("[[a]] {{b}} [[c]]");
        assert!(!a.is_computed(ElementKind::InternalLink));
        let first = a.internal_links();
        assert!(a.is_computed(ElementKind::InternalLink));
        assert!(!a.is_computed(ElementKind::Template));
        let second = a.internal_links();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_elements_generic_matches_typed() {
        let a = analysis("== T ==\n[[a]] {{b|[[c]]}} ISBN 123 <ref>x</ref> [http://x.org y]");
        assert_eq!(a.elements(ElementKind::InternalLink).len(), a.internal_links().len());
        assert_eq!(a.elements(ElementKind::Template).len(), 1);
        assert_eq!(a.elements(ElementKind::Title).len(), 1);
        assert_eq!(a.elements(ElementKind::Isbn).len(), 1);
        assert_eq!(a.elements(ElementKind::Tag).len(), 2);
        assert_eq!(a.elements(ElementKind::ExternalLink).len(), 1);
    }

    #[test]
    fn test_every_kind_sorted_and_non_overlapping() {
        let a = analysis(
            "{{a|{{b}}}} [[x|[[y]]]] [http://a.org [http://b.org]] <b><i>z</i></b>\n== t ==\nISBN 1 ISBN 2",
        );
        for kind in ElementKind::ALL {
            let elements = a.elements(kind);
            for pair in elements.windows(2) {
                assert!(pair[0].end() <= pair[1].begin(), "{kind} overlaps");
            }
        }
    }

    #[test]
    fn test_nested_kinds_are_not_flattened() {
        let a = analysis("{{cite|title=[[Foo]]}}");
        let template = &a.templates()[0];
        let link = &a.internal_links()[0];
        assert!(template.begin < link.begin && link.end < template.end);
        assert_eq!(a.template_at(link.begin).map(|t| t.name.as_str()), Some("Cite"));
    }

    #[test]
    fn test_elements_at() {
        let a = analysis("{{cite|title=[[Foo]]}}");
        let kinds: Vec<_> = a.elements_at(15).iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![ElementKind::Template, ElementKind::InternalLink]);
        assert!(a.elements_at(500).is_empty());
    }

    #[test]
    fn test_categories_with_aliases() {
        let a = PageAnalysis::new(Page::new("X"), "[[Catégorie:A]] [[Category:B]]")
            .with_category_aliases(&["Catégorie".to_string()]);
        let names: Vec<_> = a.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_empty_text() {
        let a = analysis("");
        for kind in ElementKind::ALL {
            assert!(a.elements(kind).is_empty());
        }
    }

    #[test]
    fn test_line_col() {
        let buffer = TextBuffer::new("ab\ncé\nf");
        assert_eq!(buffer.line_col(0), (1, 1));
        assert_eq!(buffer.line_col(3), (2, 1));
        assert_eq!(buffer.line_col(7), (3, 1));
        assert_eq!(buffer.line_col(5), (2, 2));
        assert_eq!(buffer.line_col(100), (3, 2));
    }

    #[test]
    fn test_namespaces() {
        assert_eq!(Page::new("Foo").namespace, Namespace::MAIN);
        assert_eq!(Page::new("category:foo bar").namespace, Namespace::CATEGORY);
        assert_eq!(Page::new("User talk:Bob").namespace, Namespace::USER_TALK);
        assert_eq!(Page::new("Star Wars: A New Hope").namespace, Namespace::MAIN);
        assert!(Page::new("Talk:Foo").namespace.is_talk());
        assert!(!Page::new("Talk:Foo").is_article());
        assert!(Page::new("Foo").is_in_main_namespace());
    }
}
