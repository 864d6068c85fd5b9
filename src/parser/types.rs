use std::ops::Range;

use clap::ValueEnum;
use serde::Serialize;

/// Anything occupying a half-open `[begin, end)` span of the page text.
pub trait Spanned {
    fn begin(&self) -> usize;
    fn end(&self) -> usize;

    fn span(&self) -> Range<usize> {
        self.begin()..self.end()
    }

    fn contains(&self, index: usize) -> bool {
        self.begin() <= index && index < self.end()
    }
}

macro_rules! impl_spanned {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Spanned for $ty {
                fn begin(&self) -> usize {
                    self.begin
                }
                fn end(&self) -> usize {
                    self.end
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    InternalLink,
    Template,
    ExternalLink,
    Title,
    Isbn,
    Tag,
    Category,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        ElementKind::InternalLink,
        ElementKind::Template,
        ElementKind::ExternalLink,
        ElementKind::Title,
        ElementKind::Isbn,
        ElementKind::Tag,
        ElementKind::Category,
    ];
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ElementKind::InternalLink => "internal-link",
            ElementKind::Template => "template",
            ElementKind::ExternalLink => "external-link",
            ElementKind::Title => "title",
            ElementKind::Isbn => "isbn",
            ElementKind::Tag => "tag",
            ElementKind::Category => "category",
        })
    }
}

/// `[[link#anchor|text]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternalLink {
    pub begin: usize,
    pub end: usize,
    pub link: String,
    pub anchor: Option<String>,
    pub text: Option<String>,
    #[serde(skip)]
    pub(crate) raw: RawLinkParts,
}

/// Untrimmed pieces of an internal link, kept to render the original markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawLinkParts {
    pub link: String,
    pub anchor: Option<String>,
    pub text: Option<String>,
}

/// `{{name|param|name=value}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub begin: usize,
    pub end: usize,
    pub name: String,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Position among the template's parameters, starting at 0.
    pub index: usize,
    /// Explicit name, `None` for positional parameters.
    pub name: Option<String>,
    /// Explicit name, or the 1-based positional number.
    pub computed_name: String,
    /// Offset of the `|` introducing the parameter.
    pub pipe_index: usize,
    pub value: String,
    pub value_begin: usize,
    pub value_end: usize,
}

/// `[url text]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLink {
    pub begin: usize,
    pub end: usize,
    pub url: String,
    pub text: Option<String>,
}

/// `== text ==` heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    pub begin: usize,
    pub end: usize,
    pub level: u8,
    pub opening: u8,
    pub closing: u8,
    pub text: String,
}

/// `ISBN 978-...` magic link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Isbn {
    pub begin: usize,
    pub end: usize,
    /// Text after the `ISBN` keyword, as written.
    pub raw: String,
    /// Digits (and a final `X`) with separators removed.
    pub number: String,
    /// The number has a valid length and checksum.
    pub valid_number: bool,
    /// The keyword is followed by the number alone, with no `:` or similar noise.
    pub clean_syntax: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

/// `<name attr="value">`, `</name>` or `<name/>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub begin: usize,
    pub end: usize,
    pub name: String,
    pub kind: TagKind,
    pub attributes: Vec<TagAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagAttribute {
    pub name: String,
    pub value: Option<String>,
}

/// `[[Category:Name|sort key]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLink {
    pub begin: usize,
    pub end: usize,
    pub name: String,
    pub sort_key: Option<String>,
}

impl_spanned!(
    InternalLink,
    Template,
    ExternalLink,
    Title,
    Isbn,
    Tag,
    CategoryLink,
);

/// A borrowed element of any kind, as handed out by kind-generic queries.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ElementRef<'a> {
    InternalLink(&'a InternalLink),
    Template(&'a Template),
    ExternalLink(&'a ExternalLink),
    Title(&'a Title),
    Isbn(&'a Isbn),
    Tag(&'a Tag),
    Category(&'a CategoryLink),
}

impl ElementRef<'_> {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRef::InternalLink(_) => ElementKind::InternalLink,
            ElementRef::Template(_) => ElementKind::Template,
            ElementRef::ExternalLink(_) => ElementKind::ExternalLink,
            ElementRef::Title(_) => ElementKind::Title,
            ElementRef::Isbn(_) => ElementKind::Isbn,
            ElementRef::Tag(_) => ElementKind::Tag,
            ElementRef::Category(_) => ElementKind::Category,
        }
    }

    fn spanned(&self) -> &dyn Spanned {
        match *self {
            ElementRef::InternalLink(e) => e,
            ElementRef::Template(e) => e,
            ElementRef::ExternalLink(e) => e,
            ElementRef::Title(e) => e,
            ElementRef::Isbn(e) => e,
            ElementRef::Tag(e) => e,
            ElementRef::Category(e) => e,
        }
    }
}

impl Spanned for ElementRef<'_> {
    fn begin(&self) -> usize {
        self.spanned().begin()
    }
    fn end(&self) -> usize {
        self.spanned().end()
    }
}
