use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::config::Properties;
use crate::emit;
use crate::engine::analysis::{Namespace, PageAnalysis};
use crate::parser::internal_link::create_internal_link;
use crate::parser::title_case::normalize_title;
use crate::types::{Finding, Replacement};

use super::Checker;

pub const ID: u32 = 91;

static WIKIPEDIA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?:)?//([a-z][a-z0-9-]{1,15})\.(?:m\.)?wikipedia\.org/wiki/([^?]+)(\?.*)?$")
        .unwrap()
});

/// Characters a page title can never hold.
const FORBIDDEN_IN_TITLE: [char; 7] = ['[', ']', '{', '}', '|', '<', '>'];

/// `[https://xx.wikipedia.org/wiki/Title text]` where an interwiki link
/// `[[:xx:Title|text]]` would do.
pub struct InterwikiExternalLinkChecker {
    language: Option<String>,
    category_aliases: Vec<String>,
}

impl InterwikiExternalLinkChecker {
    pub fn new(properties: &Properties) -> Self {
        Self {
            language: properties.get("language").map(|l| l.trim().to_lowercase()),
            category_aliases: properties.get_list("category_aliases"),
        }
    }

    fn target(&self, language: &str, title: &str) -> String {
        if self.language.as_deref() != Some(language) {
            format!(":{language}:{title}")
        } else if self.links_need_colon(title) {
            format!(":{title}")
        } else {
            title.to_string()
        }
    }

    /// A plain link to a file or a category would embed the file or
    /// categorize the page.
    fn links_need_colon(&self, title: &str) -> bool {
        let namespace = Namespace::of_title(title);
        if namespace == Namespace::FILE || namespace == Namespace::CATEGORY {
            return true;
        }
        title.split_once(':').is_some_and(|(prefix, _)| {
            let prefix = prefix.trim().to_lowercase();
            self.category_aliases
                .iter()
                .any(|alias| alias.trim().to_lowercase() == prefix)
        })
    }
}

/// Wiki language and decoded title of a Wikipedia article URL.
struct ArticleUrl {
    language: String,
    title: String,
    /// The title decoded cleanly and the URL has no query string.
    clean: bool,
    /// The title holds characters no page title can hold.
    forbidden: bool,
}

fn parse_article_url(url: &str) -> Option<ArticleUrl> {
    let caps = WIKIPEDIA_URL.captures(url)?;
    let language = caps.get(1)?.as_str().to_lowercase();
    if language == "www" {
        return None;
    }
    let raw_title = caps.get(2)?.as_str();
    let (title, decoded) = match percent_decode_str(raw_title).decode_utf8() {
        Ok(title) => (title.into_owned(), true),
        Err(_) => (raw_title.to_string(), false),
    };
    let title = match title.split_once('#') {
        Some((page, anchor)) => format!("{}#{}", normalize_title(page), anchor.replace('_', " ")),
        None => normalize_title(&title),
    };
    if title.is_empty() || title.starts_with('#') {
        return None;
    }
    Some(ArticleUrl {
        forbidden: title.contains(FORBIDDEN_IN_TITLE),
        language,
        title,
        clean: decoded && caps.get(3).is_none(),
    })
}

impl Checker for InterwikiExternalLinkChecker {
    fn id(&self) -> u32 {
        ID
    }

    fn name(&self) -> &'static str {
        "Interwiki link written as external link"
    }

    fn analyze(
        &self,
        analysis: &PageAnalysis,
        mut findings: Option<&mut Vec<Finding>>,
        only_automatic: bool,
    ) -> bool {
        let mut found = false;
        for link in analysis.external_links() {
            let Some(article) = parse_article_url(&link.url) else {
                continue;
            };
            found = true;
            emit!(findings, only_automatic, {
                let target = self.target(&article.language, &article.title);
                let text = link.text.as_deref().unwrap_or_default();
                let mut finding = Finding::new(
                    ID,
                    link.begin,
                    link.end,
                    format!("External link to {}:{} can be an interwiki link", article.language, article.title),
                );
                if !article.forbidden {
                    finding.add_replacement(Replacement::automatic(
                        create_internal_link(&target, text),
                        article.clean,
                    ));
                }
                finding
            });
        }
        found
    }

    fn parameters(&self) -> Vec<(&'static str, &'static str)> {
        vec![("language", "Language code of the wiki, its own links become internal links")]
    }
}
