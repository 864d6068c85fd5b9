use crate::config::Properties;
use crate::emit;
use crate::engine::analysis::{Page, PageAnalysis};
use crate::engine::provider::{ContentProvider, ProviderError};
use crate::parser::internal_link::create_internal_link;
use crate::parser::scanner::{byte_at, slice};
use crate::parser::title_case::same_title;
use crate::parser::types::InternalLink;
use crate::types::{Finding, Replacement, Severity};

use super::Checker;

pub const ID: u32 = 526;

const MIN_YEAR_LENGTH: usize = 3;
const MAX_YEAR_LENGTH: usize = 4;

/// Text appended after a link to ask readers for help.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AskHelp {
    label: String,
    suffix: String,
}

/// Links displaying one year while pointing to another, like `[[1995|1994]]`.
pub struct IncorrectDateLinkChecker {
    ask_help: Vec<AskHelp>,
    dump_analysis: Option<String>,
}

impl IncorrectDateLinkChecker {
    pub fn new(properties: &Properties) -> Self {
        let ask_help = properties
            .get_list("ask_help")
            .iter()
            .filter_map(|item| {
                let (label, suffix) = item.split_once('|')?;
                (!label.is_empty()).then(|| AskHelp {
                    label: label.to_string(),
                    suffix: suffix.to_string(),
                })
            })
            .collect();
        Self {
            ask_help,
            dump_analysis: properties.get("dump_analysis").map(|p| p.trim().to_string()),
        }
    }
}

/// Value of `text` when it is a year, written with 3 or 4 digits.
fn displayed_year(text: &str) -> Option<u32> {
    let length = text.chars().count();
    if !(MIN_YEAR_LENGTH..=MAX_YEAR_LENGTH).contains(&length)
        || !text.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    text.parse().ok().filter(|&year| year > 0)
}

/// `target` starts with another year than `year`, followed by nothing or by
/// a space and text without digits (`1994 in music`).
fn links_other_year(target: &str, year: u32) -> bool {
    let digits = target.bytes().take_while(u8::is_ascii_digit).count();
    if !(MIN_YEAR_LENGTH..=MAX_YEAR_LENGTH).contains(&digits) {
        return false;
    }
    let Some(linked) = target[..digits].parse::<u32>().ok().filter(|&y| y > 0) else {
        return false;
    };
    if linked == year {
        return false;
    }
    let rest = &target[digits..];
    rest.is_empty()
        || rest
            .strip_prefix(' ')
            .is_some_and(|tail| !tail.bytes().any(|b| b.is_ascii_digit()))
}

fn is_problematic(link: &InternalLink) -> bool {
    let target = link.full_link();
    let Some(text) = link.text.as_deref() else {
        return false;
    };
    if same_title(&target, text) {
        return false;
    }
    displayed_year(text).is_some_and(|year| links_other_year(&target, year))
}

fn bot_eligible(page: &Page, target: &str, suffix: &str, next: Option<u8>) -> bool {
    page.is_article()
        && page.is_in_main_namespace()
        && suffix.starts_with("{{")
        && next.is_some_and(|b| b != b'{')
        && !target.contains(['#', '(', ')'])
}

impl Checker for IncorrectDateLinkChecker {
    fn id(&self) -> u32 {
        ID
    }

    fn name(&self) -> &'static str {
        "Incorrect date link"
    }

    fn analyze(
        &self,
        analysis: &PageAnalysis,
        mut findings: Option<&mut Vec<Finding>>,
        only_automatic: bool,
    ) -> bool {
        let contents = analysis.contents();
        let mut found = false;
        for link in analysis.internal_links().iter().filter(|l| is_problematic(l)) {
            found = true;
            emit!(findings, only_automatic, {
                let target = link.full_link();
                let text = link.text.as_deref().unwrap_or_default();
                let next = byte_at(contents, link.end);
                // A template right after the link is often already a request for help.
                let severity = if next == Some(b'{') {
                    Severity::Warning
                } else {
                    Severity::Error
                };
                let mut finding = Finding::new(
                    ID,
                    link.begin,
                    link.end,
                    format!("Link to year \"{target}\" displayed as \"{text}\""),
                )
                .with_severity(severity);
                finding.add_replacement(Replacement::manual(create_internal_link(&target, &target)));
                finding.add_replacement(Replacement::manual(create_internal_link(text, text)));

                let original = slice(contents, link.begin, link.end).unwrap_or_default();
                for (position, help) in self.ask_help.iter().enumerate() {
                    let bot = position == 0
                        && bot_eligible(analysis.page(), &target, &help.suffix, next);
                    finding.add_replacement(
                        Replacement::manual(format!("{original}{}", help.suffix))
                            .with_label(help.label.clone())
                            .with_bot(bot),
                    );
                }
                finding
            });
        }
        found
    }

    fn has_special_list(&self) -> bool {
        self.dump_analysis.is_some()
    }

    /// Pages linked from the dump analysis page, sorted.
    fn special_list(
        &self,
        provider: &dyn ContentProvider,
        limit: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let Some(dump) = &self.dump_analysis else {
            return Ok(Vec::new());
        };
        let content = provider.fetch_page_content(dump)?;
        let analysis = PageAnalysis::new(Page::new(dump), content.text);
        let mut pages: Vec<String> = analysis
            .internal_links()
            .iter()
            .map(|link| link.link.clone())
            .collect();
        pages.sort();
        pages.dedup();
        pages.truncate(limit);
        Ok(pages)
    }

    fn parameters(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("ask_help", "Text added after the link to ask for help (label|text)"),
            ("dump_analysis", "A page containing a dump analysis for this error"),
        ]
    }
}
