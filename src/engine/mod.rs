pub mod analysis;
pub mod batch;
pub mod fix;
pub mod provider;
pub(crate) mod scanner;

use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::checkers::{Checker, Registry};
use crate::config::Config;
use crate::types::{CheckResult, Diagnostic, Finding};
use analysis::{Page, PageAnalysis, TextBuffer};
use fix::{apply_edits, automatic_edits, FixError};

/// Run every checker over one analysis, collecting their findings.
pub fn analyze_page(
    analysis: &PageAnalysis,
    checkers: &[&dyn Checker],
    only_automatic: bool,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for checker in checkers {
        let before = findings.len();
        if checker.analyze(analysis, Some(&mut findings), only_automatic) {
            debug!(
                page = %analysis.page().title,
                rule = checker.id(),
                count = findings.len() - before,
                "rule matched"
            );
        }
    }
    findings.sort_by_key(|f| (f.begin, f.rule, f.end));
    findings
}

/// Result of fixing one page's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFix {
    pub text: TextBuffer,
    /// Names of the rules whose fixes changed the text, in application order.
    pub rules: Vec<&'static str>,
    pub edits: usize,
}

impl PageFix {
    pub fn changed(&self) -> bool {
        !self.rules.is_empty()
    }
}

/// Apply the automatic fixes of each checker in turn.
///
/// Each rule sees a fresh analysis of the text left by the previous one.
/// With `bot` set, replacements reserved to bot mode are applied too.
pub fn fix_page(
    page: &Page,
    text: &str,
    checkers: &[&dyn Checker],
    bot: bool,
    category_aliases: &[String],
) -> Result<PageFix, FixError> {
    let mut current = TextBuffer::new(text);
    let mut rules = Vec::new();
    let mut total = 0;
    for checker in checkers {
        let analysis = PageAnalysis::new(page.clone(), current.clone())
            .with_category_aliases(category_aliases);
        let mut findings = Vec::new();
        if !checker.analyze(&analysis, Some(&mut findings), true) {
            continue;
        }
        let edits = automatic_edits(&findings, bot);
        if edits.is_empty() {
            continue;
        }
        let (fixed, applied) = apply_edits(analysis.buffer(), &edits)?;
        if fixed != current {
            debug!(page = %page.title, rule = checker.id(), applied, "fixed");
            rules.push(checker.name());
            total += applied;
            current = fixed;
        }
    }
    Ok(PageFix {
        text: current,
        rules,
        edits: total,
    })
}

fn wiki_files(path: &Path, config: &Config) -> Vec<PathBuf> {
    if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        scanner::scan(path, config)
    }
}

fn page_for(path: &Path) -> Page {
    let title = provider::title_from_path(path).unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    Page::new(&title)
}

/// Check every wikitext file under `path` (or `path` itself, for a file).
pub fn run(path: &Path, config: &Config, rules: &[u32], only_automatic: bool) -> Result<CheckResult> {
    let files = wiki_files(path, config);
    if files.is_empty() {
        anyhow::bail!("No wikitext files found in {}", path.display());
    }

    let registry = Registry::from_config(config);
    let checkers = registry.select(rules)?;

    let per_file: Vec<Vec<Diagnostic>> = files
        .par_iter()
        .filter_map(|file| match std::fs::read_to_string(file) {
            Ok(text) => Some(check_file(file, text, &checkers, config, only_automatic)),
            Err(e) => {
                warn!(path = %file.display(), error = %e, "failed to read page");
                None
            }
        })
        .collect();

    let mut result = CheckResult {
        diagnostics: per_file.into_iter().flatten().collect(),
    };
    result
        .diagnostics
        .sort_by(|a, b| (&a.file, a.begin, a.rule).cmp(&(&b.file, b.begin, b.rule)));
    Ok(result)
}

fn check_file(
    file: &Path,
    text: String,
    checkers: &[&dyn Checker],
    config: &Config,
    only_automatic: bool,
) -> Vec<Diagnostic> {
    let analysis =
        PageAnalysis::new(page_for(file), text).with_category_aliases(&config.category_aliases);
    analyze_page(&analysis, checkers, only_automatic)
        .into_iter()
        .map(|finding| {
            let (line, column) = analysis.buffer().line_col(finding.begin);
            let rule_name = checkers
                .iter()
                .find(|c| c.id() == finding.rule)
                .map_or("", |c| c.name());
            Diagnostic {
                file: file.to_path_buf(),
                title: analysis.page().title.clone(),
                line,
                column,
                severity: finding.severity,
                rule: finding.rule,
                rule_name: rule_name.to_string(),
                message: finding.message,
                begin: finding.begin,
                end: finding.end,
                replacements: finding.replacements,
            }
        })
        .collect()
}
