//! Fetch, analyze, fix and save many pages.
//!
//! Pages are independent: each one runs its whole cycle on a worker of a
//! bounded pool. Cancellation is checked before a page starts, a page
//! already in progress always completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::analysis::Page;
use super::fix_page;
use super::provider::{ContentProvider, PageSaver};
use crate::checkers::Checker;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub workers: usize,
    /// Also apply replacements reserved to bot mode, and flag saves as bot edits.
    pub bot: bool,
    pub dry_run: bool,
    /// Prefix of the edit comment, followed by the names of the applied rules.
    pub comment: String,
    pub category_aliases: Vec<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            bot: false,
            dry_run: false,
            comment: String::new(),
            category_aliases: Vec::new(),
        }
    }
}

/// Shared flag asking a running batch to stop before its next page.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PageOutcome {
    Fixed {
        rules: Vec<&'static str>,
        edits: usize,
        comment: String,
    },
    Unchanged,
    Failed {
        error: String,
    },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub title: String,
    #[serde(flatten)]
    pub outcome: PageOutcome,
}

/// Edit comment naming the rules that changed the page.
pub fn edit_comment(prefix: &str, rules: &[&str]) -> String {
    let rules = rules.join(", ");
    let prefix = prefix.trim();
    if prefix.is_empty() {
        rules
    } else {
        format!("{prefix}: {rules}")
    }
}

/// Run the fix cycle of `checkers` on every page of `titles`.
///
/// Reports come back in the order of `titles`. A page whose content cannot
/// be fetched or saved is reported as failed and the batch goes on.
pub fn run_batch(
    provider: &dyn ContentProvider,
    saver: &dyn PageSaver,
    titles: &[String],
    checkers: &[&dyn Checker],
    options: &BatchOptions,
    cancel: &CancelToken,
) -> Result<Vec<PageReport>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()?;

    let reports: Vec<PageReport> = pool.install(|| {
        titles
            .par_iter()
            .map(|title| {
                let outcome = if cancel.is_cancelled() {
                    PageOutcome::Skipped
                } else {
                    process_page(provider, saver, title, checkers, options)
                };
                PageReport {
                    title: title.clone(),
                    outcome,
                }
            })
            .collect()
    });
    Ok(reports)
}

fn process_page(
    provider: &dyn ContentProvider,
    saver: &dyn PageSaver,
    title: &str,
    checkers: &[&dyn Checker],
    options: &BatchOptions,
) -> PageOutcome {
    let content = match provider.fetch_page_content(title) {
        Ok(content) => content,
        Err(e) => {
            warn!(title, error = %e, "skipping page");
            return PageOutcome::Failed {
                error: e.to_string(),
            };
        }
    };

    let page = Page::new(&content.title);
    let fix = match fix_page(
        &page,
        &content.text,
        checkers,
        options.bot,
        &options.category_aliases,
    ) {
        Ok(fix) => fix,
        Err(e) => {
            warn!(title, error = %e, "fix failed");
            return PageOutcome::Failed {
                error: e.to_string(),
            };
        }
    };
    if !fix.changed() {
        return PageOutcome::Unchanged;
    }

    let comment = edit_comment(&options.comment, &fix.rules);
    if !options.dry_run {
        if let Err(e) = saver.save_page(&page.title, fix.text.as_str(), &comment, options.bot) {
            warn!(title, error = %e, "save failed");
            return PageOutcome::Failed {
                error: e.to_string(),
            };
        }
    }
    info!(title, revision = content.revision, edits = fix.edits, dry_run = options.dry_run, "page fixed");
    PageOutcome::Fixed {
        rules: fix.rules,
        edits: fix.edits,
        comment,
    }
}
