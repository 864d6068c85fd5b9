use owo_colors::OwoColorize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::engine::batch::{PageOutcome, PageReport};
use crate::types::{CheckResult, Severity};

pub fn render(result: &CheckResult, project_root: &Path) {
    if result.diagnostics.is_empty() {
        println!();
        println!("  {}", "\u{2501}".repeat(50).dimmed());
        println!("  {}", "no errors found".green());
        println!();
        return;
    }

    let mut by_rule: BTreeMap<u32, Vec<_>> = BTreeMap::new();
    for d in &result.diagnostics {
        by_rule.entry(d.rule).or_default().push(d);
    }

    let errors = result.error_count();
    let warnings = result.warning_count();
    let infos = result.info_count();

    println!();
    println!("  {}", "\u{2501}".repeat(50).dimmed());
    let mut parts = Vec::new();
    if errors > 0 {
        parts.push(format!("{errors} errors").red().bold().to_string());
    }
    if warnings > 0 {
        parts.push(format!("{warnings} warnings").yellow().bold().to_string());
    }
    if infos > 0 {
        parts.push(format!("{infos} info").blue().to_string());
    }
    let page_count = result
        .diagnostics
        .iter()
        .map(|d| &d.file)
        .collect::<HashSet<_>>()
        .len();
    println!("  {} across {} pages", parts.join(", "), page_count.bold());
    println!("  {}", "\u{2501}".repeat(50).dimmed());

    let mut rules: Vec<_> = by_rule.iter().collect();
    rules.sort_by_key(|(id, diags)| {
        let worst = diags.iter().map(|d| d.severity).max();
        (std::cmp::Reverse(worst), **id)
    });

    for (_, diags) in rules {
        let count = diags.len();
        let severity = diags
            .iter()
            .map(|d| d.severity)
            .max()
            .unwrap_or(Severity::Info);
        let label = diags[0].rule_label();

        let (icon, label) = match severity {
            Severity::Error => ("\u{2717}".red().to_string(), label.red().bold().to_string()),
            Severity::Warning => (
                "\u{26a0}".yellow().to_string(),
                label.yellow().bold().to_string(),
            ),
            Severity::Info => ("\u{2139}".blue().to_string(), label.blue().bold().to_string()),
        };

        println!();
        println!("  {} {} {}", icon, label, format!("({count})").dimmed());

        let mut by_file: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for d in diags {
            let rel = super::relative_path(&d.file, project_root);
            by_file.entry(rel).or_default().push(d);
        }

        for (file, file_diags) in &by_file {
            println!("    {}", file.dimmed());
            for d in file_diags {
                let position = format!("L{}:{}", d.line, d.column);
                println!("      {:<9} {}", position, d.message);
                if let Some(fix) = d.replacements.iter().find(|r| r.automatic) {
                    let text = if fix.text.is_empty() { "(remove)" } else { &fix.text };
                    println!("      {:<9} {} {}", "", "fix:".green(), text.dimmed());
                }
            }
        }
    }

    println!();
}

/// Summary of a `fix` run, one line per page that did not stay unchanged.
pub fn render_batch(reports: &[PageReport], dry_run: bool) {
    let mut fixed = 0;
    let mut failed = 0;
    let mut skipped = 0;
    for report in reports {
        match &report.outcome {
            PageOutcome::Fixed { comment, edits, .. } => {
                fixed += 1;
                let verb = if dry_run { "would fix" } else { "fixed" };
                println!(
                    "  {} {} {}",
                    verb.green(),
                    report.title.bold(),
                    format!("({edits} edits: {comment})").dimmed()
                );
            }
            PageOutcome::Failed { error } => {
                failed += 1;
                println!("  {} {} {}", "failed".red(), report.title.bold(), error.dimmed());
            }
            PageOutcome::Skipped => skipped += 1,
            PageOutcome::Unchanged => {}
        }
    }
    println!();
    println!(
        "  {} pages, {} fixed, {} failed, {} skipped",
        reports.len(),
        fixed,
        failed,
        skipped
    );
}
