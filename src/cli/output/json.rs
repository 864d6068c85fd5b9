use serde::Serialize;
use std::path::Path;

use crate::types::{CheckResult, Replacement, Severity};

#[derive(Serialize)]
struct JsonOutput<'a> {
    diagnostics: Vec<JsonDiagnostic<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    file: String,
    title: &'a str,
    line: usize,
    column: usize,
    begin: usize,
    end: usize,
    severity: &'a Severity,
    rule: u32,
    rule_name: &'a str,
    message: &'a str,
    replacements: &'a [Replacement],
}

#[derive(Serialize)]
struct JsonSummary {
    errors: usize,
    warnings: usize,
    info: usize,
}

fn build_output<'a>(result: &'a CheckResult, project_root: &Path) -> JsonOutput<'a> {
    let diagnostics = result
        .diagnostics
        .iter()
        .map(|d| JsonDiagnostic {
            file: super::relative_path(&d.file, project_root),
            title: &d.title,
            line: d.line,
            column: d.column,
            begin: d.begin,
            end: d.end,
            severity: &d.severity,
            rule: d.rule,
            rule_name: &d.rule_name,
            message: &d.message,
            replacements: &d.replacements,
        })
        .collect();

    JsonOutput {
        diagnostics,
        summary: JsonSummary {
            errors: result.error_count(),
            warnings: result.warning_count(),
            info: result.info_count(),
        },
    }
}

pub fn render(result: &CheckResult, project_root: &Path) -> anyhow::Result<()> {
    let output = build_output(result, project_root);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
