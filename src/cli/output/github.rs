use std::path::Path;

use crate::types::{CheckResult, Severity};

/// Escape a value for a workflow command property or message.
fn escape(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
        .replace(':', "%3A")
        .replace(',', "%2C")
}

pub fn render(result: &CheckResult, project_root: &Path) {
    for line in lines(result, project_root) {
        println!("{line}");
    }
}

fn lines(result: &CheckResult, project_root: &Path) -> Vec<String> {
    result
        .diagnostics
        .iter()
        .map(|d| {
            let rel = super::relative_path(&d.file, project_root);
            let level = match d.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info => "notice",
            };
            format!(
                "::{level} file={rel},line={line},col={col},title={title}::{message}",
                rel = escape(&rel),
                line = d.line,
                col = d.column,
                title = escape(&d.rule_label()),
                message = d.message.replace('%', "%25").replace('\n', "%0A"),
            )
        })
        .collect()
}
