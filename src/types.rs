use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::parser::types::Spanned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A candidate text for a finding's span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub text: String,
    /// Short label shown to a human choosing between replacements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Safe to apply without review.
    pub automatic: bool,
    /// Safe to apply in bot mode only.
    pub automatic_bot: bool,
}

impl Replacement {
    pub fn manual(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: None,
            automatic: false,
            automatic_bot: false,
        }
    }

    pub fn automatic(text: impl Into<String>, automatic: bool) -> Self {
        Self {
            automatic,
            ..Self::manual(text)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_bot(mut self, automatic_bot: bool) -> Self {
        self.automatic_bot = automatic_bot;
        self
    }
}

/// One reported rule violation over a span of the page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: u32,
    pub begin: usize,
    pub end: usize,
    pub severity: Severity,
    pub message: String,
    pub replacements: Vec<Replacement>,
}

impl Finding {
    pub fn new(rule: u32, begin: usize, end: usize, message: impl Into<String>) -> Self {
        Self {
            rule,
            begin,
            end,
            severity: Severity::Error,
            message: message.into(),
            replacements: Vec::new(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn add_replacement(&mut self, replacement: Replacement) {
        self.replacements.push(replacement);
    }

    /// At least one replacement may be applied without human review.
    pub fn is_automatic(&self) -> bool {
        self.replacements.iter().any(|r| r.automatic)
    }

    /// At least one replacement may be applied in bot mode.
    pub fn is_automatic_bot(&self) -> bool {
        self.replacements.iter().any(|r| r.automatic || r.automatic_bot)
    }
}

impl Spanned for Finding {
    fn begin(&self) -> usize {
        self.begin
    }
    fn end(&self) -> usize {
        self.end
    }
}

/// A finding located in a file, ready for output.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub title: String,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub rule: u32,
    pub rule_name: String,
    pub message: String,
    pub begin: usize,
    pub end: usize,
    pub replacements: Vec<Replacement>,
}

impl Diagnostic {
    pub fn rule_label(&self) -> String {
        format!("{:03} {}", self.rule, self.rule_name)
    }
}

#[derive(Debug, Default)]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckResult {
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Info)
            .count()
    }

    pub fn has_severity_at_least(&self, threshold: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn make_diagnostic(severity: Severity) -> Diagnostic {
        Diagnostic {
            file: PathBuf::from("Test.wiki"),
            title: "Test".to_string(),
            line: 1,
            column: 1,
            severity,
            rule: 69,
            rule_name: "ISBN wrong syntax".to_string(),
            message: "test".to_string(),
            begin: 0,
            end: 4,
            replacements: vec![],
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert!(Severity::Info < Severity::Error);
    }

    #[test]
    fn test_has_severity_at_least_error() {
        let result = CheckResult {
            diagnostics: vec![make_diagnostic(Severity::Error)],
        };
        assert!(result.has_severity_at_least(Severity::Error));
        assert!(result.has_severity_at_least(Severity::Warning));
        assert!(result.has_severity_at_least(Severity::Info));
    }

    #[test]
    fn test_has_severity_at_least_warning_only() {
        let result = CheckResult {
            diagnostics: vec![make_diagnostic(Severity::Warning)],
        };
        assert!(!result.has_severity_at_least(Severity::Error));
        assert!(result.has_severity_at_least(Severity::Warning));
    }

    #[test]
    fn test_has_severity_at_least_empty() {
        let result = CheckResult::default();
        assert!(!result.has_severity_at_least(Severity::Info));
    }

    #[test]
    fn test_count_methods() {
        let result = CheckResult {
            diagnostics: vec![
                make_diagnostic(Severity::Error),
                make_diagnostic(Severity::Error),
                make_diagnostic(Severity::Warning),
                make_diagnostic(Severity::Info),
            ],
        };
        assert_eq!(result.error_count(), 2);
        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.info_count(), 1);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Info.to_string(), "info");
    }

    #[test]
    fn test_severity_deserialize_invalid() {
        let result: Result<Severity, _> = serde_json::from_str(r#""critical""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_rule_label() {
        assert_eq!(make_diagnostic(Severity::Error).rule_label(), "069 ISBN wrong syntax");
    }

    #[test]
    fn test_finding_automatic_flags() {
        let mut finding = Finding::new(524, 3, 7, "dup");
        assert!(!finding.is_automatic());
        finding.add_replacement(Replacement::manual("x"));
        assert!(!finding.is_automatic_bot());
        finding.add_replacement(Replacement::manual("y").with_bot(true));
        assert!(!finding.is_automatic());
        assert!(finding.is_automatic_bot());
        finding.add_replacement(Replacement::automatic("", true));
        assert!(finding.is_automatic());
    }

    #[test]
    fn test_diagnostic_serialization() {
        let json = serde_json::to_value(make_diagnostic(Severity::Warning)).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["rule"], 69);
    }
}
