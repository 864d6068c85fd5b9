use std::collections::HashMap;

use crate::config::Properties;
use crate::emit;
use crate::engine::analysis::PageAnalysis;
use crate::engine::provider::{ContentProvider, ProviderError};
use crate::types::{Finding, Replacement};

use super::Checker;

pub const ID: u32 = 524;

/// Template calls giving the same argument twice. Only the last value is
/// used by the wiki, the earlier ones are silently lost.
pub struct DuplicateTemplateArgumentChecker {
    category: Option<String>,
}

impl DuplicateTemplateArgumentChecker {
    pub fn new(properties: &Properties) -> Self {
        Self {
            category: properties.get("category").map(|c| c.trim().to_string()),
        }
    }
}

impl Checker for DuplicateTemplateArgumentChecker {
    fn id(&self) -> u32 {
        ID
    }

    fn name(&self) -> &'static str {
        "Duplicate template argument"
    }

    fn analyze(
        &self,
        analysis: &PageAnalysis,
        mut findings: Option<&mut Vec<Finding>>,
        only_automatic: bool,
    ) -> bool {
        let mut found = false;
        let mut names: HashMap<&str, usize> = HashMap::new();
        for template in analysis.templates() {
            if template.parameter_count() < 2 {
                continue;
            }
            names.clear();
            for (index, param) in template.parameters.iter().enumerate() {
                // Each occurrence is paired with the latest earlier one.
                let Some(previous) = names.insert(param.computed_name.as_str(), index) else {
                    continue;
                };
                let (Some(existing), Some(next)) =
                    (template.parameter(previous), template.parameter(previous + 1))
                else {
                    continue;
                };
                found = true;
                emit!(findings, only_automatic, {
                    let mut finding = Finding::new(
                        ID,
                        existing.pipe_index,
                        next.pipe_index,
                        format!(
                            "Argument \"{}\" of template \"{}\" is given more than once",
                            param.computed_name, template.name
                        ),
                    );
                    // Numbered names may be a typo for another position.
                    let automatic = !param.computed_name.chars().any(char::is_numeric);
                    if existing.value == param.value || existing.value.is_empty() {
                        finding.add_replacement(
                            Replacement::automatic("", automatic).with_label("Remove first"),
                        );
                    }
                    finding
                });
            }
        }
        found
    }

    fn has_special_list(&self) -> bool {
        self.category.is_some()
    }

    fn special_list(
        &self,
        provider: &dyn ContentProvider,
        limit: usize,
    ) -> Result<Vec<String>, ProviderError> {
        match &self.category {
            Some(category) => provider.fetch_category_members(category, 0, limit),
            None => Ok(Vec::new()),
        }
    }

    fn parameters(&self) -> Vec<(&'static str, &'static str)> {
        vec![("category", "A category containing the list of pages in error")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analysis::Page;

    fn run(text: &str) -> (bool, Vec<Finding>) {
        let analysis = PageAnalysis::new(Page::new("Test"), text);
        let mut findings = Vec::new();
        let checker = DuplicateTemplateArgumentChecker::new(&Properties::new());
        let found = checker.analyze(&analysis, Some(&mut findings), false);
        (found, findings)
    }

    #[test]
    fn test_duplicate_with_different_values() {
        let (found, findings) = run("{{T|x=1|y=2|x=3}}");
        assert!(found);
        assert_eq!(findings.len(), 1);
        assert_eq!((findings[0].begin, findings[0].end), (3, 7));
        assert!(findings[0].replacements.is_empty());
        assert!(!findings[0].is_automatic());
    }

    #[test]
    fn test_duplicate_with_equal_values_is_automatic() {
        let text = "{{T|x=1|y=2|x=1}}";
        let (_, findings) = run(text);
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(&text[finding.begin..finding.end], "|x=1");
        assert_eq!(finding.replacements[0].text, "");
        assert!(finding.is_automatic());
    }

    #[test]
    fn test_empty_earlier_value_is_removable() {
        let (_, findings) = run("{{T|x=|y=2|x=3}}");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_automatic());
    }

    #[test]
    fn test_numeric_names_are_never_automatic() {
        let (_, findings) = run("{{T|a|1=a}}");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].replacements.len(), 1);
        assert!(!findings[0].is_automatic());

        let (_, findings) = run("{{T|date2=x|b=1|date2=x}}");
        assert!(!findings[0].is_automatic());

        let (_, findings) = run("{{T|تاريخ٢=x|b=1|تاريخ٢=x}}");
        assert_eq!(findings.len(), 1);
        assert!(!findings[0].is_automatic());

        let (_, findings) = run("{{T|तिथि२=x|तिथि२=x}}");
        assert!(!findings[0].is_automatic());
    }

    #[test]
    fn test_three_occurrences_pair_consecutively() {
        let text = "{{T|x=1|x=2|x=3}}";
        let (_, findings) = run(text);
        assert_eq!(findings.len(), 2);
        assert_eq!(&text[findings[0].begin..findings[0].end], "|x=1");
        assert_eq!(&text[findings[1].begin..findings[1].end], "|x=2");
    }

    #[test]
    fn test_no_duplicates() {
        let (found, findings) = run("{{T|a|b|x=1}} {{U|x=1}} {{V}}");
        assert!(!found);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_each_template_checked_separately() {
        let (_, findings) = run("{{T|x=1}} {{U|x=1|y=1}}");
        assert!(findings.is_empty());
        let (found, _) = run("{{T|x=1|y=1}} {{U|y=1|y=1}}");
        assert!(found);
    }

    #[test]
    fn test_only_automatic_mode() {
        let analysis = PageAnalysis::new(Page::new("Test"), "{{T|x=1|x=2}}");
        let checker = DuplicateTemplateArgumentChecker::new(&Properties::new());
        let mut findings = Vec::new();
        assert!(checker.analyze(&analysis, Some(&mut findings), true));
        assert!(findings.is_empty());
        assert!(checker.analyze(&analysis, None, true));
    }

    #[test]
    fn test_special_list_from_category() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.wiki"), "[[Category:Duplicates]]").unwrap();
        let wiki = crate::engine::provider::LocalWiki::open(dir.path()).unwrap();

        let none = DuplicateTemplateArgumentChecker::new(&Properties::new());
        assert!(!none.has_special_list());

        let checker =
            DuplicateTemplateArgumentChecker::new(&Properties::new().with("category", "Duplicates"));
        assert!(checker.has_special_list());
        assert_eq!(checker.special_list(&wiki, 10).unwrap(), vec!["A"]);
    }
}
