pub mod duplicate_template_argument;
pub mod incorrect_date_link;
pub mod interwiki_external_link;
pub mod isbn_syntax;
pub mod macros;

use std::collections::BTreeMap;

use anyhow::{bail, Result};

use crate::config::{Config, Properties};
use crate::engine::analysis::PageAnalysis;
use crate::engine::provider::{ContentProvider, ProviderError};
use crate::types::Finding;

/// One numbered rule of the error catalog.
pub trait Checker: Send + Sync {
    fn id(&self) -> u32;

    fn name(&self) -> &'static str;

    /// Look for the error in `analysis`.
    ///
    /// Returns whether the error is present. Without a findings list the
    /// checker may stop at the first occurrence. With `only_automatic`, only
    /// findings offering an automatic replacement are reported; the return
    /// value is unaffected.
    fn analyze(
        &self,
        analysis: &PageAnalysis,
        findings: Option<&mut Vec<Finding>>,
        only_automatic: bool,
    ) -> bool;

    /// The rule can list the pages likely to contain the error.
    fn has_special_list(&self) -> bool {
        false
    }

    fn special_list(
        &self,
        _provider: &dyn ContentProvider,
        _limit: usize,
    ) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Properties the rule reads, with a description of each.
    fn parameters(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }
}

/// Identifiers of every built-in rule.
pub const RULE_IDS: [u32; 4] = [
    isbn_syntax::ID,
    interwiki_external_link::ID,
    duplicate_template_argument::ID,
    incorrect_date_link::ID,
];

/// Former rule numbers kept working under their current number.
pub const ALIASES: &[(u32, u32)] = &[(512, interwiki_external_link::ID)];

/// Current number of a rule, following aliases.
pub fn resolve_id(id: u32) -> u32 {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == id)
        .map_or(id, |(_, target)| *target)
}

fn build(id: u32, properties: Properties) -> Option<Box<dyn Checker>> {
    let checker: Box<dyn Checker> = match id {
        isbn_syntax::ID => Box::new(isbn_syntax::IsbnSyntaxChecker),
        interwiki_external_link::ID => Box::new(
            interwiki_external_link::InterwikiExternalLinkChecker::new(&properties),
        ),
        duplicate_template_argument::ID => Box::new(
            duplicate_template_argument::DuplicateTemplateArgumentChecker::new(&properties),
        ),
        incorrect_date_link::ID => Box::new(
            incorrect_date_link::IncorrectDateLinkChecker::new(&properties),
        ),
        _ => return None,
    };
    Some(checker)
}

/// Flat map from rule number to checker instance.
pub struct Registry {
    checkers: BTreeMap<u32, Box<dyn Checker>>,
}

impl Registry {
    /// Every enabled rule, each built with its configured properties.
    pub fn from_config(config: &Config) -> Self {
        let checkers = RULE_IDS
            .iter()
            .filter(|&&id| config.rule_enabled(id))
            .filter_map(|&id| build(id, config.properties_for(id)).map(|c| (id, c)))
            .collect();
        Self { checkers }
    }

    pub fn get(&self, id: u32) -> Option<&dyn Checker> {
        self.checkers.get(&resolve_id(id)).map(Box::as_ref)
    }

    pub fn checkers(&self) -> impl Iterator<Item = &dyn Checker> {
        self.checkers.values().map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// The rules named in `ids`, or every rule when `ids` is empty.
    pub fn select(&self, ids: &[u32]) -> Result<Vec<&dyn Checker>> {
        if ids.is_empty() {
            return Ok(self.checkers().collect());
        }
        let mut selected: Vec<&dyn Checker> = Vec::new();
        for &id in ids {
            let Some(checker) = self.get(id) else {
                if RULE_IDS.contains(&resolve_id(id)) {
                    bail!("Rule {id} is disabled in the configuration");
                }
                bail!("Unknown rule: {id}. Run `wikitidy explain` to list rules.");
            };
            if !selected.iter().any(|c| c.id() == checker.id()) {
                selected.push(checker);
            }
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_all_rules_by_default() {
        let registry = Registry::from_config(&Config::default());
        assert_eq!(registry.len(), RULE_IDS.len());
        let ids: Vec<u32> = registry.checkers().map(|c| c.id()).collect();
        assert_eq!(ids, vec![69, 91, 524, 526]);
    }

    #[test]
    fn test_registry_alias() {
        let registry = Registry::from_config(&Config::default());
        let checker = registry.get(512).unwrap();
        assert_eq!(checker.id(), 91);
        assert_eq!(resolve_id(512), 91);
        assert_eq!(resolve_id(524), 524);
    }

    #[test]
    fn test_registry_respects_disabled_rules() {
        let config: Config = toml::from_str("[rules.524]\nenabled = false\n").unwrap();
        let registry = Registry::from_config(&config);
        assert!(registry.get(524).is_none());
        let err = registry.select(&[524]).err().unwrap();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_former_number_section_disables_rule() {
        let config: Config = toml::from_str("[rules.512]\nenabled = false\n").unwrap();
        let registry = Registry::from_config(&config);
        assert!(registry.get(91).is_none());
        let err = registry.select(&[512]).err().unwrap();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_select() {
        let registry = Registry::from_config(&Config::default());
        assert_eq!(registry.select(&[]).unwrap().len(), 4);
        let selected = registry.select(&[512, 91, 69]).unwrap();
        let ids: Vec<u32> = selected.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![91, 69]);
        let err = registry.select(&[1]).err().unwrap();
        assert!(err.to_string().contains("Unknown rule"));
    }

    #[test]
    fn test_names_are_unique() {
        let registry = Registry::from_config(&Config::default());
        let mut names: Vec<&str> = registry.checkers().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), registry.len());
    }
}
