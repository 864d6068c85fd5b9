use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::checkers::resolve_id;
use crate::cli::OutputFormat;

pub const CONFIG_FILE: &str = ".wikitidy.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub format: OutputFormat,
    pub include: Vec<String>,
    pub ignore: Vec<String>,
    /// Language code of the wiki the pages belong to (`en`, `fr`, ...).
    pub language: Option<String>,
    /// Localized names of the category namespace.
    pub category_aliases: Vec<String>,
    pub batch: BatchConfig,
    pub rules: BTreeMap<String, RuleConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub workers: usize,
    pub bot: bool,
    pub comment_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub properties: BTreeMap<String, toml::Value>,
}

/// Named settings handed to a checker when it is built.
///
/// Values are kept as strings; lists are stored one item per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn get_list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|v| {
                v.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.trim().parse().ok())
    }

    fn from_toml(values: &BTreeMap<String, toml::Value>) -> Self {
        Self(
            values
                .iter()
                .filter_map(|(k, v)| toml_to_string(v).map(|s| (k.clone(), s)))
                .collect(),
        )
    }
}

fn toml_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(toml_to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        toml::Value::Datetime(_) | toml::Value::Table(_) => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            include: vec!["**/*.wiki".into(), "**/*.mediawiki".into()],
            ignore: vec![".git".into(), "target".into()],
            language: None,
            category_aliases: Vec::new(),
            batch: BatchConfig::default(),
            rules: BTreeMap::new(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            bot: false,
            comment_prefix: "Fixing syntax".into(),
        }
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            properties: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let path = config_path.map(Path::to_path_buf).or_else(|| {
            let default = project_root.join(CONFIG_FILE);
            default.exists().then_some(default)
        });

        match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)?;
                toml::from_str(&content).map_err(|e| anyhow::anyhow!("Config parse error: {e}"))
            }
            None => Ok(Config::default()),
        }
    }

    /// Sections configuring rule `id`, under its current number or a former
    /// one. Sections under a former number come first.
    fn rule_sections(&self, id: u32) -> Vec<&RuleConfig> {
        let mut sections: Vec<(bool, &RuleConfig)> = self
            .rules
            .iter()
            .filter_map(|(key, rule)| {
                let key = key.trim().parse::<u32>().ok()?;
                (resolve_id(key) == id).then_some((key == id, rule))
            })
            .collect();
        sections.sort_by_key(|(current, _)| *current);
        sections.into_iter().map(|(_, rule)| rule).collect()
    }

    pub fn rule_enabled(&self, id: u32) -> bool {
        self.rule_sections(resolve_id(id)).iter().all(|r| r.enabled)
    }

    /// Properties for rule `id`, with the wiki-wide `language` and
    /// `category_aliases` as fallbacks.
    pub fn properties_for(&self, id: u32) -> Properties {
        let mut properties = Properties::new();
        for section in self.rule_sections(resolve_id(id)) {
            properties.0.extend(Properties::from_toml(&section.properties).0);
        }
        if let Some(language) = &self.language {
            properties
                .0
                .entry("language".to_string())
                .or_insert_with(|| language.clone());
        }
        if !self.category_aliases.is_empty() {
            properties
                .0
                .entry("category_aliases".to_string())
                .or_insert_with(|| self.category_aliases.join("\n"));
        }
        properties
    }

    pub const fn default_toml() -> &'static str {
        r#"# wikitidy configuration

# Output format: text, json or github
format = "text"

# Which files hold wikitext pages (glob patterns, case-insensitive).
include = ["**/*.wiki", "**/*.mediawiki"]

# Directories to ignore when scanning
ignore = [".git", "target"]

# Language code of the wiki (used to turn interwiki URLs into local links)
# language = "en"

# Localized names of the category namespace
# category_aliases = ["Catégorie"]

[batch]
workers = 4
bot = false
comment_prefix = "Fixing syntax"

[rules.69]
enabled = true

[rules.91]
enabled = true

[rules.524]
enabled = true
# category = "Pages using duplicate arguments in template calls"

[rules.526]
enabled = true
# ask_help = ["Ask for help|{{Which year}}"]
# dump_analysis = "Project:Check Wikipedia/Incorrect date links"
"#
    }
}
