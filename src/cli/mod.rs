pub mod explain;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

use crate::parser::types::ElementKind;
use crate::types::Severity;

#[derive(Parser, Debug)]
#[command(
    name = "wikitidy",
    version,
    about = "Find and fix syntax errors in MediaWiki pages"
)]
pub struct Cli {
    /// Show debug logs on stderr (WIKITIDY_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report errors in wikitext files
    Check {
        /// Directory (or single file) holding wikitext pages
        path: PathBuf,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Path to config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Minimum severity that causes a non-zero exit code
        #[arg(long, default_value = "error")]
        fail_on: Severity,

        /// Only run these rules (repeatable)
        #[arg(short, long = "rule", value_name = "ID")]
        rules: Vec<u32>,

        /// Only report errors that can be fixed automatically
        #[arg(long)]
        only_automatic: bool,
    },
    /// Apply automatic fixes to every page of a local wiki directory
    Fix {
        /// Directory holding one `<Title>.wiki` file per page
        path: PathBuf,

        /// Only apply these rules (repeatable)
        #[arg(short, long = "rule", value_name = "ID")]
        rules: Vec<u32>,

        /// Also apply fixes reserved to bot edits
        #[arg(long)]
        bot: bool,

        /// Report what would change without saving
        #[arg(long)]
        dry_run: bool,

        /// Number of pages processed in parallel
        #[arg(short, long)]
        workers: Option<usize>,

        /// Edit comment prefix
        #[arg(long)]
        comment: Option<String>,

        /// Path to config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the elements detected in a page as JSON
    Elements {
        /// Wikitext file
        file: PathBuf,

        /// Only this kind of element
        #[arg(short, long)]
        kind: Option<ElementKind>,
    },
    /// List the pages a rule suggests looking at
    List {
        /// Directory holding one `<Title>.wiki` file per page
        path: PathBuf,

        /// Rule number
        rule: u32,

        /// Maximum number of pages
        #[arg(short, long, default_value_t = 100)]
        limit: usize,

        /// Path to config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Create a default .wikitidy.toml
    Init,
    /// Explain what a rule detects and how it is fixed (omit rule to list all)
    Explain {
        /// Rule number or name (e.g., 524, duplicate-template-argument)
        rule: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Github,
}
