use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use wikitidy::checkers::Registry;
use wikitidy::cli::{Cli, Commands};
use wikitidy::config::{Config, CONFIG_FILE};
use wikitidy::engine::analysis::{Page, PageAnalysis};
use wikitidy::engine::batch::{self, BatchOptions, CancelToken, PageOutcome};
use wikitidy::engine::provider::{title_from_path, LocalWiki};
use wikitidy::engine;
use wikitidy::parser::types::ElementKind;

use clap::Parser;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("WIKITIDY_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            path,
            format,
            config,
            fail_on,
            rules,
            only_automatic,
        } => {
            let path = path.canonicalize().unwrap_or(path);
            let project_root = if path.is_file() {
                path.parent().unwrap_or(path.as_path()).to_path_buf()
            } else {
                path.clone()
            };
            let cfg = Config::load(config.as_deref(), &project_root)?;
            let result = engine::run(&path, &cfg, &rules, only_automatic)?;

            let output_format = format.unwrap_or(cfg.format);
            wikitidy::cli::output::render(&result, &project_root, output_format)?;

            if result.has_severity_at_least(fail_on) {
                std::process::exit(1);
            }
        }
        Commands::Fix {
            path,
            rules,
            bot,
            dry_run,
            workers,
            comment,
            config,
        } => {
            let root = path.canonicalize().unwrap_or(path);
            let cfg = Config::load(config.as_deref(), &root)?;
            let wiki = LocalWiki::open(&root)?.with_category_aliases(&cfg.category_aliases);
            let registry = Registry::from_config(&cfg);
            let checkers = registry.select(&rules)?;
            let options = BatchOptions {
                workers: workers.unwrap_or(cfg.batch.workers),
                bot: bot || cfg.batch.bot,
                dry_run,
                comment: comment.unwrap_or_else(|| cfg.batch.comment_prefix.clone()),
                category_aliases: cfg.category_aliases.clone(),
            };

            let titles = wiki.titles()?;
            if titles.is_empty() {
                bail!("No wikitext pages found in {}", root.display());
            }
            let reports =
                batch::run_batch(&wiki, &wiki, &titles, &checkers, &options, &CancelToken::new())?;
            wikitidy::cli::output::text::render_batch(&reports, dry_run);

            if reports
                .iter()
                .any(|r| matches!(r.outcome, PageOutcome::Failed { .. }))
            {
                std::process::exit(1);
            }
        }
        Commands::Elements { file, kind } => {
            let text = std::fs::read_to_string(&file)?;
            let parent = file.parent().unwrap_or(Path::new("."));
            let cfg = Config::load(None, parent)?;
            let title = title_from_path(&file).unwrap_or_else(|| file.display().to_string());
            let analysis = PageAnalysis::new(Page::new(&title), text)
                .with_category_aliases(&cfg.category_aliases);

            let kinds = kind.map_or_else(|| ElementKind::ALL.to_vec(), |k| vec![k]);
            let elements: BTreeMap<String, _> = kinds
                .into_iter()
                .map(|k| (k.to_string(), analysis.elements(k)))
                .collect();
            let output = serde_json::json!({
                "page": analysis.page(),
                "elements": elements,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::List {
            path,
            rule,
            limit,
            config,
        } => {
            let root = path.canonicalize().unwrap_or(path);
            let cfg = Config::load(config.as_deref(), &root)?;
            let registry = Registry::from_config(&cfg);
            let Some(checker) = registry.get(rule) else {
                bail!("Unknown or disabled rule: {rule}");
            };
            if !checker.has_special_list() {
                bail!(
                    "Rule {:03} has no page list; configure one of: {}",
                    checker.id(),
                    checker
                        .parameters()
                        .iter()
                        .map(|(name, _)| *name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            let wiki = LocalWiki::open(&root)?.with_category_aliases(&cfg.category_aliases);
            for title in checker.special_list(&wiki, limit)? {
                println!("{title}");
            }
        }
        Commands::Init => {
            let path = std::env::current_dir()?.join(CONFIG_FILE);
            if path.exists() {
                eprintln!("{CONFIG_FILE} already exists");
                std::process::exit(1);
            }
            std::fs::write(&path, Config::default_toml())?;
            println!("Created {CONFIG_FILE}");
        }
        Commands::Explain { rule: None } => {
            println!("{}", wikitidy::cli::explain::list_rules());
        }
        Commands::Explain { rule: Some(rule) } => {
            use wikitidy::cli::explain::{explain, list_rules, suggestions};
            match explain(&rule) {
                Some(text) => println!("{text}"),
                None => {
                    eprintln!("Unknown rule: {rule}\n");
                    if let Some(best) = suggestions(&rule).first() {
                        eprintln!("Did you mean `{best}`?\n");
                    }
                    eprintln!("{}", list_rules());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
