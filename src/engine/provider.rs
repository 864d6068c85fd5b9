//! Boundary with the wiki the pages come from.
//!
//! The analysis core never reaches the network: it pulls text through a
//! [`ContentProvider`] and hands fixed text to a [`PageSaver`]. [`LocalWiki`]
//! implements both over a directory holding one file per page.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use thiserror::Error;
use tracing::{debug, info};

use super::analysis::{Namespace, Page, PageAnalysis};
use crate::parser::category::DEFAULT_NAMESPACE;
use crate::parser::title_case::{normalize_title, same_title};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("content unavailable for \"{title}\": {reason}")]
    ContentUnavailable { title: String, reason: String },
    #[error("could not save \"{title}\": {reason}")]
    SaveFailed { title: String, reason: String },
}

impl ProviderError {
    pub fn unavailable(title: &str, reason: impl ToString) -> Self {
        Self::ContentUnavailable {
            title: title.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Text of a page together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub title: String,
    pub text: String,
    pub revision: u64,
}

pub trait ContentProvider: Send + Sync {
    fn fetch_page_content(&self, title: &str) -> Result<PageContent, ProviderError>;

    /// Members of `category`, descending into subcategories up to `max_depth`
    /// levels. At most `limit` titles are returned.
    fn fetch_category_members(
        &self,
        category: &str,
        max_depth: usize,
        limit: usize,
    ) -> Result<Vec<String>, ProviderError>;

    /// Pages holding an internal link to `title`, optionally restricted to
    /// some namespaces.
    fn fetch_pages_linking_to(
        &self,
        title: &str,
        namespaces: Option<&[Namespace]>,
    ) -> Result<Vec<String>, ProviderError>;
}

pub trait PageSaver: Send + Sync {
    fn save_page(&self, title: &str, text: &str, comment: &str, bot: bool)
        -> Result<(), ProviderError>;
}

/// Characters that cannot appear in a page file name.
const FILE_NAME: &AsciiSet = &CONTROLS.add(b'/').add(b'\\').add(b'%');

pub const PAGE_EXTENSIONS: [&str; 2] = ["wiki", "mediawiki"];

/// A wiki stored as a flat directory, one `<Title>.wiki` file per page.
///
/// Slashes in titles (subpages) are percent-encoded in file names.
#[derive(Debug, Clone)]
pub struct LocalWiki {
    root: PathBuf,
    category_aliases: Vec<String>,
}

impl LocalWiki {
    pub fn open(root: &Path) -> Result<Self, ProviderError> {
        if !root.is_dir() {
            return Err(ProviderError::unavailable(
                &root.display().to_string(),
                "not a directory",
            ));
        }
        Ok(Self {
            root: root.to_path_buf(),
            category_aliases: Vec::new(),
        })
    }

    pub fn with_category_aliases(mut self, aliases: &[String]) -> Self {
        self.category_aliases = aliases.to_vec();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Titles of every page in the directory, sorted.
    pub fn titles(&self) -> Result<Vec<String>, ProviderError> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|e| ProviderError::unavailable(&self.root.display().to_string(), e))?;
        let mut titles: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter_map(|path| title_from_path(&path))
            .collect();
        titles.sort();
        titles.dedup();
        Ok(titles)
    }

    pub fn path_for(&self, title: &str) -> PathBuf {
        let stem = utf8_percent_encode(&normalize_title(title), FILE_NAME).to_string();
        let existing = PAGE_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{stem}.{ext}")))
            .find(|path| path.is_file());
        existing.unwrap_or_else(|| self.root.join(format!("{stem}.{}", PAGE_EXTENSIONS[0])))
    }

    fn analyze(&self, title: &str) -> Result<PageAnalysis, ProviderError> {
        let content = self.fetch_page_content(title)?;
        Ok(PageAnalysis::new(Page::new(title), content.text)
            .with_category_aliases(&self.category_aliases))
    }

    /// Direct members of every category, keyed by category name.
    fn category_index(&self) -> Result<BTreeMap<String, BTreeSet<String>>, ProviderError> {
        let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for title in self.titles()? {
            let analysis = self.analyze(&title)?;
            for category in analysis.categories() {
                index
                    .entry(category.name.clone())
                    .or_default()
                    .insert(title.clone());
            }
        }
        Ok(index)
    }
}

/// Page title stored in `path`, if it has a page extension.
pub fn title_from_path(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !PAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let decoded = percent_decode_str(stem).decode_utf8().ok()?;
    let title = normalize_title(&decoded);
    (!title.is_empty()).then_some(title)
}

/// Category name without its namespace prefix.
fn category_name(category: &str, aliases: &[String]) -> String {
    let normalized = normalize_title(category);
    if let Some((prefix, name)) = normalized.split_once(':') {
        let prefix = prefix.trim();
        if prefix.eq_ignore_ascii_case(DEFAULT_NAMESPACE)
            || aliases.iter().any(|a| a.trim().to_lowercase() == prefix.to_lowercase())
        {
            return normalize_title(name);
        }
    }
    normalized
}

impl ContentProvider for LocalWiki {
    fn fetch_page_content(&self, title: &str) -> Result<PageContent, ProviderError> {
        let path = self.path_for(title);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| ProviderError::unavailable(title, format!("{}: {e}", path.display())))?;
        let revision = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());
        debug!(title, path = %path.display(), revision, "fetched page");
        Ok(PageContent {
            title: normalize_title(title),
            text,
            revision,
        })
    }

    fn fetch_category_members(
        &self,
        category: &str,
        max_depth: usize,
        limit: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let index = self.category_index()?;
        let mut members = Vec::new();
        let mut seen = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([(category_name(category, &self.category_aliases), 0)]);

        while let Some((name, depth)) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(direct) = index.get(&name) else {
                continue;
            };
            for title in direct {
                if members.len() >= limit {
                    return Ok(members);
                }
                if seen.insert(title.clone()) {
                    members.push(title.clone());
                }
                let page = Page::new(title);
                if page.namespace == Namespace::CATEGORY && depth < max_depth {
                    queue.push_back((category_name(title, &self.category_aliases), depth + 1));
                }
            }
        }
        Ok(members)
    }

    fn fetch_pages_linking_to(
        &self,
        title: &str,
        namespaces: Option<&[Namespace]>,
    ) -> Result<Vec<String>, ProviderError> {
        let mut linking = Vec::new();
        for candidate in self.titles()? {
            let analysis = self.analyze(&candidate)?;
            if namespaces.is_some_and(|ns| !ns.contains(&analysis.page().namespace)) {
                continue;
            }
            if analysis
                .internal_links()
                .iter()
                .any(|link| same_title(&link.link, title))
            {
                linking.push(candidate);
            }
        }
        Ok(linking)
    }
}

impl PageSaver for LocalWiki {
    fn save_page(
        &self,
        title: &str,
        text: &str,
        comment: &str,
        bot: bool,
    ) -> Result<(), ProviderError> {
        let path = self.path_for(title);
        std::fs::write(&path, text).map_err(|e| ProviderError::SaveFailed {
            title: title.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        info!(title, comment, bot, "saved page");
        Ok(())
    }
}
