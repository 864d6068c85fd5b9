use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

use super::provider::PAGE_EXTENSIONS;
use crate::config::Config;

pub(crate) fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    patterns
        .iter()
        .filter_map(|p| GlobBuilder::new(p).case_insensitive(true).build().ok())
        .for_each(|glob| {
            builder.add(glob);
        });
    builder.build().unwrap_or_default()
}

/// Every wikitext file under `root` accepted by the include and ignore globs.
pub fn scan(root: &Path, config: &Config) -> Vec<PathBuf> {
    let ignore_set = build_glob_set(&config.ignore);
    let include_set = build_glob_set(&config.include);
    let mut files = Vec::new();
    walk_dir(root, root, &ignore_set, &include_set, &mut files);
    files.sort();
    files
}

pub(crate) fn matches_glob(path: &Path, root: &Path, set: &GlobSet) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| set.is_match(name))
        || path.strip_prefix(root).is_ok_and(|rel| set.is_match(rel))
}

fn is_page_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PAGE_EXTENSIONS.iter().any(|p| p.eq_ignore_ascii_case(ext)))
}

fn walk_dir(
    dir: &Path,
    root: &Path,
    ignore: &GlobSet,
    include: &GlobSet,
    files: &mut Vec<PathBuf>,
) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if matches_glob(&path, root, ignore) {
            continue;
        }

        if path.is_dir() {
            walk_dir(&path, root, ignore, include, files);
        } else if is_page_file(&path) && matches_glob(&path, root, include) {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_finds_wiki_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Paris.wiki"), "Paris").unwrap();
        fs::write(dir.path().join("notes.txt"), "not wikitext").unwrap();
        fs::write(dir.path().join("Lyon.mediawiki"), "Lyon").unwrap();

        let files = scan(dir.path(), &Config::default());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_page_file(f)));
    }

    #[test]
    fn test_scan_recurses_and_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("A.wiki"), "a").unwrap();
        fs::create_dir(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("drafts/B.wiki"), "b").unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/C.wiki"), "c").unwrap();

        let files = scan(dir.path(), &Config::default());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| !f.starts_with(dir.path().join("target"))));
    }

    #[test]
    fn test_scan_glob_patterns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("A.wiki"), "a").unwrap();
        fs::create_dir(dir.path().join("build_output")).unwrap();
        fs::write(dir.path().join("build_output/B.wiki"), "b").unwrap();

        let mut config = Config::default();
        config.ignore.push("build_*".to_string());
        let files = scan(dir.path(), &config);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name().unwrap(), "A.wiki");
    }

    #[test]
    fn test_scan_include_restricts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("A.wiki"), "a").unwrap();
        fs::write(dir.path().join("B.mediawiki"), "b").unwrap();

        let mut config = Config::default();
        config.include = vec!["*.MEDIAWIKI".to_string()];
        let files = scan(dir.path(), &config);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name().unwrap(), "B.mediawiki");

        config.include = vec![];
        assert!(scan(dir.path(), &config).is_empty());
    }
}
