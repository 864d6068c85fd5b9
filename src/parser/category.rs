use super::internal_link;
use super::title_case::normalize_title;
use super::types::CategoryLink;

/// Namespace name used when no localized alias is configured.
pub const DEFAULT_NAMESPACE: &str = "Category";

/// Detect a categorization link `[[Category:Name|sort key]]` starting at `index`.
///
/// `aliases` lists the accepted namespace names besides `Category`
/// (localized names such as `Catégorie`). A leading colon
/// (`[[:Category:Name]]`) makes a plain link, not a categorization.
pub fn detect(text: &str, index: usize, aliases: &[String]) -> Option<CategoryLink> {
    let link = internal_link::detect(text, index)?;
    let raw = link.raw.link.trim_start();
    if raw.starts_with(':') {
        return None;
    }
    let (prefix, name) = raw.split_once(':')?;
    let prefix = prefix.trim();
    let known = prefix.eq_ignore_ascii_case(DEFAULT_NAMESPACE)
        || aliases
            .iter()
            .any(|alias| alias.trim().to_lowercase() == prefix.to_lowercase());
    if !known {
        return None;
    }

    let mut name = name.to_string();
    if let Some(anchor) = &link.raw.anchor {
        name.push('#');
        name.push_str(anchor);
    }
    let name = normalize_title(&name);
    if name.is_empty() {
        return None;
    }

    Some(CategoryLink {
        begin: link.begin,
        end: link.end,
        name,
        sort_key: link.text,
    })
}
