/// Uppercase the first character, leaving the rest untouched.
pub fn uc_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalize a page title the way the wiki does: underscores become spaces,
/// runs of spaces collapse, surrounding whitespace is trimmed and the first
/// letter is uppercased.
pub fn normalize_title(value: &str) -> String {
    let spaced = value.replace('_', " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    uc_first(&collapsed)
}

/// True when both strings designate the same page.
pub fn same_title(a: &str, b: &str) -> bool {
    normalize_title(a) == normalize_title(b)
}
