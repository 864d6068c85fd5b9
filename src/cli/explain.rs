use strsim::jaro_winkler;

use crate::checkers::resolve_id;

/// Rule number, slug and one-line description.
pub const AVAILABLE_RULES: &[(u32, &str, &str)] = &[
    (69, "isbn-wrong-syntax", "ISBN with a bad checksum, length or prefix"),
    (
        91,
        "interwiki-external-link",
        "Link to another Wikipedia written as an external link",
    ),
    (
        524,
        "duplicate-template-argument",
        "Template call giving the same argument twice",
    ),
    (526, "incorrect-date-link", "Link showing one year but pointing to another"),
];

pub fn list_rules() -> String {
    use std::fmt::Write;
    let mut out = String::from("Available rules:\n\n");
    for (id, slug, desc) in AVAILABLE_RULES {
        let _ = writeln!(out, "  {id:>3}  {slug:<30} {desc}");
    }
    out.push_str("\nRule 512 is an alias of rule 91.");
    out.push_str("\nRun `wikitidy explain <rule>` for details.");
    out
}

/// Rule number for a number or slug given on the command line.
pub fn lookup(rule: &str) -> Option<u32> {
    let rule = rule.trim();
    let id = match rule.parse::<u32>() {
        Ok(id) => resolve_id(id),
        Err(_) => AVAILABLE_RULES
            .iter()
            .find(|(_, slug, _)| slug.eq_ignore_ascii_case(rule))
            .map(|(id, _, _)| *id)?,
    };
    AVAILABLE_RULES
        .iter()
        .any(|(known, _, _)| *known == id)
        .then_some(id)
}

/// Closest rule slugs to a mistyped name.
pub fn suggestions(rule: &str) -> Vec<&'static str> {
    let rule = rule.to_lowercase();
    let mut scored: Vec<(f64, &'static str)> = AVAILABLE_RULES
        .iter()
        .map(|(_, slug, _)| (jaro_winkler(&rule, slug), *slug))
        .filter(|(score, _)| *score >= 0.8)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, slug)| slug).collect()
}

pub fn explain(rule: &str) -> Option<&'static str> {
    match lookup(rule)? {
        69 => Some(
            "069 isbn-wrong-syntax: ISBN wrong syntax.\n\
             \n\
             An ISBN magic link must be the keyword followed by the number alone:\n\
             `ISBN 978-0-306-40615-7`. Prefixes like `ISBN-13:` or `ISBN:` break the\n\
             link, and a number with a bad length or checksum points to no book.\n\
             \n\
             When only the syntax around a valid number is wrong, the fix\n\
             `ISBN <number>` is applied automatically.\n\
             \n\
             Severity: error\n\
             Config: [rules.69]",
        ),
        91 => Some(
            "091 interwiki-external-link: Interwiki link written as external link.\n\
             \n\
             `[https://fr.wikipedia.org/wiki/Tour_Eiffel tower]` should be written\n\
             `[[:fr:Tour Eiffel|tower]]`. Links to the wiki's own language (the\n\
             `language` setting) become plain internal links.\n\
             \n\
             The fix is automatic when the title decodes cleanly and the URL has no\n\
             query string. Former rule 512 is an alias of this rule.\n\
             \n\
             Severity: error\n\
             Config: [rules.91] (language, from the top-level `language` key)",
        ),
        524 => Some(
            "524 duplicate-template-argument: Duplicate template argument.\n\
             \n\
             In `{{Infobox|name=A|born=1900|name=B}}` the wiki only keeps the last\n\
             `name`; the earlier value is silently lost. Each repeated argument is\n\
             reported against its previous occurrence.\n\
             \n\
             Removing the earlier occurrence is automatic when both values are equal\n\
             or the earlier one is empty, unless the argument name holds a digit\n\
             (it may be a mistyped position).\n\
             \n\
             Severity: error\n\
             Config: [rules.524] (category)",
        ),
        526 => Some(
            "526 incorrect-date-link: Incorrect date link.\n\
             \n\
             `[[1995|1994]]` shows a year but leads to the article of another one.\n\
             Suggested fixes link the target year, link the displayed year, or append\n\
             a request for help configured with `ask_help`. The first request for\n\
             help is applied in bot mode on main namespace articles when it is a\n\
             template and no template already follows the link.\n\
             \n\
             Severity: error (warning when a template follows the link)\n\
             Config: [rules.526] (ask_help, dump_analysis)",
        ),
        _ => None,
    }
}
