use super::scanner::{byte_at, match_literal, next_char_index, skip_comment, slice};
use super::title_case::normalize_title;
use super::types::{Parameter, Template};

/// Detect a template call `{{name|...}}` starting exactly at `index`.
///
/// Template arguments (`{{{1}}}`), parser functions (`{{#if:...}}`) and
/// magic words (`{{DEFAULTSORT:...}}`) are not templates.
pub fn detect(text: &str, index: usize) -> Option<Template> {
    let name_begin = match_literal(text, index, "{{")?;
    if byte_at(text, name_begin) == Some(b'{') {
        return None;
    }

    let mut cursor = name_begin;
    loop {
        match byte_at(text, cursor)? {
            b'|' => break,
            b'}' if match_literal(text, cursor, "}}").is_some() => break,
            b'{' | b'}' | b'[' | b']' => return None,
            b'<' if match_literal(text, cursor, "<!--").is_some() => {
                cursor = skip_comment(text, cursor)?;
            }
            _ => cursor = next_char_index(text, cursor),
        }
    }
    let name = template_name(slice(text, name_begin, cursor)?)?;

    let mut parameters = Vec::new();
    let mut positional = 0usize;
    while byte_at(text, cursor) == Some(b'|') {
        let pipe_index = cursor;
        let (param_end, equal_index) = scan_parameter(text, pipe_index + 1)?;
        let (explicit, value_from) = match equal_index {
            Some(eq) => (Some(slice(text, pipe_index + 1, eq)?.trim().to_string()), eq + 1),
            None => (None, pipe_index + 1),
        };
        let raw_value = slice(text, value_from, param_end)?;
        let value_begin = value_from + (raw_value.len() - raw_value.trim_start().len());
        let value = raw_value.trim().to_string();
        let computed_name = match &explicit {
            Some(name) => name.clone(),
            None => {
                positional += 1;
                positional.to_string()
            }
        };
        parameters.push(Parameter {
            index: parameters.len(),
            name: explicit,
            computed_name,
            pipe_index,
            value_end: value_begin + value.len(),
            value,
            value_begin,
        });
        cursor = param_end;
    }

    match_literal(text, cursor, "}}").map(|end| Template {
        begin: index,
        end,
        name,
        parameters,
    })
}

fn template_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.contains('\n') {
        return None;
    }
    let without_comments = strip_comments(trimmed);
    let name = match without_comments.split_once(':') {
        Some((prefix, rest)) if prefix.trim().eq_ignore_ascii_case("template") => rest.to_string(),
        Some(_) => return None,
        None => without_comments,
    };
    let normalized = normalize_title(&name);
    (!normalized.is_empty()).then_some(normalized)
}

fn strip_comments(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut i = 0;
    while i < value.len() {
        if let Some(after) = skip_comment(value, i) {
            i = after;
            continue;
        }
        let next = next_char_index(value, i);
        out.push_str(&value[i..next]);
        i = next;
    }
    out
}

/// Scan one parameter body starting after its `|`.
///
/// Returns the index of the delimiter ending the parameter (`|` or `}}` at
/// nesting depth 0) and the first depth-0 `=` if any. `None` when the text
/// ends before the template is closed.
fn scan_parameter(text: &str, from: usize) -> Option<(usize, Option<usize>)> {
    let mut braces = 0usize;
    let mut arguments = 0usize;
    let mut brackets = 0usize;
    let mut equal_index = None;
    let mut cursor = from;

    loop {
        let at = move |literal: &str| match_literal(text, cursor, literal).is_some();
        match byte_at(text, cursor)? {
            b'<' if at("<!--") => cursor = skip_comment(text, cursor)?,
            b'{' if at("{{{") => {
                arguments += 1;
                cursor += 3;
            }
            b'{' if at("{{") => {
                braces += 1;
                cursor += 2;
            }
            b'}' if arguments > 0 && at("}}}") => {
                arguments -= 1;
                cursor += 3;
            }
            b'}' if at("}}") => {
                if braces == 0 {
                    return Some((cursor, equal_index));
                }
                braces -= 1;
                cursor += 2;
            }
            b'[' if at("[[") => {
                brackets += 1;
                cursor += 2;
            }
            b']' if at("]]") => {
                brackets = brackets.saturating_sub(1);
                cursor += 2;
            }
            b'|' if braces == 0 && arguments == 0 && brackets == 0 => {
                return Some((cursor, equal_index));
            }
            b'=' if braces == 0 && arguments == 0 && brackets == 0 => {
                equal_index.get_or_insert(cursor);
                cursor += 1;
            }
            _ => cursor = next_char_index(text, cursor),
        }
    }
}

impl Template {
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameter(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get(index)
    }

    /// Value of the parameter named `name`; the last occurrence wins, as on the wiki.
    pub fn parameter_value(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .rev()
            .find(|p| p.computed_name == name)
            .map(|p| p.value.as_str())
    }
}
