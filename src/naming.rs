//! Conversions between display labels and property keys.

use crate::Result;
use crate::diagnostics;

use regex::Regex;

const CAMEL_BOUNDARY_RE: &str = r"([a-z0-9])([A-Z])";
const SEPARATORS_RE: &str = r"[_\-\s.]+";
const NON_KEY_CHARS_RE: &str = r"[^a-z0-9]+";

/// `first_name` / `firstName` / `first-name` → `First Name`.
pub fn humanize_key(key: &str) -> String {
    try_humanize_key(key).unwrap_or_else(|e| {
        diagnostics::warn(format!("humanize key '{}': {}", key, e));
        key.to_string()
    })
}

fn try_humanize_key(key: &str) -> Result<String> {
    let camel = Regex::new(CAMEL_BOUNDARY_RE)?;
    let separators = Regex::new(SEPARATORS_RE)?;

    let spaced = camel.replace_all(key, "$1 $2");
    Ok(separators
        .split(&spaced)
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" "))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `First Name` → `first_name`. Falls back to `field` when nothing usable
/// remains, and prefixes keys that would start with a digit.
pub fn slugify_label(label: &str) -> String {
    try_slugify_label(label).unwrap_or_else(|e| {
        diagnostics::warn(format!("slugify label '{}': {}", label, e));
        "field".to_string()
    })
}

fn try_slugify_label(label: &str) -> Result<String> {
    let non_key = Regex::new(NON_KEY_CHARS_RE)?;

    let lowered = label.to_lowercase();
    let slug = non_key.replace_all(&lowered, "_");
    let slug = slug.trim_matches('_');
    Ok(if slug.is_empty() {
        "field".to_string()
    } else if slug.starts_with(|c: char| c.is_ascii_digit()) {
        format!("field_{}", slug)
    } else {
        slug.to_string()
    })
}

/// `base`, or `base_2`, `base_3`, ... whichever is not in `taken`.
pub fn unique_key(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|k| k == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken.iter().any(|k| k == candidate))
        .unwrap_or_else(|| base.to_string())
}
