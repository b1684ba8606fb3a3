//! Name and unit normalization shared by every curation operation.
//!
//! Uniqueness across valid names and categories is decided on [`name_key`], never
//! on the raw user input.

/// Trims a user-supplied name, returning `None` when nothing is left.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Case-insensitive lookup key for a name.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trims every unit, drops blanks, and collapses duplicates in first-seen order.
pub fn normalize_units<I, S>(units: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for unit in units {
        let unit = unit.as_ref().trim();
        if !unit.is_empty() && !out.iter().any(|u| u == unit) {
            out.push(unit.to_string());
        }
    }
    out
}

/// Set union of two unit lists, keeping the order in which units were first seen.
pub fn merge_units(existing: &[String], extra: &[String]) -> Vec<String> {
    normalize_units(existing.iter().chain(extra))
}
