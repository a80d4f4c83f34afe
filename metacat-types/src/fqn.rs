//! Fully-qualified name algebra.
//!
//! A fully-qualified name (FQN) is a dotted path from the root container
//! through every ancestor down to an entity or field, e.g.
//! `kafka.orders.payload.id`. A part that itself contains a `.` is wrapped in
//! double quotes so the path stays splittable: `kafka.orders."a.b"`.

const SEPARATOR: char = '.';
const QUOTE: char = '"';

/// Quotes `name` if it contains the separator and is not already quoted.
pub fn quote_name(name: &str) -> String {
    if is_quoted(name) || !name.contains(SEPARATOR) {
        name.to_string()
    } else {
        format!("{QUOTE}{name}{QUOTE}")
    }
}

/// Removes one pair of surrounding quotes, if present.
pub fn unquote_name(name: &str) -> &str {
    if is_quoted(name) {
        &name[1..name.len() - 1]
    } else {
        name
    }
}

fn is_quoted(name: &str) -> bool {
    name.len() >= 2 && name.starts_with(QUOTE) && name.ends_with(QUOTE)
}

/// Appends `name` to `prefix`. An empty prefix yields the quoted name alone.
pub fn add(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        quote_name(name)
    } else {
        format!("{prefix}{SEPARATOR}{}", quote_name(name))
    }
}

/// Joins unquoted parts into an FQN, quoting where needed.
pub fn build<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| quote_name(p.as_ref()))
        .collect::<Vec<_>>()
        .join(".")
}

/// Splits an FQN into its unquoted parts. Separators inside quotes are kept.
pub fn split(fqn: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in fqn.chars() {
        match c {
            QUOTE => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            SEPARATOR if !in_quotes => {
                parts.push(unquote_name(&current).to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() || !parts.is_empty() {
        parts.push(unquote_name(&current).to_string());
    }
    parts
}

/// The FQN without its last part, or `None` for a single-part name.
pub fn parent(fqn: &str) -> Option<String> {
    let parts = split(fqn);
    match parts.split_last() {
        Some((_, rest)) if !rest.is_empty() => Some(build(rest)),
        _ => None,
    }
}

/// Strips `prefix.` from `fqn`, giving the path local to the prefix.
pub fn local_name<'a>(prefix: &str, fqn: &'a str) -> Option<&'a str> {
    fqn.strip_prefix(prefix)?.strip_prefix(SEPARATOR)
}
