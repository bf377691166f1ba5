//! CSV header parsing and normalization.

use std::collections::BTreeSet;

/// Strips a leading UTF-8 BOM. Surrounding whitespace is part of the
/// column name, as polars reads it.
pub fn normalize_header(value: &str) -> String {
    value
        .strip_prefix('\u{feff}')
        .unwrap_or(value)
        .to_string()
}

/// Parses a CSV line into fields, handling quoted values.
pub fn parse_csv_line(line: &str, separator: u8) -> Vec<String> {
    let separator = char::from(separator);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                // Check for escaped quote ("")
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            c if c == separator && !in_quotes => {
                fields.push(normalize_header(&current));
                current.clear();
            }
            _ => {
                current.push(c);
            }
        }
    }

    fields.push(normalize_header(&current));
    fields
}

/// Problems found in a header row that make the table unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderProblem {
    /// No non-empty column names at all.
    Blank,
    /// A column name is empty (position is zero-based).
    EmptyName(usize),
    /// A column name appears more than once.
    Duplicate(String),
}

/// Checks that column names are present and unique.
///
/// Names are compared exactly; `a` and `a ` are distinct columns.
pub fn check_header(columns: &[String]) -> Option<HeaderProblem> {
    if columns.iter().all(|name| name.trim().is_empty()) {
        return Some(HeaderProblem::Blank);
    }
    let mut seen = BTreeSet::new();
    for (idx, name) in columns.iter().enumerate() {
        if name.trim().is_empty() {
            return Some(HeaderProblem::EmptyName(idx));
        }
        if !seen.insert(name.as_str()) {
            return Some(HeaderProblem::Duplicate(name.clone()));
        }
    }
    None
}
