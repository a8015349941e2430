//! `Key: value` metadata at the top of Markdown sources.
//!
//! ```text
//! Title: Release notes
//! Tags: rust
//!     wiki
//! Theme: slides
//!
//! # Body starts here
//! ```
//!
//! Keys are lowercased. An indented line continues the previous key, and
//! the first blank line ends the block. A leading `---` line is allowed.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    entries: BTreeMap<String, Vec<String>>,
}

impl Metadata {
    /// Split a source into its metadata and the remaining body.
    ///
    /// Text without a metadata block comes back unchanged.
    pub fn parse(text: &str) -> (Metadata, &str) {
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut last_key: Option<String> = None;

        let mut rest = text;
        let (first, after_first) = split_line(rest);
        let fenced = first == "---";
        if fenced {
            rest = after_first;
        }

        loop {
            let (line, next) = split_line(rest);
            if line.trim().is_empty() {
                rest = next;
                break;
            }
            if fenced && (line == "---" || line == "...") {
                rest = next;
                break;
            }
            if let Some((key, value)) = key_line(line) {
                entries
                    .entry(key.clone())
                    .or_default()
                    .push(value.trim().to_string());
                last_key = Some(key);
                rest = next;
                continue;
            }
            if line.starts_with("    ")
                && let Some(key) = &last_key
            {
                entries
                    .entry(key.clone())
                    .or_default()
                    .push(line.trim().to_string());
                rest = next;
                continue;
            }
            break;
        }

        if entries.is_empty() {
            return (Metadata::default(), text);
        }
        (Metadata { entries }, rest)
    }

    /// All values of a key joined with spaces
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|values| values.join(" "))
    }

    /// Every key with its raw list of values
    pub fn lists(&self) -> &BTreeMap<String, Vec<String>> {
        &self.entries
    }

    /// Every key with its values joined with spaces
    pub fn joined(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(key, values)| (key.clone(), values.join(" ")))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn split_line(text: &str) -> (&str, &str) {
    let (line, rest) = match text.find('\n') {
        Some(i) => (&text[..i], &text[i + 1..]),
        None => (text, ""),
    };
    (line.trim_end_matches('\r'), rest)
}

/// `Key: value` with at most three leading spaces and a space after the colon
fn key_line(line: &str) -> Option<(String, &str)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }

    let (key, value) = trimmed.split_once(':')?;
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return None;
    }
    // keeps `http://...` lines out of the block
    if !(value.is_empty() || value.starts_with(char::is_whitespace)) {
        return None;
    }

    Some((key.to_lowercase(), value))
}
