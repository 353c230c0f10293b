//! Front matter parsing.
//!
//! ```text
//! ---
//! title: Day 7
//! published: 2020-12-07
//! tags: aoc, haskell
//! ---
//! body...
//! ```
//!
//! The block opens with a first line of exactly `---` and closes with
//! `---` or `...`. Inside, every non-blank, non-`#` line is `key: value`.

use crate::core::BuildError;
use crate::utils::date::DateTimeUtc;

/// Ordered `key -> value` mapping read from a document header.
///
/// Keys are lowercase and unique. Insertion order is kept so templates
/// iterating metadata see it in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a new key. Returns `false` if the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // ------------------------------------------------------------------------
    // well-known keys
    // ------------------------------------------------------------------------

    pub fn title(&self) -> Option<&str> {
        self.get("title").filter(|t| !t.is_empty())
    }

    /// `published` as a date, `None` if absent or unparseable.
    pub fn published(&self) -> Option<DateTimeUtc> {
        self.get("published").and_then(DateTimeUtc::parse)
    }

    /// `last` (last updated) as a date.
    pub fn last(&self) -> Option<DateTimeUtc> {
        self.get("last").and_then(DateTimeUtc::parse)
    }

    /// `tags` split on commas and whitespace, duplicates dropped.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for tag in self
            .get("tags")
            .unwrap_or_default()
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Template overriding the first stage of the root's chain.
    pub fn template(&self) -> Option<&str> {
        self.get("template").filter(|t| !t.is_empty())
    }

    pub fn is_draft(&self) -> bool {
        self.get("draft")
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "yes")
    }
}

/// Split `content` into its metadata and body.
///
/// A document without a header block yields empty metadata and the whole
/// content as body.
pub fn split_front_matter(content: &str) -> Result<(Metadata, &str), BuildError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some(rest) = strip_delimiter_line(content, &["---"]) else {
        return Ok((Metadata::new(), content));
    };

    let mut meta = Metadata::new();
    let mut remaining = rest;
    // The opening delimiter is line 1.
    let mut line_no = 1;

    loop {
        line_no += 1;
        if remaining.is_empty() {
            return Err(BuildError::MalformedMetadata {
                line: 1,
                reason: "front matter block is never closed".into(),
            });
        }

        let (line, next) = match remaining.find('\n') {
            Some(pos) => (&remaining[..pos], &remaining[pos + 1..]),
            None => (remaining, ""),
        };
        remaining = next;

        let line = line.trim_end_matches('\r');
        if matches!(line.trim_end(), "---" | "...") {
            return Ok((meta, remaining));
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = parse_line(trimmed, line_no)?;
        if !meta.insert(key.clone(), value) {
            return Err(BuildError::MalformedMetadata {
                line: line_no,
                reason: format!("duplicate key `{key}`"),
            });
        }
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<(String, String), BuildError> {
    let Some((key, value)) = line.split_once(':') else {
        return Err(BuildError::MalformedMetadata {
            line: line_no,
            reason: format!("expected `key: value`, found `{line}`"),
        });
    };

    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(BuildError::MalformedMetadata {
            line: line_no,
            reason: format!("invalid key in `{line}`"),
        });
    }

    Ok((key.to_ascii_lowercase(), unquote(value.trim()).to_string()))
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// If the first line of `content` is one of `delimiters`, return the rest.
fn strip_delimiter_line<'a>(content: &'a str, delimiters: &[&str]) -> Option<&'a str> {
    let (first, rest) = match content.find('\n') {
        Some(pos) => (&content[..pos], &content[pos + 1..]),
        None => (content, ""),
    };
    let first = first.trim_end();
    delimiters.contains(&first).then_some(rest)
}
