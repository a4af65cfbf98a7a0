//! Boulder-IO: the line-oriented `TAG=VALUE` format used by `primer3_core`.
//!
//! A record is a run of `TAG=VALUE` lines terminated by a line holding a single `=`.

use std::fmt;
use thiserror::Error;

pub const RECORD_TERMINATOR: &str = "=";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum BoulderError {
    #[error("Line {line}: expected TAG=VALUE, got '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("Line {line}: empty tag")]
    EmptyTag { line: usize },
}

/// One Boulder-IO record, preserving tag order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoulderRecord {
    entries: Vec<(String, String)>,
}

impl BoulderRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: impl Into<String>, value: impl fmt::Display) {
        self.entries.push((tag.into(), value.to_string()));
    }

    /// Last value recorded for `tag`.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }
}

impl fmt::Display for BoulderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, value) in self.iter() {
            writeln!(f, "{tag}={value}")?;
        }
        writeln!(f, "{RECORD_TERMINATOR}")
    }
}

/// Parses every record in `text`. Trailing lines without a terminator form a final record.
pub fn parse_records(text: &str) -> Result<Vec<BoulderRecord>, BoulderError> {
    let mut records = Vec::new();
    let mut current = BoulderRecord::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if line == RECORD_TERMINATOR {
            records.push(std::mem::take(&mut current));
            continue;
        }
        let Some((tag, value)) = line.split_once('=') else {
            return Err(BoulderError::MalformedLine {
                line: idx + 1,
                content: line.to_string(),
            });
        };
        if tag.is_empty() {
            return Err(BoulderError::EmptyTag { line: idx + 1 });
        }
        current.push(tag, value);
    }

    if !current.is_empty() {
        records.push(current);
    }
    Ok(records)
}
