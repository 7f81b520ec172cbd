// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resource file parser
//!
//! Reads named queries out of a plain SQL file:
//!
//! ```sql
//! -- name: active_users
//! SELECT id, email   -- primary contact
//! FROM users
//! WHERE active;
//!
//! -- name: one_liner
//! SELECT 1;
//! ```
//!
//! Each line is classified once and then run through two ordered rule
//! groups. The groups are not exclusive: a line may complete a one-line
//! query in the first group and still be appended to a pending multi-line
//! buffer by the second.
//!
//! Semicolons inside string literals end a statement.

use std::fs;
use std::path::Path;

use serde::ser::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{IngestError, IngestResult};

pub const EMPTY_PATH_MESSAGE: &str = "Path cannot be empty.";
pub const UNREADABLE_FILE_MESSAGE: &str = "File doesn't exist or you don't have read permission.";

const NAME_PREFIX: &str = "-- name:";
const COMMENT_PREFIX: &str = "--";

/// Named queries in insertion order
///
/// Names are stored trimmed and upper-cased. Inserting an existing name
/// replaces its text but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedQueries {
    entries: Vec<(String, String)>,
}

impl NamedQueries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key under which `name` is stored
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_uppercase()
    }

    /// Insert a query, returning the text it replaced
    pub fn insert(&mut self, name: &str, sql: impl Into<String>) -> Option<String> {
        let key = Self::normalize_name(name);
        let sql = sql.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, text)) => Some(std::mem::replace(text, sql)),
            None => {
                self.entries.push((key, sql));
                None
            }
        }
    }

    /// Text of a query by its stored name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, sql)| sql.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge another mapping into this one, later entries winning
    pub fn merge(&mut self, other: NamedQueries) {
        for (name, sql) in other.entries {
            self.insert(&name, sql);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for NamedQueries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// How one line of a resource file reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineClass<'a> {
    /// Label of a `-- name:` line
    label: Option<&'a str>,
    /// Any line starting with `--`
    comment: bool,
    starts_query: bool,
    ends_query: bool,
}

impl<'a> LineClass<'a> {
    fn of(line: &'a str) -> Self {
        Self {
            label: line.strip_prefix(NAME_PREFIX).map(str::trim),
            comment: line.starts_with(COMMENT_PREFIX),
            starts_query: line.starts_with("SELECT") || line.starts_with("select"),
            ends_query: line.trim_end().ends_with(';'),
        }
    }
}

/// Line text up to an inline `--` comment
fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_PREFIX) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Parser state between lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParseState {
    /// No pending name, nothing buffered
    #[default]
    Idle,
    /// A name is pending, nothing buffered yet
    Naming(String),
    /// Lines are being collected; the name may have been consumed by a
    /// one-line query in the meantime
    Accumulating {
        name: Option<String>,
        lines: Vec<String>,
    },
}

impl ParseState {
    pub fn pending_name(&self) -> Option<&str> {
        match self {
            ParseState::Idle => None,
            ParseState::Naming(name) => Some(name),
            ParseState::Accumulating { name, .. } => name.as_deref(),
        }
    }

    pub fn is_accumulating(&self) -> bool {
        matches!(self, ParseState::Accumulating { .. })
    }

    /// Set the pending name, keeping any buffered lines
    fn set_name(&mut self, label: &str) {
        match self {
            ParseState::Accumulating { name, .. } => *name = Some(label.to_string()),
            _ => *self = ParseState::Naming(label.to_string()),
        }
    }

    /// Take the pending name, keeping any buffered lines
    fn take_name(&mut self) -> Option<String> {
        match std::mem::take(self) {
            ParseState::Idle => None,
            ParseState::Naming(name) => Some(name),
            ParseState::Accumulating { name, lines } => {
                *self = ParseState::Accumulating { name: None, lines };
                name
            }
        }
    }

    fn push(&mut self, piece: &str) {
        let piece = piece.trim().to_string();
        match self {
            ParseState::Accumulating { lines, .. } => lines.push(piece),
            _ => {
                let name = self.take_name();
                *self = ParseState::Accumulating {
                    name,
                    lines: vec![piece],
                };
            }
        }
    }

    /// Finish the buffered query, returning its name and joined text
    fn complete(&mut self) -> Option<(String, String)> {
        match std::mem::take(self) {
            ParseState::Accumulating {
                name: Some(name),
                lines,
            } => {
                let pieces: Vec<&str> = lines
                    .iter()
                    .map(String::as_str)
                    .filter(|p| !p.is_empty())
                    .collect();
                Some((name, pieces.join(" ")))
            }
            _ => None,
        }
    }
}

/// Line-by-line resource file parser
#[derive(Debug, Default)]
pub struct ResourceFileParser {
    state: ParseState,
    queries: NamedQueries,
}

impl ResourceFileParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    /// Feed one line, without its line terminator
    ///
    /// A one-line query only counts when a name line precedes it. Without
    /// one it is dropped, not stored under a placeholder name, and the
    /// parser stays idle.
    pub fn feed_line(&mut self, line: &str) {
        let class = LineClass::of(line);

        if let Some(label) = class.label {
            self.state.set_name(label);
        } else if class.comment {
            return;
        } else if class.starts_query && class.ends_query {
            match self.state.take_name() {
                Some(name) => self.store(&name, line.trim()),
                None => debug!(line, "Skipping one-line query without a name"),
            }
        }

        if class.starts_query && self.state.pending_name().is_some() {
            self.state.push(strip_comment(line));
        } else if class.ends_query && self.state.pending_name().is_some() {
            self.state.push(strip_comment(line));
            if let Some((name, sql)) = self.state.complete() {
                self.store(&name, &sql);
            }
        } else if self.state.is_accumulating() {
            self.state.push(strip_comment(line));
        }
    }

    fn store(&mut self, name: &str, sql: &str) {
        if self.queries.insert(name, sql).is_some() {
            debug!(name, "Query name redefined, keeping the later one");
        }
    }

    /// Queries collected so far; an unterminated trailing query is dropped
    pub fn finish(self) -> NamedQueries {
        if self.state.is_accumulating() {
            warn!("Resource file ends inside a query; ignoring it");
        }
        self.queries
    }
}

/// Parse resource file text
pub fn parse_resource_content(content: &str) -> NamedQueries {
    let mut parser = ResourceFileParser::new();
    for line in content.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Read and parse a resource file
///
/// # Errors
///
/// Returns `IngestError::Validation` for an empty path and `IngestError::Io`
/// when the file cannot be read as UTF-8 text.
pub fn parse_resource_file(path: impl AsRef<Path>) -> IngestResult<NamedQueries> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(IngestError::Validation(EMPTY_PATH_MESSAGE.to_string()));
    }

    let content = fs::read_to_string(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Cannot read resource file");
        IngestError::Io {
            path: path.display().to_string(),
            message: UNREADABLE_FILE_MESSAGE.to_string(),
        }
    })?;

    let queries = parse_resource_content(&content);
    debug!(path = %path.display(), count = queries.len(), "Parsed resource file");
    Ok(queries)
}
