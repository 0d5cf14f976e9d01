//! Turning command-line strings into queries and change sets.
//!
//! `key=value` arguments are split at the first unescaped `=`, with both
//! halves trimmed. A `-l KEY` argument without `=` takes its value from the
//! next input line, and `-l -` takes the whole `key=value` line from input.

use crate::operations::{Change, ChangeSet};
use crate::query::{Pattern, Query, QueryError, WherePair};
use std::io::BufRead;
use thiserror::Error;

pub const STDIN_MARKER: &str = "-";

#[derive(Error, Debug)]
pub enum ArgumentError {
    #[error("malformed key=value argument: '{input}'")]
    MalformedLine { input: String },

    #[error("end of input while reading a value for '{key}'")]
    UnexpectedEof { key: String },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of values for arguments that omit them.
pub trait LineSource {
    /// Next line without its line terminator, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>, std::io::Error>;
}

impl<R: BufRead> LineSource for R {
    fn next_line(&mut self) -> Result<Option<String>, std::io::Error> {
        let mut line = String::new();
        if self.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

/// Split at the first `=` not preceded by a backslash. The key is
/// unescaped with [`unescape_key`]; the value is trimmed.
pub fn split_key_value(input: &str) -> Option<(String, String)> {
    let mut chars = input.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' if matches!(chars.peek(), Some((_, '=' | '\\'))) => {
                chars.next();
            }
            '=' => {
                let value = input[idx + 1..].trim().to_string();
                return Some((unescape_key(&input[..idx]), value));
            }
            _ => {}
        }
    }

    None
}

/// Resolve `\=` and `\\` in a key argument and trim it.
pub fn unescape_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if matches!(chars.peek(), Some('=' | '\\')) => {
                if let Some(next) = chars.next() {
                    key.push(next);
                }
            }
            other => key.push(other),
        }
    }

    key.trim().to_string()
}

/// Reject arguments that would spill onto another line of the output.
pub fn single_line(input: &str) -> Result<&str, ArgumentError> {
    if input.contains(['\n', '\r']) {
        return Err(ArgumentError::MalformedLine {
            input: input.to_string(),
        });
    }
    Ok(input)
}

/// Resolve one `-l` argument into a key and value.
pub fn read_property(
    input: &str,
    source: &mut impl LineSource,
) -> Result<(String, String), ArgumentError> {
    if input == STDIN_MARKER {
        let line = source.next_line()?.ok_or_else(|| ArgumentError::UnexpectedEof {
            key: STDIN_MARKER.to_string(),
        })?;
        return split_key_value(&line).ok_or(ArgumentError::MalformedLine { input: line });
    }

    if let Some(pair) = split_key_value(input) {
        return Ok(pair);
    }

    let key = unescape_key(input);
    if key.is_empty() {
        return Err(ArgumentError::MalformedLine {
            input: input.to_string(),
        });
    }

    let value = source.next_line()?.ok_or_else(|| ArgumentError::UnexpectedEof {
        key: key.clone(),
    })?;
    Ok((key, value))
}

/// Build a property change set: `lines` become `Set`, `deletions` become
/// `Delete`. Deletions are applied last and win over a `Set` of the same key.
pub fn property_changes(
    lines: &[String],
    deletions: &[String],
    source: &mut impl LineSource,
) -> Result<ChangeSet, ArgumentError> {
    let mut changes = ChangeSet::new();
    for line in lines {
        let (key, value) = read_property(single_line(line)?, source)?;
        changes.insert(key, Change::Set(value));
    }
    for key in deletions {
        changes.insert(unescape_key(single_line(key)?), Change::Delete);
    }
    Ok(changes)
}

/// Build a comment change set from comments to add and to remove.
pub fn comment_changes(
    added: &[String],
    removed: &[String],
) -> Result<ChangeSet, ArgumentError> {
    let mut changes = ChangeSet::new();
    for text in added {
        changes.insert(single_line(text)?.trim(), Change::Set(String::new()));
    }
    for text in removed {
        changes.insert(single_line(text)?.trim(), Change::Delete);
    }
    Ok(changes)
}

/// Parse a `-n` criterion. A missing `=` or an empty side is a wildcard.
pub fn parse_where(input: &str, as_regex: bool) -> Result<WherePair, QueryError> {
    let (key, value) = match split_key_value(input) {
        Some((key, value)) => (key, value),
        None => (input.trim().to_string(), String::new()),
    };

    if key.is_empty() && value.is_empty() {
        return Err(QueryError::InvalidPair {
            input: input.to_string(),
            message: "both key and value are empty".to_string(),
        });
    }

    let slot = |text: String| -> Result<Option<Pattern>, QueryError> {
        if text.is_empty() {
            Ok(None)
        } else {
            Pattern::parse(&text, as_regex).map(Some)
        }
    };

    Ok((slot(key)?, slot(value)?))
}

/// Build a [`Query`] from raw criteria. Section names are always literal;
/// with `as_regex`, key/value and comment criteria are regular expressions.
///
/// Fails before anything is applied if a pattern does not compile.
pub fn build_query(
    sections: &[String],
    lines: &[String],
    comments: &[String],
    as_regex: bool,
) -> Result<Query, QueryError> {
    let sections = sections.iter().map(|name| Pattern::literal(name.as_str())).collect();
    let pairs = lines
        .iter()
        .map(|line| parse_where(line, as_regex))
        .collect::<Result<Vec<_>, _>>()?;
    let comments = comments
        .iter()
        .map(|text| Pattern::parse(text, as_regex))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Query::new(sections, pairs, comments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn no_input() -> Cursor<&'static [u8]> {
        Cursor::new(&b""[..])
    }

    #[test]
    fn split_trims_both_sides() {
        assert_eq!(
            split_key_value("B =string"),
            Some(("B".to_string(), "string".to_string()))
        );
        assert_eq!(
            split_key_value("Value = =Equals="),
            Some(("Value".to_string(), "=Equals=".to_string()))
        );
        assert_eq!(split_key_value("novalue"), None);
    }

    #[test]
    fn split_honours_escaped_equals() {
        assert_eq!(
            split_key_value("a\\=b = c"),
            Some(("a=b".to_string(), "c".to_string()))
        );
    }

    #[test]
    fn missing_value_reads_next_line() {
        let mut input = Cursor::new(&b"first\r\nsecond\n"[..]);
        assert_eq!(
            read_property("A", &mut input).unwrap(),
            ("A".to_string(), "first".to_string())
        );
        assert_eq!(
            read_property("B", &mut input).unwrap(),
            ("B".to_string(), "second".to_string())
        );
    }

    #[test]
    fn key_read_from_next_line_is_unescaped() {
        let mut input = Cursor::new(&b"1\n"[..]);
        assert_eq!(
            read_property("a\\=b", &mut input).unwrap(),
            ("a=b".to_string(), "1".to_string())
        );
        assert_eq!(
            split_key_value("a\\=b=1"),
            Some(("a=b".to_string(), "1".to_string()))
        );

        let mut input = Cursor::new(&b"2\n"[..]);
        assert_eq!(
            read_property("back\\\\slash", &mut input).unwrap(),
            ("back\\slash".to_string(), "2".to_string())
        );
    }

    #[test]
    fn line_breaks_are_malformed() {
        let err = property_changes(&["K=v\n[Evil]".to_string()], &[], &mut no_input()).unwrap_err();
        assert!(matches!(err, ArgumentError::MalformedLine { .. }));

        let err = property_changes(&[], &["K\r".to_string()], &mut no_input()).unwrap_err();
        assert!(matches!(err, ArgumentError::MalformedLine { .. }));

        let err = comment_changes(&["one\ntwo".to_string()], &[]).unwrap_err();
        assert!(matches!(err, ArgumentError::MalformedLine { .. }));

        let err = comment_changes(&[], &["one\rtwo".to_string()]).unwrap_err();
        assert!(matches!(err, ArgumentError::MalformedLine { .. }));

        assert_eq!(single_line("fine").unwrap(), "fine");
    }

    #[test]
    fn dash_reads_whole_pair() {
        let mut input = Cursor::new(&b"K = V\n"[..]);
        assert_eq!(
            read_property("-", &mut input).unwrap(),
            ("K".to_string(), "V".to_string())
        );
    }

    #[test]
    fn end_of_input_is_fatal() {
        let err = read_property("A", &mut no_input()).unwrap_err();
        assert!(matches!(err, ArgumentError::UnexpectedEof { .. }));

        let mut input = Cursor::new(&b"no equals\n"[..]);
        let err = read_property("-", &mut input).unwrap_err();
        assert!(matches!(err, ArgumentError::MalformedLine { .. }));
    }

    #[test]
    fn deletions_win() {
        let changes = property_changes(
            &["A=1".to_string(), "B=2".to_string()],
            &["A".to_string()],
            &mut no_input(),
        )
        .unwrap();
        assert_eq!(changes.get("A"), Some(&Change::Delete));
        assert_eq!(changes.get("B"), Some(&Change::Set("2".to_string())));
    }

    #[test]
    fn where_wildcards() {
        let (key, value) = parse_where("A", false).unwrap();
        assert_eq!(key, Some(Pattern::literal("A")));
        assert_eq!(value, None);

        let (key, value) = parse_where("=1", false).unwrap();
        assert_eq!(key, None);
        assert_eq!(value, Some(Pattern::literal("1")));

        assert!(parse_where("=", false).is_err());
    }

    #[test]
    fn bad_regex_fails_query_construction() {
        let err = build_query(&[], &["A=(".to_string()], &[], true).unwrap_err();
        assert!(matches!(err, QueryError::InvalidPattern { .. }));
    }

    #[test]
    fn sections_stay_literal_with_regex() {
        let query = build_query(&["a.b".to_string()], &[], &["^x".to_string()], true).unwrap();
        assert!(!query.section_patterns()[0].is_regex());
        assert!(query.comment_patterns()[0].is_regex());
    }
}
