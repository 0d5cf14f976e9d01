use crate::query::errors::QueryError;
use regex::Regex;
use std::fmt;

/// A literal string or a regular expression, compared against candidate
/// section names, keys, values and comment text.
#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    pub fn regex(source: &str) -> Result<Self, QueryError> {
        Regex::new(source)
            .map(Pattern::Regex)
            .map_err(|err| QueryError::InvalidPattern {
                pattern: source.to_string(),
                message: err.to_string(),
            })
    }

    /// Build a regex pattern when `as_regex` is set, a literal otherwise.
    pub fn parse(source: &str, as_regex: bool) -> Result<Self, QueryError> {
        if as_regex {
            Self::regex(source)
        } else {
            Ok(Self::literal(source))
        }
    }

    /// Literal: exact equality. Regex: unanchored search.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Pattern::Literal(text) => text == candidate,
            Pattern::Regex(regex) => regex.is_match(candidate),
        }
    }

    /// Compare two patterns. A literal on either side is matched against
    /// the other pattern; two regexes never match each other.
    pub fn matches_pattern(&self, other: &Pattern) -> bool {
        match (self, other) {
            (Pattern::Regex(_), Pattern::Regex(_)) => false,
            (pattern, Pattern::Literal(text)) | (Pattern::Literal(text), pattern) => {
                pattern.matches(text)
            }
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Pattern::Regex(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Literal(text) => text,
            Pattern::Regex(regex) => regex.as_str(),
        }
    }

    pub(crate) fn trimmed(self) -> Self {
        match self {
            Pattern::Literal(text) => Pattern::Literal(text.trim().to_string()),
            regex => regex,
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.is_regex() == other.is_regex() && self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(text) => write!(f, "{text}"),
            Pattern::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Pattern::literal(text)
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Pattern::Literal(text)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern::Regex(regex)
    }
}
