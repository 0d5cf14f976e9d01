use crate::editor::{EditorOptions, DEFAULT_COMMENT_PREFIX};
use serde::Deserialize;
use std::fmt;

/// Settings file contents. Every field is optional in the file.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Prefix for comments created by `add` and `modify`.
    pub comment_prefix: String,
    /// Treat key/value and comment criteria as regular expressions.
    pub regex: bool,
    /// Exit with a failure status when no section matched.
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
            regex: false,
            strict: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if !self.comment_prefix.starts_with('#') {
            issues.push(ValidationIssue::InvalidField {
                field: "comment_prefix",
                message: format!(
                    "'{}' must start with '#' to be read back as a comment",
                    self.comment_prefix
                ),
            });
        }

        if self.comment_prefix.contains(['\n', '\r']) {
            issues.push(ValidationIssue::InvalidField {
                field: "comment_prefix",
                message: "must not contain a line break".to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            comment_prefix: self.comment_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    InvalidField {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::InvalidField { field, message } => write!(f, "{field}: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}
