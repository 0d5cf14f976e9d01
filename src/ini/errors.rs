use thiserror::Error;

#[derive(Error, Debug)]
pub enum IniError {
    #[error("line {line}: expected a section header, property or comment: {content}")]
    InvalidLine { line: usize, content: String },

    #[error("line {line}: invalid section header: {message}")]
    InvalidHeader { line: usize, message: String },

    #[error("invalid section name {name:?}: {message}")]
    InvalidSectionName { name: String, message: String },

    #[error("{field} must be a single line: {text:?}")]
    LineBreak { field: &'static str, text: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
