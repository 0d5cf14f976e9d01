use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("invalid key/value criterion '{input}': {message}")]
    InvalidPair { input: String, message: String },
}
