//! Language configuration error types

use thiserror::Error;

/// Errors raised while building engines or deciding an edit
#[derive(Debug, Error)]
pub enum LanguageConfigError {
    /// A generated bracket pattern failed to compile
    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A configured rule pattern failed to compile
    #[error("Invalid rule pattern `{pattern}`: {source}")]
    InvalidRulePattern {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },

    /// A bracket pair with an empty open or close string
    #[error("Empty delimiter in pair ({open:?}, {close:?})")]
    EmptyDelimiter { open: String, close: String },

    /// Host passed an offset past the end of the document
    #[error("Offset {offset} out of bounds for document of length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// Host passed an offset inside a UTF-8 sequence
    #[error("Offset {0} is not on a character boundary")]
    NotCharBoundary(usize),

    /// Tab width must be positive
    #[error("Invalid tab width: {0}")]
    InvalidTabWidth(usize),

    /// Malformed `language-configuration.json`
    #[error("Malformed language configuration: {0}")]
    Json(#[from] json5::Error),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Language configuration result
pub type LanguageConfigResult<T> = Result<T, LanguageConfigError>;
