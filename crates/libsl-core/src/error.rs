//! Error types for the LibSL front end
//!
//! All fallible operations return `Result<T, Error>`.
//! Every error is terminal for the call that produced it: no partial IR
//! is ever returned alongside an error.

use thiserror::Error;

/// LibSL front-end error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed token or grammar structure; the message carries `line:column`
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Function without an explicit entity and without a `@handle` argument
    #[error("No @handle argument in function {function}")]
    MissingHandle { function: String },

    /// Function without an explicit entity and with several `@handle` arguments
    #[error("Ambiguous @handle arguments in function {function}: found {count}")]
    AmbiguousHandle { function: String, count: usize },

    /// Operator token with no comparison/arithmetic meaning
    #[error("Unknown operator '{0}'")]
    UnknownOperator(String),

    /// Code-type lookup for a semantic type absent from the type table
    #[error("No type declaration for semantic type '{0}'")]
    MissingTypeDecl(String),

    /// Complex type whose enclosing type has no conversion rule
    #[error("No conversion rule for enclosing type '{0}'")]
    MissingConversionRule(String),

    /// Source bytes are not valid UTF-8
    #[error("Invalid UTF-8 in source: {0}")]
    InvalidUtf8(String),

    /// Failure reading a source stream
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type alias for LibSL operations
pub type Result<T> = std::result::Result<T, Error>;
