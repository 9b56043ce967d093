//! Error type for MAT-file reading and writing

use mat5_core::{ErrorCategory, MatError};
use std::borrow::Cow;
use std::fmt;

/// Errors raised by the codec
#[derive(Debug)]
pub enum Error {
    /// The input is not a well-formed MAT-file
    Format(Cow<'static, str>),
    /// The caller asked for something the format or array cannot do
    Argument(Cow<'static, str>),
    /// A buffer of the requested size cannot be provided
    Capacity(Cow<'static, str>),
    /// Buffer provider I/O failure
    Io(std::io::Error),
    /// Error raised by the format definitions
    Core(MatError),
}

impl Error {
    /// Format error with a message
    pub fn format(msg: impl Into<Cow<'static, str>>) -> Self {
        Error::Format(msg.into())
    }

    /// Argument error with a message
    pub fn argument(msg: impl Into<Cow<'static, str>>) -> Self {
        Error::Argument(msg.into())
    }

    /// Capacity error with a message
    pub fn capacity(msg: impl Into<Cow<'static, str>>) -> Self {
        Error::Capacity(msg.into())
    }

    /// Category of this error; I/O failures count as format problems
    /// of the source
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Format(_) | Error::Io(_) => ErrorCategory::Format,
            Error::Argument(_) => ErrorCategory::Argument,
            Error::Capacity(_) => ErrorCategory::Capacity,
            Error::Core(e) => e.category(),
        }
    }

    /// Whether the caller misused the API
    pub fn is_argument(&self) -> bool {
        self.category() == ErrorCategory::Argument
    }

    /// Whether the input was malformed
    pub fn is_format(&self) -> bool {
        self.category() == ErrorCategory::Format
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(msg) => write!(f, "Format error: {msg}"),
            Error::Argument(msg) => write!(f, "Argument error: {msg}"),
            Error::Capacity(msg) => write!(f, "Capacity error: {msg}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Core(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MatError> for Error {
    fn from(e: MatError) -> Self {
        Error::Core(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;
