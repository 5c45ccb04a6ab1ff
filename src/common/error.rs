use std::fmt;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type.
///
/// `Internal` is reserved for violations of the buffer pool / B+Tree
/// invariants described in the design docs; callers should treat it as a
/// programming error rather than something to recover from.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidInput(String),
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::Internal(msg) => write!(f, "internal error: {msg}"),
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

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for Error {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        Error::Internal(format!("(de)serialization failure: {e}"))
    }
}

/// Formats a message into an `Error::InvalidInput`.
///
/// Shorthand for the common "bail out with a formatted message" case, used
/// as `Err(errinput!("..."))`.
#[macro_export]
macro_rules! errinput {
    ($($args:tt)*) => {
        $crate::common::Error::InvalidInput(format!($($args)*))
    };
}
