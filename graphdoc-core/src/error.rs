//! Error types for graphdoc-core

use crate::keypath::KeypathProblem;
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Construction source has an unknown or unbounded entry count
    #[error("size error: {0}")]
    Size(String),

    /// Structurally invalid value object or document element
    #[error("structure error: {0}")]
    Structure(String),

    /// Keypath grammar violation; the message is the problem text verbatim
    #[error(transparent)]
    Validation(#[from] KeypathProblem),
}

impl Error {
    /// Create a size error
    pub fn size(msg: impl Into<String>) -> Self {
        Error::Size(msg.into())
    }

    /// Create a structure error
    pub fn structure(msg: impl Into<String>) -> Self {
        Error::Structure(msg.into())
    }
}
