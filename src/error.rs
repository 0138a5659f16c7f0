//! Error types for the motivation-board library.
//!
//! This module provides custom error types using `thiserror` so callers can
//! tell a rejected action apart from a storage failure.

use thiserror::Error;

/// Errors that can occur in the motivation-board application.
#[derive(Error, Debug)]
pub enum BoardError {
    /// The submitted word was empty after trimming
    #[error("Word cannot be empty")]
    EmptyWord,

    /// The submitted word contains control characters
    #[error("Word contains invalid characters: {0}")]
    InvalidWord(String),

    /// The submitted word is longer than allowed
    #[error("Word too long (max {max} characters)")]
    WordTooLong {
        /// Configured maximum length in characters
        max: usize,
    },

    /// A word must carry at least one template
    #[error("At least one sentence template is required")]
    NoTemplates,

    /// A template was empty after trimming
    #[error("Template text cannot be empty")]
    EmptyTemplate,

    /// A template is longer than allowed
    #[error("Template too long (max {max} characters)")]
    TemplateTooLong {
        /// Configured maximum length in characters
        max: usize,
    },

    /// Two templates of the same word collapse to the same text
    #[error("Duplicate template: {0}")]
    DuplicateTemplate(String),

    /// A word with this key already exists in the registry
    #[error("Word already exists: {0}")]
    WordExists(String),

    /// The word is not in the registry
    #[error("Word not found: {0}")]
    WordNotFound(String),

    /// Contributor display name was rejected
    #[error("Invalid contributor name: {0}")]
    InvalidContributor(String),

    /// Backend read or write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A built-in pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl BoardError {
    /// True for errors that reject a user action and leave the stores untouched.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::EmptyWord
                | Self::InvalidWord(_)
                | Self::WordTooLong { .. }
                | Self::NoTemplates
                | Self::EmptyTemplate
                | Self::TemplateTooLong { .. }
                | Self::DuplicateTemplate(_)
                | Self::WordExists(_)
                | Self::WordNotFound(_)
                | Self::InvalidContributor(_)
        )
    }
}

/// Convenience type alias for Result with `BoardError`
pub type Result<T> = std::result::Result<T, BoardError>;

impl From<sled::Error> for BoardError {
    fn from(err: sled::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for BoardError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::Storage(format!("stored value is not valid UTF-8: {err}"))
    }
}
