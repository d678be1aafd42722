//! Feed Error Types
//!
//! The bucketing and normalization operations are total; these errors cover
//! the host side: reading input, parsing records and dates, and configuration.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record on line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    #[error("Invalid date '{input}': {message}")]
    InvalidDate { input: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Cannot serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FeedError {
    pub fn configuration(message: impl Into<String>) -> Self {
        FeedError::Configuration {
            message: message.into(),
        }
    }
}

impl crate::core::error_handling::ContextualError for FeedError {
    fn is_user_actionable(&self) -> bool {
        match self {
            FeedError::MalformedRecord { .. } => true, // User can fix the input file
            FeedError::InvalidDate { .. } => true,
            FeedError::Configuration { .. } => true,
            FeedError::Io { .. } => false, // System IO issues
            FeedError::Serialization(_) => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            FeedError::MalformedRecord { message, .. } => Some(message),
            FeedError::InvalidDate { message, .. } => Some(message),
            FeedError::Configuration { message } => Some(message),
            FeedError::Io { .. } | FeedError::Serialization(_) => None,
        }
    }
}

/// Result type for feed host operations
pub type FeedResult<T> = Result<T, FeedError>;
