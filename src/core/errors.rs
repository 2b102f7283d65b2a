//! Error types for the RQL builder
//!
//! This module defines the errors that can abort a compile. Every error is
//! fatal for the call that raised it: the builder never returns a partial
//! query.

use thiserror::Error;

/// Errors that can occur while compiling a tree
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid sort direction for '{field}': {direction} (expected asc, desc, 1 or -1)")]
    InvalidSortDirection {
        field: String,
        direction: String,
    },

    #[error("Malformed tree: {0}")]
    MalformedTree(String),

    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Shorthand for a malformed tree error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        BuildError::MalformedTree(message.into())
    }
}

/// Result type for builder operations
pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BuildError::InvalidSortDirection {
            field: "name".to_string(),
            direction: "\"up\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid sort direction for 'name': \"up\" (expected asc, desc, 1 or -1)"
        );

        let err = BuildError::malformed("OPERATOR without a KEY");
        assert_eq!(err.to_string(), "Malformed tree: OPERATOR without a KEY");
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BuildError = parse_err.into();
        assert!(matches!(err, BuildError::Serialization(_)));
    }
}
