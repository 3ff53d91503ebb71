//! Error types for path parsing and construction.

use thiserror::Error;

/// Errors that can occur while parsing or building a materialized path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Empty input provided.
    #[error("empty path")]
    Empty,

    /// The path does not start with the configured separator.
    #[error("path must start with separator '{separator}'")]
    MissingLeadingSeparator {
        /// The configured separator.
        separator: char,
    },

    /// A segment is empty or malformed at a specific byte position.
    #[error("invalid path segment at position {position}")]
    InvalidSegment {
        /// Byte offset in the input where the bad segment starts.
        position: usize,
    },

    /// A key or label contains the separator, which would make prefix tests ambiguous.
    #[error("segment '{segment}' contains the path separator '{separator}'")]
    SeparatorInSegment {
        /// The offending segment text.
        segment: String,
        /// The configured separator.
        separator: char,
    },
}

/// Result type for path operations.
pub type PathResult<T> = std::result::Result<T, PathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_separator_in_segment() {
        let err = PathError::SeparatorInSegment {
            segment: "a/b".to_string(),
            separator: '/',
        };
        assert_eq!(
            err.to_string(),
            "segment 'a/b' contains the path separator '/'"
        );
    }

    #[test]
    fn test_error_display_invalid_segment() {
        let err = PathError::InvalidSegment { position: 3 };
        assert_eq!(err.to_string(), "invalid path segment at position 3");
    }
}
