//! Error types for context extraction
//!
//! Only two failure kinds exist. Lines that match no rule are not errors.

use thiserror::Error;

/// Errors surfaced by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The input handed to the classifier is not text
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A block comment opener with no closing `*/`
    ///
    /// Only returned when `ParseOptions::strict_comments` is set; the default
    /// behavior skips the line and keeps scanning.
    #[error("unterminated block comment opened on line {line}")]
    MalformedComment { line: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_argument() {
        let err = ContextError::InvalidArgument("expected UTF-8 text".to_string());
        assert_eq!(err.to_string(), "invalid argument: expected UTF-8 text");
    }

    #[test]
    fn test_display_malformed_comment() {
        let err = ContextError::MalformedComment { line: 12 };
        assert_eq!(
            err.to_string(),
            "unterminated block comment opened on line 12"
        );
    }
}
