//! Parse error types.

use thiserror::Error;

/// Errors that can occur while parsing a template.
///
/// A parse error is terminal for the current attempt; callers surface it as a
/// single offense for the file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An ERB tag was opened but input ended before its closing delimiter.
    #[error("Unclosed ERB tag starting at byte {offset}")]
    UnclosedTag {
        /// Byte offset of the opening `<%`.
        offset: usize,
    },

    /// A quote inside markup was never closed.
    #[error("Unclosed string: {quote} opened at byte {offset} is never closed")]
    UnclosedString {
        /// Byte offset of the opening quote.
        offset: usize,
        /// The quote character.
        quote: char,
    },

    /// The markup parser produced a tree that cannot be trusted.
    #[error("Invalid tree: {reason}")]
    InvalidTree {
        /// Why the tree was rejected.
        reason: String,
    },
}

impl ParseError {
    /// Creates a new unclosed tag error.
    pub fn unclosed_tag(offset: usize) -> Self {
        Self::UnclosedTag { offset }
    }

    /// Creates a new unclosed string error.
    pub fn unclosed_string(offset: usize, quote: char) -> Self {
        Self::UnclosedString { offset, quote }
    }

    /// Creates a new invalid tree error.
    pub fn invalid_tree(reason: impl Into<String>) -> Self {
        Self::InvalidTree {
            reason: reason.into(),
        }
    }

    /// Byte offset the error points at, when it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnclosedTag { offset } | Self::UnclosedString { offset, .. } => Some(*offset),
            Self::InvalidTree { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ParseError::unclosed_tag(3).to_string(),
            "Unclosed ERB tag starting at byte 3"
        );
        assert_eq!(
            ParseError::unclosed_string(7, '"').to_string(),
            "Unclosed string: \" opened at byte 7 is never closed"
        );
        assert_eq!(
            ParseError::invalid_tree("empty").to_string(),
            "Invalid tree: empty"
        );
    }

    #[test]
    fn test_offset() {
        assert_eq!(ParseError::unclosed_tag(3).offset(), Some(3));
        assert_eq!(ParseError::invalid_tree("x").offset(), None);
    }
}
