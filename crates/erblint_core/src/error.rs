//! Linter error types.

use thiserror::Error;

/// Errors that can occur during linting.
#[derive(Debug, Error)]
pub enum LinterError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error.
    #[error("File error: {0}")]
    File(String),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(#[from] erblint_cache::CacheError),

    /// Rule registry error.
    #[error("Rule error: {0}")]
    Rule(#[from] erblint_rule::RuleError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LinterError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a file error.
    pub fn file(message: impl Into<String>) -> Self {
        Self::File(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for errors that abort a whole run rather than one file.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Rule(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            LinterError::config("bad").to_string(),
            "Configuration error: bad"
        );
        assert_eq!(
            LinterError::file("missing").to_string(),
            "File error: missing"
        );
    }

    #[test]
    fn test_rule_error_is_config() {
        let error = LinterError::from(erblint_rule::RuleError::NoRulesEnabled);
        assert!(error.is_config());
        assert!(!LinterError::file("x").is_config());
    }
}
