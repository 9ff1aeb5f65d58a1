//! Rule error types.

use thiserror::Error;

/// Errors raised while building the rule registry.
///
/// These are configuration errors and abort the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Rule options do not match the rule's schema or config type.
    #[error("Invalid configuration for rule '{rule}': {message}")]
    InvalidConfig { rule: String, message: String },

    /// The configuration names a rule nobody registered.
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    /// Every rule is disabled.
    #[error("No rules enabled")]
    NoRulesEnabled,
}

impl RuleError {
    /// Creates an invalid config error.
    pub fn invalid_config(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown rule error.
    pub fn unknown_rule(name: impl Into<String>) -> Self {
        Self::UnknownRule(name.into())
    }
}
