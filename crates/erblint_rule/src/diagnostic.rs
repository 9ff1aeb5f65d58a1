//! Offense and correction types.

use erblint_ast::SourceRange;
use serde::{Deserialize, Serialize};

/// Severity level for offenses.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - must be fixed.
    #[default]
    Error,
    /// Warning - should be reviewed.
    Warning,
    /// Info - informational message.
    Info,
}

impl Severity {
    /// Parses a severity name. `"off"` is not a severity.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A problem reported by a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offense {
    /// The rule that reported this offense.
    pub rule_id: String,

    /// Where the problem is, in the content the rule saw.
    pub range: SourceRange,

    pub message: String,

    /// Opaque data the reporting rule may need to correct the offense.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,

    pub severity: Severity,

    /// Set when a suppression directive covers this offense.
    pub disabled: bool,
}

impl Offense {
    /// Creates a new, active offense with [`Severity::Error`].
    pub fn new(rule_id: impl Into<String>, range: SourceRange, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            range,
            message: message.into(),
            context: None,
            severity: Severity::Error,
            disabled: false,
        }
    }

    /// Sets the severity level.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attaches correction context.
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// True unless a suppression directive disabled this offense.
    pub fn is_active(&self) -> bool {
        !self.disabled
    }

    /// Line of the offense start (1-indexed).
    pub fn line(&self) -> u32 {
        self.range.line()
    }
}

/// A single replacement of a range of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    /// The range to replace.
    pub range: SourceRange,

    /// The replacement text.
    pub replacement: String,
}

impl Correction {
    /// Creates a new correction.
    pub fn new(range: SourceRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Creates a correction that deletes a range.
    pub fn delete(range: SourceRange) -> Self {
        Self::new(range, String::new())
    }

    /// True when applying the correction leaves the content unchanged.
    pub fn is_noop(&self, content: &str) -> bool {
        content.get(self.range.begin()..self.range.end()) == Some(self.replacement.as_str())
    }
}
