//! Parser trait definition.

use std::sync::Arc;

use erblint_ast::ParseTree;
use serde::{Deserialize, Serialize};

use crate::session::TokenSource;
use crate::{EscapeRestoreParser, ParseError, StripBalanceParser};

/// Trait for parsing template content into a [`ParseTree`].
///
/// Every node of the returned tree addresses the content passed in, never
/// an intermediate text.
///
/// # Example
///
/// ```rust
/// use erblint_parser::{Parser, ParserMode, StripBalanceParser};
///
/// let parser = StripBalanceParser::new();
/// let tree = parser.parse("<p><%= name %></p>").unwrap();
///
/// assert_eq!(parser.mode(), ParserMode::StripBalance);
/// assert_eq!(tree.roots().len(), 1);
/// ```
pub trait Parser: Send + Sync {
    /// Returns the mode this parser implements.
    fn mode(&self) -> ParserMode;

    /// Parses the content into a tree.
    fn parse(&self, content: &str) -> Result<ParseTree, ParseError>;

    /// Returns the name of this parser.
    fn name(&self) -> &'static str {
        self.mode().name()
    }
}

/// How ERB tags are hidden from the markup parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParserMode {
    /// Tags are escaped and restored; they stay visible as text.
    #[default]
    EscapeRestore,
    /// Tags are blanked out; quote balance is checked across the markup.
    StripBalance,
}

impl ParserMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::EscapeRestore => "escape-restore",
            Self::StripBalance => "strip-balance",
        }
    }

    /// Builds the parser for this mode.
    pub fn parser(self, tokens: Arc<dyn TokenSource>) -> Box<dyn Parser> {
        match self {
            Self::EscapeRestore => Box::new(EscapeRestoreParser::with_token_source(tokens)),
            Self::StripBalance => Box::new(StripBalanceParser::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::OsTokenSource;

    #[test]
    fn test_mode_builds_matching_parser() {
        for mode in [ParserMode::EscapeRestore, ParserMode::StripBalance] {
            let parser = mode.parser(Arc::new(OsTokenSource));
            assert_eq!(parser.mode(), mode);
            assert_eq!(parser.name(), mode.name());
        }
    }

    #[test]
    fn test_mode_serde() {
        let mode: ParserMode = serde_json::from_str("\"strip-balance\"").unwrap();
        assert_eq!(mode, ParserMode::StripBalance);
        assert_eq!(
            serde_json::to_string(&ParserMode::EscapeRestore).unwrap(),
            "\"escape-restore\""
        );
    }
}
