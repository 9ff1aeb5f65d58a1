//! # erblint_parser
//!
//! ERB-aware markup parsing for ErbLint.
//!
//! This crate provides:
//! - A `Parser` trait shared by both parsing modes
//! - [`EscapeRestoreParser`]: keeps ERB tags visible as text nodes
//! - [`StripBalanceParser`]: blanks ERB tags and checks quote balance
//! - [`ProcessedSource`]: a buffer, its tree and its tags, handed to rules
//!
//! ## Architecture
//!
//! Both modes scan ERB tags first, hide them from a lenient HTML fragment
//! parser, and return a tree whose spans address the original content.
//!
//! ## Example
//!
//! ```rust
//! use erblint_ast::SourceBuffer;
//! use erblint_parser::{EscapeRestoreParser, ProcessedSource};
//!
//! let buffer = SourceBuffer::new("index.html.erb", "<p><%= name %></p>");
//! let source = ProcessedSource::parse(buffer, &EscapeRestoreParser::new()).unwrap();
//!
//! let p = source.tree().get(source.tree().roots()[0]);
//! assert_eq!(p.name(), Some("p"));
//! assert_eq!(source.erb_tags().len(), 1);
//! ```

mod entities;
mod error;
mod escape;
mod markup;
mod processed;
pub mod scanner;
pub mod session;
mod strip;
mod traits;

pub use error::ParseError;
pub use escape::EscapeRestoreParser;
pub use processed::ProcessedSource;
pub use scanner::{ErbTag, Indicator, TagScan, scan_tags};
pub use session::{FixedToken, OsTokenSource, SessionToken, TokenSource};
pub use strip::StripBalanceParser;
pub use traits::{Parser, ParserMode};
