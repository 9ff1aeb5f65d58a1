//! # erblint_ast
//!
//! Source and tree types for ErbLint.
//!
//! This crate provides:
//! - [`SourceBuffer`]: one file's path and content with a line index
//! - [`Span`] / [`SourceRange`]: raw and validated byte ranges
//! - [`ParseTree`]: the position-preserving element/attribute/text tree
//!
//! ## Example
//!
//! ```rust
//! use erblint_ast::SourceBuffer;
//!
//! let buffer = SourceBuffer::new("app/views/index.html.erb", "<p>\n  <%= name %>\n</p>\n");
//! let range = buffer.range(6, 17).unwrap();
//!
//! assert_eq!(range.line(), 2);
//! assert_eq!(range.column(), 2);
//! ```

mod node;
mod source;
mod span;
pub mod visitor;

pub use node::{Node, NodeId, NodeKind, ParseTree};
pub use source::{RangeError, SourceBuffer};
pub use span::{Location, Position, SourceRange, Span};

pub use visitor::{VisitResult, Visitor};
