//! A parsed template, ready for rules.

use std::path::Path;

use erblint_ast::{NodeId, ParseTree, RangeError, SourceBuffer, SourceRange};
use tracing::warn;

use crate::scanner::{ErbTag, scan_tags};
use crate::{ParseError, Parser, ParserMode};

/// One source buffer together with its parse tree and ERB tags.
///
/// Created once per parse attempt and never mutated; a corrected file is
/// parsed into a new `ProcessedSource`.
#[derive(Debug)]
pub struct ProcessedSource {
    buffer: SourceBuffer,
    tree: ParseTree,
    tags: Vec<ErbTag>,
    mode: ParserMode,
}

impl ProcessedSource {
    /// Parses `buffer` with `parser`.
    pub fn parse(buffer: SourceBuffer, parser: &dyn Parser) -> Result<Self, ParseError> {
        let tree = parser.parse(buffer.content())?;
        let tags = scan_tags(buffer.content())?.tags;
        Ok(Self {
            buffer,
            tree,
            tags,
            mode: parser.mode(),
        })
    }

    pub fn buffer(&self) -> &SourceBuffer {
        &self.buffer
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }

    /// ERB tags in source order.
    pub fn erb_tags(&self) -> &[ErbTag] {
        &self.tags
    }

    pub fn content(&self) -> &str {
        self.buffer.content()
    }

    pub fn path(&self) -> &Path {
        self.buffer.path()
    }

    pub fn mode(&self) -> ParserMode {
        self.mode
    }

    /// Builds a range, clamping it into the content when it does not fit.
    ///
    /// A clamped range means a rule computed bad offsets; it is logged.
    pub fn to_range(&self, begin: usize, end: usize) -> SourceRange {
        match self.buffer.range(begin, end) {
            Ok(range) => range,
            Err(e) => {
                warn!("Clamping range in {}: {}", self.path().display(), e);
                self.buffer.clamped_range(begin, end)
            }
        }
    }

    /// Builds a range, failing when it does not address the content.
    pub fn try_range(&self, begin: usize, end: usize) -> Result<SourceRange, RangeError> {
        self.buffer.range(begin, end)
    }

    /// The range covered by a node of the tree.
    pub fn node_range(&self, id: NodeId) -> SourceRange {
        let span = self.tree.get(id).span;
        self.to_range(span.start as usize, span.end as usize)
    }

    /// The range covered by an ERB tag.
    pub fn tag_range(&self, tag: &ErbTag) -> SourceRange {
        self.to_range(tag.span.start as usize, tag.span.end as usize)
    }

    /// True when the template has no content besides the sentinel.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EscapeRestoreParser, StripBalanceParser};
    use erblint_ast::Span;
    use pretty_assertions::assert_eq;

    fn processed(content: &str) -> ProcessedSource {
        let buffer = SourceBuffer::new("views/show.html.erb", content);
        ProcessedSource::parse(buffer, &EscapeRestoreParser::new()).unwrap()
    }

    #[test]
    fn test_parse_exposes_buffer_tree_and_tags() {
        let source = processed("<p>\n  <%= title %>\n</p>\n");
        assert_eq!(source.path(), Path::new("views/show.html.erb"));
        assert_eq!(source.mode(), ParserMode::EscapeRestore);
        assert_eq!(source.erb_tags().len(), 1);

        let range = source.tag_range(&source.erb_tags()[0]);
        assert_eq!(range.line(), 2);
        assert_eq!(range.column(), 2);

        let p = source.tree().roots()[0];
        assert_eq!(source.node_range(p).span(), Span::new(0, 23));
    }

    #[test]
    fn test_is_empty() {
        assert!(processed("").is_empty());
        assert!(!processed("<% %>").is_empty());
    }

    #[test]
    fn test_to_range_clamps() {
        let source = processed("abc");
        assert_eq!(source.to_range(1, 10).span(), Span::new(1, 3));
        assert!(source.try_range(1, 10).is_err());
    }

    #[test]
    fn test_parse_error() {
        let buffer = SourceBuffer::new("a.html.erb", "<div class=\"x>");
        let err = ProcessedSource::parse(buffer, &StripBalanceParser::new()).unwrap_err();
        assert_eq!(err, ParseError::UnclosedString { offset: 11, quote: '"' });
    }
}
