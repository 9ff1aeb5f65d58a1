//! Strip-and-balance parser.
//!
//! ERB tags are blanked out with whitespace of the same length, so the markup
//! parser works directly on source offsets and no mapping is needed. The
//! resulting tree describes pure markup; tag code is gone from its strings.

use erblint_ast::ParseTree;
use tracing::debug;

use crate::markup::{self, Identity};
use crate::scanner::{ErbTag, scan_tags};
use crate::{ParseError, Parser, ParserMode};

/// Parser that discards ERB code and checks quote balance over the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripBalanceParser;

impl StripBalanceParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for StripBalanceParser {
    fn mode(&self) -> ParserMode {
        ParserMode::StripBalance
    }

    fn parse(&self, content: &str) -> Result<ParseTree, ParseError> {
        let scan = scan_tags(content)?;
        let stripped = strip(content, &scan.tags)?;
        check_quote_balance(&stripped)?;

        let mut tree = markup::parse_fragment(&stripped, &Identity(&stripped));
        let lines = stripped.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
        tree.set_end_line(lines);

        debug!(
            "Parsed {} bytes with {} nodes in strip-and-balance mode",
            content.len(),
            tree.node_count()
        );
        Ok(tree)
    }
}

/// Replaces every tag byte except newlines with a space.
pub(crate) fn strip(content: &str, tags: &[ErbTag]) -> Result<String, ParseError> {
    let mut bytes = content.as_bytes().to_vec();
    for tag in tags {
        for b in &mut bytes[tag.span.range()] {
            if *b != b'\n' {
                *b = b' ';
            }
        }
    }
    String::from_utf8(bytes).map_err(|e| ParseError::invalid_tree(e.to_string()))
}

/// Checks that every quote opened in the stripped document is closed.
///
/// Quotes are tracked across text, tags, comments and raw-text bodies alike.
/// While one kind of quote is open the other kind is literal.
pub(crate) fn check_quote_balance(text: &str) -> Result<(), ParseError> {
    let mut open: Option<(u8, usize)> = None;

    for (offset, &b) in text.as_bytes().iter().enumerate() {
        match open {
            Some((q, _)) if b == q => open = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => open = Some((b, offset)),
            None => {}
        }
    }

    match open {
        Some((q, offset)) => Err(ParseError::unclosed_string(offset, q as char)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erblint_ast::{NodeKind, Span};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_strip_preserves_offsets_and_newlines() {
        let content = "<p><%= a %></p>\n<% if x\n  y %>";
        let scan = scan_tags(content).unwrap();
        let stripped = strip(content, &scan.tags).unwrap();
        assert_eq!(stripped.len(), content.len());
        assert_eq!(stripped, "<p>        </p>\n       \n      ");
    }

    #[test]
    fn test_tree_uses_source_offsets() {
        let content = "<% x %><b class=\"<%= c %>\">t</b>";
        let tree = StripBalanceParser.parse(content).unwrap();
        let b = tree.get(tree.roots()[1]);
        assert_eq!(b.name(), Some("b"));
        assert_eq!(b.span, Span::new(7, 32));
        let class = tree.get(b.attributes()[0]);
        let NodeKind::Attribute { value_span, .. } = &class.kind else {
            panic!("expected attribute");
        };
        assert_eq!(&content[value_span.unwrap().range()], "<%= c %>");
    }

    #[rstest]
    #[case::double("<div class=\"a>text</div>", 11, '"')]
    #[case::single("<p>ok</p>\n<a href='x>", 18, '\'')]
    #[case::quote_hidden_in_tag("<a title=\"<%= x %>>", 9, '"')]
    fn test_unclosed_string(#[case] content: &str, #[case] offset: usize, #[case] quote: char) {
        assert_eq!(
            StripBalanceParser.parse(content),
            Err(ParseError::UnclosedString { offset, quote })
        );
    }

    #[rstest]
    #[case::apostrophe_in_text("<p>it's</p>", 5, '\'')]
    #[case::quote_in_text("<p>say \"hi</p>", 7, '"')]
    #[case::script_body("<script>var s = 'x;</script>", 16, '\'')]
    #[case::comment("<!-- <a href=\" -->", 13, '"')]
    #[case::after_balanced_attribute("<a href=\"x\">it's</a>", 14, '\'')]
    fn test_stray_quote_outside_tags(
        #[case] content: &str,
        #[case] offset: usize,
        #[case] quote: char,
    ) {
        assert_eq!(
            StripBalanceParser.parse(content),
            Err(ParseError::UnclosedString { offset, quote })
        );
    }

    #[rstest]
    #[case::quotes_in_text("<p>say \"hi\" and 'bye'</p>")]
    #[case::quote_inside_erb("<p class=\"<%= x ? '\"' : '' %>\">a</p>")]
    #[case::script_body("<script>var s = \"</div>\";</script><p>x</p>")]
    #[case::nested_kinds("<p title=\"it's\">'a \"b\" c'</p>")]
    #[case::comment("<!-- <a href=\"x\"> -->")]
    fn test_balanced(#[case] content: &str) {
        assert!(StripBalanceParser.parse(content).is_ok());
    }

    #[test]
    fn test_unclosed_tag() {
        assert_eq!(
            StripBalanceParser.parse("<p><% unclosed"),
            Err(ParseError::UnclosedTag { offset: 3 })
        );
    }

    #[test]
    fn test_end_line() {
        let tree = StripBalanceParser.parse("a\nb\n").unwrap();
        assert_eq!(tree.end_line(), 3);
    }
}
