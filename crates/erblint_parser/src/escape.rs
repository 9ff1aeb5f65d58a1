//! Escape-and-restore parser.
//!
//! Every ERB tag is replaced with an entity-encoded placeholder wrapped in the
//! session token, a sentinel element is appended, and the result is parsed as
//! plain HTML. An offset map recorded during the transformation lands every
//! node back on the original content, so tags reappear verbatim as text.

use std::sync::Arc;

use erblint_ast::{Node, ParseTree, Span};
use tracing::debug;

use crate::entities::{self, LITERAL_OPEN};
use crate::markup::{self, Resolver};
use crate::scanner::scan_tags;
use crate::session::{OsTokenSource, SessionToken, TokenSource};
use crate::{ParseError, Parser, ParserMode};

const SENTINEL_PREFIX: &str = "erblint-sentinel-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    /// Copied byte for byte.
    Copied,
    /// A tag or literal-escape replaced by its encoding.
    Replaced,
    /// Inserted text with no source counterpart.
    Synthetic,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    out_start: usize,
    out_end: usize,
    src_start: usize,
    src_end: usize,
    kind: SegmentKind,
}

/// Maps offsets of the transformed text back to the original content.
#[derive(Debug, Default)]
struct OffsetMap {
    segments: Vec<Segment>,
    source_len: usize,
}

impl OffsetMap {
    fn push(&mut self, out: std::ops::Range<usize>, src: std::ops::Range<usize>, kind: SegmentKind) {
        if out.is_empty() {
            return;
        }
        self.segments.push(Segment {
            out_start: out.start,
            out_end: out.end,
            src_start: src.start,
            src_end: src.end,
            kind,
        });
    }

    fn segment_at(&self, out: usize) -> Option<&Segment> {
        let index = self.segments.partition_point(|s| s.out_end <= out);
        self.segments.get(index)
    }

    /// Source offset for a transformed start offset. Offsets inside a
    /// replaced segment move to the segment's start.
    fn source_start(&self, out: usize) -> usize {
        match self.segment_at(out) {
            Some(seg) if seg.kind == SegmentKind::Copied => seg.src_start + (out - seg.out_start),
            Some(seg) => seg.src_start,
            None => self.source_len,
        }
    }

    /// Source offset for a transformed end offset. Offsets inside a replaced
    /// segment move to the segment's end.
    fn source_end(&self, out: usize) -> usize {
        let Some(last) = out.checked_sub(1) else {
            return 0;
        };
        match self.segment_at(last) {
            Some(seg) if seg.kind == SegmentKind::Copied => seg.src_start + (out - seg.out_start),
            Some(seg) => seg.src_end,
            None => self.source_len,
        }
    }
}

/// A template rewritten for the markup parser.
#[derive(Debug)]
pub(crate) struct Transformed {
    pub(crate) text: String,
    map: OffsetMap,
    sentinel: String,
}

/// Rewrites `content` so that no ERB delimiter is visible to the markup parser.
pub(crate) fn transform(content: &str, token: &SessionToken) -> Result<Transformed, ParseError> {
    let scan = scan_tags(content)?;

    let mut replacements: Vec<(usize, usize)> = scan
        .tags
        .iter()
        .map(|tag| tag.span.range())
        .map(|r| (r.start, r.end))
        .chain(scan.literal_escapes.iter().map(|&start| (start, start + 1)))
        .collect();
    replacements.sort_unstable();

    let mut text = String::with_capacity(content.len() * 2);
    let mut map = OffsetMap {
        segments: Vec::with_capacity(replacements.len() * 2 + 2),
        source_len: content.len(),
    };
    let mut cursor = 0;

    for (start, end) in replacements {
        let out_start = text.len();
        text.push_str(&content[cursor..start]);
        map.push(out_start..text.len(), cursor..start, SegmentKind::Copied);

        let out_start = text.len();
        let original = &content[start..end];
        if original == "<" {
            text.push_str(LITERAL_OPEN);
        } else {
            text.push_str(token.as_str());
            entities::encode_into(&mut text, original);
            text.push_str(token.as_str());
        }
        map.push(out_start..text.len(), start..end, SegmentKind::Replaced);
        cursor = end;
    }

    let out_start = text.len();
    text.push_str(&content[cursor..]);
    map.push(out_start..text.len(), cursor..content.len(), SegmentKind::Copied);

    let sentinel = format!("{SENTINEL_PREFIX}{token}");
    let out_start = text.len();
    text.push_str(&format!("<{sentinel}></{sentinel}>"));
    map.push(
        out_start..text.len(),
        content.len()..content.len(),
        SegmentKind::Synthetic,
    );

    Ok(Transformed {
        text,
        map,
        sentinel,
    })
}

/// Resolves transformed offsets against the original content.
struct Restorer<'a> {
    transformed: &'a Transformed,
    source: &'a str,
}

impl Resolver for Restorer<'_> {
    fn span(&self, start: usize, end: usize) -> Span {
        let map = &self.transformed.map;
        Span::from_usize(map.source_start(start), map.source_end(end))
    }

    fn text(&self, start: usize, end: usize) -> String {
        let map = &self.transformed.map;
        if let Some(seg) = map.segment_at(start)
            && seg.kind == SegmentKind::Synthetic
            && end <= seg.out_end
        {
            return self.transformed.text[start..end].to_string();
        }
        self.source
            .get(map.source_start(start)..map.source_end(end))
            .map(str::to_string)
            .unwrap_or_default()
    }
}

/// Parser that keeps ERB tags visible as text.
pub struct EscapeRestoreParser {
    tokens: Arc<dyn TokenSource>,
}

impl EscapeRestoreParser {
    /// Creates a parser drawing session tokens from the OS.
    pub fn new() -> Self {
        Self::with_token_source(Arc::new(OsTokenSource))
    }

    pub fn with_token_source(tokens: Arc<dyn TokenSource>) -> Self {
        Self { tokens }
    }
}

impl Default for EscapeRestoreParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for EscapeRestoreParser {
    fn mode(&self) -> ParserMode {
        ParserMode::EscapeRestore
    }

    fn parse(&self, content: &str) -> Result<ParseTree, ParseError> {
        let token = self.tokens.token();
        let transformed = transform(content, &token)?;
        let restorer = Restorer {
            transformed: &transformed,
            source: content,
        };
        let mut tree = markup::parse_fragment(&transformed.text, &restorer);

        let last = tree
            .last_node()
            .ok_or_else(|| ParseError::invalid_tree("markup parser produced an empty tree"))?;
        let sentinel = tree.get(last);
        if !(sentinel.is_element() && sentinel.name() == Some(transformed.sentinel.as_str())) {
            return Err(ParseError::invalid_tree(
                "document is not terminated by the sentinel element",
            ));
        }
        let end_line = line_of(content, sentinel.span.start as usize);
        tree.detach(last);
        tree.set_end_line(end_line);

        for id in tree.descendants() {
            let node = tree.get(id);
            if leaks_token(node, token.as_str()) {
                return Err(ParseError::invalid_tree(format!(
                    "session token survived restoration at byte {}",
                    node.span.start
                )));
            }
        }

        debug!(
            "Parsed {} bytes with {} nodes in escape-and-restore mode",
            content.len(),
            tree.node_count()
        );
        Ok(tree)
    }
}

fn leaks_token(node: &Node, token: &str) -> bool {
    node.name().is_some_and(|s| s.contains(token)) || node.text().is_some_and(|s| s.contains(token))
}

fn line_of(content: &str, offset: usize) -> u32 {
    let offset = offset.min(content.len());
    content.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count() as u32
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FixedToken;
    use erblint_ast::NodeKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parser(token: &str) -> EscapeRestoreParser {
        EscapeRestoreParser::with_token_source(Arc::new(FixedToken::new(token)))
    }

    fn parse(content: &str) -> Result<ParseTree, ParseError> {
        parser("e5c4pe").parse(content)
    }

    #[test]
    fn test_transformed_text() {
        let token = FixedToken::new("tok").token();
        let transformed = transform(r#"<p class="<%= a %>"><%% b</p>"#, &token).unwrap();
        insta::assert_snapshot!(
            transformed.text,
            @r#"<p class="tok&#60;&#37;&#61;&#32;a&#32;&#37;&#62;tok">&lt;%% b</p><erblint-sentinel-tok></erblint-sentinel-tok>"#
        );
    }

    #[test]
    fn test_lone_tag_is_one_text_node() {
        let tree = parse("<% %>").unwrap();
        assert_eq!(tree.roots().len(), 1);
        let node = tree.get(tree.roots()[0]);
        assert_eq!(node.span, Span::new(0, 5));
        assert_eq!(node.text(), Some("<% %>"));
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_empty_content() {
        let tree = parse("").unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.end_line(), 1);
    }

    #[test]
    fn test_unclosed_tag() {
        assert_eq!(
            parse("<% unclosed"),
            Err(ParseError::UnclosedTag { offset: 0 })
        );
    }

    #[test]
    fn test_end_line_from_sentinel() {
        let tree = parse("<div>\n  <%= x %>\n</div>\n").unwrap();
        assert_eq!(tree.end_line(), 4);
        let tree = parse("<div>\n</div>").unwrap();
        assert_eq!(tree.end_line(), 2);
    }

    #[test]
    fn test_attribute_value_restored() {
        let content = r#"<a href="<%= url_for(x) %>" <%= extra %>>link</a>"#;
        let tree = parse(content).unwrap();
        let a = tree.get(tree.roots()[0]);
        let attrs: Vec<_> = a.attributes().iter().map(|&id| tree.get(id)).collect();

        assert_eq!(attrs[0].name(), Some("href"));
        assert_eq!(attrs[0].text(), Some("<%= url_for(x) %>"));
        let NodeKind::Attribute { value_span, .. } = &attrs[0].kind else {
            panic!("expected attribute");
        };
        assert_eq!(&content[value_span.unwrap().range()], "<%= url_for(x) %>");
        assert_eq!(attrs[1].name(), Some("<%= extra %>"));
        assert_eq!(a.span, Span::from_usize(0, content.len()));
    }

    #[test]
    fn test_unterminated_start_tag_is_invalid() {
        let err = parse("<p>ok</p><div class=\"x").unwrap_err();
        assert!(matches!(err, ParseError::InvalidTree { .. }));
    }

    #[test]
    fn test_token_collision_is_invalid() {
        let err = parser("x").parse("<p>x</p>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidTree { .. }));
    }

    #[rstest]
    #[case("<p><%= name %></p>")]
    #[case("<ul>\n<% items.each do |i| %>\n  <li class=\"<%= i.kind %>\"><%= i %></li>\n<% end %>\n</ul>\n")]
    #[case("<script>var a = '<%= raw j(x) %>';</script>")]
    #[case("<%# comment with \"quotes\" and <tags> %>text")]
    #[case("<%% literal %> and <%= real %>")]
    #[case("<div\n  <%= attrs %>\n  id='a'>日本語 <%= t('.x') %></div>")]
    fn test_round_trip(#[case] content: &str) {
        let tree = parse(content).unwrap();
        let mut seen = String::new();
        for id in tree.descendants() {
            let node = tree.get(id);
            assert!(node.span.end as usize <= content.len());
            match &node.kind {
                NodeKind::Text { content: text } => {
                    assert_eq!(text, &content[node.span.range()]);
                    seen.push_str(text);
                }
                NodeKind::Attribute {
                    value: Some(value),
                    value_span: Some(span),
                    ..
                } => {
                    assert_eq!(value, &content[span.range()]);
                    seen.push_str(value);
                }
                NodeKind::Attribute { name, .. } => seen.push_str(name),
                _ => {}
            }
        }
        for tag in scan_tags(content).unwrap().tags {
            assert!(seen.contains(&content[tag.span.range()]));
        }
    }
}
