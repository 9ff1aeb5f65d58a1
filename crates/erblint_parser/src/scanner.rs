//! ERB tag scanner shared by both parser modes.
//!
//! Finds every `<% … %>` region in a template. `<%%` is a literal-escape that
//! renders as `<%` and never opens a tag; inside a tag, `%%>` renders as `%>`
//! and never closes it.

use erblint_ast::Span;

use crate::ParseError;

const OPEN: &[u8] = b"<%";
const CLOSE: &[u8] = b"%>";

/// The marker that follows the opening delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// `<% code %>`
    Statement,
    /// `<%= expr %>`
    Output,
    /// `<%== expr %>`
    RawOutput,
    /// `<%- code %>`
    TrimStatement,
    /// `<%# comment %>`
    Comment,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Statement => "",
            Self::Output => "=",
            Self::RawOutput => "==",
            Self::TrimStatement => "-",
            Self::Comment => "#",
        }
    }
}

/// One ERB tag found in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErbTag {
    /// The whole tag, delimiters included.
    pub span: Span,
    pub indicator: Indicator,
    /// The code between the indicator and the closing delimiter (or `-%>`).
    pub code: Span,
    /// Whether the tag closes with `-%>`.
    pub trim_close: bool,
}

impl ErbTag {
    pub fn is_comment(&self) -> bool {
        self.indicator == Indicator::Comment
    }

    pub fn is_output(&self) -> bool {
        matches!(self.indicator, Indicator::Output | Indicator::RawOutput)
    }

    /// Length of `<%` plus the indicator.
    pub fn open_len(&self) -> usize {
        (self.code.start - self.span.start) as usize
    }

    /// Length of `%>` plus the trim marker.
    pub fn close_len(&self) -> usize {
        (self.span.end - self.code.end) as usize
    }
}

/// Result of scanning one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagScan {
    /// Tags in source order.
    pub tags: Vec<ErbTag>,
    /// Start offsets of `<%%` literal-escapes outside tags.
    pub literal_escapes: Vec<usize>,
}

/// Scans `content` for ERB tags.
///
/// Fails with [`ParseError::UnclosedTag`] when input ends inside a tag.
pub fn scan_tags(content: &str) -> Result<TagScan, ParseError> {
    let bytes = content.as_bytes();
    let mut scan = TagScan::default();
    let mut pos = 0;

    while let Some(start) = find(bytes, OPEN, pos) {
        if bytes.get(start + 2) == Some(&b'%') {
            scan.literal_escapes.push(start);
            pos = start + 3;
            continue;
        }

        let (indicator, code_start) = indicator_at(bytes, start + 2);
        let close = find_close(bytes, code_start).ok_or(ParseError::unclosed_tag(start))?;
        let trim_close = close > code_start && bytes[close - 1] == b'-';
        let code_end = if trim_close { close - 1 } else { close };
        let end = close + CLOSE.len();

        scan.tags.push(ErbTag {
            span: Span::from_usize(start, end),
            indicator,
            code: Span::from_usize(code_start, code_end),
            trim_close,
        });
        pos = end;
    }

    Ok(scan)
}

fn indicator_at(bytes: &[u8], at: usize) -> (Indicator, usize) {
    match &bytes[at..] {
        [b'=', b'=', ..] => (Indicator::RawOutput, at + 2),
        [b'=', ..] => (Indicator::Output, at + 1),
        [b'-', ..] => (Indicator::TrimStatement, at + 1),
        [b'#', ..] => (Indicator::Comment, at + 1),
        _ => (Indicator::Statement, at),
    }
}

/// Finds the closing `%>` of a tag whose code starts at `from`, skipping `%%>`.
fn find_close(bytes: &[u8], from: usize) -> Option<usize> {
    let mut search = from;
    loop {
        let close = find(bytes, CLOSE, search)?;
        if close > from && bytes[close - 1] == b'%' {
            search = close + CLOSE.len();
            continue;
        }
        return Some(close);
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| from + i)
}
