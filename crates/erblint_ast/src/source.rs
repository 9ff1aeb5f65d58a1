//! Immutable source buffer with a byte-offset → line/column index.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{Location, Position, SourceRange, Span};

/// Errors raised when a range does not address the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The range is reversed or extends past the end of the buffer.
    #[error("range {begin}..{end} is out of bounds for content of length {len}")]
    OutOfBounds { begin: usize, end: usize, len: usize },

    /// An end of the range splits a multi-byte character.
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
}

/// One file's path and content, plus the line-start table derived from it.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    path: PathBuf,
    content: String,
    /// Byte offset of the first byte of every line. Always starts with 0.
    line_starts: Vec<u32>,
}

impl SourceBuffer {
    /// Creates a new buffer, indexing line starts.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let content = content.into();
        let mut line_starts = Vec::with_capacity(content.len() / 32 + 1);
        line_starts.push(0);
        line_starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );

        Self {
            path: path.into(),
            content,
            line_starts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length of the content in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of lines. A trailing newline opens a final, empty line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the 1-indexed line containing `offset`.
    ///
    /// Offsets past the end are attributed to the last line.
    pub fn line_of(&self, offset: usize) -> u32 {
        let offset = offset.min(self.content.len()) as u32;
        self.line_starts.partition_point(|&start| start <= offset) as u32
    }

    /// Returns the line/column position of `offset`.
    pub fn position(&self, offset: usize) -> Position {
        let offset = self.floor_char_boundary(offset.min(self.content.len()));
        let line = self.line_of(offset);
        let line_start = self.line_starts[(line - 1) as usize] as usize;
        let column = self.content[line_start..offset].chars().count() as u32;
        Position::new(line, column)
    }

    /// Returns the text of a 1-indexed line, without its line terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let index = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(index)? as usize;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|&next| next as usize - 1)
            .unwrap_or(self.content.len());
        let text = &self.content[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Byte offset where a 1-indexed line starts.
    pub fn line_start(&self, line: u32) -> Option<usize> {
        let index = line.checked_sub(1)? as usize;
        self.line_starts.get(index).map(|&start| start as usize)
    }

    /// Builds a validated [`SourceRange`].
    pub fn range(&self, begin: usize, end: usize) -> Result<SourceRange, RangeError> {
        let len = self.content.len();
        if begin > end || end > len {
            return Err(RangeError::OutOfBounds { begin, end, len });
        }
        for offset in [begin, end] {
            if !self.content.is_char_boundary(offset) {
                return Err(RangeError::NotCharBoundary { offset });
            }
        }

        let loc = Location::new(self.position(begin), self.position(end));
        Ok(SourceRange::new(Span::from_usize(begin, end), loc))
    }

    /// Builds a range, clamping it into the buffer instead of failing.
    ///
    /// Both ends are clamped to the content length and moved back to the
    /// nearest character boundary; a reversed range collapses to its start.
    pub fn clamped_range(&self, begin: usize, end: usize) -> SourceRange {
        let begin = self.floor_char_boundary(begin.min(self.content.len()));
        let end = self.floor_char_boundary(end.min(self.content.len())).max(begin);
        let loc = Location::new(self.position(begin), self.position(end));
        SourceRange::new(Span::from_usize(begin, end), loc)
    }

    /// Builds a range from a span, see [`SourceBuffer::range`].
    pub fn span_range(&self, span: Span) -> Result<SourceRange, RangeError> {
        self.range(span.start as usize, span.end as usize)
    }

    /// Returns the text addressed by a span, if it is valid for this buffer.
    pub fn slice(&self, span: Span) -> Option<&str> {
        self.content.get(span.range())
    }

    fn floor_char_boundary(&self, mut offset: usize) -> usize {
        while !self.content.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffer(content: &str) -> SourceBuffer {
        SourceBuffer::new("test.html.erb", content)
    }

    #[test]
    fn test_line_of() {
        let buf = buffer("ab\ncd\n\nef");
        assert_eq!(buf.line_count(), 4);
        assert_eq!(buf.line_of(0), 1);
        assert_eq!(buf.line_of(2), 1); // the newline belongs to its line
        assert_eq!(buf.line_of(3), 2);
        assert_eq!(buf.line_of(6), 3);
        assert_eq!(buf.line_of(7), 4);
        assert_eq!(buf.line_of(100), 4);
    }

    #[test]
    fn test_position_counts_characters() {
        let buf = buffer("<p>日本</p>\n<%= x %>");
        // "日" is 3 bytes; "本" starts at byte 6 but column 4.
        assert_eq!(buf.position(6), Position::new(1, 4));
        assert_eq!(buf.position(buf.len()), Position::new(2, 8));
    }

    #[test]
    fn test_line_text() {
        let buf = buffer("one\r\ntwo\nthree");
        assert_eq!(buf.line_text(1), Some("one"));
        assert_eq!(buf.line_text(2), Some("two"));
        assert_eq!(buf.line_text(3), Some("three"));
        assert_eq!(buf.line_text(0), None);
        assert_eq!(buf.line_text(4), None);
        assert_eq!(buf.line_start(3), Some(9));
    }

    #[test]
    fn test_range_derives_positions() {
        let buf = buffer("<div>\n  <%= x %>\n</div>");
        let range = buf.range(8, 16).unwrap();
        assert_eq!(range.line(), 2);
        assert_eq!(range.column(), 2);
        assert_eq!(range.last_line(), 2);
        assert_eq!(range.last_column(), 10);
        assert_eq!(buf.slice(range.span()), Some("<%= x %>"));
    }

    #[test]
    fn test_range_validation() {
        let buf = buffer("日本");
        assert_eq!(
            buf.range(0, 10),
            Err(RangeError::OutOfBounds {
                begin: 0,
                end: 10,
                len: 6
            })
        );
        assert_eq!(
            buf.range(4, 3),
            Err(RangeError::OutOfBounds {
                begin: 4,
                end: 3,
                len: 6
            })
        );
        assert_eq!(
            buf.range(1, 3),
            Err(RangeError::NotCharBoundary { offset: 1 })
        );
        assert!(buf.range(6, 6).is_ok());
    }

    #[test]
    fn test_clamped_range() {
        let buf = buffer("ab日");
        assert_eq!(buf.clamped_range(1, 100).span(), Span::new(1, 5));
        assert_eq!(buf.clamped_range(3, 4).span(), Span::new(2, 2));
        assert_eq!(buf.clamped_range(4, 1).span(), Span::new(2, 2));
    }

    #[test]
    fn test_empty_buffer() {
        let buf = buffer("");
        assert!(buf.is_empty());
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.position(0), Position::new(1, 0));
        assert_eq!(buf.line_text(1), Some(""));
    }
}
