//! Span and position types for source locations.
//!
//! `Span` is a bare half-open byte range. `SourceRange` is a span that has
//! been validated against a [`SourceBuffer`](crate::SourceBuffer) and carries
//! the line/column information derived from it.

use serde::{Deserialize, Serialize};

/// A position in source text.
///
/// Lines are 1-indexed, columns are 0-indexed and counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (0-indexed).
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A half-open byte range in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: u32,
    /// End byte offset (exclusive).
    pub end: u32,
}

impl Span {
    /// Creates a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Creates a span from `usize` offsets.
    #[inline]
    pub const fn from_usize(start: usize, end: usize) -> Self {
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    /// Returns the length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if this span contains the given offset.
    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns the span as a `usize` range, for slicing.
    #[inline]
    pub const fn range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Returns true if the two spans share at least one offset.
    ///
    /// An empty span at `p` overlaps a non-empty span only when `p` lies
    /// strictly inside it; inserting at the edge of a replaced region is
    /// well defined, inserting in its middle is not. Two empty spans never
    /// overlap.
    pub const fn overlaps(&self, other: &Span) -> bool {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => false,
            (true, false) => other.start < self.start && self.start < other.end,
            (false, true) => self.start < other.start && other.start < self.end,
            (false, false) => self.start < other.end && other.start < self.end,
        }
    }

    /// Merges two spans into one that covers both.
    #[inline]
    pub const fn merge(&self, other: &Span) -> Span {
        Span {
            start: if self.start < other.start {
                self.start
            } else {
                other.start
            },
            end: if self.end > other.end {
                self.end
            } else {
                other.end
            },
        }
    }
}

/// Location information combining start and end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Start position.
    pub start: Position,
    /// End position.
    pub end: Position,
}

impl Location {
    /// Creates a new location.
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// A byte range validated against a source buffer.
///
/// Constructed through [`SourceBuffer::range`](crate::SourceBuffer::range),
/// which guarantees `start <= end <= len` and that both ends fall on UTF-8
/// character boundaries. The derived positions are computed once so the range
/// stays meaningful after the buffer is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceRange {
    span: Span,
    loc: Location,
}

impl SourceRange {
    pub(crate) const fn new(span: Span, loc: Location) -> Self {
        Self { span, loc }
    }

    /// The underlying byte span.
    #[inline]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Start byte offset (inclusive).
    #[inline]
    pub const fn begin(&self) -> usize {
        self.span.start as usize
    }

    /// End byte offset (exclusive).
    #[inline]
    pub const fn end(&self) -> usize {
        self.span.end as usize
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.span.len() as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// Line of the first byte (1-indexed).
    #[inline]
    pub const fn line(&self) -> u32 {
        self.loc.start.line
    }

    /// Column of the first byte (0-indexed, in characters).
    #[inline]
    pub const fn column(&self) -> u32 {
        self.loc.start.column
    }

    /// Line of the end offset (1-indexed).
    #[inline]
    pub const fn last_line(&self) -> u32 {
        self.loc.end.line
    }

    /// Column of the end offset (0-indexed, in characters).
    #[inline]
    pub const fn last_column(&self) -> u32 {
        self.loc.end.column
    }

    #[inline]
    pub const fn location(&self) -> Location {
        self.loc
    }

    /// See [`Span::overlaps`].
    #[inline]
    pub const fn overlaps(&self, other: &SourceRange) -> bool {
        self.span.overlaps(&other.span)
    }

    /// Two ranges conflict when they overlap and are not identical.
    #[inline]
    pub fn conflicts_with(&self, other: &SourceRange) -> bool {
        self.overlaps(other) && self.span != other.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_span() {
        let span = Span::new(10, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert!(span.contains(15));
        assert!(!span.contains(5));
        assert!(!span.contains(20));
        assert_eq!(span.range(), 10..20);
    }

    #[test]
    fn test_span_merge() {
        let merged = Span::new(10, 20).merge(&Span::new(15, 30));
        assert_eq!(merged, Span::new(10, 30));
    }

    #[rstest]
    #[case::disjoint(Span::new(0, 5), Span::new(5, 10), false)]
    #[case::partial(Span::new(0, 5), Span::new(3, 8), true)]
    #[case::nested(Span::new(0, 20), Span::new(5, 15), true)]
    #[case::identical(Span::new(4, 9), Span::new(4, 9), true)]
    #[case::insert_at_edge(Span::new(5, 5), Span::new(5, 10), false)]
    #[case::insert_at_end(Span::new(10, 10), Span::new(5, 10), false)]
    #[case::insert_inside(Span::new(7, 7), Span::new(5, 10), true)]
    #[case::two_inserts(Span::new(5, 5), Span::new(5, 5), false)]
    fn test_span_overlaps(#[case] a: Span, #[case] b: Span, #[case] expected: bool) {
        assert_eq!(a.overlaps(&b), expected);
        assert_eq!(b.overlaps(&a), expected);
    }

    #[test]
    fn test_location() {
        let loc = Location::new(Position::new(1, 0), Position::new(1, 10));
        assert_eq!(loc.start.line, 1);
        assert_eq!(loc.end.column, 10);
    }

    #[test]
    fn test_source_range_conflicts() {
        let loc = Location::new(Position::new(1, 0), Position::new(1, 0));
        let a = SourceRange::new(Span::new(0, 5), loc);
        let b = SourceRange::new(Span::new(3, 8), loc);
        let same = SourceRange::new(Span::new(0, 5), loc);

        assert!(a.conflicts_with(&b));
        assert!(a.overlaps(&same));
        assert!(!a.conflicts_with(&same));
    }

    #[test]
    fn test_span_serialization() {
        let span = Span::new(10, 20);
        let json = serde_json::to_string(&span).unwrap();
        assert_eq!(json, r#"{"start":10,"end":20}"#);
    }
}
