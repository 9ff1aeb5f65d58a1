//! Lenient HTML fragment parser.
//!
//! Builds a [`ParseTree`] from text that contains no ERB tags. It never fails:
//! mis-nested end tags close up to the matching element, stray end tags are
//! dropped, unclosed elements end at end of input, and an unterminated tag or
//! comment turns the rest of the input into text.
//!
//! Offsets and strings go through a [`Resolver`] so that callers parsing a
//! transformed text can land every node in original-source coordinates.

use erblint_ast::{Node, NodeId, NodeKind, ParseTree, Span};

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Maps offsets in the parsed text to spans and strings of the final tree.
pub(crate) trait Resolver {
    fn span(&self, start: usize, end: usize) -> Span;
    fn text(&self, start: usize, end: usize) -> String;
}

/// Resolver for text whose offsets already are source offsets.
pub(crate) struct Identity<'a>(pub &'a str);

impl Resolver for Identity<'_> {
    fn span(&self, start: usize, end: usize) -> Span {
        Span::from_usize(start, end)
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.0[start..end].to_string()
    }
}

/// Parses `text` into a tree.
pub(crate) fn parse_fragment<R: Resolver>(text: &str, resolver: &R) -> ParseTree {
    TreeBuilder::new(text, resolver).build()
}

struct OpenElement {
    id: NodeId,
    name: String,
    start: usize,
}

struct TreeBuilder<'a, R> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    text_start: usize,
    resolver: &'a R,
    tree: ParseTree,
    open: Vec<OpenElement>,
}

impl<'a, R: Resolver> TreeBuilder<'a, R> {
    fn new(text: &'a str, resolver: &'a R) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            text_start: 0,
            resolver,
            tree: ParseTree::new(),
            open: Vec::new(),
        }
    }

    fn build(mut self) -> ParseTree {
        while let Some(lt) = self.next_lt() {
            self.pos = lt;
            let consumed = match self.bytes.get(lt + 1) {
                Some(b'!') if self.text[lt..].starts_with("<!--") => self.comment(lt),
                Some(b'!') | Some(b'?') => self.declaration(lt),
                Some(b'/') if self.peek_alpha(lt + 2) => self.end_tag(lt),
                Some(c) if c.is_ascii_alphabetic() => self.start_tag(lt),
                _ => false,
            };
            if !consumed {
                self.pos = lt + 1;
            }
        }

        self.flush_text(self.bytes.len());
        let end = self.bytes.len();
        while let Some(element) = self.open.pop() {
            self.close(element, end);
        }
        self.tree
    }

    fn next_lt(&self) -> Option<usize> {
        self.bytes
            .get(self.pos..)?
            .iter()
            .position(|&b| b == b'<')
            .map(|i| self.pos + i)
    }

    fn peek_alpha(&self, at: usize) -> bool {
        self.bytes.get(at).is_some_and(|b| b.is_ascii_alphabetic())
    }

    /// Emits pending text up to `end` as a text node.
    fn flush_text(&mut self, end: usize) {
        if self.text_start < end {
            let node = Node {
                kind: NodeKind::Text {
                    content: self.resolver.text(self.text_start, end),
                },
                span: self.resolver.span(self.text_start, end),
            };
            self.attach(node);
        }
        self.text_start = end;
    }

    fn attach(&mut self, node: Node) -> NodeId {
        match self.open.last() {
            Some(parent) => {
                let parent = parent.id;
                let id = self.tree.push(node);
                self.tree.append_child(parent, id);
                id
            }
            None => self.tree.push_root(node),
        }
    }

    fn close(&mut self, element: OpenElement, end: usize) {
        self.tree.get_mut(element.id).span = self.resolver.span(element.start, end);
    }

    fn comment(&mut self, lt: usize) -> bool {
        let inner = lt + 4;
        let Some(close) = self.text[inner..].find("-->").map(|i| inner + i) else {
            return false;
        };
        self.push_comment(lt, inner, close, close + 3);
        true
    }

    /// `<!DOCTYPE …>` and `<? … >`, kept as comments.
    fn declaration(&mut self, lt: usize) -> bool {
        let inner = lt + 2;
        let Some(close) = self.text[inner..].find('>').map(|i| inner + i) else {
            return false;
        };
        self.push_comment(lt, inner, close, close + 1);
        true
    }

    fn push_comment(&mut self, lt: usize, inner: usize, close: usize, end: usize) {
        self.flush_text(lt);
        let node = Node {
            kind: NodeKind::Comment {
                content: self.resolver.text(inner, close),
            },
            span: self.resolver.span(lt, end),
        };
        self.attach(node);
        self.pos = end;
        self.text_start = end;
    }

    fn end_tag(&mut self, lt: usize) -> bool {
        let name_start = lt + 2;
        let name_end = self.scan_name(name_start);
        let Some(gt) = self.text[name_end..].find('>').map(|i| name_end + i) else {
            return false;
        };
        let end = gt + 1;
        self.flush_text(lt);

        let name = &self.text[name_start..name_end];
        if let Some(index) = self
            .open
            .iter()
            .rposition(|open| open.name.eq_ignore_ascii_case(name))
        {
            while self.open.len() > index + 1 {
                if let Some(inner) = self.open.pop() {
                    self.close(inner, lt);
                }
            }
            if let Some(element) = self.open.pop() {
                self.close(element, end);
            }
        }

        self.pos = end;
        self.text_start = end;
        true
    }

    fn start_tag(&mut self, lt: usize) -> bool {
        let name_start = lt + 1;
        let name_end = self.scan_name(name_start);
        let Some((attributes, tag_end, self_closing)) = self.scan_attributes(name_end) else {
            return false;
        };
        self.flush_text(lt);

        let lowered = self.text[name_start..name_end].to_ascii_lowercase();
        let id = self.attach(Node {
            kind: NodeKind::Element {
                name: self.resolver.text(name_start, name_end),
                attributes: Vec::new(),
                children: Vec::new(),
                self_closing,
            },
            span: self.resolver.span(lt, tag_end),
        });
        for attribute in attributes {
            let attribute = self.tree.push(attribute);
            self.tree.append_attribute(id, attribute);
        }

        self.pos = tag_end;
        self.text_start = tag_end;

        if self_closing || VOID_ELEMENTS.contains(&lowered.as_str()) {
            return true;
        }

        let raw_text = RAW_TEXT_ELEMENTS.contains(&lowered.as_str());
        self.open.push(OpenElement {
            id,
            name: lowered,
            start: lt,
        });
        if raw_text {
            self.raw_text(tag_end);
        }
        true
    }

    /// Consumes raw text up to the end tag of the innermost open element.
    fn raw_text(&mut self, from: usize) {
        let Some(name) = self.open.last().map(|open| open.name.clone()) else {
            return;
        };
        let needle = format!("</{name}");
        let lower = self.text[from..].to_ascii_lowercase();
        let end = lower
            .match_indices(&needle)
            .map(|(i, _)| from + i)
            .find(|&i| {
                matches!(
                    self.bytes.get(i + needle.len()),
                    None | Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
                )
            })
            .unwrap_or(self.bytes.len());

        self.flush_text(end);
        self.pos = end;
    }

    fn scan_name(&self, from: usize) -> usize {
        let mut end = from;
        while let Some(&b) = self.bytes.get(end) {
            if b.is_ascii_whitespace() || b == b'/' || b == b'>' {
                break;
            }
            end += 1;
        }
        end
    }

    /// Scans attributes up to and including `>`.
    ///
    /// Returns `None` when input ends first.
    fn scan_attributes(&self, from: usize) -> Option<(Vec<Node>, usize, bool)> {
        let mut attributes = Vec::new();
        let mut pos = from;

        loop {
            pos = self.skip_whitespace(pos);
            match *self.bytes.get(pos)? {
                b'>' => return Some((attributes, pos + 1, false)),
                b'/' if self.bytes.get(pos + 1) == Some(&b'>') => {
                    return Some((attributes, pos + 2, true));
                }
                b'/' => pos += 1,
                _ => {
                    let (attribute, next) = self.scan_attribute(pos)?;
                    attributes.push(attribute);
                    pos = next;
                }
            }
        }
    }

    fn scan_attribute(&self, name_start: usize) -> Option<(Node, usize)> {
        // A leading `=` belongs to the name.
        let mut name_end = name_start + 1;
        while let Some(&b) = self.bytes.get(name_end) {
            if b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'/') {
                break;
            }
            name_end += 1;
        }

        let after_name = self.skip_whitespace(name_end);
        let mut end = name_end;
        let mut value = None;

        if self.bytes.get(after_name) == Some(&b'=') {
            let value_start = self.skip_whitespace(after_name + 1);
            match *self.bytes.get(value_start)? {
                quote @ (b'"' | b'\'') => {
                    let inner = value_start + 1;
                    let close = self.bytes[inner..].iter().position(|&b| b == quote)? + inner;
                    value = Some((inner, close));
                    end = close + 1;
                }
                b'>' => end = value_start,
                _ => {
                    let mut close = value_start;
                    while let Some(&b) = self.bytes.get(close) {
                        if b.is_ascii_whitespace() || b == b'>' {
                            break;
                        }
                        close += 1;
                    }
                    value = Some((value_start, close));
                    end = close;
                }
            }
        }

        let node = Node {
            kind: NodeKind::Attribute {
                name: self.resolver.text(name_start, name_end),
                value: value.map(|(start, end)| self.resolver.text(start, end)),
                value_span: value.map(|(start, end)| self.resolver.span(start, end)),
            },
            span: self.resolver.span(name_start, end),
        };
        Some((node, end))
    }

    fn skip_whitespace(&self, mut pos: usize) -> usize {
        while self.bytes.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
            pos += 1;
        }
        pos
    }
}
