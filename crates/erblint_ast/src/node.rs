//! Parse tree definition.
//!
//! Nodes live in a flat, index-addressed store owned by the [`ParseTree`];
//! parents refer to children by [`NodeId`]. Every node span addresses the
//! original file content, never an intermediate text produced while parsing.

use serde::Serialize;

use crate::Span;

/// Index of a node inside its [`ParseTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// An element such as `<div class="a">…</div>`.
    Element {
        name: String,
        attributes: Vec<NodeId>,
        children: Vec<NodeId>,
        self_closing: bool,
    },
    /// An attribute of an element. `value_span` excludes the quotes.
    Attribute {
        name: String,
        value: Option<String>,
        value_span: Option<Span>,
    },
    /// Character data between tags.
    Text { content: String },
    /// `<!-- … -->`, doctypes and processing instructions.
    Comment { content: String },
}

/// A node in the parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Byte span in the original source.
    pub span: Span,
}

impl Node {
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    /// Element or attribute name.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } | NodeKind::Attribute { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Text content of text and comment nodes, or the value of an attribute.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { content } | NodeKind::Comment { content } => Some(content),
            NodeKind::Attribute { value, .. } => value.as_deref(),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn attributes(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }
}

/// An ordered forest of nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    /// Line of the end of the parsed content, as recovered by the parser.
    end_line: u32,
}

impl ParseTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            end_line: 1,
        }
    }

    /// Adds a node to the store without attaching it anywhere.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Adds a node and appends it to the root list.
    pub fn push_root(&mut self, node: Node) -> NodeId {
        let id = self.push(node);
        self.roots.push(id);
        id
    }

    /// Appends `child` to the children of `parent`. No-op for non-elements.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let NodeKind::Element { children, .. } = &mut self.nodes[parent.index()].kind {
            children.push(child);
        }
    }

    /// Appends `attribute` to the attribute list of `element`.
    pub fn append_attribute(&mut self, element: NodeId, attribute: NodeId) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[element.index()].kind {
            attributes.push(attribute);
        }
    }

    /// Detaches `id` from the root list or from whichever element lists it.
    ///
    /// The node stays in the store; it is simply no longer reachable.
    pub fn detach(&mut self, id: NodeId) {
        self.roots.retain(|&root| root != id);
        for node in &mut self.nodes {
            if let NodeKind::Element { children, .. } = &mut node.kind {
                children.retain(|&child| child != id);
            }
        }
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Total number of stored nodes, including detached ones.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node is reachable from the roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    pub fn set_end_line(&mut self, line: u32) {
        self.end_line = line;
    }

    /// Returns reachable nodes in document order (attributes before children).
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            let node = self.get(id);
            stack.extend(node.children().iter().rev());
            stack.extend(node.attributes().iter().rev());
        }
        out
    }

    /// The last reachable node in document order.
    pub fn last_node(&self) -> Option<NodeId> {
        let mut current = *self.roots.last()?;
        loop {
            let node = self.get(current);
            match node.children().last().or(node.attributes().last()) {
                Some(&next) => current = next,
                None => return Some(current),
            }
        }
    }

    /// All reachable elements with the given name (ASCII case-insensitive).
    pub fn elements_named<'t>(&'t self, name: &'t str) -> impl Iterator<Item = NodeId> + 't {
        self.descendants().into_iter().filter(move |&id| {
            self.get(id).is_element()
                && self
                    .get(id)
                    .name()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }
}

impl Default for ParseTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(name: &str, span: Span) -> Node {
        Node {
            kind: NodeKind::Element {
                name: name.to_string(),
                attributes: Vec::new(),
                children: Vec::new(),
                self_closing: false,
            },
            span,
        }
    }

    fn text(content: &str, span: Span) -> Node {
        Node {
            kind: NodeKind::Text {
                content: content.to_string(),
            },
            span,
        }
    }

    fn sample() -> (ParseTree, NodeId, NodeId, NodeId, NodeId) {
        // <div id="a">x</div>y
        let mut tree = ParseTree::new();
        let div = tree.push_root(element("div", Span::new(0, 19)));
        let attr = tree.push(Node {
            kind: NodeKind::Attribute {
                name: "id".to_string(),
                value: Some("a".to_string()),
                value_span: Some(Span::new(9, 10)),
            },
            span: Span::new(5, 11),
        });
        tree.append_attribute(div, attr);
        let x = tree.push(text("x", Span::new(12, 13)));
        tree.append_child(div, x);
        let y = tree.push_root(text("y", Span::new(19, 20)));
        (tree, div, attr, x, y)
    }

    #[test]
    fn test_descendants_document_order() {
        let (tree, div, attr, x, y) = sample();
        assert_eq!(tree.descendants(), vec![div, attr, x, y]);
        assert_eq!(tree.last_node(), Some(y));
    }

    #[test]
    fn test_last_node_descends() {
        let (mut tree, _, _, x, y) = sample();
        tree.detach(y);
        assert_eq!(tree.last_node(), Some(x));
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_empty_tree() {
        let tree = ParseTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.last_node(), None);
        assert!(tree.descendants().is_empty());
    }

    #[test]
    fn test_accessors() {
        let (tree, div, attr, x, _) = sample();
        assert_eq!(tree.get(div).name(), Some("div"));
        assert_eq!(tree.get(attr).text(), Some("a"));
        assert_eq!(tree.get(x).text(), Some("x"));
        assert_eq!(tree.elements_named("DIV").collect::<Vec<_>>(), vec![div]);
    }
}
