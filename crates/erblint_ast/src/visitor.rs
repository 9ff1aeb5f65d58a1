//! Visitor pattern for parse tree traversal.
//!
//! # Example
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use erblint_ast::{Node, NodeKind, ParseTree, Span};
//! use erblint_ast::visitor::{Visitor, VisitResult, walk_tree};
//!
//! struct TextCollector {
//!     texts: Vec<String>,
//! }
//!
//! impl Visitor for TextCollector {
//!     fn visit_text(&mut self, _tree: &ParseTree, node: &Node) -> VisitResult {
//!         if let Some(text) = node.text() {
//!             self.texts.push(text.to_string());
//!         }
//!         ControlFlow::Continue(())
//!     }
//! }
//!
//! let mut tree = ParseTree::new();
//! tree.push_root(Node {
//!     kind: NodeKind::Text { content: "hello".to_string() },
//!     span: Span::new(0, 5),
//! });
//!
//! let mut collector = TextCollector { texts: Vec::new() };
//! let _ = walk_tree(&mut collector, &tree);
//! assert_eq!(collector.texts, vec!["hello"]);
//! ```

use std::ops::ControlFlow;

use crate::{Node, NodeId, NodeKind, ParseTree};

/// Result type for visitor methods.
///
/// - `ControlFlow::Continue(())` - keep walking
/// - `ControlFlow::Break(())` - stop traversal early
pub type VisitResult = ControlFlow<()>;

/// Read-only traversal of a [`ParseTree`].
///
/// `visit_element` walks attributes and then children by default; override
/// it and call [`walk_element`] to keep descending.
pub trait Visitor {
    fn visit_element(&mut self, tree: &ParseTree, node: &Node) -> VisitResult {
        walk_element(self, tree, node)
    }

    fn visit_attribute(&mut self, _tree: &ParseTree, _node: &Node) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_text(&mut self, _tree: &ParseTree, _node: &Node) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_comment(&mut self, _tree: &ParseTree, _node: &Node) -> VisitResult {
        ControlFlow::Continue(())
    }
}

/// Walks every root of the tree in order.
pub fn walk_tree<V>(visitor: &mut V, tree: &ParseTree) -> VisitResult
where
    V: Visitor + ?Sized,
{
    for &root in tree.roots() {
        walk_node(visitor, tree, root)?;
    }
    ControlFlow::Continue(())
}

/// Dispatches a node to the matching `visit_*` method.
pub fn walk_node<V>(visitor: &mut V, tree: &ParseTree, id: NodeId) -> VisitResult
where
    V: Visitor + ?Sized,
{
    let node = tree.get(id);
    match node.kind {
        NodeKind::Element { .. } => visitor.visit_element(tree, node),
        NodeKind::Attribute { .. } => visitor.visit_attribute(tree, node),
        NodeKind::Text { .. } => visitor.visit_text(tree, node),
        NodeKind::Comment { .. } => visitor.visit_comment(tree, node),
    }
}

/// Walks an element's attributes, then its children.
pub fn walk_element<V>(visitor: &mut V, tree: &ParseTree, node: &Node) -> VisitResult
where
    V: Visitor + ?Sized,
{
    for &attribute in node.attributes() {
        walk_node(visitor, tree, attribute)?;
    }
    for &child in node.children() {
        walk_node(visitor, tree, child)?;
    }
    ControlFlow::Continue(())
}
