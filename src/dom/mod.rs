//! In-memory element tree standing in for the browser document.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Removing a node
//! detaches it from its parent; the id stays valid but the node is no longer
//! reachable from the root, so queries stop returning it.
//!
//! Slots are never freed or reused: a removed node keeps its slot for the
//! life of the document. Pending message dismissals hold [`NodeId`]s, and a
//! reused slot would let them take down an unrelated element. Memory grows
//! with every element ever created, which is fine for a page preview but
//! not for a long-running feed.

pub mod locator;

use std::collections::BTreeMap;
use std::fmt::Write as _;

use thiserror::Error;

pub use locator::{
    find_all_markers_for_field, find_container, find_markers, find_mirrors, EntityKind,
};

/// Handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("no such node: {0:?}")]
    NoSuchNode(NodeId),

    #[error("cannot insert {child:?} into {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Read-only view of one element, handed to query predicates.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    pub id: NodeId,
    node: &'a Node,
}

impl<'a> ElementRef<'a> {
    pub fn tag(&self) -> &'a str {
        &self.node.tag
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.node.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.node.classes.iter().map(String::as_str)
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attrs.get(name).map(String::as_str)
    }
}

/// The page: an `html` root with a single `body` child.
///
/// Append-only arena, see the module docs for why removed slots stay.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    /// Bumped on every write; lets callers assert an operation was a no-op.
    mutations: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut html = Node::new("html");
        let mut body = Node::new("body");
        let root = NodeId(0);
        let body_id = NodeId(1);
        html.children.push(body_id);
        body.parent = Some(root);

        Self {
            nodes: vec![html, body],
            root,
            body: body_id,
            mutations: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::NoSuchNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::NoSuchNode(id))
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.nodes.get(id.0).map(|node| ElementRef { id, node })
    }

    // =========================================================================
    // TREE
    // =========================================================================

    /// Create a detached element. Always takes a fresh slot.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Create an element with the given class attribute and append it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        class_name: &str,
    ) -> Result<NodeId, DomError> {
        let id = self.create_element(tag);
        self.set_class_name(id, class_name)?;
        self.append_child(parent, id)?;
        Ok(id)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_child(parent, child, None)
    }

    /// Insert `child` before the current first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_child(parent, child, Some(0))
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> Result<(), DomError> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root || self.is_ancestor_or_self(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child)?;
        let children = &mut self.node_mut(parent)?.children;
        let at = index.map_or(children.len(), |i| i.min(children.len()));
        children.insert(at, child);
        self.node_mut(child)?.parent = Some(parent);
        self.mutations += 1;
        Ok(())
    }

    /// Detach `node` from its parent. Removing an already detached node is a no-op.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        if self.detach(node)? {
            self.mutations += 1;
        }
        Ok(())
    }

    fn detach(&mut self, node: NodeId) -> Result<bool, DomError> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(false);
        };
        self.node_mut(parent)?.children.retain(|c| *c != node);
        self.node_mut(node)?.parent = None;
        Ok(true)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    /// Still reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.is_ancestor_or_self(self.root, node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// All descendants of `scope` (excluding `scope`) in document order.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Descendants of `scope` matching `pred`, in document order.
    pub fn find_all<F>(&self, scope: NodeId, pred: F) -> Vec<NodeId>
    where
        F: Fn(&ElementRef<'_>) -> bool,
    {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|el| pred(&el)))
            .collect()
    }

    pub fn find_first<F>(&self, scope: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&ElementRef<'_>) -> bool,
    {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.element(*id).is_some_and(|el| pred(&el)))
    }

    pub fn find_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.find_all(scope, |el| el.has_class(class))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_first(self.root, |el| el.attr("id") == Some(id))
    }

    // =========================================================================
    // CLASSES
    // =========================================================================

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|el| el.has_class(class))
    }

    pub fn class_name(&self, node: NodeId) -> Option<String> {
        self.node(node).ok().map(|n| n.classes.join(" "))
    }

    /// Replace the whole class list, like assigning `className`.
    pub fn set_class_name(&mut self, node: NodeId, class_name: &str) -> Result<(), DomError> {
        let n = self.node_mut(node)?;
        n.classes.clear();
        for class in class_name.split_whitespace() {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        }
        self.mutations += 1;
        Ok(())
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        let n = self.node_mut(node)?;
        if !n.classes.iter().any(|c| c == class) {
            n.classes.push(class.to_string());
        }
        self.mutations += 1;
        Ok(())
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.node_mut(node)?.classes.retain(|c| c != class);
        self.mutations += 1;
        Ok(())
    }

    /// Add the class when `force` is true, remove it otherwise.
    pub fn toggle_class(&mut self, node: NodeId, class: &str, force: bool) -> Result<(), DomError> {
        if force {
            self.add_class(node, class)
        } else {
            self.remove_class(node, class)
        }
    }

    // =========================================================================
    // ATTRIBUTES / TEXT
    // =========================================================================

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node.0)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.node_mut(node)?
            .attrs
            .insert(name.to_string(), value.to_string());
        self.mutations += 1;
        Ok(())
    }

    /// Concatenated text of the node and its descendants (`textContent`).
    pub fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(n) = self.nodes.get(node.0) {
            out.push_str(&n.text);
            for child in &n.children {
                self.collect_text(*child, out);
            }
        }
    }

    /// Replace the node's content with plain text. Children are detached.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            self.node_mut(child)?.parent = None;
        }
        self.node_mut(node)?.text = text.to_string();
        self.mutations += 1;
        Ok(())
    }

    // =========================================================================
    // DEBUG OUTPUT
    // =========================================================================

    /// Serialize a subtree as indented markup.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, 0, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, depth: usize, out: &mut String) {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{}<{}", indent, n.tag);
        if !n.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", n.classes.join(" "));
        }
        for (k, v) in &n.attrs {
            let _ = write!(out, " {}=\"{}\"", k, v);
        }
        out.push('>');
        if n.children.is_empty() {
            let _ = writeln!(out, "{}</{}>", n.text, n.tag);
            return;
        }
        out.push_str(&n.text);
        out.push('\n');
        for child in &n.children {
            self.write_html(*child, depth + 1, out);
        }
        let _ = writeln!(out, "{}</{}>", indent, n.tag);
    }
}
