//! Constituency tree data structures
//!
//! A [`Tree`] owns an arena of [`Node`]s in pre-order (document order), so the
//! root is always node 0. Parent links are arena indices, never owning
//! references. Navigation goes through [`NodeRef`], a copyable handle pairing
//! a tree with a node id.
//!
//! Trees are built once by [`crate::builder`] and are immutable afterwards.

use crate::pattern::NodePattern;
use std::fmt;

/// Unique identifier for a node within its tree
pub type NodeId = usize;

/// Tag of Penn Treebank null elements (elided subjects, traces, ...)
pub const NULL_TAG: &str = "-NONE-";

/// A constituent or terminal in a constituency tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// Full label as written in the source, e.g. `NP-SBJ-1`
    pub label: String,
    /// Base constituent tag, e.g. `NP`
    pub tag: String,
    /// Dash-suffixed function tags in source order, e.g. `["SBJ", "1"]`
    pub function_tags: Vec<String>,
    /// Word or placeholder, present only on terminals
    pub word: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        label: &str,
        tag: &str,
        function_tags: &[&str],
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            id,
            label: label.to_string(),
            tag: tag.to_string(),
            function_tags: function_tags.iter().map(|t| t.to_string()).collect(),
            word: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.word.is_some()
    }
}

/// A parsed treebank unit (sentence)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    unit_id: String,
    nodes: Vec<Node>,
}

impl Tree {
    /// Wrap a finished node arena. `nodes` must be non-empty and in pre-order.
    pub(crate) fn from_nodes(unit_id: &str, nodes: Vec<Node>) -> Self {
        debug_assert!(!nodes.is_empty(), "tree without a root");
        Self {
            unit_id: unit_id.to_string(),
            nodes,
        }
    }

    /// Identifier of the source unit, e.g. `ann_0001.parse:3`
    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { tree: self, id: 0 }
    }

    /// Number of nodes, internal and terminal
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a node by ID
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// All nodes in document order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every node (root included) satisfying `predicate`, in document order
    pub fn find_all<'t, P>(&'t self, predicate: P) -> Descendants<'t, P>
    where
        P: FnMut(NodeRef<'t>) -> bool,
    {
        self.root().descendants_or_self(predicate)
    }

    /// Nodes matching an attribute pattern, in document order
    pub fn search<'t>(&'t self, pattern: &'t NodePattern) -> impl Iterator<Item = NodeRef<'t>> + 't {
        self.find_all(move |node| pattern.matches(node))
    }

    pub fn leaves(&self) -> Leaves<'_> {
        self.root().leaves()
    }

    /// Every terminal word, null-element placeholders included
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.leaves().filter_map(NodeRef::word)
    }

    /// Surface sentence; null elements contribute nothing
    pub fn sentence_text(&self) -> String {
        self.root().yield_text()
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root(), f)
    }
}

/// Borrowed handle to one node of a tree
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    #[inline]
    fn at(self, id: NodeId) -> Self {
        NodeRef {
            tree: self.tree,
            id,
        }
    }

    pub fn id(self) -> NodeId {
        self.id
    }

    pub fn tree(self) -> &'t Tree {
        self.tree
    }

    /// The underlying node data
    pub fn data(self) -> &'t Node {
        &self.tree.nodes[self.id]
    }

    pub fn tag(self) -> &'t str {
        &self.data().tag
    }

    pub fn label(self) -> &'t str {
        &self.data().label
    }

    pub fn function_tags(self) -> &'t [String] {
        &self.data().function_tags
    }

    pub fn word(self) -> Option<&'t str> {
        self.data().word.as_deref()
    }

    pub fn is_terminal(self) -> bool {
        self.data().is_terminal()
    }

    pub fn is_root(self) -> bool {
        self.data().parent.is_none()
    }

    /// Exact match on the base tag
    pub fn has_tag(self, tag: &str) -> bool {
        self.tag() == tag
    }

    pub fn has_function_tag(self, tag: &str) -> bool {
        self.function_tags().iter().any(|t| t == tag)
    }

    pub fn parent(self) -> Option<Self> {
        self.data().parent.map(|id| self.at(id))
    }

    pub fn children(self) -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator + 't {
        self.data().children.iter().map(move |&id| self.at(id))
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(self) -> Ancestors<'t> {
        Ancestors {
            tree: self.tree,
            next: self.data().parent,
        }
    }

    /// Nearest strict ancestor satisfying `predicate`
    pub fn nearest_ancestor<P>(self, mut predicate: P) -> Option<Self>
    where
        P: FnMut(NodeRef<'t>) -> bool,
    {
        self.ancestors().find(|&node| predicate(node))
    }

    /// Other children of this node's parent, in document order
    pub fn siblings(self) -> impl Iterator<Item = Self> + 't {
        let id = self.id;
        self.parent()
            .into_iter()
            .flat_map(NodeRef::children)
            .filter(move |sib| sib.id != id)
    }

    /// Siblings to the left, in document order
    pub fn preceding_siblings(self) -> impl Iterator<Item = Self> + 't {
        let id = self.id;
        self.parent()
            .into_iter()
            .flat_map(NodeRef::children)
            .take_while(move |sib| sib.id != id)
    }

    /// Siblings to the right, in document order
    pub fn following_siblings(self) -> impl Iterator<Item = Self> + 't {
        let id = self.id;
        self.parent()
            .into_iter()
            .flat_map(NodeRef::children)
            .skip_while(move |sib| sib.id != id)
            .skip(1)
    }

    /// Strict descendants satisfying `predicate`, pre-order left to right
    pub fn descendants<P>(self, predicate: P) -> Descendants<'t, P>
    where
        P: FnMut(NodeRef<'t>) -> bool,
    {
        let mut stack: Vec<NodeId> = Vec::new();
        stack.extend(self.data().children.iter().rev());
        Descendants {
            tree: self.tree,
            stack,
            predicate,
        }
    }

    /// Like [`NodeRef::descendants`], but this node is also a candidate
    pub fn descendants_or_self<P>(self, predicate: P) -> Descendants<'t, P>
    where
        P: FnMut(NodeRef<'t>) -> bool,
    {
        Descendants {
            tree: self.tree,
            stack: vec![self.id],
            predicate,
        }
    }

    /// Terminal nodes under (or at) this node, left to right
    pub fn leaves(self) -> Leaves<'t> {
        Leaves(self.descendants_or_self(NodeRef::is_terminal as fn(NodeRef<'t>) -> bool))
    }

    /// Surface words under this node joined by single spaces
    ///
    /// Null elements are skipped whatever their placeholder spelling.
    pub fn yield_text(self) -> String {
        let words: Vec<&str> = self
            .leaves()
            .filter(|leaf| !leaf.has_tag(NULL_TAG))
            .filter_map(NodeRef::word)
            .collect();
        words.join(" ")
    }

    /// True if `other` lies strictly below this node
    pub fn dominates(self, other: NodeRef<'_>) -> bool {
        std::ptr::eq(self.tree, other.tree) && other.ancestors().any(|a| a.id == self.id)
    }

    /// Number of edges between this node and the root
    pub fn depth(self) -> usize {
        self.ancestors().count()
    }

    /// One-line bracket notation of the subtree
    pub fn to_bracketed(self) -> String {
        self.to_string()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("label", &self.label())
            .field("word", &self.word())
            .finish()
    }
}

enum Step {
    Open(NodeId),
    Close,
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = &self.tree.nodes;
        let mut stack = vec![Step::Open(self.id)];
        let mut first = true;

        while let Some(step) = stack.pop() {
            match step {
                Step::Open(id) => {
                    let node = &nodes[id];
                    if !first {
                        f.write_str(" ")?;
                    }
                    first = false;
                    write!(f, "({}", node.label)?;
                    match &node.word {
                        Some(word) => write!(f, " {})", word)?,
                        None => {
                            stack.push(Step::Close);
                            stack.extend(node.children.iter().rev().map(|&c| Step::Open(c)));
                        }
                    }
                }
                Step::Close => f.write_str(")")?,
            }
        }
        Ok(())
    }
}

/// Iterator over strict ancestors, nearest first
#[derive(Clone)]
pub struct Ancestors<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.nodes[id].parent;
        Some(NodeRef {
            tree: self.tree,
            id,
        })
    }
}

/// Filtered depth-first, pre-order traversal
///
/// Holds only the pending-sibling stack, so memory follows tree depth.
pub struct Descendants<'t, P> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
    predicate: P,
}

impl<'t, P> Iterator for Descendants<'t, P>
where
    P: FnMut(NodeRef<'t>) -> bool,
{
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let node = &self.tree.nodes[id];
            self.stack.extend(node.children.iter().rev());
            let candidate = NodeRef {
                tree: self.tree,
                id,
            };
            if (self.predicate)(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Terminal nodes in left-to-right order
pub struct Leaves<'t>(Descendants<'t, fn(NodeRef<'t>) -> bool>);

impl<'t> Iterator for Leaves<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}
