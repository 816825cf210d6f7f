//! Tree construction from bracket tokens
//!
//! An explicit-stack builder turns the token stream of one unit into a
//! [`Tree`]. Compound labels are split into a base tag and function tags
//! here. Every failure is scoped to the unit being built.

use crate::tokenizer::{Token, TokenKind, tokenize};
use crate::tree::{Node, NodeId, Tree};
use thiserror::Error;

/// What went wrong while building a unit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralErrorKind {
    #[error("closing parenthesis without a matching open")]
    UnbalancedClose,

    #[error("{0} parenthesis(es) still open at end of unit")]
    UnclosedOpen(usize),

    #[error("missing label after opening parenthesis")]
    EmptyLabel,

    #[error("node `{0}` has neither a word nor children")]
    EmptyNode(String),

    #[error("terminal `{0}` must close right after its word")]
    MalformedTerminal(String),

    #[error("word `{0}` found among child constituents")]
    UnexpectedWord(String),

    #[error("label `{0}` not preceded by an opening parenthesis")]
    MisplacedLabel(String),

    #[error("unit does not start with an opening parenthesis")]
    MissingOpen,

    #[error("content after the root node was closed")]
    TrailingContent,
}

/// Error building a tree from one unit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unit {unit_id}: {kind} (depth {depth}, byte {offset})")]
    Structural {
        unit_id: String,
        kind: StructuralErrorKind,
        depth: usize,
        offset: usize,
    },

    #[error("unit {unit_id}: no tokens")]
    EmptyInput { unit_id: String },
}

impl TreeError {
    /// Identifier of the unit that failed
    pub fn unit_id(&self) -> &str {
        match self {
            TreeError::Structural { unit_id, .. } | TreeError::EmptyInput { unit_id } => unit_id,
        }
    }
}

/// Split a compound label into base tag and function tags
///
/// `NP-SBJ-TPC` gives `("NP", ["SBJ", "TPC"])`. Labels wrapped in dashes
/// (`-NONE-`, `-LRB-`) are literal markers and stay whole.
pub fn split_label(label: &str) -> (&str, Vec<&str>) {
    if label.len() > 1 && label.starts_with('-') && label.ends_with('-') {
        return (label, Vec::new());
    }
    let mut parts = label.split('-');
    let tag = parts.next().unwrap_or_default();
    (tag, parts.filter(|p| !p.is_empty()).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Nothing read yet
    Start,
    /// Just opened a node
    Label,
    /// Inside a labeled node: children, a word, or its close
    Content,
    /// Word read; only a close may follow
    Close,
    /// Root closed
    Done,
}

struct TreeBuilder<'u> {
    unit_id: &'u str,
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    expect: Expect,
}

impl<'u> TreeBuilder<'u> {
    fn new(unit_id: &'u str) -> Self {
        Self {
            unit_id,
            nodes: Vec::new(),
            stack: Vec::new(),
            expect: Expect::Start,
        }
    }

    fn error(&self, kind: StructuralErrorKind, offset: usize) -> TreeError {
        TreeError::Structural {
            unit_id: self.unit_id.to_string(),
            kind,
            depth: self.stack.len(),
            offset,
        }
    }

    fn current(&mut self) -> &mut Node {
        let id = *self.stack.last().expect("builder stack empty inside a node");
        &mut self.nodes[id]
    }

    fn push(&mut self, token: Token<'_>) -> Result<(), TreeError> {
        use StructuralErrorKind::*;

        let offset = token.offset;
        match (self.expect, token.kind) {
            (Expect::Done, _) => Err(self.error(TrailingContent, offset)),

            (Expect::Start, TokenKind::Open) => {
                self.expect = Expect::Label;
                Ok(())
            }
            (Expect::Start, TokenKind::Close) => Err(self.error(UnbalancedClose, offset)),
            (Expect::Start, _) => Err(self.error(MissingOpen, offset)),

            (Expect::Label, TokenKind::Label(label)) => self.open_node(label, offset),
            (Expect::Label, _) => Err(self.error(EmptyLabel, offset)),

            (Expect::Content, TokenKind::Open) => {
                self.expect = Expect::Label;
                Ok(())
            }
            (Expect::Content, TokenKind::Word(word)) => {
                let node = self.current();
                if !node.children.is_empty() {
                    return Err(self.error(UnexpectedWord(word.to_string()), offset));
                }
                node.word = Some(word.to_string());
                self.expect = Expect::Close;
                Ok(())
            }
            (Expect::Content, TokenKind::Label(label)) => {
                Err(self.error(MisplacedLabel(label.to_string()), offset))
            }
            (Expect::Content | Expect::Close, TokenKind::Close) => self.close_node(offset),

            (Expect::Close, _) => {
                let label = self.current().label.clone();
                Err(self.error(MalformedTerminal(label), offset))
            }
        }
    }

    fn open_node(&mut self, label: &str, offset: usize) -> Result<(), TreeError> {
        let (tag, function_tags) = split_label(label);
        if tag.is_empty() {
            return Err(self.error(StructuralErrorKind::EmptyLabel, offset));
        }

        let id = self.nodes.len();
        let parent = self.stack.last().copied();
        self.nodes
            .push(Node::new(id, label, tag, &function_tags, parent));
        if let Some(parent_id) = parent {
            self.nodes[parent_id].children.push(id);
        }
        self.stack.push(id);
        self.expect = Expect::Content;
        Ok(())
    }

    fn close_node(&mut self, offset: usize) -> Result<(), TreeError> {
        let node = self.current();
        if node.word.is_none() && node.children.is_empty() {
            let label = node.label.clone();
            return Err(self.error(StructuralErrorKind::EmptyNode(label), offset));
        }
        self.stack.pop();
        self.expect = if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::Content
        };
        Ok(())
    }

    fn finish(self, end: usize) -> Result<Tree, TreeError> {
        match self.expect {
            Expect::Start => Err(TreeError::EmptyInput {
                unit_id: self.unit_id.to_string(),
            }),
            Expect::Done => Ok(Tree::from_nodes(self.unit_id, self.nodes)),
            // a pending open counts as unclosed too
            Expect::Label => {
                let open = self.stack.len() + 1;
                Err(self.error(StructuralErrorKind::UnclosedOpen(open), end))
            }
            Expect::Content | Expect::Close => {
                let open = self.stack.len();
                Err(self.error(StructuralErrorKind::UnclosedOpen(open), end))
            }
        }
    }
}

/// Build a tree from a token sequence
pub fn build<'a, I>(unit_id: &str, tokens: I) -> Result<Tree, TreeError>
where
    I: IntoIterator<Item = Token<'a>>,
{
    let mut builder = TreeBuilder::new(unit_id);
    let mut end = 0;
    for token in tokens {
        end = token.offset + 1;
        builder.push(token)?;
    }
    builder.finish(end)
}

/// Tokenize and build one bracketed unit
pub fn parse_tree(text: &str, unit_id: &str) -> Result<Tree, TreeError> {
    build(unit_id, tokenize(text))
}
