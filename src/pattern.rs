//! Attribute patterns over tree nodes
//!
//! A [`NodePattern`] is a conjunction of [`Constraint`]s, each testing one
//! node attribute with a [`Matcher`]. Patterns are usually built by
//! [`crate::parser::parse_query`], but can be assembled directly.

use crate::tree::NodeRef;
use regex::Regex;
use std::fmt::Debug;

/// Node attribute a constraint looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Base tag (`NP`)
    Tag,
    /// Full label as written (`NP-SBJ-1`)
    Label,
    /// Terminal word; never matches internal nodes
    Word,
    /// Any of the function tags
    Function,
    /// Full label of the parent; never matches the root
    Parent,
}

/// How a value is compared against an attribute
#[derive(Clone)]
pub enum Matcher {
    Exact(String),
    StartsWith(String),
    Contains(String),
    Regex(String, Regex), // Pattern string + compiled regex
}

impl Matcher {
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Matcher::Regex(pattern.to_string(), Regex::new(pattern)?))
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Exact(s) => text == s,
            Matcher::StartsWith(s) => text.starts_with(s.as_str()),
            Matcher::Contains(s) => text.contains(s.as_str()),
            Matcher::Regex(_, re) => re.is_match(text),
        }
    }
}

// Manual Debug implementation
impl Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Matcher::Exact(s) => f.debug_tuple("Exact").field(s).finish(),
            Matcher::StartsWith(s) => f.debug_tuple("StartsWith").field(s).finish(),
            Matcher::Contains(s) => f.debug_tuple("Contains").field(s).finish(),
            Matcher::Regex(pattern, _) => f.debug_tuple("Regex").field(pattern).finish(),
        }
    }
}

// Manual PartialEq implementation (compare pattern strings, not compiled regex)
impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Matcher::Exact(a), Matcher::Exact(b)) => a == b,
            (Matcher::StartsWith(a), Matcher::StartsWith(b)) => a == b,
            (Matcher::Contains(a), Matcher::Contains(b)) => a == b,
            (Matcher::Regex(a, _), Matcher::Regex(b, _)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub field: Field,
    pub matcher: Matcher,
    pub negated: bool,
}

impl Constraint {
    pub fn new(field: Field, matcher: Matcher) -> Self {
        Self {
            field,
            matcher,
            negated: false,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Test one node
    ///
    /// Missing attributes (word of an internal node, parent of the root)
    /// fail the constraint whether or not it is negated.
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        let hit = match self.field {
            Field::Tag => Some(self.matcher.is_match(node.tag())),
            Field::Label => Some(self.matcher.is_match(node.label())),
            Field::Word => node.word().map(|w| self.matcher.is_match(w)),
            Field::Function => Some(
                node.function_tags()
                    .iter()
                    .any(|t| self.matcher.is_match(t)),
            ),
            Field::Parent => node.parent().map(|p| self.matcher.is_match(p.label())),
        };
        hit.is_some_and(|hit| hit != self.negated)
    }
}

/// Conjunction of constraints; the empty pattern matches every node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodePattern {
    pub constraints: Vec<Constraint>,
}

impl NodePattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positive constraint
    pub fn with(mut self, field: Field, matcher: Matcher) -> Self {
        self.constraints.push(Constraint::new(field, matcher));
        self
    }

    /// Add a negated constraint
    pub fn without(mut self, field: Field, matcher: Matcher) -> Self {
        self.constraints
            .push(Constraint::new(field, matcher).negate());
        self
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn is_any(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        self.constraints.iter().all(|c| c.matches(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::parse_tree;
    use crate::tree::Tree;

    fn english() -> Tree {
        parse_tree(
            "(TOP (S (NP (NNP John)) (VP (VPZ loves) (NP (NNP Mary))) (PUNC .)))",
            "test:1",
        )
        .unwrap()
    }

    fn exact(s: &str) -> Matcher {
        Matcher::Exact(s.to_string())
    }

    #[test]
    fn test_tag_modes() {
        let tree = english();

        let exact_vp = NodePattern::new().with(Field::Tag, exact("VP"));
        assert_eq!(tree.search(&exact_vp).count(), 1);

        let prefix = NodePattern::new().with(Field::Tag, Matcher::StartsWith("VP".into()));
        let found: Vec<_> = tree.search(&prefix).map(|n| n.tag()).collect();
        assert_eq!(found, vec!["VP", "VPZ"]);

        let contains = NodePattern::new().with(Field::Tag, Matcher::Contains("S".into()));
        assert_eq!(tree.search(&contains).count(), 1);
    }

    #[test]
    fn test_word_constraints() {
        let tree = english();

        let j = NodePattern::new().with(Field::Word, Matcher::StartsWith("J".into()));
        let found: Vec<_> = tree.search(&j).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word(), Some("John"));

        let mary = NodePattern::new()
            .with(Field::Tag, Matcher::Contains("NP".into()))
            .with(Field::Word, Matcher::Contains("ar".into()));
        assert_eq!(tree.search(&mary).next().unwrap().word(), Some("Mary"));

        // Internal nodes never satisfy word constraints, negated or not
        let not_john = NodePattern::new().without(Field::Word, exact("John"));
        assert_eq!(tree.search(&not_john).count(), 3);

        let none = NodePattern::new()
            .with(Field::Tag, exact("NP"))
            .with(Field::Word, exact("John"));
        assert_eq!(tree.search(&none).count(), 0);
    }

    #[test]
    fn test_regex_and_parent() {
        let tree = parse_tree(
            "(S (NP-SBJ (-NONE- *-1)) (VP (VBD wrote) (NP-OBJ (-NONE- *T*))))",
            "test:2",
        )
        .unwrap();

        let prodrop = NodePattern::new()
            .with(Field::Tag, exact("-NONE-"))
            .with(Field::Word, Matcher::regex(r"^\*(?:-\d+)?$").unwrap())
            .with(Field::Parent, Matcher::StartsWith("NP-SBJ".into()));
        let found: Vec<_> = tree.search(&prodrop).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word(), Some("*-1"));

        let root_parent = NodePattern::new().without(Field::Parent, exact("X"));
        assert!(tree.search(&root_parent).all(|n| !n.is_root()));
    }

    #[test]
    fn test_function_field() {
        let tree = parse_tree("(S (NP-SBJ-1 (NN a)) (NP (NN b)))", "test:3").unwrap();

        let sbj = NodePattern::new().with(Field::Function, exact("SBJ"));
        assert_eq!(tree.search(&sbj).count(), 1);

        let no_sbj = NodePattern::new()
            .with(Field::Tag, exact("NP"))
            .without(Field::Function, exact("SBJ"));
        let found: Vec<_> = tree.search(&no_sbj).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].label(), "NP");
    }

    #[test]
    fn test_empty_pattern_matches_all() {
        let tree = english();
        let any = NodePattern::new();
        assert!(any.is_any());
        assert_eq!(tree.search(&any).count(), tree.node_count());
    }

    #[test]
    fn test_matcher_equality_ignores_compiled_regex() {
        assert_eq!(Matcher::regex("a+").unwrap(), Matcher::regex("a+").unwrap());
        assert_ne!(Matcher::regex("a+").unwrap(), exact("a+"));
    }
}
