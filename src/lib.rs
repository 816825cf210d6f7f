//! Prodrop: Penn Treebank constituency trees and pro-drop subject analysis
//!
//! Parses bracketed treebank files (such as the Penn Arabic Treebank `.parse`
//! files), navigates and searches the resulting trees, and counts pro-drop
//! and overt subjects together with the verbs they belong to.

pub mod analysis; // Subject classification and verb statistics
pub mod builder; // Explicit-stack tree construction
pub mod corpus; // Unit splitting and file reading
pub mod iterators; // Treebank and match collections
pub mod parser; // Query language parser
pub mod pattern; // Node attribute patterns
pub mod query; // Structural predicates and verb lookup
pub mod report; // Text and CSV reports
pub mod tokenizer; // Bracket notation tokens
pub mod tree; // Tree data structures

// Re-exports for convenience
pub use analysis::{AnalysisConfig, CombinedAnalyzer, SubjectKind, SubjectVerbAnalyzer};
pub use builder::{StructuralErrorKind, TreeError, parse_tree};
pub use corpus::{CorpusError, UnitReader};
pub use iterators::{MatchSet, Treebank};
pub use parser::{QueryError, parse_query};
pub use pattern::{Constraint, Field, Matcher, NodePattern};
pub use tokenizer::{Token, TokenKind, tokenize};
pub use tree::{Node, NodeId, NodeRef, Tree};
