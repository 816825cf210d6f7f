//! Structural queries over constituency trees
//!
//! Predicate constructors and composite lookups used by the analysis layer.
//! Everything here is a plain function over [`NodeRef`]; there is no hidden
//! state, so any query can be recomposed from the tree primitives.
//!
//! The composite queries encode Penn (Arabic) Treebank conventions:
//! - a pro-drop subject is a `-NONE-` terminal with a `*` or `*-N`
//!   placeholder under a subject-tagged phrase;
//! - the verb governing a subject is a verb terminal preceding it among its
//!   siblings (verb-initial clauses), the verb of a following sibling `VP`
//!   (subject-initial clauses), or failing both the verb of its nearest `VP`.

use crate::tree::{NULL_TAG, NodeRef};
use regex::Regex;
use std::sync::LazyLock;

/// Function tag marking subjects
pub const SUBJECT_FUNCTION: &str = "SBJ";

/// Base tag of verb phrases
pub const VP_TAG: &str = "VP";

/// Null-element words that mark an elided subject: `*`, `*-1`, `*-12`, ...
pub const PRODROP_WORD_PATTERN: &str = r"^\*(?:-\d+)?$";

static PRODROP_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PRODROP_WORD_PATTERN).expect("valid placeholder pattern"));

/// Predicate: base tag equals `tag`
pub fn tag_is(tag: &str) -> impl Fn(NodeRef<'_>) -> bool + '_ {
    move |node| node.has_tag(tag)
}

/// Predicate: node carries function tag `tag`
pub fn function_tag_is(tag: &str) -> impl Fn(NodeRef<'_>) -> bool + '_ {
    move |node| node.has_function_tag(tag)
}

/// Predicate: full label starts with `prefix` (`NP-SBJ` matches `NP-SBJ-2`)
pub fn label_starts_with(prefix: &str) -> impl Fn(NodeRef<'_>) -> bool + '_ {
    move |node| node.label().starts_with(prefix)
}

pub fn is_null_element(node: NodeRef<'_>) -> bool {
    node.has_tag(NULL_TAG)
}

/// True for the placeholders Penn Treebank uses for pro-drop subjects
///
/// Traces such as `*T*` or `*ICH*` and unindexed forms like `*1` are not
/// pro-drop placeholders.
pub fn is_prodrop_placeholder(word: &str) -> bool {
    PRODROP_WORD.is_match(word)
}

/// A null element whose placeholder is a pro-drop placeholder
pub fn is_prodrop_marker(node: NodeRef<'_>) -> bool {
    is_null_element(node) && node.word().is_some_and(is_prodrop_placeholder)
}

/// The subject phrase a null element stands in for
///
/// Nearest subject-tagged ancestor first, then a subject-tagged sibling.
pub fn null_subject_phrase(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    if !is_null_element(node) {
        return None;
    }
    node.nearest_ancestor(function_tag_is(SUBJECT_FUNCTION))
        .or_else(|| node.siblings().find(|s| s.has_function_tag(SUBJECT_FUNCTION)))
}

/// A null element with a subject-tagged ancestor or sibling
pub fn is_null_subject(node: NodeRef<'_>) -> bool {
    null_subject_phrase(node).is_some()
}

/// True if `tag` starts with one of the verb tag prefixes
pub fn is_verb_tag<S: AsRef<str>>(tag: &str, prefixes: &[S]) -> bool {
    prefixes.iter().any(|p| tag.starts_with(p.as_ref()))
}

/// The verb terminal heading `node`
///
/// A verb terminal is its own verb; otherwise the first terminal child with
/// a verb tag.
pub fn verb_leaf<'t, S: AsRef<str>>(node: NodeRef<'t>, prefixes: &[S]) -> Option<NodeRef<'t>> {
    if node.is_terminal() {
        return is_verb_tag(node.tag(), prefixes).then_some(node);
    }
    node.children()
        .find(|child| child.is_terminal() && is_verb_tag(child.tag(), prefixes))
}

/// The verb a subject phrase belongs to
///
/// The subject's own clause is searched before any enclosing `VP`, so a
/// subject-initial clause embedded under another verb keeps its own verb.
pub fn governing_verb<'t, S: AsRef<str>>(
    subject: NodeRef<'t>,
    prefixes: &[S],
) -> Option<NodeRef<'t>> {
    subject
        .preceding_siblings()
        .find(|sib| sib.is_terminal() && is_verb_tag(sib.tag(), prefixes))
        .or_else(|| {
            subject
                .following_siblings()
                .filter(|sib| sib.has_tag(VP_TAG))
                .find_map(|vp| verb_leaf(vp, prefixes))
        })
        .or_else(|| {
            subject
                .nearest_ancestor(tag_is(VP_TAG))
                .and_then(|vp| verb_leaf(vp, prefixes))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::parse_tree;
    use crate::tree::Tree;

    const ARABIC_VERBS: [&str; 4] = ["IV", "PV", "VERB", "PSEUDO_VERB"];

    fn tree(text: &str) -> Tree {
        parse_tree(text, "q:1").unwrap()
    }

    #[test]
    fn test_placeholder_pattern() {
        for ok in ["*", "*-1", "*-10", "*-123"] {
            assert!(is_prodrop_placeholder(ok), "{ok}");
        }
        for bad in ["*T*", "*ICH*", "Wivs", "123", "", "*1", "0"] {
            assert!(!is_prodrop_placeholder(bad), "{bad}");
        }
    }

    #[test]
    fn test_predicate_constructors() {
        let t = tree("(S (NP-SBJ-2 (NN a)) (VP (VBD b)))");
        assert_eq!(t.find_all(tag_is("NP")).count(), 1);
        assert_eq!(t.find_all(function_tag_is("SBJ")).count(), 1);
        assert_eq!(t.find_all(label_starts_with("NP-SBJ")).count(), 1);
        assert_eq!(t.find_all(tag_is("ADJP")).count(), 0);
    }

    #[test]
    fn test_null_subject_under_ancestor() {
        let t = tree("(S (NP-SBJ (-NONE- *)) (VP (VBD wrote) (NP (NN letter))))");
        let null = t.find_all(is_null_element).next().unwrap();

        assert!(is_null_subject(null));
        assert!(is_prodrop_marker(null));
        assert_eq!(null_subject_phrase(null).unwrap().label(), "NP-SBJ");
    }

    #[test]
    fn test_null_subject_via_sibling() {
        let t = tree("(S (-NONE- *) (NP-SBJ (NN x)) (VP (VB y)))");
        let null = t.find_all(is_null_element).next().unwrap();
        assert_eq!(null_subject_phrase(null).unwrap().label(), "NP-SBJ");
    }

    #[test]
    fn test_null_object_is_not_subject() {
        let t = tree("(S (NP-SBJ (NN I)) (VP (VB saw) (NP (-NONE- *T*-1))))");
        let null = t.find_all(is_null_element).next().unwrap();
        assert!(!is_null_subject(null));
        assert!(!is_prodrop_marker(null));
        // only null elements stand in for subjects
        let noun = t.leaves().next().unwrap();
        assert!(null_subject_phrase(noun).is_none());
    }

    #[test]
    fn test_governing_verb_verb_initial() {
        let t = tree(
            "(TOP (S (VP (PV+PVSUFF_SUBJ:3MS qAl) (NP-SBJ (-NONE- *)) (NP-OBJ (NOUN x)))))",
        );
        let subject = t.find_all(function_tag_is("SBJ")).next().unwrap();
        let verb = governing_verb(subject, &ARABIC_VERBS).unwrap();
        assert_eq!(verb.word(), Some("qAl"));
    }

    #[test]
    fn test_governing_verb_through_vp_ancestor() {
        let t = tree("(S (VP (IV yqwl) (S (NP-SBJ (NOUN x)) (ADJP (ADJ y)))))");
        let subject = t.find_all(function_tag_is("SBJ")).next().unwrap();
        let verb = governing_verb(subject, &ARABIC_VERBS).unwrap();
        assert_eq!(verb.word(), Some("yqwl"));
    }

    #[test]
    fn test_governing_verb_subject_initial() {
        let t = tree("(S (NP-SBJ (-NONE- *)) (VP (VBD wrote) (NP (NN letter))))");
        let subject = t.find_all(function_tag_is("SBJ")).next().unwrap();

        assert!(governing_verb(subject, &ARABIC_VERBS).is_none());
        let verb = governing_verb(subject, &["VB"]).unwrap();
        assert_eq!(verb.word(), Some("wrote"));
        assert_eq!(verb.parent().unwrap().tag(), "VP");
    }

    #[test]
    fn test_governing_verb_embedded_clause() {
        let t = tree(
            "(TOP (S (VP (PV+PVSUFF_SUBJ:3MS qAl) (NP-SBJ (-NONE- *)) (SBAR (SUB_CONJ <in) \
             (S (NP-SBJ (DET+NOUN Al+wzyr)) (VP (IV3MS+IV+IVSUFF_MOOD:I yzwr) (NP-OBJ (NOUN_PROP lbnAn))))))))",
        );
        let verbs: Vec<_> = t
            .find_all(function_tag_is("SBJ"))
            .map(|s| governing_verb(s, &ARABIC_VERBS).and_then(NodeRef::word))
            .collect();
        assert_eq!(verbs, vec![Some("qAl"), Some("yzwr")]);
    }

    #[test]
    fn test_governing_verb_first_in_document_order() {
        let t = tree("(S (VP (PV a) (PV b) (NP-SBJ (NOUN c))))");
        let subject = t.find_all(function_tag_is("SBJ")).next().unwrap();
        assert_eq!(governing_verb(subject, &ARABIC_VERBS).unwrap().word(), Some("a"));
    }

    #[test]
    fn test_verb_leaf() {
        let t = tree("(VP (PRT (NEG_PART lA)) (IV3MS+IV ydrs))");
        assert_eq!(verb_leaf(t.root(), &ARABIC_VERBS).unwrap().word(), Some("ydrs"));
        let neg = t.leaves().next().unwrap();
        assert!(verb_leaf(neg, &ARABIC_VERBS).is_none());
        assert!(is_verb_tag("PSEUDO_VERB", &ARABIC_VERBS));
        assert!(!is_verb_tag("NOUN", &ARABIC_VERBS));
    }
}
