//! Query language parser
//!
//! Parses node search queries into a [`NodePattern`] using a pest grammar.
//! A query is a comma-separated list of `field op "value"` constraints:
//!
//! | op   | meaning              |
//! |------|----------------------|
//! | `=`  | equal                |
//! | `!=` | not equal            |
//! | `^=` | starts with          |
//! | `*=` | contains             |
//! | `~`  | regex matches        |
//! | `!~` | regex does not match |
//!
//! Fields are `tag`, `label`, `word`, `function`, and `parent`. Inside a
//! value only `\"` is an escape; other backslashes are kept for regexes.

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::pattern::{Constraint, Field, Matcher, NodePattern};

#[derive(Parser)]
#[grammar = "query_grammar.pest"]
struct QueryParser;

/// Error type for query parsing failures
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query error: {0}")]
    ParseError(#[from] pest::error::Error<Rule>),

    #[error("Query error: Unknown field: {0}")]
    UnknownField(String),

    #[error("Query error: Invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Parse a query string into a NodePattern
pub fn parse_query(input: &str) -> Result<NodePattern, QueryError> {
    let mut pairs = QueryParser::parse(Rule::query, input)?;
    let mut pattern = NodePattern::new();

    let Some(query_pair) = pairs.next() else {
        return Ok(pattern);
    };

    for pair in query_pair.into_inner() {
        match pair.as_rule() {
            Rule::constraint => pattern.push(parse_constraint(pair)?),
            Rule::EOI => {} // End of input
            _ => {}
        }
    }

    Ok(pattern)
}

/// Parse a single constraint: field op "value"
fn parse_constraint(pair: pest::iterators::Pair<Rule>) -> Result<Constraint, QueryError> {
    let mut inner = pair.into_inner();

    // The grammar guarantees all three parts
    let (Some(field_pair), Some(op_pair), Some(value_pair)) =
        (inner.next(), inner.next(), inner.next())
    else {
        unreachable!("constraint rule always has field, operator, and value");
    };

    let field = parse_field(field_pair.as_str())?;
    let value = unescape(value_pair.into_inner().as_str());

    let (matcher, negated) = match op_pair.as_str() {
        "=" => (Matcher::Exact(value), false),
        "!=" => (Matcher::Exact(value), true),
        "^=" => (Matcher::StartsWith(value), false),
        "*=" => (Matcher::Contains(value), false),
        "~" => (Matcher::regex(&value)?, false),
        "!~" => (Matcher::regex(&value)?, true),
        other => unreachable!("grammar admitted operator {other}"),
    };

    let constraint = Constraint::new(field, matcher);
    Ok(if negated {
        constraint.negate()
    } else {
        constraint
    })
}

fn parse_field(name: &str) -> Result<Field, QueryError> {
    match name {
        "tag" => Ok(Field::Tag),
        "label" => Ok(Field::Label),
        "word" => Ok(Field::Word),
        "function" => Ok(Field::Function),
        "parent" => Ok(Field::Parent),
        _ => Err(QueryError::UnknownField(name.to_string())),
    }
}

fn unescape(raw: &str) -> String {
    raw.replace("\\\"", "\"")
}
