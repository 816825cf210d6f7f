//! Lexical scanning of bracketed tree text
//!
//! Splits one Penn Treebank unit into parentheses, labels, and words.
//! Scanning is purely lexical and never fails: bracket balance and node
//! well-formedness are checked by the builder.

use std::iter::FusedIterator;

/// Kind of a lexical token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Open,
    Close,
    /// Text run immediately following an opening parenthesis
    Label(&'a str),
    /// Any other text run
    Word(&'a str),
}

/// A token together with its byte offset in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub offset: usize,
}

/// Lazy token stream over a borrowed unit of text
///
/// Single pass; call [`tokenize`] again to restart.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
    after_open: bool,
}

/// Tokenize a bracketed tree unit
pub fn tokenize(text: &str) -> Tokenizer<'_> {
    Tokenizer {
        text,
        pos: 0,
        after_open: false,
    }
}

#[inline]
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == '(' || c == ')'
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let trimmed = rest.trim_start();
        let offset = self.pos + (rest.len() - trimmed.len());

        let Some(first) = trimmed.chars().next() else {
            self.pos = self.text.len();
            return None;
        };

        let kind = match first {
            '(' => {
                self.pos = offset + 1;
                self.after_open = true;
                return Some(Token {
                    kind: TokenKind::Open,
                    offset,
                });
            }
            ')' => {
                self.pos = offset + 1;
                TokenKind::Close
            }
            _ => {
                let len = trimmed.find(is_delimiter).unwrap_or(trimmed.len());
                let run = &trimmed[..len];
                self.pos = offset + len;
                if self.after_open {
                    TokenKind::Label(run)
                } else {
                    TokenKind::Word(run)
                }
            }
        };

        self.after_open = false;
        Some(Token { kind, offset })
    }
}

impl FusedIterator for Tokenizer<'_> {}
