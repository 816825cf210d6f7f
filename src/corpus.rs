//! Treebank file reading
//!
//! Splits `.parse` files into bracketed units and parses each one into a
//! [`Tree`]. A unit starts at an opening parenthesis at depth zero and ends at
//! its matching close; text between units is ignored. Units may span any
//! number of lines, blank ones included. A line starting with `(TOP ` while a
//! unit is still open ends that unit early, so a missing close only costs the
//! one unit.
//!
//! Units are numbered from 1 within their source, giving unit ids like
//! `ann_0001.parse:3`.
//!
//! Malformed units surface as per-unit [`TreeError`]s; reading carries on
//! with the next unit.

use crate::builder::{TreeError, parse_tree};
use crate::tree::Tree;
use flate2::read::MultiGzDecoder;
use log::warn;
use memchr::memchr2_iter;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, ErrorKind, Lines};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error locating or opening treebank input
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("no treebank files found for {0}")]
    NotFound(String),
}

/// Start of a line that always begins a new unit
pub const UNIT_START: &str = "(TOP ";

/// True for `.gz` paths
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// True for `.parse` and `.parse.gz` paths, case-insensitively
pub fn is_parse_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.ends_with(".parse") || name.ends_with(".parse.gz")
}

/// Unit reader that iterates over the trees of one source
pub struct UnitReader<R: BufRead> {
    lines: Lines<R>,
    source: String,
    line_num: usize,
    unit_count: usize,
    depth: usize,
    current: String,
    ready: VecDeque<String>,
    exhausted: bool,
}

impl UnitReader<Box<dyn BufRead + Send>> {
    /// Create a reader from a file path; `.gz` files are decompressed
    pub fn from_file(path: &Path) -> Result<Self, CorpusError> {
        let file = File::open(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader: Box<dyn BufRead + Send> = if is_gzip(path) {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::from_reader(reader, &path.display().to_string()))
    }
}

impl UnitReader<Cursor<String>> {
    /// Create a reader from a string
    pub fn from_string(text: &str, source: &str) -> Self {
        Self::from_reader(Cursor::new(text.to_string()), source)
    }
}

impl<R: BufRead> UnitReader<R> {
    pub fn from_reader(reader: R, source: &str) -> Self {
        Self {
            lines: reader.lines(),
            source: source.to_string(),
            line_num: 0,
            unit_count: 0,
            depth: 0,
            current: String::new(),
            ready: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Name of the source used in unit ids
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Next raw unit as `(unit_id, text)`, without parsing it
    pub fn next_unit(&mut self) -> Option<(String, String)> {
        while self.ready.is_empty() && !self.exhausted {
            self.line_num += 1;
            match self.lines.next() {
                Some(Ok(line)) => self.feed_line(&line),
                // The offending line has been consumed; carry on with the next
                Some(Err(e)) if e.kind() == ErrorKind::InvalidData => {
                    warn!("{}: skipping line {}: {}", self.source, self.line_num, e);
                }
                Some(Err(e)) => {
                    warn!(
                        "{}: read error at line {}, skipping rest of source: {}",
                        self.source, self.line_num, e
                    );
                    self.finish_source();
                }
                None => self.finish_source(),
            }
        }

        let text = self.ready.pop_front()?;
        self.unit_count += 1;
        Some((format!("{}:{}", self.source, self.unit_count), text))
    }

    /// Track bracket depth across one line, cutting out finished units
    fn feed_line(&mut self, line: &str) {
        if self.depth > 0 && line.starts_with(UNIT_START) {
            self.flush_unclosed();
        }

        let bytes = line.as_bytes();
        let mut seg_start = 0;

        for pos in memchr2_iter(b'(', b')', bytes) {
            if bytes[pos] == b'(' {
                if self.depth == 0 {
                    seg_start = pos;
                }
                self.depth += 1;
            } else if self.depth == 0 {
                // Stray close; hand it to the builder so it gets reported
                self.ready.push_back(")".to_string());
            } else {
                self.depth -= 1;
                if self.depth == 0 {
                    self.current.push_str(&line[seg_start..=pos]);
                    self.ready.push_back(std::mem::take(&mut self.current));
                    seg_start = pos + 1;
                }
            }
        }

        if self.depth > 0 {
            self.current.push_str(&line[seg_start..]);
            self.current.push('\n');
        }
    }

    /// An unclosed unit is still emitted so the builder reports it
    fn flush_unclosed(&mut self) {
        if self.depth > 0 && !self.current.trim().is_empty() {
            self.ready.push_back(std::mem::take(&mut self.current));
        }
        self.current.clear();
        self.depth = 0;
    }

    fn finish_source(&mut self) {
        self.exhausted = true;
        self.flush_unclosed();
    }
}

/// Raw `(unit_id, text)` units of an in-memory source
pub fn split_units(text: &str, source: &str) -> impl Iterator<Item = (String, String)> {
    let mut reader = UnitReader::from_string(text, source);
    std::iter::from_fn(move || reader.next_unit())
}

impl<R: BufRead> Iterator for UnitReader<R> {
    type Item = Result<Tree, TreeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (unit_id, text) = self.next_unit()?;
        Some(parse_tree(&text, &unit_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StructuralErrorKind;

    const TWO_UNITS: &str = "(TOP (S (NP-SBJ (-NONE- *))
   (VP (VBD wrote)
       (NP (NN letter)))))

(TOP (S (NP (NNP John)) (VP (VBZ sleeps))))
";

    #[test]
    fn test_read_units() {
        let mut reader = UnitReader::from_string(TWO_UNITS, "two.parse");

        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.unit_id(), "two.parse:1");
        assert_eq!(first.sentence_text(), "wrote letter");

        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.unit_id(), "two.parse:2");
        assert_eq!(second.sentence_text(), "John sleeps");

        assert!(reader.next().is_none());
    }

    #[test]
    fn test_units_sharing_a_line() {
        let text = "(A (b c)) (D (e f))\n(G (h i)) junk between (J (k l))";
        let ids: Vec<_> = UnitReader::from_string(text, "s")
            .map(|r| r.unwrap().root().tag().to_string())
            .collect();
        assert_eq!(ids, vec!["A", "D", "G", "J"]);
    }

    #[test]
    fn test_malformed_unit_does_not_stop_reading() {
        let text = "(TOP (S (NP (NN a)) (VP (VB b))\n(TOP (S (NP foo)))\n";
        let results: Vec<_> = UnitReader::from_string(text, "bad").collect();
        assert_eq!(results.len(), 2);
        match &results[0] {
            Err(TreeError::Structural { unit_id, kind, .. }) => {
                assert_eq!(unit_id, "bad:1");
                assert_eq!(*kind, StructuralErrorKind::UnclosedOpen(2));
            }
            other => panic!("Expected structural error, got {:?}", other),
        }
        assert_eq!(results[1].as_ref().unwrap().unit_id(), "bad:2");
        assert_eq!(results[1].as_ref().unwrap().sentence_text(), "foo");

        let text = "(S (NN) (VB b))\n(S (NP foo))\n";
        let results: Vec<_> = UnitReader::from_string(text, "bad").collect();
        assert_eq!(results.len(), 2);
        match &results[0] {
            Err(TreeError::Structural { unit_id, kind, .. }) => {
                assert_eq!(unit_id, "bad:1");
                assert_eq!(*kind, StructuralErrorKind::EmptyNode("NN".to_string()));
            }
            other => panic!("Expected structural error, got {:?}", other),
        }
        assert_eq!(results[1].as_ref().unwrap().sentence_text(), "foo");
    }

    #[test]
    fn test_blank_lines_inside_unit() {
        let text = "(TOP (S (NP-SBJ (NNP John))\n\n   (VP (VBD wrote))))\n";
        let results: Vec<_> = UnitReader::from_string(text, "p").collect();
        assert_eq!(results.len(), 1);
        let tree = results[0].as_ref().unwrap();
        assert_eq!(tree.unit_id(), "p:1");
        assert_eq!(tree.sentence_text(), "John wrote");
    }

    #[test]
    fn test_top_line_starts_new_unit() {
        // Only a line-initial `(TOP ` cuts an open unit short
        let text = "(TOP (S (NP foo)\n  (TOP (X y))\n(TOP (S (NP bar)))\n";
        let results: Vec<_> = UnitReader::from_string(text, "p").collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert_eq!(results[1].as_ref().unwrap().sentence_text(), "bar");
    }

    #[test]
    fn test_invalid_utf8_line_skipped() {
        let bytes = b"(A (b c))\n\xff\xfe\n(D (e f))\n".to_vec();
        let results: Vec<_> = UnitReader::from_reader(Cursor::new(bytes), "bin").collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().sentence_text(), "c");
        assert_eq!(results[1].as_ref().unwrap().sentence_text(), "f");
    }

    #[test]
    fn test_stray_close_reported() {
        let text = "(A (b c)))\n(D (e f))";
        let results: Vec<_> = UnitReader::from_string(text, "s").collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(TreeError::Structural {
                kind: StructuralErrorKind::UnbalancedClose,
                ..
            })
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_unclosed_unit_at_eof() {
        let text = "(S (NP (NN a))\n";
        let results: Vec<_> = UnitReader::from_string(text, "eof").collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(TreeError::Structural {
                kind: StructuralErrorKind::UnclosedOpen(1),
                ..
            })
        ));
    }

    #[test]
    fn test_raw_units() {
        let mut reader = UnitReader::from_string("x (A (b c))\n", "raw");
        assert_eq!(
            reader.next_unit(),
            Some(("raw:1".to_string(), "(A (b c))".to_string()))
        );
        assert_eq!(reader.next_unit(), None);
    }

    #[test]
    fn test_split_units() {
        let units: Vec<_> = split_units(TWO_UNITS, "two.parse").collect();
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].0, "two.parse:2");
        assert_eq!(units[1].1, "(TOP (S (NP (NNP John)) (VP (VBZ sleeps))))");
        assert!(units[0].1.starts_with("(TOP (S (NP-SBJ"));
    }

    #[test]
    fn test_file_extensions() {
        assert!(is_parse_file(Path::new("dir/ann_0001.parse")));
        assert!(is_parse_file(Path::new("ANN_0001.PARSE")));
        assert!(is_parse_file(Path::new("ann_0001.parse.gz")));
        assert!(!is_parse_file(Path::new("ann_0001.txt")));
        assert!(is_gzip(Path::new("a.parse.GZ")));
        assert!(!is_gzip(Path::new("a.parse")));
    }

    #[test]
    fn test_from_missing_file() {
        let err = UnitReader::from_file(Path::new("/nonexistent/x.parse")).err().unwrap();
        assert!(matches!(err, CorpusError::Io { .. }));
    }
}
