//! Iterators for trees and matches
//!
//! Provides collection interfaces for:
//! - Iterating over trees from a string, file, directory, or glob pattern
//! - Searching node patterns across all of those trees
//! - Sequential and parallel iteration via standard traits
//!
//! All iterators are `Send`, so they can be fed to
//! `pariter::IteratorExt::parallel_map`.

use crate::builder::TreeError;
use crate::corpus::{CorpusError, UnitReader, is_parse_file};
use crate::pattern::NodePattern;
use crate::tree::{NodeId, NodeRef, Tree};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Boxed iterator over per-unit parse results
pub type Units = Box<dyn Iterator<Item = Result<Tree, TreeError>> + Send>;

/// Source of trees for a collection
#[derive(Debug, Clone)]
enum TreeSource {
    /// In-memory bracketed text with the name used in unit ids
    String { name: String, text: String },
    /// Single file path
    File(PathBuf),
    /// Multiple file paths (from a directory, glob, or explicit paths)
    Files(Vec<PathBuf>),
}

/// Collection of trees from a string, file, directory, or glob pattern
///
/// Trees are parsed lazily on every pass. [`Treebank::units`] yields every
/// parse result; [`Treebank::trees`] and plain iteration yield only the trees
/// that parsed, logging the rest. Unreadable files are logged and skipped.
///
/// # Examples
///
/// ```no_run
/// use prodrop::Treebank;
/// use pariter::IteratorExt as _;
///
/// // Sequential iteration
/// let trees = Treebank::from_file("ann_0001.parse");
/// for tree in trees {
///     println!("{}: {}", tree.unit_id(), tree.sentence_text());
/// }
///
/// // Parallel iteration
/// let count = Treebank::from_glob("data/*.parse")
///     .unwrap()
///     .into_iter()
///     .parallel_map(|tree| tree.node_count())
///     .count();
/// ```
#[derive(Debug, Clone)]
pub struct Treebank {
    source: TreeSource,
}

impl Treebank {
    /// Create from in-memory bracketed text; `name` prefixes the unit ids
    pub fn from_string(text: &str, name: &str) -> Self {
        Self {
            source: TreeSource::String {
                name: name.to_string(),
                text: text.to_string(),
            },
        }
    }

    /// Create from a single file path
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            source: TreeSource::File(path.as_ref().to_path_buf()),
        }
    }

    /// Create from every `.parse` (or `.parse.gz`) file directly inside `dir`
    ///
    /// Not recursive. The extension check ignores case; files are sorted.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| CorpusError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut file_paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_parse_file(path))
            .collect();
        file_paths.sort();
        debug!("{}: {} treebank files", dir.display(), file_paths.len());

        Ok(Self::from_paths(file_paths))
    }

    /// Create from a glob pattern
    ///
    /// Files are processed in sorted order for deterministic results.
    pub fn from_glob(pattern: &str) -> Result<Self, CorpusError> {
        let mut file_paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        file_paths.sort();
        Ok(Self::from_paths(file_paths))
    }

    /// Create from explicit file paths
    pub fn from_paths(file_paths: Vec<PathBuf>) -> Self {
        Self {
            source: TreeSource::Files(file_paths),
        }
    }

    /// Create from a file, a directory, or a glob pattern, whichever `input` names
    pub fn from_path(input: &str) -> Result<Self, CorpusError> {
        let path = Path::new(input);
        let treebank = if path.is_file() {
            Self::from_file(path)
        } else if path.is_dir() {
            Self::from_dir(path)?
        } else {
            Self::from_glob(input)?
        };

        if treebank.paths().is_empty() {
            return Err(CorpusError::NotFound(input.to_string()));
        }
        Ok(treebank)
    }

    /// Files this treebank reads; empty for in-memory text
    pub fn paths(&self) -> &[PathBuf] {
        match &self.source {
            TreeSource::String { .. } => &[],
            TreeSource::File(path) => std::slice::from_ref(path),
            TreeSource::Files(paths) => paths,
        }
    }

    /// Every unit's parse result, failures included, in source order
    pub fn units(&self) -> Units {
        match self.source.clone() {
            TreeSource::String { name, text } => {
                Box::new(UnitReader::from_reader(std::io::Cursor::new(text), &name))
            }
            TreeSource::File(path) => open_file_units(path),
            TreeSource::Files(paths) => Box::new(paths.into_iter().flat_map(open_file_units)),
        }
    }

    /// Successfully parsed trees; failed units are logged and skipped
    pub fn trees(&self) -> Box<dyn Iterator<Item = Arc<Tree>> + Send> {
        Box::new(self.units().filter_map(|result| match result {
            Ok(tree) => Some(Arc::new(tree)),
            Err(e) => {
                warn!("Skipping {e}");
                None
            }
        }))
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Arc<Tree>> + Send> {
        self.trees()
    }

    /// Nodes matching `pattern` across every tree
    pub fn search(&self, pattern: &NodePattern) -> MatchSet {
        MatchSet::new(self, pattern)
    }
}

impl IntoIterator for Treebank {
    type Item = Arc<Tree>;
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + Send>;

    fn into_iter(self) -> Self::IntoIter {
        self.trees()
    }
}

/// Collection of matches from a Treebank and pattern
///
/// Yields each matching node as its tree plus node id, in document order
/// within a tree and source order across trees.
///
/// # Examples
///
/// ```no_run
/// use prodrop::{MatchSet, Treebank, parse_query};
/// use pariter::IteratorExt as _;
///
/// let pattern = parse_query(r#"tag="-NONE-", parent^="NP-SBJ""#).unwrap();
/// let treebank = Treebank::from_dir("data").unwrap();
///
/// for (tree, id) in MatchSet::new(&treebank, &pattern) {
///     println!("{}: {}", tree.unit_id(), tree.node(id).unwrap());
/// }
///
/// let count = treebank
///     .search(&pattern)
///     .into_iter()
///     .parallel_map(|m| m)
///     .count();
/// ```
#[derive(Debug, Clone)]
pub struct MatchSet {
    treebank: Treebank,
    pattern: NodePattern,
}

impl MatchSet {
    /// Create from a Treebank and pattern
    pub fn new(treebank: &Treebank, pattern: &NodePattern) -> Self {
        Self {
            treebank: treebank.clone(),
            pattern: pattern.clone(),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = (Arc<Tree>, NodeId)> + Send> {
        self.clone().into_iter()
    }
}

impl IntoIterator for MatchSet {
    type Item = (Arc<Tree>, NodeId);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + Send>;

    fn into_iter(self) -> Self::IntoIter {
        let pattern = self.pattern;
        let iter = self.treebank.trees().flat_map(move |tree| {
            let ids: Vec<NodeId> = tree.search(&pattern).map(NodeRef::id).collect();
            ids.into_iter().map(move |id| (tree.clone(), id))
        });
        Box::new(iter)
    }
}

/// Helper: Open a file and return an iterator over its units
///
/// Logs file open errors and returns an empty iterator on error.
fn open_file_units(path: PathBuf) -> Units {
    match UnitReader::from_file(&path) {
        Ok(reader) => Box::new(reader),
        Err(e) => {
            warn!("Skipping file: {e}");
            Box::new(std::iter::empty())
        }
    }
}
