//! Subject/verb analysis
//!
//! Finds subject phrases, classifies each one as pro-drop (only a null
//! placeholder stands in for it) or overt (it has surface words), and links it
//! to the verb it belongs to. [`SubjectVerbAnalyzer`] gathers statistics for
//! one kind of subject; [`CombinedAnalyzer`] runs both kinds in a single pass
//! over a corpus and builds the per-verb table.

use crate::builder::TreeError;
use crate::query::{SUBJECT_FUNCTION, governing_verb, is_prodrop_marker};
use crate::tree::{NodeRef, Tree};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

/// Base tags of phrases that can be subjects
pub const DEFAULT_SUBJECT_TAGS: [&str; 1] = ["NP"];

/// Verb tag prefixes used when none are configured
///
/// The Arabic Treebank verb tags plus the English `VB*` family.
pub const DEFAULT_VERB_TAGS: [&str; 5] = ["IV", "PV", "VERB", "PSEUDO_VERB", "VB"];

/// How a subject phrase is realised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    /// Elided; only a `*` or `*-N` null element marks it
    ProDrop,
    /// Has surface words
    Overt,
}

impl SubjectKind {
    /// Name used in reports
    pub fn descriptor(self) -> &'static str {
        match self {
            SubjectKind::ProDrop => "pro-drop",
            SubjectKind::Overt => "non-pro-drop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// A tag starting with any of these marks a verb terminal
    pub verb_tags: Vec<String>,
    /// Function tag identifying subject phrases
    pub subject_function: String,
    /// Base tags a subject phrase may have; clausal `S-SBJ` is left out by default
    pub subject_tags: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            verb_tags: DEFAULT_VERB_TAGS.iter().map(|t| t.to_string()).collect(),
            subject_function: SUBJECT_FUNCTION.to_string(),
            subject_tags: DEFAULT_SUBJECT_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_verb_tags<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
        self.verb_tags = tags.iter().map(|t| t.as_ref().to_string()).collect();
        self
    }

    pub fn with_subject_tags<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
        self.subject_tags = tags.iter().map(|t| t.as_ref().to_string()).collect();
        self
    }
}

/// Classify a subject phrase
///
/// Pro-drop needs the placeholder as a direct child. `None` for phrases that
/// are neither, such as a lone `*T*` trace.
pub fn classify_subject(subject: NodeRef<'_>) -> Option<SubjectKind> {
    if !subject.yield_text().is_empty() {
        Some(SubjectKind::Overt)
    } else if subject.children().any(is_prodrop_marker) {
        Some(SubjectKind::ProDrop)
    } else {
        None
    }
}

/// Subject phrases in document order: a configured base tag plus the subject
/// function tag
pub fn subjects<'t>(
    tree: &'t Tree,
    config: &'t AnalysisConfig,
) -> impl Iterator<Item = NodeRef<'t>> + 't {
    tree.find_all(move |node| {
        node.has_function_tag(&config.subject_function)
            && config.subject_tags.iter().any(|tag| node.has_tag(tag))
    })
}

/// Counters gathered by a [`SubjectVerbAnalyzer`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectStats {
    pub tree_count: usize,
    pub trees_with_subject: usize,
    pub subject_count: usize,
    pub subjects_with_verb: usize,
    /// Occurrences of each associated verb word
    pub verb_counts: FxHashMap<String, usize>,
    /// Tags of the preceding siblings of subjects with no verb found
    pub ignored_tag_counts: FxHashMap<String, usize>,
    /// Units with at least one failed verb lookup, in analysis order
    pub failed_lookups: Vec<String>,
}

impl SubjectStats {
    /// Share of subjects with an associated verb, 0 when there are no subjects
    pub fn verb_percentage(&self) -> f64 {
        if self.subject_count == 0 {
            0.0
        } else {
            100.0 * self.subjects_with_verb as f64 / self.subject_count as f64
        }
    }
}

/// Gathers subject and verb statistics for one [`SubjectKind`]
#[derive(Debug, Clone)]
pub struct SubjectVerbAnalyzer {
    kind: SubjectKind,
    config: AnalysisConfig,
    stats: SubjectStats,
}

impl SubjectVerbAnalyzer {
    pub fn new(kind: SubjectKind, config: AnalysisConfig) -> Self {
        Self {
            kind,
            config,
            stats: SubjectStats::default(),
        }
    }

    pub fn kind(&self) -> SubjectKind {
        self.kind
    }

    pub fn descriptor(&self) -> &'static str {
        self.kind.descriptor()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn stats(&self) -> &SubjectStats {
        &self.stats
    }

    pub fn reset(&mut self) {
        self.stats = SubjectStats::default();
    }

    /// Analyze one tree, returning the verb word of every subject that has one
    ///
    /// A verb appears once per subject it governs.
    pub fn analyze_tree(&mut self, tree: &Tree) -> Vec<String> {
        let kind = self.kind;
        let config = &self.config;
        let stats = &mut self.stats;

        stats.tree_count += 1;
        let mut has_subject = false;
        let mut lookup_failed = false;
        let mut verbs = Vec::new();

        for subject in subjects(tree, config)
            .filter(|s| classify_subject(*s) == Some(kind))
        {
            has_subject = true;
            stats.subject_count += 1;

            match governing_verb(subject, &config.verb_tags).and_then(NodeRef::word) {
                Some(word) => {
                    stats.subjects_with_verb += 1;
                    *stats.verb_counts.entry(word.to_string()).or_default() += 1;
                    verbs.push(word.to_string());
                }
                None => {
                    for sibling in subject.preceding_siblings() {
                        *stats
                            .ignored_tag_counts
                            .entry(sibling.tag().to_string())
                            .or_default() += 1;
                    }
                    lookup_failed = true;
                }
            }
        }

        if has_subject {
            stats.trees_with_subject += 1;
        }
        if lookup_failed {
            debug!("{}: no verb for a {} subject", tree.unit_id(), kind.descriptor());
            stats.failed_lookups.push(tree.unit_id().to_string());
        }

        verbs
    }
}

/// Per-verb association counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerbCounts {
    pub prodrop: usize,
    pub overt: usize,
}

/// Pro-drop and overt analysis in one pass, plus the per-verb table
#[derive(Debug, Clone)]
pub struct CombinedAnalyzer {
    prodrop: SubjectVerbAnalyzer,
    overt: SubjectVerbAnalyzer,
    verbs: FxHashMap<String, VerbCounts>,
    failures: Vec<TreeError>,
}

impl Default for CombinedAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl CombinedAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            prodrop: SubjectVerbAnalyzer::new(SubjectKind::ProDrop, config.clone()),
            overt: SubjectVerbAnalyzer::new(SubjectKind::Overt, config),
            verbs: FxHashMap::default(),
            failures: Vec::new(),
        }
    }

    pub fn prodrop(&self) -> &SubjectVerbAnalyzer {
        &self.prodrop
    }

    pub fn overt(&self) -> &SubjectVerbAnalyzer {
        &self.overt
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.prodrop.config()
    }

    pub fn analyze_tree(&mut self, tree: &Tree) {
        for verb in self.prodrop.analyze_tree(tree) {
            self.verbs.entry(verb).or_default().prodrop += 1;
        }
        for verb in self.overt.analyze_tree(tree) {
            self.verbs.entry(verb).or_default().overt += 1;
        }
    }

    /// Keep a unit that failed to parse for the failure report
    pub fn record_failure(&mut self, error: TreeError) {
        warn!("Skipping {error}");
        self.failures.push(error);
    }

    /// Analyze every unit; parse failures are recorded, not fatal
    pub fn analyze<I>(&mut self, units: I)
    where
        I: IntoIterator<Item = Result<Tree, TreeError>>,
    {
        info!("Starting combined analysis");
        for unit in units {
            match unit {
                Ok(tree) => self.analyze_tree(&tree),
                Err(e) => self.record_failure(e),
            }
        }
        info!(
            "Analysis complete: {} trees, {} failed units, {} distinct verbs",
            self.prodrop.stats().tree_count,
            self.failures.len(),
            self.verbs.len()
        );
    }

    pub fn reset(&mut self) {
        self.prodrop.reset();
        self.overt.reset();
        self.verbs.clear();
        self.failures.clear();
    }

    pub fn verb_counts(&self, verb: &str) -> Option<VerbCounts> {
        self.verbs.get(verb).copied()
    }

    /// Every associated verb with its counts, sorted by verb
    pub fn verb_table(&self) -> Vec<(&str, VerbCounts)> {
        let mut table: Vec<_> = self
            .verbs
            .iter()
            .map(|(verb, counts)| (verb.as_str(), *counts))
            .collect();
        table.sort_unstable_by(|a, b| a.0.cmp(b.0));
        table
    }

    /// Units that failed to parse, in input order
    pub fn failures(&self) -> &[TreeError] {
        &self.failures
    }

    /// Units seen, parsed or not
    pub fn unit_count(&self) -> usize {
        self.prodrop.stats().tree_count + self.failures.len()
    }
}
