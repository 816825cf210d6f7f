//! Text and CSV reports
//!
//! [`ReportWriter`] lays out statistics in fixed-width text; the free
//! functions below write the standard reports for the analyzers.

use crate::analysis::{CombinedAnalyzer, SubjectVerbAnalyzer};
use std::fmt::Display;
use std::io::{self, Write};

/// Width of the right-aligned number column
const NUMBER_WIDTH: usize = 5;

/// Header row of the verb table
pub const CSV_HEADER: [&str; 3] = ["VERB", "PRO-DROP COUNT", "NON-PRO-DROP COUNT"];

/// Writes formatted report lines for simple values and collections
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn blank_line(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// `    n - description`
    pub fn int_stat(&mut self, description: &str, n: usize) -> io::Result<()> {
        writeln!(self.out, "{n:>NUMBER_WIDTH$} - {description}")
    }

    /// `n` with one decimal, right-aligned so that number and suffix fill the column
    pub fn float_stat(&mut self, description: &str, n: f64, suffix: &str) -> io::Result<()> {
        let width = NUMBER_WIDTH.saturating_sub(suffix.chars().count());
        writeln!(self.out, "{n:>width$.1}{suffix} - {description}")
    }

    /// Blank line, the heading, then an `=` underline of the same length
    pub fn heading(&mut self, heading: &str) -> io::Result<()> {
        let rule = "=".repeat(heading.chars().count());
        write!(self.out, "\n{heading}\n{rule}\n")
    }

    /// Heading over- and underlined with `=`, followed by a blank line
    pub fn toplevel_heading(&mut self, heading: &str) -> io::Result<()> {
        let rule = "=".repeat(heading.chars().count());
        write!(self.out, "{rule}\n{heading}\n{rule}\n\n")
    }

    /// Counts as `  count  :  key`, highest count first, ties by key
    pub fn counts<'a, K, I>(&mut self, heading: &str, counts: I) -> io::Result<()>
    where
        K: AsRef<str> + 'a,
        I: IntoIterator<Item = (&'a K, &'a usize)>,
    {
        self.heading(heading)?;

        let mut rows: Vec<(&str, usize)> = counts
            .into_iter()
            .map(|(key, n)| (key.as_ref(), *n))
            .collect();
        rows.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        for (key, n) in rows {
            writeln!(self.out, "{n:>NUMBER_WIDTH$}  :  {key}")?;
        }
        Ok(())
    }

    /// One indented item per line under a heading
    pub fn sequence<T, I>(&mut self, heading: &str, items: I) -> io::Result<()>
    where
        T: Display,
        I: IntoIterator<Item = T>,
    {
        self.heading(heading)?;
        for item in items {
            writeln!(self.out, "  {item}")?;
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Summary statistics of one analyzer
pub fn write_basic<W: Write>(rw: &mut ReportWriter<W>, analyzer: &SubjectVerbAnalyzer) -> io::Result<()> {
    let sd = analyzer.descriptor();
    let stats = analyzer.stats();

    rw.int_stat("Trees searched", stats.tree_count)?;
    rw.int_stat(&format!("Trees with at least 1 {sd}"), stats.trees_with_subject)?;
    rw.int_stat("Trees with failed verb lookup", stats.failed_lookups.len())?;

    rw.blank_line()?;
    rw.int_stat(&format!("Total {sd}s found"), stats.subject_count)?;
    rw.int_stat(
        &format!("{}s with associated verb found", capitalize(sd)),
        stats.subjects_with_verb,
    )?;
    rw.float_stat(
        &format!("Percent {sd}s with associated verb"),
        stats.verb_percentage(),
        "%",
    )?;

    rw.blank_line()?;
    rw.int_stat("Distinct associated verbs found", stats.verb_counts.len())?;
    rw.int_stat("Distinct excluded sibling tags", stats.ignored_tag_counts.len())
}

/// Basic statistics plus verb tags, ignored sibling tags, and verb counts
pub fn write_full<W: Write>(rw: &mut ReportWriter<W>, analyzer: &SubjectVerbAnalyzer) -> io::Result<()> {
    let sd = analyzer.descriptor();
    let stats = analyzer.stats();

    rw.toplevel_heading(&format!("{} VERB ASSOCIATION ANALYSIS REPORT", sd.to_uppercase()))?;
    write_basic(rw, analyzer)?;

    rw.sequence("Allowed verb tag bases", &analyzer.config().verb_tags)?;
    rw.counts(
        &format!("Sibling tags of {sd}s with no associated verb found"),
        &stats.ignored_tag_counts,
    )?;
    rw.counts("Verb occurrences", &stats.verb_counts)?;
    rw.sequence("Trees with failed verb lookup", &stats.failed_lookups)
}

/// How many units failed to parse, and why
pub fn write_failures<W: Write>(rw: &mut ReportWriter<W>, analyzer: &CombinedAnalyzer) -> io::Result<()> {
    let failures = analyzer.failures();

    rw.heading("Parse failures")?;
    rw.int_stat("Units read", analyzer.unit_count())?;
    rw.int_stat("Units that failed to parse", failures.len())?;
    for error in failures {
        writeln!(rw.out, "  {error}")?;
    }
    Ok(())
}

/// Basic statistics of both analyzers and the parse failures
pub fn write_combined_basic<W: Write>(
    rw: &mut ReportWriter<W>,
    analyzer: &CombinedAnalyzer,
) -> io::Result<()> {
    rw.toplevel_heading("Pro-drop Results")?;
    write_basic(rw, analyzer.prodrop())?;

    rw.blank_line()?;
    rw.toplevel_heading("Non-pro-drop Results")?;
    write_basic(rw, analyzer.overt())?;

    write_failures(rw, analyzer)
}

/// Full reports of both analyzers and the parse failures
pub fn write_combined_full<W: Write>(
    rw: &mut ReportWriter<W>,
    analyzer: &CombinedAnalyzer,
) -> io::Result<()> {
    write_full(rw, analyzer.prodrop())?;
    rw.blank_line()?;
    write_full(rw, analyzer.overt())?;
    write_failures(rw, analyzer)
}

/// Quote a CSV field when it holds a delimiter, quote, or line break
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Verb table as CSV: verb, pro-drop count, non-pro-drop count; sorted by verb
pub fn write_csv<W: Write>(mut out: W, analyzer: &CombinedAnalyzer) -> io::Result<()> {
    writeln!(out, "{}", CSV_HEADER.join(","))?;
    for (verb, counts) in analyzer.verb_table() {
        writeln!(out, "{},{},{}", csv_field(verb), counts.prodrop, counts.overt)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisConfig, SubjectKind};
    use crate::builder::parse_tree;
    use crate::corpus::UnitReader;
    use rustc_hash::FxHashMap;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut ReportWriter<Vec<u8>>) -> io::Result<()>,
    {
        let mut rw = ReportWriter::new(Vec::new());
        f(&mut rw).unwrap();
        String::from_utf8(rw.into_inner()).unwrap()
    }

    #[test]
    fn test_stat_lines() {
        assert_eq!(render(|rw| rw.int_stat("Trees searched", 42)), "   42 - Trees searched\n");
        assert_eq!(render(|rw| rw.float_stat("Percent", 57.14, "%")), "57.1% - Percent\n");
        assert_eq!(render(|rw| rw.float_stat("Percent", 5.0, "%")), " 5.0% - Percent\n");
        assert_eq!(render(|rw| rw.float_stat("Ratio", 0.5, "")), "  0.5 - Ratio\n");
    }

    #[test]
    fn test_headings() {
        assert_eq!(render(|rw| rw.heading("Verbs")), "\nVerbs\n=====\n");
        assert_eq!(
            render(|rw| rw.toplevel_heading("Results")),
            "=======\nResults\n=======\n\n"
        );
    }

    #[test]
    fn test_counts_sorted_by_value() {
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        counts.insert("qAl".to_string(), 3);
        counts.insert("kAn".to_string(), 12);
        counts.insert(">kd".to_string(), 3);

        assert_eq!(
            render(|rw| rw.counts("Verb occurrences", &counts)),
            "\nVerb occurrences\n================\n   12  :  kAn\n    3  :  >kd\n    3  :  qAl\n"
        );
    }

    #[test]
    fn test_sequence() {
        assert_eq!(
            render(|rw| rw.sequence("Tags", ["IV", "PV"])),
            "\nTags\n====\n  IV\n  PV\n"
        );
    }

    #[test]
    fn test_basic_report() {
        let tree = parse_tree("(S (VP (PV qAl) (NP-SBJ (-NONE- *))))", "r:1").unwrap();
        let mut analyzer = SubjectVerbAnalyzer::new(SubjectKind::ProDrop, AnalysisConfig::default());
        analyzer.analyze_tree(&tree);

        let expected = "    1 - Trees searched
    1 - Trees with at least 1 pro-drop
    0 - Trees with failed verb lookup

    1 - Total pro-drops found
    1 - Pro-drops with associated verb found
100.0% - Percent pro-drops with associated verb

    1 - Distinct associated verbs found
    0 - Distinct excluded sibling tags
";
        assert_eq!(render(|rw| write_basic(rw, &analyzer)), expected);
    }

    #[test]
    fn test_full_report_sections() {
        let tree = parse_tree("(S (NP-SBJ (NNP John)) (VP (VBD wrote)))", "r:1").unwrap();
        let mut analyzer = SubjectVerbAnalyzer::new(SubjectKind::Overt, AnalysisConfig::default());
        analyzer.analyze_tree(&tree);

        let report = render(|rw| write_full(rw, &analyzer));
        let title = "NON-PRO-DROP VERB ASSOCIATION ANALYSIS REPORT";
        let rule = "=".repeat(title.len());
        assert!(report.starts_with(&format!("{rule}\n{title}\n{rule}\n\n")));
        assert!(report.contains("\nAllowed verb tag bases\n"));
        assert!(report.contains("  PSEUDO_VERB\n"));
        assert!(report.contains("Sibling tags of non-pro-drops with no associated verb found"));
        assert!(report.contains("    1  :  wrote\n"));
    }

    #[test]
    fn test_combined_reports_list_failures() {
        let mut analyzer = CombinedAnalyzer::default();
        analyzer.analyze(UnitReader::from_string(
            "(S (VP (PV qAl) (NP-SBJ (-NONE- *))))\n(S (NP foo)\n",
            "f.parse",
        ));

        let basic = render(|rw| write_combined_basic(rw, &analyzer));
        assert!(basic.starts_with("================\nPro-drop Results\n"));
        assert!(basic.contains("Non-pro-drop Results"));
        assert!(basic.contains("    2 - Units read\n"));
        assert!(basic.contains("    1 - Units that failed to parse\n"));
        assert!(basic.contains("  unit f.parse:2: "));

        let full = render(|rw| write_combined_full(rw, &analyzer));
        assert!(full.contains("PRO-DROP VERB ASSOCIATION ANALYSIS REPORT"));
        assert!(full.contains("NON-PRO-DROP VERB ASSOCIATION ANALYSIS REPORT"));
        assert!(full.contains("Parse failures"));
    }

    #[test]
    fn test_csv() {
        let mut analyzer = CombinedAnalyzer::default();
        analyzer.analyze(UnitReader::from_string(
            "(S (VP (PV qAl) (NP-SBJ (-NONE- *))))
(S (VP (PV qAl) (NP-SBJ (NOUN x))))
(S (VP (PV a,b) (NP-SBJ (NOUN y))))
",
            "c",
        ));

        let mut out = Vec::new();
        write_csv(&mut out, &analyzer).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "VERB,PRO-DROP COUNT,NON-PRO-DROP COUNT\n\"a,b\",0,1\nqAl,1,1\n"
        );
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("qAl"), "qAl");
        assert_eq!(csv_field("say \"x\""), "\"say \"\"x\"\"\"");
        assert_eq!(csv_field("a\nb"), "\"a\nb\"");
    }
}
