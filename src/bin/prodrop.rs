//! Command-line interface for prodrop
//!
//! Usage:
//!   prodrop analyze `<input>` [--full] [--report-dir `<dir>`] [--csv `<file>`] [--verb-tag `<tag>`]...
//!   prodrop search `<input>` `<query>` [--limit `<n>`]
//!   prodrop show `<input>` [--unit `<id>`]
//!
//! `<input>` is a `.parse` file, a directory of them, or a glob pattern.

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};
use log::{LevelFilter, debug, info};
use prodrop::report::{self, ReportWriter};
use prodrop::{AnalysisConfig, CombinedAnalyzer, Treebank, parse_query};
use simple_logger::SimpleLogger;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "prodrop", version, about = "Pro-drop subject analysis of Penn Treebank corpora")]
struct Cli {
    /// More log output; repeat for debug messages
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count pro-drop and overt subjects and their associated verbs
    Analyze {
        input: String,

        /// Print the full report instead of the summary
        #[arg(long)]
        full: bool,

        /// Write full reports and the verb table into this directory
        #[arg(long, value_name = "DIR")]
        report_dir: Option<PathBuf>,

        /// Write the verb table to this CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// Verb tag prefix; replaces the defaults when given
        #[arg(long = "verb-tag", value_name = "TAG")]
        verb_tags: Vec<String>,
    },

    /// Print every node matching a query such as `tag="-NONE-", parent^="NP-SBJ"`
    Search {
        input: String,
        query: String,

        /// Stop after this many matches
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the sentence of each unit, or one unit in bracket notation
    Show {
        input: String,

        /// Unit id such as `ann_0001.parse:3`
        #[arg(long)]
        unit: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    SimpleLogger::new().with_level(level).init()?;
    debug!("prodrop v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Analyze {
            input,
            full,
            report_dir,
            csv,
            verb_tags,
        } => analyze(&input, full, report_dir.as_deref(), csv.as_deref(), &verb_tags),
        Command::Search { input, query, limit } => search(&input, &query, limit),
        Command::Show { input, unit } => show(&input, unit.as_deref()),
    }
}

fn open_treebank(input: &str) -> anyhow::Result<Treebank> {
    let treebank = Treebank::from_path(input)?;
    info!("{}: {} files", input, treebank.paths().len());
    Ok(treebank)
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("failed to create `{}`", path.display()))?;
    Ok(BufWriter::new(file))
}

fn analyze(
    input: &str,
    full: bool,
    report_dir: Option<&Path>,
    csv: Option<&Path>,
    verb_tags: &[String],
) -> anyhow::Result<()> {
    let treebank = open_treebank(input)?;
    let config = if verb_tags.is_empty() {
        AnalysisConfig::default()
    } else {
        AnalysisConfig::default().with_verb_tags(verb_tags)
    };

    let start = Instant::now();
    let mut analyzer = CombinedAnalyzer::new(config);
    analyzer.analyze(treebank.units());

    let mut rw = ReportWriter::new(io::stdout().lock());
    if full {
        report::write_combined_full(&mut rw, &analyzer)?;
    } else {
        report::write_combined_basic(&mut rw, &analyzer)?;
    }

    if let Some(dir) = report_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create `{}`", dir.display()))?;

        for sub in [analyzer.prodrop(), analyzer.overt()] {
            let path = dir.join(format!("{} report.txt", sub.descriptor()));
            let mut file_rw = ReportWriter::new(create(&path)?);
            report::write_full(&mut file_rw, sub)?;
            report::write_failures(&mut file_rw, &analyzer)?;
            file_rw.into_inner().flush()?;
            info!("Wrote {}", path.display());
        }

        let path = dir.join("verbs.csv");
        report::write_csv(create(&path)?, &analyzer)?;
        info!("Wrote {}", path.display());
    }

    if let Some(path) = csv {
        report::write_csv(create(path)?, &analyzer)?;
        info!("Wrote {}", path.display());
    }

    println!("\nTime: {:.3}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn search(input: &str, query: &str, limit: Option<usize>) -> anyhow::Result<()> {
    let pattern = parse_query(query)?;
    let treebank = open_treebank(input)?;

    let mut out = BufWriter::new(io::stdout().lock());
    let mut count = 0;
    for (tree, id) in treebank.search(&pattern).into_iter().take(limit.unwrap_or(usize::MAX)) {
        if let Some(node) = tree.node(id) {
            writeln!(out, "{}\t{}", tree.unit_id(), node)?;
            count += 1;
        }
    }
    out.flush()?;

    info!("{count} matches");
    Ok(())
}

fn show(input: &str, unit: Option<&str>) -> anyhow::Result<()> {
    let treebank = open_treebank(input)?;
    let mut out = BufWriter::new(io::stdout().lock());

    match unit {
        Some(unit_id) => {
            let Some(tree) = treebank.trees().find(|t| t.unit_id() == unit_id) else {
                bail!("no unit `{unit_id}` in {input}");
            };
            writeln!(out, "{tree}")?;
            writeln!(out, "{}", tree.sentence_text())?;
        }
        None => {
            for tree in treebank.trees() {
                writeln!(out, "{}\t{}", tree.unit_id(), tree.sentence_text())?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
