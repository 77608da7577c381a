//! CLI command definitions, routing, and tracing setup.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use sensebound_extract::extract_str;
use sensebound_report::{count_changes, find_examples, load_jsonl, render_change_table};
use sensebound_shared::{BoundaryMode, Extraction, UnmatchedExample};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Sensebound — sense-boundary extraction for dictionary HTML.
#[derive(Parser)]
#[command(
    name = "sensebound",
    version,
    about = "Extract part-of-speech entries, senses, and usage examples from dictionary HTML.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract entries from one or more HTML files, emitting JSONL.
    Extract {
        /// HTML files to process.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Headword (defaults to each file's stem).
        #[arg(short, long)]
        word: Option<String>,

        /// Boundary mode: strict or lenient. Defaults to the
        /// SENSEBOUND_STRICT_BOUNDARY environment variable.
        #[arg(short, long)]
        boundary: Option<String>,

        /// Output JSONL path (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Write the unmatched-examples report to this JSON file.
        #[arg(long)]
        unmatched: Option<PathBuf>,
    },

    /// Compare two JSONL runs word by word and print a change table.
    Report {
        /// Baseline run.
        #[arg(long)]
        old: PathBuf,

        /// Candidate run.
        #[arg(long)]
        new: PathBuf,

        /// Word list fixing the rows (one word per line). Defaults to
        /// every word seen in either run.
        #[arg(long)]
        words: Option<PathBuf>,
    },

    /// Find examples containing a substring in one or two JSONL runs.
    Find {
        /// JSONL file(s) to search (at most two).
        #[arg(required = true, num_args = 1..=2)]
        files: Vec<PathBuf>,

        /// Case-insensitive substring to look for.
        #[arg(short, long)]
        contains: String,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sensebound=info",
        1 => "sensebound=debug",
        _ => "sensebound=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract {
            files,
            word,
            boundary,
            out,
            unmatched,
        } => cmd_extract(
            &files,
            word.as_deref(),
            boundary.as_deref(),
            out.as_deref(),
            unmatched.as_deref(),
        ),
        Command::Report { old, new, words } => cmd_report(&old, &new, words.as_deref()),
        Command::Find { files, contains } => cmd_find(&files, &contains),
    }
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

fn cmd_extract(
    files: &[PathBuf],
    word: Option<&str>,
    boundary: Option<&str>,
    out: Option<&Path>,
    unmatched_out: Option<&Path>,
) -> Result<()> {
    let mode = match boundary {
        Some(name) => name.parse::<BoundaryMode>()?,
        None => BoundaryMode::from_env(),
    };

    info!(mode = %mode, files = files.len(), "extracting");

    let progress = (files.len() > 1).then(spinner);

    let mut lines = String::new();
    let mut unmatched: Vec<UnmatchedExample> = Vec::new();
    let mut extracted = 0usize;
    for file in files {
        if let Some(bar) = &progress {
            bar.set_message(format!("Extracting {}", file.display()));
        }

        let headword = match word {
            Some(w) => w.to_string(),
            None => word_from_path(file)?,
        };
        let html = fs::read_to_string(file)
            .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;

        // A page with no sense markers is skipped, not fatal: batch runs
        // routinely include redirect and stub pages.
        let extraction: Extraction = match extract_str(&headword, &html, mode) {
            Ok(ex) => ex,
            Err(err) => {
                warn!(file = %file.display(), %err, "skipping document");
                continue;
            }
        };

        for entry in &extraction.entries {
            let _ = writeln!(lines, "{}", serde_json::to_string(entry)?);
        }
        unmatched.extend(extraction.unmatched.items);
        extracted += 1;
    }

    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }
    if extracted == 0 {
        return Err(eyre!("no document produced any entries"));
    }

    match out {
        Some(path) => {
            fs::write(path, &lines).map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
            info!(path = %path.display(), "wrote entries");
        }
        None => print!("{lines}"),
    }

    if let Some(path) = unmatched_out {
        let json = serde_json::to_string_pretty(&unmatched)?;
        fs::write(path, json).map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
        info!(path = %path.display(), count = unmatched.len(), "wrote unmatched report");
    } else if !unmatched.is_empty() {
        warn!(count = unmatched.len(), "examples left unmatched; rerun with --unmatched to inspect");
    }

    Ok(())
}

/// Derive the headword from a file name ("lay.html" -> "lay").
fn word_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(String::from)
        .ok_or_else(|| eyre!("cannot derive a headword from '{}'; pass --word", path.display()))
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar
}

// ---------------------------------------------------------------------------
// report
// ---------------------------------------------------------------------------

fn cmd_report(old: &Path, new: &Path, words: Option<&Path>) -> Result<()> {
    let old_entries = load_jsonl(old)?;
    let new_entries = load_jsonl(new)?;

    let words = match words {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| eyre!("cannot read word list '{}': {e}", path.display()))?;
            raw.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()
        }
        None => {
            let mut seen: Vec<String> = Vec::new();
            for entry in old_entries.iter().chain(&new_entries) {
                if !seen.contains(&entry.word) {
                    seen.push(entry.word.clone());
                }
            }
            seen
        }
    };

    let rows = count_changes(&words, &old_entries, &new_entries);
    print!("{}", render_change_table(&rows));

    let dirty = rows.iter().filter(|r| !r.is_clean()).count();
    println!();
    println!("  {dirty} of {} words differ between runs", rows.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// find
// ---------------------------------------------------------------------------

fn cmd_find(files: &[PathBuf], contains: &str) -> Result<()> {
    for file in files {
        let entries = load_jsonl(file)?;
        let hits = find_examples(&entries, contains);

        // Per-file header lines up the two runs for side-by-side reading.
        if files.len() > 1 {
            println!("== {} ==", file.display());
        }
        for hit in &hits {
            println!("{} [{} sense {}]", hit.word, hit.pos, hit.sense_ordinal);
            if let Some(gloss) = &hit.gloss {
                println!("  gloss:   {gloss}");
            }
            println!("  example: {}", hit.text);
        }
        println!();
        println!("  {} example(s) containing {contains:?}", hits.len());
    }
    Ok(())
}
