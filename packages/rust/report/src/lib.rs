//! Regression tooling over finalized JSONL output.
//!
//! Two runs of the extractor (say, one per boundary mode) produce two
//! JSONL files. This crate loads them, indexes every usage example by the
//! part(s) of speech it landed under, and reports per-word differences so
//! a mode change can be reviewed example by example instead of by diffing
//! raw JSON.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use sensebound_shared::{Result, SenseboundError, WordEntry};

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load every [`WordEntry`] from a JSONL file, one record per line.
///
/// Blank lines are skipped; a line that fails to decode is warned about
/// and skipped, so one mangled record does not block a comparison run.
/// A file that yields no entries despite having non-blank lines is
/// rejected with a positioned error (it is most likely not JSONL at all).
pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Vec<WordEntry>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| SenseboundError::io(path, e))?;

    let mut entries = Vec::new();
    let mut first_bad: Option<(usize, String)> = None;
    for (idx, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<WordEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(path = %path.display(), line = idx + 1, %e, "skipping undecodable line");
                if first_bad.is_none() {
                    first_bad = Some((idx + 1, e.to_string()));
                }
            }
        }
    }

    if entries.is_empty() {
        if let Some((line, message)) = first_bad {
            return Err(SenseboundError::jsonl(path, line, message));
        }
    }

    debug!(path = %path.display(), entries = entries.len(), "loaded JSONL");
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Example -> part-of-speech indexing
// ---------------------------------------------------------------------------

/// For each word, every example text mapped to the set of parts of speech
/// it appears under. A set larger than one means the same citation was
/// attached in several sections.
pub type ExamplePosMap = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// Index entries by word, then by example text, collecting the parts of
/// speech each example landed under.
pub fn example_pos_map(entries: &[WordEntry]) -> ExamplePosMap {
    let mut map: ExamplePosMap = BTreeMap::new();
    for entry in entries {
        let by_example = map.entry(entry.word.clone()).or_default();
        for sense in &entry.senses {
            for example in &sense.examples {
                by_example
                    .entry(example.text.clone())
                    .or_default()
                    .insert(entry.pos.clone());
            }
        }
    }
    map
}

// ---------------------------------------------------------------------------
// Change counting
// ---------------------------------------------------------------------------

/// Per-word summary of example movement between two runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRow {
    pub word: String,
    /// Examples whose part-of-speech set differs between the runs. An
    /// example missing from one run counts with an empty set, so a
    /// dropped or newly attached citation is a change too.
    pub changed: usize,
    /// Distinct example texts in the old run.
    pub old_unique: usize,
    /// Distinct example texts in the new run.
    pub new_unique: usize,
}

impl ChangeRow {
    /// No example moved, appeared, or disappeared. A text present in
    /// only one run counts as changed, so `changed == 0` covers the
    /// unique totals as well.
    pub fn is_clean(&self) -> bool {
        self.changed == 0
    }
}

/// Compare two runs word by word.
///
/// Iterates the union of example texts per word: any text whose
/// part-of-speech set differs across the runs (missing counts as empty)
/// increments `changed`. The unique columns are per-run distinct-example
/// totals. `words` fixes the rows and their order; a word absent from
/// both runs still yields a (clean) row, so the report shape is stable
/// across runs.
pub fn count_changes(words: &[String], old: &[WordEntry], new: &[WordEntry]) -> Vec<ChangeRow> {
    let old_map = example_pos_map(old);
    let new_map = example_pos_map(new);
    let empty = BTreeMap::new();
    let no_pos = BTreeSet::new();

    let mut rows = Vec::with_capacity(words.len());
    for word in words {
        let old_examples = old_map.get(word).unwrap_or(&empty);
        let new_examples = new_map.get(word).unwrap_or(&empty);

        let texts: BTreeSet<&String> = old_examples.keys().chain(new_examples.keys()).collect();
        let mut changed = 0usize;
        for text in texts {
            let old_pos = old_examples.get(text).unwrap_or(&no_pos);
            let new_pos = new_examples.get(text).unwrap_or(&no_pos);
            if old_pos != new_pos {
                changed += 1;
                debug!(word, example = text.as_str(), ?old_pos, ?new_pos, "example differs");
            }
        }

        if changed > 0 {
            warn!(word, changed, "examples differ between runs");
        }
        rows.push(ChangeRow {
            word: word.clone(),
            changed,
            old_unique: old_examples.len(),
            new_unique: new_examples.len(),
        });
    }
    rows
}

/// Render change rows as a fixed-width text table.
pub fn render_change_table(rows: &[ChangeRow]) -> String {
    let word_width = rows
        .iter()
        .map(|r| r.word.len())
        .chain(std::iter::once("Word".len()))
        .max()
        .unwrap_or(4);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<word_width$}  {:>7}  {:>9}  {:>9}",
        "Word", "Changed", "OldUnique", "NewUnique"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<word_width$}  {:>7}  {:>9}  {:>9}",
            row.word, row.changed, row.old_unique, row.new_unique
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Example search
// ---------------------------------------------------------------------------

/// One example whose text contains a search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleHit {
    pub word: String,
    pub pos: String,
    /// 1-based ordinal of the owning sense.
    pub sense_ordinal: u32,
    pub gloss: Option<String>,
    pub text: String,
}

/// Find every example whose text contains `needle` (case-insensitive),
/// in entry order. Useful for tracing where a known citation landed.
pub fn find_examples(entries: &[WordEntry], needle: &str) -> Vec<ExampleHit> {
    let needle = needle.to_lowercase();
    let mut hits = Vec::new();
    for entry in entries {
        for sense in &entry.senses {
            for example in &sense.examples {
                if example.text.to_lowercase().contains(&needle) {
                    hits.push(ExampleHit {
                        word: entry.word.clone(),
                        pos: entry.pos.clone(),
                        sense_ordinal: sense.ordinal,
                        gloss: sense.glosses.first().cloned(),
                        text: example.text.clone(),
                    });
                }
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensebound_shared::{ExampleOut, SenseOut};
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../../fixtures/jsonl")).join(name)
    }

    fn entry(word: &str, pos: &str, examples: &[&str]) -> WordEntry {
        WordEntry {
            word: word.into(),
            lang: "English".into(),
            lang_code: "en".into(),
            pos: pos.into(),
            senses: vec![SenseOut {
                ordinal: 1,
                glosses: vec![format!("a {pos} sense")],
                examples: examples
                    .iter()
                    .map(|t| ExampleOut { text: (*t).into() })
                    .collect(),
            }],
        }
    }

    #[test]
    fn loads_fixture_runs() {
        let old = load_jsonl(fixture("lenient.jsonl")).expect("lenient fixture");
        let new = load_jsonl(fixture("strict.jsonl")).expect("strict fixture");
        assert!(!old.is_empty());
        assert_eq!(
            old.iter().map(|e| &e.word).collect::<BTreeSet<_>>(),
            new.iter().map(|e| &e.word).collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn load_skips_blank_lines() {
        let dir = std::env::temp_dir().join("sensebound-report-blank");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("blank.jsonl");
        std::fs::write(
            &path,
            "{\"word\":\"lay\",\"lang\":\"English\",\"pos\":\"verb\",\"senses\":[]}\n\n",
        )
        .expect("write");
        let entries = load_jsonl(&path).expect("load");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "lay");
    }

    #[test]
    fn load_skips_undecodable_lines() {
        let dir = std::env::temp_dir().join("sensebound-report-bad");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("bad.jsonl");
        std::fs::write(
            &path,
            "{\"word\":\"lay\",\"lang\":\"English\",\"pos\":\"verb\",\"senses\":[]}\nnot json\n{\"word\":\"set\",\"lang\":\"English\",\"pos\":\"verb\",\"senses\":[]}\n",
        )
        .expect("write");
        let entries = load_jsonl(&path).expect("good lines survive");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].word, "set");
    }

    #[test]
    fn load_rejects_file_with_no_decodable_lines() {
        let dir = std::env::temp_dir().join("sensebound-report-notjsonl");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("page.html");
        std::fs::write(&path, "<html>\n<body>not jsonl</body>\n</html>\n").expect("write");
        let err = load_jsonl(&path).expect_err("nothing decodable");
        assert!(err.to_string().contains("line 1"), "{err}");
    }

    #[test]
    fn pos_map_merges_duplicate_examples() {
        let entries = vec![
            entry("fast", "adjective", &["a fast car"]),
            entry("fast", "adverb", &["a fast car"]),
        ];
        let map = example_pos_map(&entries);
        let pos = &map["fast"]["a fast car"];
        assert_eq!(pos.len(), 2);
        assert!(pos.contains("adjective") && pos.contains("adverb"));
    }

    #[test]
    fn counts_moved_and_unique_examples() {
        let words = vec!["lay".to_string(), "set".to_string()];
        let old = vec![
            entry("lay", "noun", &["the pullet citation", "only in old"]),
            entry("set", "verb", &["set the table"]),
        ];
        let new = vec![
            entry("lay", "verb", &["the pullet citation", "only in new"]),
            entry("set", "verb", &["set the table"]),
        ];

        let rows = count_changes(&words, &old, &new);
        // Moved citation plus one one-sided example per run.
        assert_eq!(rows[0].changed, 3);
        assert_eq!(rows[0].old_unique, 2);
        assert_eq!(rows[0].new_unique, 2);
        assert!(rows[1].is_clean());
        assert_eq!(rows[1].old_unique, 1);
        assert_eq!(rows[1].new_unique, 1);
    }

    #[test]
    fn dropped_examples_count_as_changed() {
        // A citation attached in the old run but absent from the new one
        // (e.g. rejected at a boundary) must surface as a change, not
        // vanish from the table.
        let words = vec!["lay".to_string()];
        let old = vec![entry("lay", "noun", &["the pullet citation"])];
        let new = vec![entry("lay", "noun", &[])];

        let rows = count_changes(&words, &old, &new);
        assert_eq!(rows[0].changed, 1);
        assert_eq!(rows[0].old_unique, 1);
        assert_eq!(rows[0].new_unique, 0);
        assert!(!rows[0].is_clean());
    }

    #[test]
    fn missing_word_yields_clean_row() {
        let words = vec!["absent".to_string()];
        let rows = count_changes(&words, &[], &[]);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_clean());
    }

    #[test]
    fn only_lay_changes_between_fixture_runs() {
        let old = load_jsonl(fixture("lenient.jsonl")).expect("lenient fixture");
        let new = load_jsonl(fixture("strict.jsonl")).expect("strict fixture");
        let words: Vec<String> = old.iter().map(|e| e.word.clone()).collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = count_changes(&words, &old, &new);
        for row in &rows {
            if row.word == "lay" {
                assert_eq!(row.changed, 1, "the pullet citation moves noun -> verb");
                assert_eq!(row.old_unique, 1);
                assert_eq!(row.new_unique, 1);
            } else {
                assert!(row.is_clean(), "unexpected change for '{}'", row.word);
                assert_eq!(row.old_unique, row.new_unique, "'{}'", row.word);
            }
        }
    }

    #[test]
    fn table_lines_up_columns() {
        let rows = vec![
            ChangeRow {
                word: "lay".into(),
                changed: 1,
                old_unique: 0,
                new_unique: 0,
            },
            ChangeRow {
                word: "lead".into(),
                changed: 0,
                old_unique: 0,
                new_unique: 0,
            },
        ];
        let table = render_change_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Word"));
        assert!(lines[0].contains("Changed"));
        assert!(lines[1].contains("lay"));
        assert_eq!(lines[1].len(), lines[2].len());
    }

    #[test]
    fn finds_examples_by_substring() {
        let entries = load_jsonl(fixture("strict.jsonl")).expect("strict fixture");
        let hits = find_examples(&entries, "PULLET");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].word, "lay");
        assert_eq!(hits[0].pos, "verb");
        assert_eq!(hits[0].sense_ordinal, 1);
        assert!(hits[0].gloss.is_some());
    }

    #[test]
    fn search_misses_return_empty() {
        let entries = vec![entry("run", "verb", &["run fast"])];
        assert!(find_examples(&entries, "zebra").is_empty());
    }
}
