//! Sense assembler: merges match results into finalized per-sense example
//! lists, grouped into one record per (language, part-of-speech) pair.
//!
//! Assembly builds fresh output from its inputs every time, so running it
//! twice over the same matched set yields identical records — nothing
//! accumulates across runs.

use std::collections::HashMap;

use tracing::debug;

use sensebound_shared::{
    Extraction, ExampleOut, MatchResult, SenseOut, UnmatchedExample, UnmatchedReport, WordEntry,
};

use crate::breadcrumb::SenseSite;
use crate::locate::ExampleCandidate;

/// Language-name to code table for the headings we encounter. Unlisted
/// languages keep an empty code; the name itself is always preserved.
fn lang_code(name: &str) -> &'static str {
    match name {
        "English" => "en",
        "French" => "fr",
        "German" => "de",
        "Spanish" => "es",
        "Italian" => "it",
        "Portuguese" => "pt",
        "Dutch" => "nl",
        "Russian" => "ru",
        "Latin" => "la",
        _ => "",
    }
}

/// Merge matched examples into their owning senses and collect the rest
/// into the unmatched report.
///
/// `results` must be parallel to `candidates` (one result per candidate,
/// as produced by the matcher). Example order within a sense follows
/// candidate document order.
pub fn assemble(
    word: &str,
    senses: &[SenseSite],
    candidates: &[ExampleCandidate],
    results: &[MatchResult],
) -> Extraction {
    debug_assert_eq!(candidates.len(), results.len());

    // Group senses by (language, pos) in first-appearance order and
    // remember where each sense landed.
    let mut entries: Vec<WordEntry> = Vec::new();
    let mut entry_index: HashMap<(String, String), usize> = HashMap::new();
    let mut slots: Vec<(usize, usize)> = Vec::with_capacity(senses.len());

    for site in senses {
        let key = (site.language.clone(), site.pos.clone());
        let idx = *entry_index.entry(key).or_insert_with(|| {
            entries.push(WordEntry {
                word: word.to_string(),
                lang: site.language.clone(),
                lang_code: lang_code(&site.language).to_string(),
                pos: site.pos.clone(),
                senses: Vec::new(),
            });
            entries.len() - 1
        });
        entries[idx].senses.push(SenseOut {
            ordinal: site.ordinal,
            glosses: site.gloss.clone().into_iter().collect(),
            examples: Vec::new(),
        });
        slots.push((idx, entries[idx].senses.len() - 1));
    }

    let mut unmatched = UnmatchedReport::default();

    for (candidate, result) in candidates.iter().zip(results) {
        match result {
            MatchResult::Matched(id) => {
                let (e, s) = slots[id.0];
                entries[e].senses[s].examples.push(ExampleOut {
                    text: candidate.text.clone(),
                });
            }
            MatchResult::Unmatched(reason) => {
                unmatched.items.push(UnmatchedExample {
                    text: candidate.text.clone(),
                    locator: candidate
                        .locator()
                        .map(|id| senses[id.0].breadcrumb.clone()),
                    reason: *reason,
                });
            }
        }
    }

    let extraction = Extraction {
        entries,
        unmatched,
        candidates: candidates.len(),
    };

    debug!(
        entries = extraction.entries.len(),
        matched = extraction.matched(),
        unmatched = extraction.unmatched.len(),
        "assembly complete"
    );
    extraction
}
