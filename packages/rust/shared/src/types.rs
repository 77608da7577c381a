//! Core domain types for sense-boundary matching.
//!
//! The hierarchy of a dictionary page is described by [`Breadcrumb`] trails
//! of [`Marker`]s rather than by DOM containment, which is unreliable in
//! the source HTML. Finalized output is a flat list of [`WordEntry`]
//! records plus an [`UnmatchedReport`] for examples that could not be
//! attached under the active boundary policy.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Marker / Breadcrumb
// ---------------------------------------------------------------------------

/// A typed structural tag extracted from a document node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// A recognized part-of-speech section header (normalized, lowercase).
    PartOfSpeech(String),
    /// A numbered sense item; ordinals are 1-based and reset at each new
    /// part-of-speech section.
    Sense(u32),
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marker::PartOfSpeech(name) => write!(f, "pos:{name}"),
            Marker::Sense(n) => write!(f, "sense:{n}"),
        }
    }
}

/// Ordered path of markers from outermost to innermost, identifying a
/// position in the sense hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breadcrumb(pub Vec<Marker>);

impl Breadcrumb {
    /// Breadcrumb for a sense: `[pos:<name>, sense:<ordinal>]`.
    pub fn sense(pos: impl Into<String>, ordinal: u32) -> Self {
        Self(vec![
            Marker::PartOfSpeech(pos.into()),
            Marker::Sense(ordinal),
        ])
    }

    /// `true` iff every `Sense` marker is directly preceded by exactly one
    /// `PartOfSpeech` marker.
    pub fn is_well_formed(&self) -> bool {
        self.0.iter().enumerate().all(|(i, m)| match m {
            Marker::Sense(_) => {
                matches!(i.checked_sub(1).map(|j| &self.0[j]), Some(Marker::PartOfSpeech(_)))
            }
            Marker::PartOfSpeech(_) => true,
        })
    }

    /// `self` is an ancestor of `other` iff `self` is a proper prefix.
    pub fn is_ancestor_of(&self, other: &Breadcrumb) -> bool {
        self.0.len() < other.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// The part-of-speech marker directly enclosing the innermost sense,
    /// if this breadcrumb identifies a sense.
    pub fn part_of_speech(&self) -> Option<&str> {
        match &self.0[..] {
            [.., Marker::PartOfSpeech(name), Marker::Sense(_)] => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|m| m.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

// ---------------------------------------------------------------------------
// SenseId / MatchResult
// ---------------------------------------------------------------------------

/// Per-document sense identifier, assigned in document order by the
/// breadcrumb builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenseId(pub usize);

impl std::fmt::Display for SenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why an example candidate failed to attach to any sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// The inferred sense crosses a part-of-speech boundary under strict
    /// mode; attaching it would be a misattribution.
    BoundaryMismatch,
    /// No sense exists to attach to (orphan candidate).
    NoBoundary,
}

impl std::fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnmatchedReason::BoundaryMismatch => write!(f, "boundary_mismatch"),
            UnmatchedReason::NoBoundary => write!(f, "no_boundary"),
        }
    }
}

/// Outcome of boundary matching for a single candidate. Every candidate
/// produces exactly one of these per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Matched(SenseId),
    Unmatched(UnmatchedReason),
}

// ---------------------------------------------------------------------------
// Output records (JSONL schema)
// ---------------------------------------------------------------------------

/// A usage example attached to a sense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleOut {
    /// Normalized citation text.
    pub text: String,
}

/// A finalized sense with its ordered examples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseOut {
    /// 1-based ordinal within the part-of-speech section.
    pub ordinal: u32,
    /// Gloss lines (first paragraph of the sense item).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub glosses: Vec<String>,
    /// Examples in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<ExampleOut>,
}

/// One output record per (language, part-of-speech) pair, in
/// first-appearance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    /// The headword being extracted.
    pub word: String,
    /// Language section name (from the top-level heading).
    pub lang: String,
    /// Language code, empty when the language name is not recognized.
    #[serde(default)]
    pub lang_code: String,
    /// Normalized part-of-speech name, lowercase.
    pub pos: String,
    /// Senses in document order.
    pub senses: Vec<SenseOut>,
}

// ---------------------------------------------------------------------------
// Unmatched report
// ---------------------------------------------------------------------------

/// A single example that could not be attached to any sense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedExample {
    /// Candidate citation text.
    pub text: String,
    /// Locator breadcrumb, absent for orphans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<Breadcrumb>,
    /// Why the candidate was rejected.
    pub reason: UnmatchedReason,
}

/// Side report of every unmatched candidate. Consumed by regression
/// tooling; never silently discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedReport {
    pub items: Vec<UnmatchedExample>,
}

impl UnmatchedReport {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of rejections with the given reason.
    pub fn count(&self, reason: UnmatchedReason) -> usize {
        self.items.iter().filter(|i| i.reason == reason).count()
    }
}

// ---------------------------------------------------------------------------
// Extraction (finalized per-document output)
// ---------------------------------------------------------------------------

/// Finalized output of one document run.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// One entry per (language, part-of-speech) pair.
    pub entries: Vec<WordEntry>,
    /// Every candidate that did not attach.
    pub unmatched: UnmatchedReport,
    /// Total number of example candidates located. Always equals the
    /// matched count plus `unmatched.len()`.
    pub candidates: usize,
}

impl Extraction {
    /// Number of examples attached across all senses.
    pub fn matched(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|e| &e.senses)
            .map(|s| s.examples.len())
            .sum()
    }
}
