//! Sense-boundary extraction core.
//!
//! Takes a parsed dictionary page and produces per-sense example lists by
//! matching each located citation against the sense hierarchy:
//! - [`breadcrumb`] — derives marker paths for part-of-speech headers and
//!   numbered sense items
//! - [`locate`] — finds citation nodes and their positional anchors
//! - [`matcher`] — decides ownership under strict or lenient boundary policy
//! - [`assemble`] — merges matches into finalized [`WordEntry`] records plus
//!   an unmatched-examples report
//!
//! The whole pipeline is a pure, synchronous function of one immutable
//! parsed document plus the boundary mode; fetching and serialization live
//! with the callers.

pub mod assemble;
pub mod breadcrumb;
pub mod locate;
pub mod matcher;

use scraper::Html;
use tracing::{info, instrument};

use sensebound_shared::{BoundaryMode, Extraction, Result, SenseboundError};

pub use breadcrumb::SenseSite;
pub use locate::{CandidateOrigin, ExampleCandidate};
pub use matcher::{HeadingTrailPolicy, ScopePolicy};

/// Run the full extraction pipeline over an already-parsed document.
///
/// Returns [`SenseboundError::MalformedDocument`] when the page has no
/// recognizable part-of-speech or sense markers; per-citation failures
/// never abort the document and are surfaced in the unmatched report.
#[instrument(skip(doc), fields(word = %word, mode = %mode))]
pub fn extract_document(word: &str, doc: &Html, mode: BoundaryMode) -> Result<Extraction> {
    let senses = breadcrumb::build(doc);
    if senses.is_empty() {
        return Err(SenseboundError::malformed(word));
    }

    let candidates = locate::locate(doc, &senses);
    let results = matcher::match_all(&candidates, &senses, mode, &HeadingTrailPolicy);
    let extraction = assemble::assemble(word, &senses, &candidates, &results);

    info!(
        senses = senses.len(),
        entries = extraction.entries.len(),
        matched = extraction.matched(),
        unmatched = extraction.unmatched.len(),
        "document extracted"
    );
    Ok(extraction)
}

/// Parse raw HTML and extract. Convenience wrapper around
/// [`extract_document`] for callers holding the page text.
pub fn extract_str(word: &str, html: &str, mode: BoundaryMode) -> Result<Extraction> {
    let doc = Html::parse_document(html);
    extract_document(word, &doc, mode)
}
