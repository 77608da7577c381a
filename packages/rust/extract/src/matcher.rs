//! Boundary matcher: decides, for each located citation, which sense owns
//! it under the active policy.
//!
//! Strict mode exists to close a specific defect class: an example from
//! one part-of-speech section drifting into an unrelated section's last
//! sense merely because that sense was the most recently seen node during
//! a linear scan. Lenient mode reproduces that legacy behavior for
//! comparison runs.

use tracing::trace;

use sensebound_shared::{BoundaryMode, MatchResult, UnmatchedReason};

use crate::breadcrumb::SenseSite;
use crate::locate::ExampleCandidate;

/// Judges whether a sense's heading trail is consistent with the heading
/// trail observed at a citation's position.
///
/// The exact signal for part-of-speech scoping is deliberately a swappable
/// policy: heading trails are what the rendered HTML gives us today, but
/// other sources (anchors, section ids) could slot in here.
pub trait ScopePolicy {
    fn consistent(&self, sense_trail: &[String], candidate_trail: &[String]) -> bool;
}

/// Default policy: two trails are consistent when they agree on their
/// common prefix. This subsumes plain part-of-speech equality and also
/// separates senses under different intermediate headings (e.g. two
/// etymologies carrying the same part of speech).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingTrailPolicy;

impl ScopePolicy for HeadingTrailPolicy {
    fn consistent(&self, sense_trail: &[String], candidate_trail: &[String]) -> bool {
        if sense_trail.is_empty() || candidate_trail.is_empty() {
            return false;
        }
        let n = sense_trail.len().min(candidate_trail.len());
        sense_trail[..n] == candidate_trail[..n]
    }
}

/// Resolve one candidate against the known senses.
///
/// Strict: an exact candidate attaches to its enclosing sense
/// unconditionally; an inferred candidate attaches to its preceding sense
/// only when the scope policy agrees; orphans never attach. Lenient: any
/// candidate attaches to the nearest preceding sense in document order,
/// whatever its part of speech.
pub fn match_candidate(
    candidate: &ExampleCandidate,
    senses: &[SenseSite],
    mode: BoundaryMode,
    policy: &dyn ScopePolicy,
) -> MatchResult {
    let result = match mode {
        BoundaryMode::Lenient => match candidate.preceding {
            Some(id) => MatchResult::Matched(id),
            None => MatchResult::Unmatched(UnmatchedReason::NoBoundary),
        },
        BoundaryMode::Strict => {
            if let Some(id) = candidate.ancestor {
                MatchResult::Matched(id)
            } else if let Some(id) = candidate.preceding {
                let sense = &senses[id.0];
                if policy.consistent(&sense.trail, &candidate.trail) {
                    MatchResult::Matched(id)
                } else {
                    MatchResult::Unmatched(UnmatchedReason::BoundaryMismatch)
                }
            } else {
                MatchResult::Unmatched(UnmatchedReason::NoBoundary)
            }
        }
    };

    trace!(
        text = %candidate.text,
        ?result,
        %mode,
        "matched candidate"
    );
    result
}

/// Resolve every candidate. Output order equals candidate order; each
/// candidate yields exactly one result.
pub fn match_all(
    candidates: &[ExampleCandidate],
    senses: &[SenseSite],
    mode: BoundaryMode,
    policy: &dyn ScopePolicy,
) -> Vec<MatchResult> {
    candidates
        .iter()
        .map(|c| match_candidate(c, senses, mode, policy))
        .collect()
}
