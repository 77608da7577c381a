//! Example locator: finds every usage-example node and records where it
//! sits relative to the known senses.
//!
//! Citations are frequently siblings of, not children of, their owning
//! sense item, so each candidate carries two anchors: the innermost
//! enclosing sense (reliable when present) and the nearest preceding sense
//! in document order (heuristic). Which anchor wins is the boundary
//! matcher's decision, not ours.

use std::collections::HashMap;

use scraper::Html;
use scraper::node::Element;
use tracing::debug;

use sensebound_shared::SenseId;

use crate::breadcrumb::{HeadingState, SenseSite, element_text, normalize_ws};

/// How a candidate's locator was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin {
    /// A strict ancestor sense item encloses the citation.
    Exact,
    /// Only a preceding sense in document order is available.
    Inferred,
    /// No sense precedes or encloses the citation.
    Orphan,
}

/// A usage-example citation with its positional anchors.
#[derive(Debug, Clone)]
pub struct ExampleCandidate {
    /// Normalized citation text.
    pub text: String,
    /// Heading trail in effect at the citation's position.
    pub trail: Vec<String>,
    /// Innermost enclosing sense item, if the citation is structurally
    /// contained in one.
    pub ancestor: Option<SenseId>,
    /// Most recent sense item started before this node in document order.
    pub preceding: Option<SenseId>,
}

impl ExampleCandidate {
    pub fn origin(&self) -> CandidateOrigin {
        match (self.ancestor, self.preceding) {
            (Some(_), _) => CandidateOrigin::Exact,
            (None, Some(_)) => CandidateOrigin::Inferred,
            (None, None) => CandidateOrigin::Orphan,
        }
    }

    /// The sense this candidate points at before any boundary policy is
    /// applied: the ancestor when exact, the preceding sense otherwise.
    pub fn locator(&self) -> Option<SenseId> {
        self.ancestor.or(self.preceding)
    }
}

/// `true` for elements that carry a usage example. Covers the
/// `data-type="example"` blocks of REST-rendered fixtures and the
/// `h-usage-example` class of live mobile HTML.
fn is_example_element(element: &Element) -> bool {
    if element.attr("data-type") == Some("example") {
        return true;
    }
    element.classes().any(|c| c == "h-usage-example")
}

/// Walk the document and produce one candidate per citation node, in
/// document order. Empty citations are skipped.
pub fn locate(doc: &Html, senses: &[SenseSite]) -> Vec<ExampleCandidate> {
    let by_node: HashMap<_, SenseId> = senses.iter().map(|s| (s.node, s.id)).collect();

    let mut state = HeadingState::default();
    let mut last_sense: Option<SenseId> = None;
    let mut candidates = Vec::new();

    for node in doc.tree.root().descendants() {
        let Some(element) = node.value().as_element() else {
            continue;
        };
        let tag = element.name();

        if matches!(tag, "h2" | "h3" | "h4") {
            let text = element_text(node).unwrap_or_default();
            state.observe(tag, &text);
            continue;
        }

        if let Some(id) = by_node.get(&node.id()) {
            last_sense = Some(*id);
        }

        if !is_example_element(element) {
            continue;
        }

        let text = element_text(node)
            .map(|t| normalize_ws(&t))
            .unwrap_or_default();
        if text.is_empty() {
            continue;
        }

        let ancestor = node
            .ancestors()
            .find_map(|a| by_node.get(&a.id()).copied());

        candidates.push(ExampleCandidate {
            text,
            trail: state.trail(),
            ancestor,
            preceding: last_sense,
        });
    }

    debug!(candidates = candidates.len(), "example locator finished");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breadcrumb::build;

    fn run(html: &str) -> (Vec<SenseSite>, Vec<ExampleCandidate>) {
        let doc = Html::parse_document(html);
        let senses = build(&doc);
        let candidates = locate(&doc, &senses);
        (senses, candidates)
    }

    #[test]
    fn contained_example_is_exact() {
        let html = r#"<html><body>
            <h2>English</h2><h4>Verb</h4>
            <ol><li><p>To do a thing.</p>
                <div data-type="example">An example inside the sense.</div>
            </li></ol>
        </body></html>"#;
        let (senses, cands) = run(html);
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].origin(), CandidateOrigin::Exact);
        assert_eq!(cands[0].ancestor, Some(senses[0].id));
        // The enclosing item is also the nearest preceding sense.
        assert_eq!(cands[0].preceding, Some(senses[0].id));
    }

    #[test]
    fn sibling_example_is_inferred() {
        let html = r#"<html><body>
            <h2>English</h2><h4>Verb</h4>
            <ol><li><p>To do a thing.</p></li></ol>
            <div data-type="example">Detached citation after the list.</div>
        </body></html>"#;
        let (senses, cands) = run(html);
        assert_eq!(cands[0].origin(), CandidateOrigin::Inferred);
        assert_eq!(cands[0].ancestor, None);
        assert_eq!(cands[0].preceding, Some(senses[0].id));
    }

    #[test]
    fn example_before_any_sense_is_orphan() {
        let html = r#"<html><body>
            <div data-type="example">Citation with nothing to scan back into.</div>
            <h2>English</h2><h4>Noun</h4>
            <ol><li><p>a sense</p></li></ol>
        </body></html>"#;
        let (_, cands) = run(html);
        assert_eq!(cands[0].origin(), CandidateOrigin::Orphan);
        assert_eq!(cands[0].locator(), None);
    }

    #[test]
    fn usage_example_class_is_recognized() {
        let html = r#"<html><body>
            <h2>English</h2><h4>Noun</h4>
            <ol><li><p>a sense</p>
                <span class="h-usage-example">Class-marked citation.</span>
            </li></ol>
        </body></html>"#;
        let (_, cands) = run(html);
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].text, "Class-marked citation.");
    }

    #[test]
    fn empty_citations_are_skipped() {
        let html = r#"<html><body>
            <h2>English</h2><h4>Noun</h4>
            <ol><li><p>a sense</p></li></ol>
            <div data-type="example">   </div>
        </body></html>"#;
        let (_, cands) = run(html);
        assert!(cands.is_empty());
    }

    #[test]
    fn trail_reflects_position_not_ancestry() {
        // The citation is structurally inside the verb sense item, but a
        // noun heading intervenes in document order, so the linear trail
        // reports the noun section.
        let html = r#"<html><body>
            <h2>English</h2><h4>Verb</h4>
            <ol><li><p>verb sense</p>
                <section><h4>Noun</h4><ol><li><p>noun sense</p></li></ol></section>
                <div data-type="example">Trailing citation.</div>
            </li></ol>
        </body></html>"#;
        let (senses, cands) = run(html);
        assert_eq!(senses.len(), 2);
        assert_eq!(cands[0].trail.last().map(String::as_str), Some("Noun"));
        // Exact ancestry still finds the verb item.
        assert_eq!(cands[0].ancestor, Some(senses[0].id));
        // The backward scan finds the nested noun sense instead.
        assert_eq!(cands[0].preceding, Some(senses[1].id));
    }
}
