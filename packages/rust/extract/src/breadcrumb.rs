//! Breadcrumb builder: one traversal of the parsed document that derives,
//! for every part-of-speech header and numbered sense item, an ordered
//! marker path from the document root down to that node.
//!
//! Heading state is tracked linearly over the traversal (an `h2` names the
//! language section, an `h3` a subsection such as an etymology, an `h4` a
//! part of speech) rather than through DOM ancestry, because the source
//! HTML nests sections unreliably. The emitted order equals document
//! order, which the boundary matcher's fallback rule relies on.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{ElementRef, Html};
use tracing::debug;

use sensebound_shared::{Breadcrumb, SenseId};

/// Recognized part-of-speech heading names, normalized to a canonical
/// lowercase form.
static POS_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert("noun", "noun");
    m.insert("proper noun", "proper noun");
    m.insert("verb", "verb");
    m.insert("adjective", "adjective");
    m.insert("adverb", "adverb");
    m.insert("pronoun", "pronoun");
    m.insert("preposition", "preposition");
    m.insert("postposition", "postposition");
    m.insert("conjunction", "conjunction");
    m.insert("interjection", "interjection");
    m.insert("determiner", "determiner");
    m.insert("article", "article");
    m.insert("particle", "particle");
    m.insert("numeral", "numeral");
    m.insert("phrase", "phrase");
    m
});

/// A sense item discovered in the document, in document order.
#[derive(Debug, Clone)]
pub struct SenseSite {
    /// Identifier assigned in document order, starting at 0.
    pub id: SenseId,
    /// Node handle of the `<li>` carrying the sense.
    pub node: NodeId,
    /// Language section name from the enclosing `h2`, empty if none.
    pub language: String,
    /// Heading trail (`h2`..`h4` texts) in effect at this node. Used by
    /// the boundary matcher's scope checks.
    pub trail: Vec<String>,
    /// `[pos:<name>, sense:<ordinal>]` breadcrumb.
    pub breadcrumb: Breadcrumb,
    /// Canonical lowercase part-of-speech name.
    pub pos: String,
    /// 1-based ordinal within the current part-of-speech section.
    pub ordinal: u32,
    /// Gloss text, taken from the item's first paragraph.
    pub gloss: Option<String>,
}

/// Linear heading state carried over a pre-order traversal.
///
/// Deeper headings reset when a shallower one appears, mirroring how the
/// rendered page reads top to bottom.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeadingState {
    h2: Option<String>,
    h3: Option<String>,
    h4: Option<String>,
}

impl HeadingState {
    /// Feed one element to the state. Returns `true` when the element was
    /// a heading that changed the state.
    pub(crate) fn observe(&mut self, tag: &str, text: &str) -> bool {
        let text = normalize_ws(text);
        if text.is_empty() {
            return false;
        }
        match tag {
            "h2" => {
                self.h2 = Some(text);
                self.h3 = None;
                self.h4 = None;
                true
            }
            "h3" => {
                self.h3 = Some(text);
                self.h4 = None;
                true
            }
            "h4" => {
                self.h4 = Some(text);
                true
            }
            _ => false,
        }
    }

    /// Current breadcrumb of heading texts, outermost first.
    pub(crate) fn trail(&self) -> Vec<String> {
        [&self.h2, &self.h3, &self.h4]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }

    pub(crate) fn language(&self) -> &str {
        self.h2.as_deref().unwrap_or("")
    }

    pub(crate) fn h4(&self) -> Option<&str> {
        self.h4.as_deref()
    }
}

/// Trailing enumeration on repeated headings ("Verb 2", "Noun 3").
static HEADING_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d+$").expect("valid regex"));

/// Look up the canonical part-of-speech name for a heading text.
pub(crate) fn recognize_pos(heading: &str) -> Option<&'static str> {
    let key = normalize_ws(heading).to_lowercase();
    let key = HEADING_SUFFIX.replace(&key, "");
    POS_NAMES.get(key.as_ref()).copied()
}

/// Collapse all whitespace runs to single spaces and trim.
pub(crate) fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of a node, if it is an element.
pub(crate) fn element_text(node: NodeRef<'_, Node>) -> Option<String> {
    ElementRef::wrap(node).map(|el| el.text().collect::<String>())
}

/// Walk the document once and emit every sense item with its breadcrumb.
///
/// Nodes that are neither part-of-speech headers nor sense items produce
/// nothing. Every emitted breadcrumb satisfies the well-formedness
/// invariant (a sense marker directly below its part-of-speech marker).
pub fn build(doc: &Html) -> Vec<SenseSite> {
    let mut state = HeadingState::default();
    let mut sites: Vec<SenseSite> = Vec::new();

    // Ordinal counter for the current part-of-speech section; None while
    // no recognized part of speech is in scope.
    let mut current_pos: Option<(&'static str, u32)> = None;

    for node in doc.tree.root().descendants() {
        let Some(element) = node.value().as_element() else {
            continue;
        };
        let tag = element.name();

        if matches!(tag, "h2" | "h3" | "h4") {
            let text = element_text(node).unwrap_or_default();
            if state.observe(tag, &text) {
                // A new heading of any level closes the current
                // part-of-speech section; a recognized h4 opens a new one
                // with a fresh ordinal counter.
                current_pos = state.h4().and_then(recognize_pos).map(|pos| (pos, 0));
            }
            continue;
        }

        if tag == "li" && is_ordered_item(node) {
            let Some(section) = current_pos.as_mut() else {
                continue;
            };
            section.1 += 1;
            let (pos, ordinal) = *section;
            let id = SenseId(sites.len());
            sites.push(SenseSite {
                id,
                node: node.id(),
                language: state.language().to_string(),
                trail: state.trail(),
                breadcrumb: Breadcrumb::sense(pos, ordinal),
                pos: pos.to_string(),
                ordinal,
                gloss: extract_gloss(node),
            });
        }
    }

    debug!(senses = sites.len(), "breadcrumb builder finished");
    sites
}

/// `true` for `<li>` nodes that belong to an ordered (numbered) list.
/// Unordered lists carry quotations and other non-sense material.
fn is_ordered_item(node: NodeRef<'_, Node>) -> bool {
    node.parent()
        .and_then(|p| p.value().as_element().map(|e| e.name() == "ol"))
        .unwrap_or(false)
}

/// Gloss of a sense item: the first paragraph's text, falling back to the
/// item's direct text nodes when no paragraph exists.
fn extract_gloss(li: NodeRef<'_, Node>) -> Option<String> {
    for desc in li.descendants() {
        if let Some(el) = desc.value().as_element() {
            if el.name() == "p" {
                let text = element_text(desc).map(|t| normalize_ws(&t))?;
                return (!text.is_empty()).then_some(text);
            }
        }
    }

    // No paragraph: use the item's own text children only, so text from
    // nested lists or sections does not leak into the gloss.
    let own: String = li
        .children()
        .filter_map(|c| c.value().as_text().map(|t| t.to_string()))
        .collect();
    let own = normalize_ws(&own);
    (!own.is_empty()).then_some(own)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensebound_shared::Marker;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    const TWO_POS: &str = r#"
        <html><body>
        <section><h2>English</h2>
          <section><h3>Etymology 1</h3>
            <section><h4>Noun</h4>
              <ol>
                <li><p>A first noun sense.</p></li>
                <li><p>A second noun sense.</p></li>
              </ol>
            </section>
            <section><h4>Verb</h4>
              <ol>
                <li><p>A verb sense.</p></li>
              </ol>
            </section>
          </section>
        </section>
        </body></html>"#;

    #[test]
    fn builds_sites_in_document_order() {
        let doc = parse(TWO_POS);
        let sites = build(&doc);

        assert_eq!(sites.len(), 3);
        assert_eq!(sites[0].breadcrumb, Breadcrumb::sense("noun", 1));
        assert_eq!(sites[1].breadcrumb, Breadcrumb::sense("noun", 2));
        assert_eq!(sites[2].breadcrumb, Breadcrumb::sense("verb", 1));
        assert_eq!(sites[2].id, SenseId(2));
    }

    #[test]
    fn ordinals_reset_per_pos_section() {
        let doc = parse(TWO_POS);
        let sites = build(&doc);
        assert_eq!(sites[1].ordinal, 2);
        assert_eq!(sites[2].ordinal, 1);
    }

    #[test]
    fn every_breadcrumb_is_well_formed() {
        let doc = parse(TWO_POS);
        for site in build(&doc) {
            assert!(site.breadcrumb.is_well_formed(), "{}", site.breadcrumb);
            assert!(matches!(site.breadcrumb.0[0], Marker::PartOfSpeech(_)));
        }
    }

    #[test]
    fn trail_and_language_follow_headings() {
        let doc = parse(TWO_POS);
        let sites = build(&doc);
        assert_eq!(sites[0].language, "English");
        assert_eq!(
            sites[0].trail,
            vec!["English".to_string(), "Etymology 1".into(), "Noun".into()]
        );
        assert_eq!(sites[2].trail.last().map(String::as_str), Some("Verb"));
    }

    #[test]
    fn glosses_come_from_first_paragraph() {
        let doc = parse(TWO_POS);
        let sites = build(&doc);
        assert_eq!(sites[0].gloss.as_deref(), Some("A first noun sense."));
    }

    #[test]
    fn gloss_falls_back_to_direct_text() {
        let html = r#"<html><body>
            <h2>English</h2><h4>Noun</h4>
            <ol><li>Bare text gloss <ul><li>nested quotation</li></ul></li></ol>
        </body></html>"#;
        let doc = parse(html);
        let sites = build(&doc);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].gloss.as_deref(), Some("Bare text gloss"));
    }

    #[test]
    fn unordered_lists_are_not_senses() {
        let html = r#"<html><body>
            <h2>English</h2><h4>Noun</h4>
            <ul><li>quotation line</li></ul>
            <ol><li><p>real sense</p></li></ol>
        </body></html>"#;
        let doc = parse(html);
        let sites = build(&doc);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].gloss.as_deref(), Some("real sense"));
    }

    #[test]
    fn unrecognized_heading_closes_pos_scope() {
        let html = r#"<html><body>
            <h2>English</h2><h4>Noun</h4>
            <ol><li><p>a noun sense</p></li></ol>
            <h4>Translations</h4>
            <ol><li><p>not a sense</p></li></ol>
        </body></html>"#;
        let doc = parse(html);
        let sites = build(&doc);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].pos, "noun");
    }

    #[test]
    fn proper_noun_is_its_own_section() {
        let html = r#"<html><body>
            <h2>English</h2><h4>Noun</h4>
            <ol><li><p>a common noun sense</p></li></ol>
            <h4>Proper noun</h4>
            <ol><li><p>a name</p></li></ol>
        </body></html>"#;
        let doc = parse(html);
        let sites = build(&doc);
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].pos, "noun");
        assert_eq!(sites[1].pos, "proper noun");
        // A fresh section, so the ordinal restarts.
        assert_eq!(sites[1].ordinal, 1);
    }

    #[test]
    fn no_markers_yields_no_sites() {
        let doc = parse("<html><body><p>just prose</p></body></html>");
        assert!(build(&doc).is_empty());
    }

    #[test]
    fn pos_recognition_is_case_insensitive() {
        assert_eq!(recognize_pos("Verb"), Some("verb"));
        assert_eq!(recognize_pos("  proper  noun "), Some("proper noun"));
        assert_eq!(recognize_pos("Verb 2"), Some("verb"));
        assert_eq!(recognize_pos("Translations"), None);
    }
}
