//! Candidate selection: which elements need their direction corrected.
//!
//! Checks run cheapest first. Structural checks only look at the element and its ancestors;
//! the computed style is resolved only for elements that pass them.

use rtlfix_dom::{BaseDocument, Direction, ElementData, MATHML_NAMESPACE, Node, ProcessingMark, SVG_NAMESPACE};

use crate::classifier::contains_rtl;

/// Elements whose content is never restyled, along with everything inside them.
pub const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "code", "pre", "input", "textarea", "select", "noscript", "iframe", "svg",
    "math", "template",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not an element, inside skipped or editable content, or not connected to the document
    Ineligible,
    /// Already marked, or checked since its text last changed
    AlreadyProcessed,
    Hidden,
    NoRtl,
    AlreadyRtl,
    StyleError,
}

impl Rejection {
    /// The mark recorded on the element for this rejection, if any.
    pub fn mark(self) -> Option<ProcessingMark> {
        match self {
            Rejection::Ineligible | Rejection::AlreadyProcessed => None,
            Rejection::Hidden => Some(ProcessingMark::Hidden),
            Rejection::NoRtl => Some(ProcessingMark::NoRtlDetected),
            Rejection::AlreadyRtl => Some(ProcessingMark::AlreadyRtl),
            Rejection::StyleError => Some(ProcessingMark::StyleError),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Contains right-to-left text but renders left-to-right
    Candidate,
    Rejected(Rejection),
}

fn is_skipped(element: &ElementData) -> bool {
    let ns = element.namespace();
    ns == SVG_NAMESPACE || ns == MATHML_NAMESPACE || SKIPPED_ELEMENTS.contains(&element.local_name())
}

/// Structural eligibility: a connected element, outside skipped subtrees and editable regions.
pub fn is_eligible(doc: &BaseDocument, node_id: usize) -> bool {
    let Some(node) = doc.get_node(node_id) else {
        return false;
    };
    let Some(element) = node.element_data() else {
        return false;
    };
    if !node.is_in_document() || is_skipped(element) {
        return false;
    }

    // The nearest explicit contenteditable value decides
    let mut editable = element.content_editable();
    if editable == Some(true) {
        return false;
    }
    for ancestor in doc.ancestors(node_id).filter_map(Node::element_data) {
        if is_skipped(ancestor) {
            return false;
        }
        if editable.is_none() {
            editable = ancestor.content_editable();
            if editable == Some(true) {
                return false;
            }
        }
    }
    true
}

/// Decide whether an element is a candidate for correction. Rejections other than
/// [`Rejection::Ineligible`] and [`Rejection::AlreadyProcessed`] are recorded as the element's
/// mark so it is not evaluated again until its text changes.
pub fn evaluate(doc: &mut BaseDocument, node_id: usize) -> Verdict {
    if !is_eligible(doc, node_id) {
        return Verdict::Rejected(Rejection::Ineligible);
    }
    if doc.get_node(node_id).is_some_and(Node::is_processed) {
        return Verdict::Rejected(Rejection::AlreadyProcessed);
    }

    let rejection = match doc.computed_style(node_id) {
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("could not resolve style of node {node_id}: {_err}");
            Some(Rejection::StyleError)
        }
        Ok(style) if !style.is_rendered() => Some(Rejection::Hidden),
        Ok(style) => {
            if !contains_rtl(&doc.text_content(node_id)) {
                Some(Rejection::NoRtl)
            } else if style.direction == Direction::Rtl {
                Some(Rejection::AlreadyRtl)
            } else {
                None
            }
        }
    };

    match rejection {
        Some(rejection) => {
            if let Some(node) = doc.get_node_mut(node_id) {
                node.mark = rejection.mark();
            }
            Verdict::Rejected(rejection)
        }
        None => Verdict::Candidate,
    }
}

pub fn is_candidate(doc: &mut BaseDocument, node_id: usize) -> bool {
    evaluate(doc, node_id) == Verdict::Candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{by_id, page};
    use rtlfix_dom::ProcessingMark;

    #[test]
    fn ltr_paragraph_with_persian_is_a_candidate() {
        let mut doc = page(r#"<p id="p">سلام world</p>"#);
        let p = by_id(&doc, "p");
        assert_eq!(evaluate(&mut doc, p), Verdict::Candidate);
        assert_eq!(doc.get_node(p).unwrap().mark, None);
    }

    #[test]
    fn skipped_elements_are_rejected_whatever_their_content() {
        let mut doc = page(
            r#"<script id="script">var s = "سلام";</script>
               <pre id="pre">سلام</pre>
               <code id="code">سلام</code>
               <textarea id="textarea">سلام</textarea>
               <pre><span id="nested">سلام</span></pre>
               <template><p id="inert">سلام</p></template>"#,
        );
        for id in ["script", "pre", "code", "textarea", "nested", "inert"] {
            let node = by_id(&doc, id);
            assert_eq!(evaluate(&mut doc, node), Verdict::Rejected(Rejection::Ineligible), "{id}");
            assert_eq!(doc.get_node(node).unwrap().mark, None, "{id}");
        }
    }

    #[test]
    fn editable_regions_are_skipped() {
        let doc = page(
            r#"<div contenteditable="true"><p id="inside">سلام</p></div>
               <div contenteditable><div contenteditable="false"><p id="opted-out">سلام</p></div></div>"#,
        );
        let inside = by_id(&doc, "inside");
        let opted_out = by_id(&doc, "opted-out");
        assert!(!is_eligible(&doc, inside));
        assert!(is_eligible(&doc, opted_out));
    }

    #[test]
    fn svg_and_mathml_content_is_skipped() {
        let mut doc = page(r#"<svg><text id="label">سلام</text></svg><math><mi id="var">س</mi></math>"#);
        let label = by_id(&doc, "label");
        let var = by_id(&doc, "var");
        assert_eq!(evaluate(&mut doc, label), Verdict::Rejected(Rejection::Ineligible));
        assert_eq!(evaluate(&mut doc, var), Verdict::Rejected(Rejection::Ineligible));
    }

    #[test]
    fn hidden_elements_are_marked_hidden() {
        let mut doc = page(
            r#"<p id="none" style="display: none">سلام</p>
               <p id="invisible" style="visibility: hidden">سلام</p>
               <div hidden><p id="attr">سلام</p></div>"#,
        );
        for id in ["none", "invisible"] {
            let node = by_id(&doc, id);
            assert_eq!(evaluate(&mut doc, node), Verdict::Rejected(Rejection::Hidden), "{id}");
            assert_eq!(doc.get_node(node).unwrap().mark, Some(ProcessingMark::Hidden), "{id}");
        }
        // display: none on an ancestor does not propagate through computed display
        let attr = by_id(&doc, "attr");
        assert_eq!(evaluate(&mut doc, attr), Verdict::Candidate);
    }

    #[test]
    fn latin_text_is_marked_no_rtl() {
        let mut doc = page(r#"<p id="p">Hello world</p>"#);
        let p = by_id(&doc, "p");
        assert_eq!(evaluate(&mut doc, p), Verdict::Rejected(Rejection::NoRtl));
        assert_eq!(doc.get_node(p).unwrap().mark, Some(ProcessingMark::NoRtlDetected));
    }

    #[test]
    fn rtl_rendered_text_is_marked_already_rtl() {
        let mut doc = page(
            r#"<style>.fa { direction: rtl }</style>
               <p id="attr" dir="rtl">سلام world</p>
               <p id="class" class="fa">سلام world</p>
               <div dir="rtl"><p id="inherited">سلام world</p></div>"#,
        );
        for id in ["attr", "class", "inherited"] {
            let node = by_id(&doc, id);
            assert_eq!(evaluate(&mut doc, node), Verdict::Rejected(Rejection::AlreadyRtl), "{id}");
            assert_eq!(doc.get_node(node).unwrap().mark, Some(ProcessingMark::AlreadyRtl), "{id}");
        }
    }

    #[test]
    fn unreadable_style_is_marked_style_error() {
        let mut doc = page(r#"<p id="p">سلام</p>"#);
        let p = by_id(&doc, "p");
        doc.nodes[p].parent = Some(4242);

        assert!(is_eligible(&doc, p));
        assert_eq!(evaluate(&mut doc, p), Verdict::Rejected(Rejection::StyleError));
        assert_eq!(doc.get_node(p).unwrap().mark, Some(ProcessingMark::StyleError));
        assert_eq!(evaluate(&mut doc, p), Verdict::Rejected(Rejection::AlreadyProcessed));
    }

    #[test]
    fn marked_elements_are_not_reevaluated() {
        let mut doc = page(r#"<p id="p">Hello</p>"#);
        let p = by_id(&doc, "p");
        assert_eq!(evaluate(&mut doc, p), Verdict::Rejected(Rejection::NoRtl));
        assert_eq!(evaluate(&mut doc, p), Verdict::Rejected(Rejection::AlreadyProcessed));
        assert!(!is_candidate(&mut doc, p));
    }

    #[test]
    fn text_and_detached_nodes_are_ineligible() {
        let mut doc = page(r#"<p id="p">سلام</p>"#);
        let p = by_id(&doc, "p");
        let text = doc.get_node(p).unwrap().children[0];
        assert!(!is_eligible(&doc, text));

        doc.mutate().remove_node(p).unwrap();
        assert_eq!(evaluate(&mut doc, p), Verdict::Rejected(Rejection::Ineligible));
        assert!(!is_eligible(&doc, usize::MAX));
    }
}
