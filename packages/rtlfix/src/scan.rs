//! Bulk scans over the block-level, text-bearing elements of a document.

use rtlfix_dom::BaseDocument;

use crate::activation::ActivationState;
use crate::walker::{WalkStats, process_element};

/// Elements queried by a scan. Anything else is only reached by a mutation walk.
pub const SCAN_TAGS: &[&str] = &[
    "p", "li", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "article", "section",
    "aside", "summary", "figcaption", "dt", "dd",
];

/// Evaluate and, where needed, correct every [`SCAN_TAGS`] element below `container`.
///
/// Does nothing unless `activation` is active. Matches are processed individually, without
/// descending into their children.
pub fn scan(doc: &mut BaseDocument, container: usize, activation: ActivationState) -> WalkStats {
    let mut stats = WalkStats::default();
    if !activation.is_active() {
        return stats;
    }

    for node_id in doc.query_selector_all_by_local_names(container, SCAN_TAGS) {
        process_element(doc, node_id, &mut stats);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "scanned node {container}: {} visited, {} styled, {} failed",
        stats.visited,
        stats.styled,
        stats.failed
    );

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{by_id, page};
    use rtlfix_dom::{Direction, TextAlign};

    #[test]
    fn scan_styles_listed_elements() {
        let mut doc = page(
            r#"<h1 id="h">عنوان</h1>
               <ul><li id="li">مورد</li></ul>
               <table><tr><td id="td">خانه</td><th id="th">Header</th></tr></table>
               <p id="p">سلام world</p>"#,
        );
        let stats = scan(&mut doc, 0, ActivationState::Active);
        assert_eq!(stats.styled, 4);
        for id in ["h", "li", "td", "p"] {
            let style = doc.computed_style(by_id(&doc, id)).unwrap();
            assert_eq!(style.direction, Direction::Rtl, "{id}");
            assert_eq!(style.text_align, TextAlign::Right, "{id}");
        }
        let th = by_id(&doc, "th");
        assert_eq!(doc.computed_style(th).unwrap().direction, Direction::Ltr);
    }

    #[test]
    fn unlisted_elements_are_not_scanned() {
        let mut doc = page(r#"<div id="div">سلام</div><span id="span">سلام</span>"#);
        let stats = scan(&mut doc, 0, ActivationState::Active);
        assert_eq!(stats, WalkStats::default());
        assert!(!doc.get_node(by_id(&doc, "div")).unwrap().is_processed());
    }

    #[test]
    fn inactive_scan_is_a_no_op() {
        let mut doc = page(r#"<p id="p">سلام</p>"#);
        let stats = scan(&mut doc, 0, ActivationState::Inactive);
        assert_eq!(stats, WalkStats::default());
        let p = by_id(&doc, "p");
        assert!(!doc.get_node(p).unwrap().is_processed());
        assert_eq!(doc.get_node(p).unwrap().attr("style"), None);
    }

    #[test]
    fn second_scan_only_touches_new_content() {
        let mut doc = page(r#"<p id="p">سلام</p>"#);
        scan(&mut doc, 0, ActivationState::Active);
        let again = scan(&mut doc, 0, ActivationState::Active);
        assert_eq!(again.styled, 0);
        assert_eq!(again.visited, 1);
    }
}
