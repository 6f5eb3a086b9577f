//! Recursive correction of a subtree.

use rtlfix_dom::{BaseDocument, Node, NodeFlags};

use crate::corrector::apply_fix;
use crate::filter::{Rejection, Verdict, evaluate, is_eligible};

/// Counts from one walk or scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Elements evaluated
    pub visited: usize,
    /// Elements that were styled
    pub styled: usize,
    /// Elements whose style could not be read or whose fix failed
    pub failed: usize,
}

impl WalkStats {
    pub fn merge(&mut self, other: WalkStats) {
        self.visited += other.visited;
        self.styled += other.styled;
        self.failed += other.failed;
    }
}

/// Evaluate one element and style it if it is a candidate. A rejected element that is not
/// styled gets the `CHECKED` flag.
pub(crate) fn process_element(doc: &mut BaseDocument, node_id: usize, stats: &mut WalkStats) {
    stats.visited += 1;
    match evaluate(doc, node_id) {
        Verdict::Candidate => match apply_fix(doc, node_id) {
            Ok(true) => stats.styled += 1,
            Ok(false) => {}
            Err(_err) => {
                stats.failed += 1;
                #[cfg(feature = "tracing")]
                tracing::warn!("failed to style node {node_id}: {_err}");
            }
        },
        Verdict::Rejected(Rejection::Ineligible) => {}
        Verdict::Rejected(rejection) => {
            if rejection == Rejection::StyleError {
                stats.failed += 1;
            }
            if let Some(node) = doc.get_node_mut(node_id) {
                if !node.mark.as_ref().is_some_and(|mark| mark.is_styled()) {
                    node.flags.insert(NodeFlags::CHECKED);
                }
            }
        }
    }
}

/// Clear the mark and `CHECKED` flag of a node whose text changed, unless it is styled.
pub(crate) fn invalidate(doc: &mut BaseDocument, node_id: usize) {
    if let Some(node) = doc.get_node_mut(node_id) {
        node.invalidate();
    }
}

/// Correct `node_id` and every eligible element below it.
///
/// A text node stands for its parent element, which is invalidated first: its text changed, so
/// any earlier verdict is stale. Subtrees rooted at ineligible elements are not entered.
pub fn check_and_fix(doc: &mut BaseDocument, node_id: usize) -> WalkStats {
    let mut stats = WalkStats::default();

    let Some(node) = doc.get_node(node_id) else {
        return stats;
    };
    let root = if node.is_text_node() {
        let Some(parent_id) = doc.parent_element(node_id) else {
            return stats;
        };
        invalidate(doc, parent_id);
        parent_id
    } else {
        node_id
    };

    if !is_eligible(doc, root) {
        return stats;
    }

    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        process_element(doc, id, &mut stats);

        let Some(node) = doc.get_node(id) else {
            continue;
        };
        let children: Vec<usize> = node
            .children
            .iter()
            .rev()
            .copied()
            .filter(|&child| doc.get_node(child).is_some_and(Node::is_element))
            .filter(|&child| is_eligible(doc, child))
            .collect();
        stack.extend(children);
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(
        "walked node {root}: {} visited, {} styled",
        stats.visited,
        stats.styled
    );

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{by_id, page};
    use rtlfix_dom::{Direction, ProcessingMark};

    #[test]
    fn walks_every_descendant_element() {
        let mut doc = page(
            r#"<div id="root"><div id="inner"><span id="span">English</span></div><p id="p">سلام</p></div>"#,
        );
        let root = by_id(&doc, "root");
        let stats = check_and_fix(&mut doc, root);
        assert_eq!(stats.visited, 4);
        assert_eq!(stats.styled, 1);

        // The root holds Persian text, so it is styled and its descendants inherit rtl
        assert!(doc.get_node(root).unwrap().mark.as_ref().is_some_and(ProcessingMark::is_styled));
        let p = by_id(&doc, "p");
        assert_eq!(doc.get_node(p).unwrap().mark, Some(ProcessingMark::AlreadyRtl));
        let span = by_id(&doc, "span");
        assert_eq!(doc.get_node(span).unwrap().mark, Some(ProcessingMark::NoRtlDetected));
        assert!(doc.get_node(span).unwrap().flags.is_checked());
    }

    #[test]
    fn styled_elements_are_never_checked() {
        let mut doc = page(r#"<p id="p">سلام</p>"#);
        let p = by_id(&doc, "p");
        check_and_fix(&mut doc, p);
        check_and_fix(&mut doc, p);
        let node = doc.get_node(p).unwrap();
        assert!(node.mark.as_ref().is_some_and(ProcessingMark::is_styled));
        assert!(!node.flags.is_checked());
    }

    #[test]
    fn text_node_resolves_to_invalidated_parent() {
        let mut doc = page(r#"<p id="p">Hello</p>"#);
        let p = by_id(&doc, "p");
        check_and_fix(&mut doc, p);
        assert_eq!(doc.get_node(p).unwrap().mark, Some(ProcessingMark::NoRtlDetected));

        let text = doc.get_node(p).unwrap().children[0];
        doc.mutate().set_node_text(text, "سلام").unwrap();
        let stats = check_and_fix(&mut doc, text);
        assert_eq!(stats.styled, 1);
        assert_eq!(doc.computed_style(p).unwrap().direction, Direction::Rtl);
    }

    #[test]
    fn a_failing_element_does_not_stop_the_walk() {
        let mut doc = page(
            r#"<div id="root"><p id="a" style="direction: ltr">سلام</p><p id="b" style="direction: ltr">سلام</p><p id="c" style="direction: ltr">سلام</p></div>"#,
        );
        let root = by_id(&doc, "root");
        let b = by_id(&doc, "b");
        doc.nodes[b].parent = Some(4242);

        let stats = check_and_fix(&mut doc, root);
        assert_eq!(stats, WalkStats { visited: 4, styled: 3, failed: 1 });

        assert_eq!(doc.get_node(b).unwrap().mark, Some(ProcessingMark::StyleError));
        assert!(doc.get_node(b).unwrap().flags.is_checked());
        for id in ["a", "c"] {
            let node = by_id(&doc, id);
            assert!(doc.get_node(node).unwrap().mark.as_ref().is_some_and(ProcessingMark::is_styled), "{id}");
        }
    }

    #[test]
    fn skipped_subtrees_are_not_entered() {
        let mut doc = page(r#"<div id="root"><pre><b id="b">سلام</b></pre></div>"#);
        let root = by_id(&doc, "root");
        check_and_fix(&mut doc, root);
        let b = by_id(&doc, "b");
        assert!(!doc.get_node(b).unwrap().is_processed());
    }

    #[test]
    fn ineligible_root_is_a_no_op() {
        let mut doc = page(r#"<script id="s">"سلام"</script>"#);
        let s = by_id(&doc, "s");
        assert_eq!(check_and_fix(&mut doc, s), WalkStats::default());
        assert_eq!(check_and_fix(&mut doc, usize::MAX), WalkStats::default());
    }
}
