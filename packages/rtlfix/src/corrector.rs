//! Applying and reverting the direction override.

use rtlfix_dom::style::Declaration;
use rtlfix_dom::{BaseDocument, NodeFlags, PriorInline, ProcessingMark};

use crate::FixError;

/// Right alignment rather than `justify`: justified mixed-direction text spaces unevenly.
const FIXED_DIRECTION: &str = "rtl";
const FIXED_TEXT_ALIGN: &str = "right";

/// Override the element's direction to right-to-left and align its text right, then mark it
/// `Styled`. Returns `false` without touching the element if it is already styled.
pub fn apply_fix(doc: &mut BaseDocument, node_id: usize) -> Result<bool, FixError> {
    let already_styled = doc
        .get_node(node_id)
        .and_then(|node| node.mark.as_ref())
        .is_some_and(ProcessingMark::is_styled);
    if already_styled {
        return Ok(false);
    }

    let prior = {
        let mut mutr = doc.mutate();
        let direction = mutr.set_style_property(node_id, Declaration::new("direction", FIXED_DIRECTION))?;
        let text_align = mutr.set_style_property(node_id, Declaration::new("text-align", FIXED_TEXT_ALIGN))?;
        PriorInline {
            direction,
            text_align,
        }
    };

    if let Some(node) = doc.get_node_mut(node_id) {
        node.flags.remove(NodeFlags::CHECKED);
        node.mark = Some(ProcessingMark::Styled(prior));
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("styled node {node_id}");

    Ok(true)
}

/// Undo [`apply_fix`]: restore the inline `direction` and `text-align` declarations the
/// element had before it was styled, and return it to unprocessed. Unstyled elements only have
/// their mark and `CHECKED` flag cleared.
pub fn revert_fix(doc: &mut BaseDocument, node_id: usize) -> Result<(), FixError> {
    let node = doc
        .get_node_mut(node_id)
        .ok_or(rtlfix_dom::MutationError::NodeNotFound(node_id))?;
    node.flags.remove(NodeFlags::CHECKED);
    let Some(ProcessingMark::Styled(prior)) = node.mark.take() else {
        return Ok(());
    };

    let mut mutr = doc.mutate();
    let restores = [
        ("direction", prior.direction),
        ("text-align", prior.text_align),
    ];
    for (property, declaration) in restores {
        match declaration {
            Some(declaration) => mutr.set_style_property(node_id, declaration)?,
            None => mutr.remove_style_property(node_id, property)?,
        };
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("reverted node {node_id}");

    Ok(())
}
