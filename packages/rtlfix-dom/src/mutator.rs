use std::collections::BTreeSet;

use markup5ever::QualName;

use crate::node::{Attribute, ElementData, NodeData, NodeFlags};
use crate::style::{Declaration, Declarations};
use crate::{BaseDocument, MutationRecord, Node, TreeTraverser};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("node {0} does not exist")]
    NodeNotFound(usize),

    #[error("node {0} is not an element")]
    NotAnElement(usize),

    #[error("node {0} is not a text node")]
    NotATextNode(usize),

    #[error("node {0} has no parent")]
    NoParent(usize),

    #[error("cannot insert node {child} into {parent}: it is an inclusive ancestor of it")]
    HierarchyRequest { parent: usize, child: usize },
}

/// Applies changes to a [`BaseDocument`], keeping connectedness and author stylesheets up to
/// date and queueing [`MutationRecord`]s for observers.
///
/// Stylesheets of affected `<style>` elements are re-parsed when the mutator is flushed or dropped.
pub struct DocumentMutator<'doc> {
    /// Document is public as an escape hatch, but users of this API should ideally avoid using it
    /// and prefer exposing additional functionality in DocumentMutator.
    pub doc: &'doc mut BaseDocument,

    /// `<style>` elements whose stylesheet must be re-parsed
    style_nodes: BTreeSet<usize>,
}

impl Drop for DocumentMutator<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}

impl DocumentMutator<'_> {
    pub fn new<'doc>(doc: &'doc mut BaseDocument) -> DocumentMutator<'doc> {
        DocumentMutator {
            doc,
            style_nodes: BTreeSet::new(),
        }
    }

    pub fn node_has_parent(&self, node_id: usize) -> bool {
        self.doc.get_node(node_id).is_some_and(|node| node.parent.is_some())
    }

    pub fn element_name(&self, node_id: usize) -> Option<&QualName> {
        self.doc
            .get_node(node_id)?
            .element_data()
            .map(|el| &el.name)
    }

    pub fn last_child_id(&self, node_id: usize) -> Option<usize> {
        self.doc.get_node(node_id)?.children.last().copied()
    }

    pub fn previous_sibling_id(&self, node_id: usize) -> Option<usize> {
        let parent_id = self.doc.get_node(node_id)?.parent?;
        let siblings = &self.doc.get_node(parent_id)?.children;
        let idx = siblings.iter().position(|&id| id == node_id)?;
        idx.checked_sub(1).map(|prev| siblings[prev])
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> usize {
        let data = ElementData::new(name, attrs);
        self.doc.create_node(NodeData::Element(data))
    }

    pub fn create_text_node(&mut self, text: &str) -> usize {
        self.doc.create_text_node(text)
    }

    pub fn create_comment_node(&mut self) -> usize {
        self.doc.create_node(NodeData::Comment)
    }

    pub fn append_children(&mut self, parent_id: usize, child_ids: &[usize]) -> Result<(), MutationError> {
        self.insert_children(parent_id, None, child_ids)
    }

    pub fn insert_nodes_before(&mut self, anchor_id: usize, new_node_ids: &[usize]) -> Result<(), MutationError> {
        let anchor = self.node(anchor_id)?;
        let parent_id = anchor.parent.ok_or(MutationError::NoParent(anchor_id))?;
        self.insert_children(parent_id, Some(anchor_id), new_node_ids)
    }

    fn insert_children(
        &mut self,
        parent_id: usize,
        before: Option<usize>,
        child_ids: &[usize],
    ) -> Result<(), MutationError> {
        let parent = self.node(parent_id)?;
        if matches!(parent.data, NodeData::Text(_) | NodeData::Comment) {
            return Err(MutationError::NotAnElement(parent_id));
        }
        for &child_id in child_ids {
            self.node(child_id)?;
            if self.doc.is_inclusive_ancestor(child_id, parent_id) {
                return Err(MutationError::HierarchyRequest {
                    parent: parent_id,
                    child: child_id,
                });
            }
        }

        for &child_id in child_ids {
            self.detach(child_id);
        }

        let parent = &mut self.doc.nodes[parent_id];
        let idx = before
            .and_then(|anchor| parent.children.iter().position(|&id| id == anchor))
            .unwrap_or(parent.children.len());
        parent.children.splice(idx..idx, child_ids.iter().copied());
        let connected = parent.is_in_document();

        for &child_id in child_ids {
            self.doc.nodes[child_id].parent = Some(parent_id);
            self.set_connected(child_id, connected);
            self.note_style_changes(child_id);
        }

        self.doc.queue_mutation_record(MutationRecord::ChildList {
            target: parent_id,
            added_nodes: child_ids.to_vec(),
            removed_nodes: Vec::new(),
        });
        Ok(())
    }

    /// Remove the node from its parent. The node and its subtree stay alive and may be
    /// re-inserted.
    pub fn remove_node(&mut self, node_id: usize) -> Result<(), MutationError> {
        self.node(node_id)?;
        self.detach(node_id);
        Ok(())
    }

    /// Remove the node from its parent and drop it and its subtree from the document.
    pub fn remove_and_drop_node(&mut self, node_id: usize) -> Result<Node, MutationError> {
        self.node(node_id)?;
        self.detach(node_id);

        let subtree: Vec<usize> = TreeTraverser::new_with_root(self.doc, node_id).collect();
        for &id in subtree.iter().skip(1) {
            self.style_nodes.remove(&id);
            self.doc.remove_stylesheet_for_node(id);
            self.doc.nodes.try_remove(id);
        }
        self.style_nodes.remove(&node_id);
        self.doc.remove_stylesheet_for_node(node_id);
        self.doc
            .nodes
            .try_remove(node_id)
            .ok_or(MutationError::NodeNotFound(node_id))
    }

    /// Move all children of `old_parent_id` to the end of `new_parent_id`'s children.
    pub fn reparent_children(&mut self, old_parent_id: usize, new_parent_id: usize) -> Result<(), MutationError> {
        self.node(new_parent_id)?;
        let children = std::mem::take(&mut self.node_mut(old_parent_id)?.children);
        if children.is_empty() {
            return Ok(());
        }
        self.doc.queue_mutation_record(MutationRecord::ChildList {
            target: old_parent_id,
            added_nodes: Vec::new(),
            removed_nodes: children.clone(),
        });

        let connected = self.doc.nodes[new_parent_id].is_in_document();
        for &child_id in &children {
            self.doc.nodes[child_id].parent = Some(new_parent_id);
            self.set_connected(child_id, connected);
            self.note_style_changes(child_id);
        }
        self.doc.nodes[new_parent_id].children.extend(children.iter().copied());

        self.doc.queue_mutation_record(MutationRecord::ChildList {
            target: new_parent_id,
            added_nodes: children,
            removed_nodes: Vec::new(),
        });
        Ok(())
    }

    /// Replace the content of a text node.
    pub fn set_node_text(&mut self, node_id: usize, text: &str) -> Result<(), MutationError> {
        self.update_text(node_id, |content| {
            content.clear();
            content.push_str(text);
        })
    }

    pub fn append_text_to_node(&mut self, node_id: usize, text: &str) -> Result<(), MutationError> {
        self.update_text(node_id, |content| content.push_str(text))
    }

    fn update_text(&mut self, node_id: usize, update: impl FnOnce(&mut String)) -> Result<(), MutationError> {
        let text = self
            .node_mut(node_id)?
            .text_data_mut()
            .ok_or(MutationError::NotATextNode(node_id))?;
        let old_value = text.content.clone();
        update(&mut text.content);

        self.note_style_changes(node_id);
        self.doc.queue_mutation_record(MutationRecord::CharacterData {
            target: node_id,
            old_value,
        });
        Ok(())
    }

    pub fn set_attribute(&mut self, node_id: usize, name: &str, value: &str) -> Result<(), MutationError> {
        let element = self.element_mut(node_id)?;
        let old_value = element.set_attr(name, value);
        self.doc.queue_mutation_record(MutationRecord::Attributes {
            target: node_id,
            name: name.to_string(),
            old_value,
        });
        Ok(())
    }

    pub fn clear_attribute(&mut self, node_id: usize, name: &str) -> Result<(), MutationError> {
        let element = self.element_mut(node_id)?;
        if let Some(old) = element.remove_attr(name) {
            self.doc.queue_mutation_record(MutationRecord::Attributes {
                target: node_id,
                name: name.to_string(),
                old_value: Some(old.value),
            });
        }
        Ok(())
    }

    pub fn add_attrs_if_missing(&mut self, node_id: usize, attrs: Vec<Attribute>) -> Result<(), MutationError> {
        let element = self.element_mut(node_id)?;
        let missing: Vec<Attribute> = attrs
            .into_iter()
            .filter(|attr| !element.has_attr(&attr.name.local))
            .collect();
        for attr in missing {
            self.set_attribute(node_id, &attr.name.local, &attr.value)?;
        }
        Ok(())
    }

    /// Set an inline style declaration, returning the one it replaced.
    pub fn set_style_property(
        &mut self,
        node_id: usize,
        declaration: Declaration,
    ) -> Result<Option<Declaration>, MutationError> {
        self.update_inline_style(node_id, |style| style.set(declaration))
    }

    /// Remove an inline style declaration, returning it.
    pub fn remove_style_property(
        &mut self,
        node_id: usize,
        property: &str,
    ) -> Result<Option<Declaration>, MutationError> {
        self.update_inline_style(node_id, |style| style.remove(property))
    }

    fn update_inline_style<R>(
        &mut self,
        node_id: usize,
        update: impl FnOnce(&mut Declarations) -> R,
    ) -> Result<R, MutationError> {
        let element = self.element_mut(node_id)?;
        let old_value = element.attr("style").map(str::to_string);
        let result = update(&mut element.style_attribute);
        element.flush_style_attribute();

        if element.attr("style") != old_value.as_deref() {
            self.doc.queue_mutation_record(MutationRecord::Attributes {
                target: node_id,
                name: "style".to_string(),
                old_value,
            });
        }
        Ok(result)
    }

    /// Re-parse the stylesheets of `<style>` elements touched since the last flush.
    pub fn flush(&mut self) {
        for node_id in std::mem::take(&mut self.style_nodes) {
            let is_live_style = self.doc.get_node(node_id).is_some_and(|node| {
                node.is_in_document() && node.local_name() == Some("style")
            });
            if is_live_style {
                self.doc.upsert_stylesheet_for_node(node_id);
            } else {
                self.doc.remove_stylesheet_for_node(node_id);
            }
        }
    }

    fn node(&self, node_id: usize) -> Result<&Node, MutationError> {
        self.doc.get_node(node_id).ok_or(MutationError::NodeNotFound(node_id))
    }

    fn node_mut(&mut self, node_id: usize) -> Result<&mut Node, MutationError> {
        self.doc
            .get_node_mut(node_id)
            .ok_or(MutationError::NodeNotFound(node_id))
    }

    fn element_mut(&mut self, node_id: usize) -> Result<&mut ElementData, MutationError> {
        self.node_mut(node_id)?
            .element_data_mut()
            .ok_or(MutationError::NotAnElement(node_id))
    }

    fn detach(&mut self, node_id: usize) {
        let Some(parent_id) = self.doc.nodes.get_mut(node_id).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent) = self.doc.nodes.get_mut(parent_id) {
            parent.children.retain(|&id| id != node_id);
        }
        self.note_style_changes(node_id);
        if let Some(style_id) = self.enclosing_style_element(parent_id) {
            self.style_nodes.insert(style_id);
        }
        self.set_connected(node_id, false);

        self.doc.queue_mutation_record(MutationRecord::ChildList {
            target: parent_id,
            added_nodes: Vec::new(),
            removed_nodes: vec![node_id],
        });
    }

    fn set_connected(&mut self, node_id: usize, connected: bool) {
        let subtree: Vec<usize> = TreeTraverser::new_with_root(self.doc, node_id).collect();
        for id in subtree {
            self.doc.nodes[id].flags.set(NodeFlags::IS_IN_DOCUMENT, connected);
        }
    }

    /// Record `<style>` elements whose text may have been affected by a change at `node_id`.
    fn note_style_changes(&mut self, node_id: usize) {
        let styles: Vec<usize> = TreeTraverser::new_with_root(self.doc, node_id)
            .filter(|&id| self.doc.get_node(id).and_then(Node::local_name) == Some("style"))
            .collect();
        self.style_nodes.extend(styles);
        if let Some(style_id) = self.enclosing_style_element(node_id) {
            self.style_nodes.insert(style_id);
        }
    }

    fn enclosing_style_element(&self, node_id: usize) -> Option<usize> {
        std::iter::once(node_id)
            .chain(self.doc.ancestors(node_id).map(|node| node.id))
            .find(|&id| self.doc.get_node(id).and_then(Node::local_name) == Some("style"))
    }
}
