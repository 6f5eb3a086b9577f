//! Mutation observation.
//!
//! Observers are registered on a root node and receive [`MutationRecord`]s for the changes made
//! through a [`DocumentMutator`](crate::DocumentMutator) that they are interested in. Records are
//! buffered per observer until [`BaseDocument::take_records`] drains them.

use crate::BaseDocument;

/// Which changes an observer wants to hear about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserverOptions {
    /// Node insertion and removal
    pub child_list: bool,
    /// Text node content changes
    pub character_data: bool,
    /// Attribute changes
    pub attributes: bool,
    /// Observe the whole subtree rather than just the root's own changes
    pub subtree: bool,
}

impl ObserverOptions {
    /// Insertions, removals and text changes anywhere below the root.
    pub const fn content_changes() -> Self {
        Self {
            child_list: true,
            character_data: true,
            attributes: false,
            subtree: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// Children of `target` were added and/or removed
    ChildList {
        target: usize,
        added_nodes: Vec<usize>,
        removed_nodes: Vec<usize>,
    },
    /// The text of the text node `target` changed
    CharacterData { target: usize, old_value: String },
    /// Attribute `name` of element `target` changed
    Attributes {
        target: usize,
        name: String,
        old_value: Option<String>,
    },
}

impl MutationRecord {
    pub fn target(&self) -> usize {
        match self {
            MutationRecord::ChildList { target, .. }
            | MutationRecord::CharacterData { target, .. }
            | MutationRecord::Attributes { target, .. } => *target,
        }
    }

    fn wanted_by(&self, options: &ObserverOptions) -> bool {
        match self {
            MutationRecord::ChildList { .. } => options.child_list,
            MutationRecord::CharacterData { .. } => options.character_data,
            MutationRecord::Attributes { .. } => options.attributes,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MutationObserver {
    root: usize,
    options: ObserverOptions,
    records: Vec<MutationRecord>,
}

impl BaseDocument {
    /// Start observing `root`. Records accumulate until taken with [`Self::take_records`].
    pub fn observe(&mut self, root: usize, options: ObserverOptions) -> ObserverId {
        let id = self.observers.insert(MutationObserver {
            root,
            options,
            records: Vec::new(),
        });
        ObserverId(id)
    }

    /// Stop observing and drop any records not yet taken. Returns false if the observer was
    /// already disconnected.
    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        self.observers.try_remove(observer.0).is_some()
    }

    pub fn is_observing(&self, observer: ObserverId) -> bool {
        self.observers.contains(observer.0)
    }

    /// Drain the records queued for `observer`, in the order the mutations happened.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(observer.0)
            .map(|observer| std::mem::take(&mut observer.records))
            .unwrap_or_default()
    }

    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn queue_mutation_record(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }

        let target = record.target();
        let interested: Vec<usize> = self
            .observers
            .iter()
            .filter(|(_, observer)| record.wanted_by(&observer.options))
            .filter(|(_, observer)| {
                observer.root == target
                    || (observer.options.subtree && self.is_inclusive_ancestor(observer.root, target))
            })
            .map(|(key, _)| key)
            .collect();

        for key in interested {
            self.observers[key].records.push(record.clone());
        }
    }
}
