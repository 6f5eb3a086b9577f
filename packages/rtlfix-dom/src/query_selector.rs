use crate::{BaseDocument, TreeTraverser};

impl BaseDocument {
    /// All descendant elements of `root` (excluding `root` itself) whose local name is one of
    /// `names`, in tree order.
    pub fn query_selector_all_by_local_names(&self, root: usize, names: &[&str]) -> Vec<usize> {
        TreeTraverser::new_with_root(self, root)
            .skip(1)
            .filter(|&id| {
                self.get_node(id)
                    .and_then(|node| node.local_name())
                    .is_some_and(|local| names.iter().any(|name| name.eq_ignore_ascii_case(local)))
            })
            .collect()
    }

    /// The first element in the document with the given id attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<usize> {
        TreeTraverser::new(self).find(|&node_id| {
            self.get_node(node_id)
                .and_then(|node| node.element_data())
                .is_some_and(|el| el.id.as_deref() == Some(id))
        })
    }

    pub fn get_elements_by_tag_name(&self, name: &str) -> Vec<usize> {
        self.query_selector_all_by_local_names(0, &[name])
    }
}
