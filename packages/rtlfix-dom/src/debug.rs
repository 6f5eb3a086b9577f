use crate::BaseDocument;

impl BaseDocument {
    /// Print the whole tree to stdout
    pub fn print_tree(&self) {
        self.print_subtree(0);
    }

    pub fn print_subtree(&self, node_id: usize) {
        print!("{}", self.debug_tree_string(node_id));
    }

    /// An indented dump of the subtree at `node_id`, one node per line, including processing marks.
    pub fn debug_tree_string(&self, node_id: usize) -> String {
        let mut out = String::new();
        let mut stack = vec![(node_id, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.get_node(id) else {
                continue;
            };
            out.push_str(&"  ".repeat(depth));
            out.push_str(&node.node_debug_str());
            out.push('\n');
            stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }
        out
    }
}
