//! Rendering of tree nodes as box-drawing text via `termtree`.

use std::fmt::Display;

use termtree::Tree;
use tracing::instrument;

use crate::domain::TreeNode;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<T: Display> TreeNodeConvert for TreeNode<T> {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let label = self.data().to_string();

        // Recursively construct the children
        let leaves: Vec<_> = self
            .children()
            .iter()
            .map(|c| c.to_tree_string())
            .collect();

        Tree::new(label).with_leaves(leaves)
    }
}
