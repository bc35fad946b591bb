//! Generic hierarchical container with synchronous event propagation.
//!
//! Every [`TreeNode`] is both a node and the tree rooted at it. Nodes own their
//! children, keep weak links to their parent and to the tree root, and carry a
//! local event emitter used by [`TreeNode::broadcast_down`] and
//! [`TreeNode::bubble_up`]. Trees encode to a flat pre-order sequence of
//! `[payload, @N@]` pairs and decode back losslessly.
//!
//! ```
//! use evtree::TreeNode;
//!
//! let root = TreeNode::new("root");
//! let a = TreeNode::new("a");
//! root.attach(&a)?.attach(&TreeNode::new("c"))?;
//! a.attach(&TreeNode::new("b"))?.attach(&TreeNode::new("d"))?;
//!
//! assert_eq!(
//!     root.encode_strings(),
//!     ["root", "@2@", "a", "@2@", "b", "@0@", "d", "@0@", "c", "@0@"]
//! );
//! # Ok::<(), evtree::TreeError>(())
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use domain::{
    format_marker, parse_marker, DecodeError, EventEmitter, SubscriptionId, Token, TreeError,
    TreeNode, TreeResult, WeakTreeNode,
};
