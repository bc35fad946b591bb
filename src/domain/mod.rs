//! Domain layer: the tree node, its event emitter and the array codec
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod codec;
pub mod emitter;
pub mod error;
pub mod node;

pub use codec::{format_marker, parse_marker, Token, MARKER_DELIMITER};
pub use emitter::{EventEmitter, Handler, SubscriptionId};
pub use error::{DecodeError, TreeError, TreeResult};
pub use node::{PreOrder, TreeNode, WeakTreeNode};
