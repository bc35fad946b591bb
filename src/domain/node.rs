//! Self-referential tree node: owns its children, points back at parent and root.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::emitter::{dispatch, EventEmitter, SubscriptionId};
use crate::domain::error::{TreeError, TreeResult};

type Link<T> = Rc<RefCell<NodeInner<T>>>;
type WeakLink<T> = Weak<RefCell<NodeInner<T>>>;

struct NodeInner<T> {
    data: T,
    /// Owning links; the only strong references inside a tree.
    children: Vec<TreeNode<T>>,
    /// None exactly when this node is a root
    parent: Option<WeakLink<T>>,
    /// Topmost ancestor, None exactly when `parent` is None
    root: Option<WeakLink<T>>,
    emitter: EventEmitter,
}

/// Handle to a node that is at the same time a whole tree.
///
/// Cloning the handle does not copy the node: both clones refer to the same
/// node. Use [`TreeNode::ptr_eq`] for identity and [`TreeNode::equal`] (or `==`)
/// for structural comparison.
///
/// The handle is single-threaded (`Rc`/`RefCell`); callers needing shared
/// access across threads must serialize mutations themselves.
pub struct TreeNode<T> {
    inner: Link<T>,
}

impl<T> Clone for TreeNode<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> TreeNode<T> {
    pub fn new(data: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(NodeInner {
                data,
                children: Vec::new(),
                parent: None,
                root: None,
                emitter: EventEmitter::new(),
            })),
        }
    }

    fn from_weak(link: &WeakLink<T>) -> Option<Self> {
        link.upgrade().map(|inner| Self { inner })
    }

    fn weak_link(&self) -> WeakLink<T> {
        Rc::downgrade(&self.inner)
    }

    /// Non-owning handle to this node.
    ///
    /// Handlers that need their own node (or an ancestor) capture this instead
    /// of a clone; a clone held by the node's emitter would keep it alive forever.
    pub fn downgrade(&self) -> WeakTreeNode<T> {
        WeakTreeNode {
            inner: self.weak_link(),
        }
    }

    pub fn data(&self) -> Ref<'_, T> {
        Ref::map(self.inner.borrow(), |n| &n.data)
    }

    pub fn set_data(&self, data: T) {
        self.inner.borrow_mut().data = data;
    }

    /// Swaps in a new payload and returns the previous one.
    pub fn replace_data(&self, data: T) -> T {
        std::mem::replace(&mut self.inner.borrow_mut().data, data)
    }

    pub fn parent(&self) -> Option<Self> {
        self.inner.borrow().parent.as_ref().and_then(Self::from_weak)
    }

    /// Cached topmost ancestor; `None` when this node is itself a root.
    pub fn root(&self) -> Option<Self> {
        self.inner.borrow().root.as_ref().and_then(Self::from_weak)
    }

    /// Effective root of the tree this node belongs to (itself if it is the root).
    pub fn root_node(&self) -> Self {
        self.root().unwrap_or_else(|| self.clone())
    }

    pub fn children(&self) -> Vec<Self> {
        self.inner.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.inner.borrow().children.len()
    }

    pub fn is_root(&self) -> bool {
        self.inner.borrow().parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.inner.borrow().children.is_empty()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Walks `parent` links starting at `self`.
    fn is_self_or_ancestor(&self, candidate: &Self) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.ptr_eq(candidate) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Appends `child` and re-roots its subtree under this node's tree.
    ///
    /// Returns the receiver so calls chain: `a.attach(&b)?.attach(&d)?`.
    #[instrument(level = "trace", skip(self, child))]
    pub fn attach(&self, child: &Self) -> TreeResult<&Self> {
        if !child.is_root() {
            return Err(if self.is_self_or_ancestor(child) {
                TreeError::CycleDetected
            } else {
                TreeError::AlreadyAttached
            });
        }
        // A parentless ancestor of the receiver can only be its root.
        if self.root_node().ptr_eq(child) {
            return Err(TreeError::CycleDetected);
        }

        let new_root = self.root_node().weak_link();
        child.inner.borrow_mut().parent = Some(self.weak_link());
        self.inner.borrow_mut().children.push(child.clone());
        propagate_root(child, Some(new_root));

        debug!(children = self.child_count(), "attached child");
        Ok(self)
    }

    /// Removes `child` and makes it the root of its own tree.
    ///
    /// Fails with [`TreeError::NotAChild`] without touching anything when
    /// `child` is not a direct child of the receiver.
    #[instrument(level = "trace", skip(self, child))]
    pub fn detach(&self, child: &Self) -> TreeResult<&Self> {
        let position = self
            .inner
            .borrow()
            .children
            .iter()
            .position(|c| c.ptr_eq(child))
            .ok_or(TreeError::NotAChild)?;

        let removed = self.inner.borrow_mut().children.remove(position);
        removed.inner.borrow_mut().parent = None;
        propagate_root(&removed, None);

        debug!(position = position, children = self.child_count(), "detached child");
        Ok(self)
    }

    /// Detaches the receiver from its parent; no-op on a root.
    pub fn detach_from_parent(&self) -> TreeResult<()> {
        if let Some(parent) = self.parent() {
            parent.detach(self)?;
        }
        Ok(())
    }

    /// Links a freshly created root node as the last child, with a known tree root.
    pub(crate) fn push_fresh_child(&self, child: &Self, root: &Self) {
        {
            let mut c = child.inner.borrow_mut();
            c.parent = Some(self.weak_link());
            c.root = Some(root.weak_link());
        }
        self.inner.borrow_mut().children.push(child.clone());
    }

    /// Pre-order iterator over this node and all its descendants.
    pub fn iter(&self) -> PreOrder<T> {
        PreOrder {
            stack: vec![self.clone()],
        }
    }

    /// Number of nodes in the subtree, including the receiver.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false: a subtree contains at least its own root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Height of the subtree; a lone node has depth 1.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.clone(), 1)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for child in node.inner.borrow().children.iter() {
                stack.push((child.clone(), depth + 1));
            }
        }
        max_depth
    }

    /// First node in pre-order whose payload satisfies `predicate`.
    pub fn find_node(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<Self> {
        self.iter().find(|node| predicate(&*node.data()))
    }

    pub fn subscribe(&self, event: &str, handler: impl Fn(&[Value]) + 'static) -> SubscriptionId {
        self.inner
            .borrow_mut()
            .emitter
            .subscribe(event, Rc::new(handler))
    }

    pub fn unsubscribe(&self, event: &str, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().emitter.unsubscribe(event, id)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.inner.borrow().emitter.listener_count(event)
    }

    /// Delivers `event` to this node's own handlers only.
    ///
    /// The handler list is fixed before the first call, and no borrow of the
    /// node is held while handlers run.
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        let handlers = self.inner.borrow().emitter.handlers(event);
        dispatch(event, &handlers, args)
    }

    /// Emits `event` on every descendant in pre-order; the receiver is skipped.
    ///
    /// Returns the number of handler invocations.
    #[instrument(level = "trace", skip(self, args))]
    pub fn broadcast_down(&self, event: &str, args: &[Value]) -> usize {
        let mut delivered = 0;
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            delivered += node.emit(event, args);
            stack.extend(node.children().into_iter().rev());
        }
        delivered
    }

    /// Emits `event` on every ancestor, nearest first, up to the root.
    #[instrument(level = "trace", skip(self, args))]
    pub fn bubble_up(&self, event: &str, args: &[Value]) -> usize {
        let mut delivered = 0;
        let mut current = self.parent();
        while let Some(node) = current {
            delivered += node.emit(event, args);
            current = node.parent();
        }
        delivered
    }
}

/// Weak counterpart of [`TreeNode`], obtained from [`TreeNode::downgrade`].
pub struct WeakTreeNode<T> {
    inner: WeakLink<T>,
}

impl<T> WeakTreeNode<T> {
    /// `None` once every strong handle to the node is gone.
    pub fn upgrade(&self) -> Option<TreeNode<T>> {
        TreeNode::from_weak(&self.inner)
    }
}

impl<T> Clone for WeakTreeNode<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for WeakTreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakTreeNode")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<T: Clone> TreeNode<T> {
    /// Every matching payload in pre-order, the receiver's own included when it matches.
    pub fn find_all(&self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        self.iter()
            .filter_map(|node| {
                let data = node.data();
                if predicate(&*data) {
                    Some(data.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    /// First matching payload in pre-order.
    pub fn find_one(&self, predicate: impl FnMut(&T) -> bool) -> Option<T> {
        self.find_node(predicate).map(|node| node.data().clone())
    }

    /// Payloads of all leaves in pre-order.
    pub fn leaves(&self) -> Vec<T> {
        self.iter()
            .filter(TreeNode::is_leaf)
            .map(|node| node.data().clone())
            .collect()
    }
}

impl<T: PartialEq> TreeNode<T> {
    /// Structural equality: payloads, child counts and children by position.
    /// `parent` and `root` are not compared.
    pub fn equal(&self, other: &Self) -> bool {
        let mut stack = vec![(self.clone(), other.clone())];
        while let Some((a, b)) = stack.pop() {
            if a.ptr_eq(&b) {
                continue;
            }
            let (a, b) = (a.inner.borrow(), b.inner.borrow());
            if a.data != b.data || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().cloned().zip(b.children.iter().cloned()));
        }
        true
    }
}

impl<T: PartialEq> PartialEq for TreeNode<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl<T: fmt::Debug> fmt::Debug for TreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TreeNode")
            .field("data", &inner.data)
            .field("children", &inner.children)
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a TreeNode<T> {
    type Item = TreeNode<T>;
    type IntoIter = PreOrder<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Assigns `root` to `node`, then `root` (or `node` itself when `root` is None)
/// to every descendant.
fn propagate_root<T>(node: &TreeNode<T>, root: Option<WeakLink<T>>) {
    let mut stack = vec![(node.clone(), root)];
    while let Some((current, root)) = stack.pop() {
        let child_root = root.clone().unwrap_or_else(|| current.weak_link());
        let mut inner = current.inner.borrow_mut();
        inner.root = root;
        for child in inner.children.iter() {
            stack.push((child.clone(), Some(child_root.clone())));
        }
    }
}

impl<T> Drop for NodeInner<T> {
    /// Children still referenced elsewhere become roots of their own trees.
    ///
    /// Unreferenced descendants are flattened into a work list first, so
    /// dropping a deep tree does not recurse once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            if Rc::strong_count(&child.inner) > 1 {
                child.inner.borrow_mut().parent = None;
                propagate_root(&child, None);
            } else if let Ok(mut inner) = child.inner.try_borrow_mut() {
                pending.append(&mut inner.children);
            }
        }
    }
}

/// Pre-order traversal with an explicit stack, children left to right.
pub struct PreOrder<T> {
    stack: Vec<TreeNode<T>>,
}

impl<T> Iterator for PreOrder<T> {
    type Item = TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack
            .extend(current.inner.borrow().children.iter().rev().cloned());
        Some(current)
    }
}
