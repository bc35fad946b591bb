//! Tests for TreeNode linkage, mutation, search and equality

use evtree::util::testing;
use evtree::{TreeError, TreeNode};
use rstest::{fixture, rstest};

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

struct Nodes {
    root: TreeNode<&'static str>,
    a: TreeNode<&'static str>,
    b: TreeNode<&'static str>,
    c: TreeNode<&'static str>,
    d: TreeNode<&'static str>,
}

//      root
//      /  \
//     a    c
//    / \
//   b   d
fn build() -> Nodes {
    let n = Nodes {
        root: TreeNode::new("root"),
        a: TreeNode::new("a"),
        b: TreeNode::new("b"),
        c: TreeNode::new("c"),
        d: TreeNode::new("d"),
    };
    n.root.attach(&n.a).unwrap();
    n.a.attach(&n.b).unwrap().attach(&n.d).unwrap();
    n.root.attach(&n.c).unwrap();
    n
}

#[fixture]
fn nodes() -> Nodes {
    build()
}

/// Follows `parent` links to termination.
fn walk_to_top<T>(node: &TreeNode<T>) -> TreeNode<T> {
    let mut current = node.clone();
    while let Some(parent) = current.parent() {
        current = parent;
    }
    current
}

fn assert_root_invariant<T>(tree: &TreeNode<T>) {
    for node in tree.iter() {
        match (node.parent(), node.root()) {
            (None, None) => {}
            (Some(_), Some(root)) => assert!(root.ptr_eq(&walk_to_top(&node))),
            _ => panic!("root must be set exactly when parent is set"),
        }
    }
}

// ============================================================
// Construction & linkage
// ============================================================

#[rstest]
fn given_new_node_when_created_then_has_payload_and_no_links() {
    let root = TreeNode::new("root");
    assert_eq!(*root.data(), "root");
    assert_eq!(root.child_count(), 0);
    assert!(root.parent().is_none());
    assert!(root.root().is_none());
}

#[rstest]
fn given_built_tree_then_parent_and_root_point_upwards(nodes: Nodes) {
    assert!(nodes.c.root().unwrap().ptr_eq(&nodes.root));
    assert!(nodes.c.parent().unwrap().ptr_eq(&nodes.root));
    assert!(nodes.b.root().unwrap().ptr_eq(&nodes.a.root().unwrap()));
    assert!(nodes.d.parent().unwrap().ptr_eq(&nodes.a));
    assert!(nodes.root.root().is_none());
    assert_root_invariant(&nodes.root);
}

#[rstest]
fn given_subtree_built_first_when_attached_then_descendants_are_rerooted() {
    let a = TreeNode::new("a");
    let b = TreeNode::new("b");
    let e = TreeNode::new("e");
    a.attach(&b).unwrap();
    b.attach(&e).unwrap();
    assert!(e.root().unwrap().ptr_eq(&a));

    let root = TreeNode::new("root");
    root.attach(&a).unwrap();

    assert!(e.root().unwrap().ptr_eq(&root));
    assert!(b.root().unwrap().ptr_eq(&root));
    assert_root_invariant(&root);
}

#[rstest]
fn given_attach_to_non_root_when_attached_then_uses_receivers_root(nodes: Nodes) {
    let e = TreeNode::new("e");
    nodes.b.attach(&e).unwrap();

    assert!(e.root().unwrap().ptr_eq(&nodes.root));
    assert!(e.parent().unwrap().ptr_eq(&nodes.b));
    assert_root_invariant(&nodes.root);
}

// ============================================================
// Attach failures
// ============================================================

#[rstest]
fn given_ancestor_when_attached_below_descendant_then_cycle_detected(nodes: Nodes) {
    let err = nodes.b.attach(&nodes.root).unwrap_err();
    assert_eq!(err, TreeError::CycleDetected);

    let err = nodes.d.attach(&nodes.a).unwrap_err();
    assert_eq!(err, TreeError::CycleDetected);

    // nothing changed
    assert!(nodes.b.is_leaf());
    assert!(nodes.root.is_root());
    assert_eq!(nodes.root.len(), 5);
    assert_root_invariant(&nodes.root);
}

#[rstest]
fn given_attached_node_when_attached_elsewhere_then_already_attached(nodes: Nodes) {
    let err = nodes.c.attach(&nodes.b).unwrap_err();
    assert_eq!(err, TreeError::AlreadyAttached);
    assert!(nodes.b.parent().unwrap().ptr_eq(&nodes.a));
    assert!(nodes.c.is_leaf());
}

// ============================================================
// Detach
// ============================================================

#[rstest]
fn given_tree_when_detach_subtree_then_subtree_roots_at_detached_node(nodes: Nodes) {
    nodes.root.detach(&nodes.a).unwrap();

    assert!(nodes.b.root().unwrap().ptr_eq(&nodes.a));
    assert!(nodes.d.root().unwrap().ptr_eq(&nodes.a));
    assert!(nodes.a.root().is_none());
    assert!(nodes.a.parent().is_none());
    assert!(nodes.a.root_node().ptr_eq(&nodes.a));

    assert_eq!(nodes.root.child_count(), 1);
    assert!(nodes.root.children()[0].ptr_eq(&nodes.c));
    assert_root_invariant(&nodes.root);
    assert_root_invariant(&nodes.a);
}

#[rstest]
fn given_non_child_when_detach_then_not_a_child_and_unchanged(nodes: Nodes) {
    let err = nodes.root.detach(&nodes.b).unwrap_err();
    assert_eq!(err, TreeError::NotAChild);

    let stranger = TreeNode::new("x");
    assert_eq!(nodes.root.detach(&stranger).unwrap_err(), TreeError::NotAChild);

    assert_eq!(nodes.root.child_count(), 2);
    assert!(nodes.b.parent().unwrap().ptr_eq(&nodes.a));
    assert_root_invariant(&nodes.root);
}

#[rstest]
fn given_detached_node_when_reattached_elsewhere_then_links_follow(nodes: Nodes) {
    nodes.a.detach(&nodes.d).unwrap().detach(&nodes.b).unwrap();
    nodes.c.attach(&nodes.d).unwrap();

    assert!(nodes.a.is_leaf());
    assert!(nodes.d.parent().unwrap().ptr_eq(&nodes.c));
    assert!(nodes.d.root().unwrap().ptr_eq(&nodes.root));
    assert!(nodes.b.is_root());
    assert_root_invariant(&nodes.root);
}

#[rstest]
fn given_child_when_detach_from_parent_then_isolated(nodes: Nodes) {
    nodes.d.detach_from_parent().unwrap();
    assert!(nodes.d.is_root());
    assert_eq!(nodes.a.child_count(), 1);

    // no-op on a root
    nodes.d.detach_from_parent().unwrap();
    assert!(nodes.d.is_root());
}

// ============================================================
// Search
// ============================================================

#[rstest]
fn given_tree_when_find_all_then_matches_in_pre_order(nodes: Nodes) {
    assert_eq!(nodes.root.find_all(|_| true), vec!["root", "a", "b", "d", "c"]);
    assert_eq!(nodes.root.find_all(|d| d.len() == 1), vec!["a", "b", "d", "c"]);
    assert_eq!(nodes.a.find_all(|d| *d != "a"), vec!["b", "d"]);
}

#[rstest]
fn given_no_match_when_find_all_then_empty(nodes: Nodes) {
    assert!(nodes.root.find_all(|d| d.starts_with('z')).is_empty());
}

#[rstest]
fn given_tree_when_find_one_then_first_pre_order_match(nodes: Nodes) {
    assert_eq!(nodes.root.find_one(|d| *d != "root"), Some("a"));
    assert_eq!(nodes.root.find_one(|d| *d == "d" || *d == "c"), Some("d"));
    assert_eq!(nodes.root.find_one(|d| *d == "zzz"), None);
}

#[rstest]
fn given_tree_when_find_one_then_short_circuits(nodes: Nodes) {
    let mut visited = Vec::new();
    nodes.root.find_one(|d| {
        visited.push(*d);
        *d == "b"
    });
    assert_eq!(visited, vec!["root", "a", "b"]);
}

#[rstest]
fn given_tree_when_find_node_then_returns_handle(nodes: Nodes) {
    let found = nodes.root.find_node(|d| *d == "d").unwrap();
    assert!(found.ptr_eq(&nodes.d));
}

#[rstest]
fn given_tree_when_queried_then_reports_shape(nodes: Nodes) {
    assert_eq!(nodes.root.len(), 5);
    assert_eq!(nodes.root.depth(), 3);
    assert_eq!(nodes.root.leaves(), vec!["b", "d", "c"]);
    let order: Vec<_> = nodes.root.iter().map(|n| *n.data()).collect();
    assert_eq!(order, vec!["root", "a", "b", "d", "c"]);
}

#[rstest]
fn given_node_when_set_data_then_visible_through_tree(nodes: Nodes) {
    nodes.d.set_data("delta");
    assert_eq!(nodes.root.find_one(|d| d.starts_with('d')), Some("delta"));
}

// ============================================================
// Equality
// ============================================================

#[rstest]
fn given_same_shape_when_equal_then_true(nodes: Nodes) {
    let other = build();
    assert!(nodes.root.equal(&other.root));
    assert_eq!(nodes.root, other.root);
    assert!(!nodes.root.ptr_eq(&other.root));
}

#[rstest]
fn given_swapped_children_when_equal_then_false() {
    let left = TreeNode::new(0);
    left.attach(&TreeNode::new(1)).unwrap().attach(&TreeNode::new(2)).unwrap();
    let right = TreeNode::new(0);
    right.attach(&TreeNode::new(2)).unwrap().attach(&TreeNode::new(1)).unwrap();

    assert!(!left.equal(&right));
}

#[rstest]
fn given_different_payload_or_arity_when_equal_then_false(nodes: Nodes) {
    let other = build();
    other.d.set_data("x");
    assert_ne!(nodes.root, other.root);

    let other = build();
    other.c.attach(&TreeNode::new("e")).unwrap();
    assert_ne!(nodes.root, other.root);
}

#[rstest]
fn given_subtrees_with_different_parents_when_equal_then_links_ignored(nodes: Nodes) {
    let lone = TreeNode::new("a");
    lone.attach(&TreeNode::new("b")).unwrap().attach(&TreeNode::new("d")).unwrap();
    assert!(nodes.a.equal(&lone));
}
