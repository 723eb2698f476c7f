//! Binary search tree traversals, insert and delete as step machines.
//!
//! Insert and delete keep a working copy of the tree and apply each
//! structural event to it as they emit it, so ids in later events always
//! refer to the tree a replaying consumer holds at that point.

use std::collections::VecDeque;

use crate::catalog::Algorithm;
use crate::error::{Result, StepError};
use crate::event::{StepEvent, VisualElement};
use crate::generator::{StepMachine, Steps};
use crate::tree::{BinarySearchTree, TreeNodeId};

fn visit(id: TreeNodeId) -> StepEvent {
    StepEvent::Visit {
        element: VisualElement::TreeNode(id),
    }
}

fn mark(id: TreeNodeId) -> StepEvent {
    StepEvent::MarkVisited {
        element: VisualElement::TreeNode(id),
    }
}

fn non_empty(tree: &BinarySearchTree) -> Result<TreeNodeId> {
    tree.root().ok_or(StepError::EmptyInput)
}

/// Depth-first visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    In,
    Pre,
    Post,
}

/// In-order traversal: left, node, right.
pub fn inorder(tree: BinarySearchTree) -> Result<Steps<Traversal>> {
    Traversal::new(tree, Order::In)
}

/// Pre-order traversal: node, left, right.
pub fn preorder(tree: BinarySearchTree) -> Result<Steps<Traversal>> {
    Traversal::new(tree, Order::Pre)
}

/// Post-order traversal: left, right, node.
pub fn postorder(tree: BinarySearchTree) -> Result<Steps<Traversal>> {
    Traversal::new(tree, Order::Post)
}

/// A pending subtree, or a node whose children are already scheduled.
#[derive(Debug, Clone, Copy)]
enum Frame {
    Expand(TreeNodeId),
    Emit(TreeNodeId),
}

#[derive(Debug, Clone)]
pub struct Traversal {
    tree: BinarySearchTree,
    order: Order,
    frames: Vec<Frame>,
}

impl Traversal {
    fn new(tree: BinarySearchTree, order: Order) -> Result<Steps<Self>> {
        let root = non_empty(&tree)?;
        Ok(Steps::new(Self {
            tree,
            order,
            frames: vec![Frame::Expand(root)],
        }))
    }

    /// Schedule the subtree at `id`. Frames pop in reverse push order.
    fn expand(&mut self, id: TreeNodeId) {
        let left = self.tree.left(id).map(Frame::Expand);
        let right = self.tree.right(id).map(Frame::Expand);
        let emit = Some(Frame::Emit(id));
        let scheduled = match self.order {
            Order::In => [right, emit, left],
            Order::Pre => [right, left, emit],
            Order::Post => [emit, right, left],
        };
        self.frames.extend(scheduled.into_iter().flatten());
    }
}

impl StepMachine for Traversal {
    fn algorithm(&self) -> Algorithm {
        match self.order {
            Order::In => Algorithm::InorderTraversal,
            Order::Pre => Algorithm::PreorderTraversal,
            Order::Post => Algorithm::PostorderTraversal,
        }
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        match self.frames.pop() {
            Some(Frame::Expand(id)) => self.expand(id),
            Some(Frame::Emit(id)) => {
                out.push_back(visit(id));
                if let Some(value) = self.tree.value(id) {
                    out.push_back(StepEvent::message(format!("Visiting Node {value}")));
                }
            }
            None => return false,
        }
        true
    }
}

/// Insert `value`, narrating the search for its slot.
///
/// An empty tree gets `value` as its root. A value already present is
/// reported with a message and leaves the tree as it was.
pub fn insert(tree: BinarySearchTree, value: i64) -> Steps<InsertNode> {
    let cursor = tree.root();
    Steps::new(InsertNode {
        tree,
        value,
        cursor,
        done: false,
    })
}

#[derive(Debug, Clone)]
pub struct InsertNode {
    tree: BinarySearchTree,
    value: i64,
    cursor: Option<TreeNodeId>,
    done: bool,
}

impl InsertNode {
    /// The working tree, including the node once it has been attached.
    pub fn tree(&self) -> &BinarySearchTree {
        &self.tree
    }

    fn attach(&mut self, parent: Option<TreeNodeId>, is_left: bool, out: &mut VecDeque<StepEvent>) {
        let value = self.value;
        if self.tree.attach(parent, is_left, value).is_err() {
            return;
        }
        out.push_back(StepEvent::InsertAt {
            parent,
            is_left,
            value,
        });
        let text = match parent.and_then(|id| self.tree.value(id)) {
            Some(parent_value) => format!("Inserted Node {value} under Node {parent_value}"),
            None => format!("Inserted Node {value} as root"),
        };
        out.push_back(StepEvent::message(text));
    }
}

impl StepMachine for InsertNode {
    fn algorithm(&self) -> Algorithm {
        Algorithm::InsertNode
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        if self.done {
            return false;
        }
        self.done = true;
        let Some(id) = self.cursor else {
            self.attach(None, false, out);
            return true;
        };
        let Some(current) = self.tree.value(id) else {
            return true;
        };
        out.push_back(visit(id));
        out.push_back(StepEvent::message(format!(
            "Searching at Node {current} for Insert Position"
        )));
        out.push_back(mark(id));
        if self.value == current {
            out.push_back(StepEvent::message(format!(
                "Node {} already exists",
                self.value
            )));
            return true;
        }
        let is_left = self.value < current;
        let child = if is_left {
            self.tree.left(id)
        } else {
            self.tree.right(id)
        };
        match child {
            Some(child) => {
                self.cursor = Some(child);
                self.done = false;
            }
            None => self.attach(Some(id), is_left, out),
        }
        true
    }
}

/// Delete `value` using the three textbook cases.
///
/// A missing value is reported with a message; only an empty tree fails.
pub fn delete(tree: BinarySearchTree, value: i64) -> Result<Steps<DeleteNode>> {
    let root = non_empty(&tree)?;
    Ok(Steps::new(DeleteNode {
        tree,
        value,
        phase: DeletePhase::Search(root),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeletePhase {
    Search(TreeNodeId),
    Found(TreeNodeId),
    /// Walking left from the target's right child.
    Successor {
        target: TreeNodeId,
        cursor: TreeNodeId,
    },
    Done,
}

#[derive(Debug, Clone)]
pub struct DeleteNode {
    tree: BinarySearchTree,
    value: i64,
    phase: DeletePhase,
}

impl DeleteNode {
    /// The working tree, with the node removed once the run has finished.
    pub fn tree(&self) -> &BinarySearchTree {
        &self.tree
    }

    fn remove(&mut self, id: TreeNodeId, out: &mut VecDeque<StepEvent>) {
        if self.tree.remove_node(id).is_ok() {
            out.push_back(StepEvent::DeleteNode { node: id });
            out.push_back(StepEvent::message(format!(
                "Deleted Node {} Successfully",
                self.value
            )));
        }
        self.phase = DeletePhase::Done;
    }
}

impl StepMachine for DeleteNode {
    fn algorithm(&self) -> Algorithm {
        Algorithm::DeleteNode
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        match self.phase {
            DeletePhase::Search(id) => {
                let Some(current) = self.tree.value(id) else {
                    self.phase = DeletePhase::Done;
                    return true;
                };
                if current == self.value {
                    self.phase = DeletePhase::Found(id);
                    return true;
                }
                out.push_back(visit(id));
                out.push_back(StepEvent::message(format!(
                    "Searching Node {current} for Deletion"
                )));
                out.push_back(mark(id));
                let child = if self.value < current {
                    self.tree.left(id)
                } else {
                    self.tree.right(id)
                };
                self.phase = match child {
                    Some(child) => DeletePhase::Search(child),
                    None => {
                        let missing = StepError::NotFound(self.value);
                        out.push_back(StepEvent::message(missing.to_string()));
                        DeletePhase::Done
                    }
                };
            }
            DeletePhase::Found(id) => {
                out.push_back(visit(id));
                out.push_back(StepEvent::message(format!(
                    "Found Node {}, Deleting...",
                    self.value
                )));
                match (self.tree.left(id), self.tree.right(id)) {
                    (Some(_), Some(right)) => {
                        self.phase = DeletePhase::Successor {
                            target: id,
                            cursor: right,
                        };
                    }
                    _ => self.remove(id, out),
                }
            }
            DeletePhase::Successor { target, cursor } => match self.tree.left(cursor) {
                Some(left) => {
                    if let Some(current) = self.tree.value(cursor) {
                        out.push_back(visit(cursor));
                        out.push_back(StepEvent::message(format!(
                            "Finding Inorder Successor at Node {current}"
                        )));
                        out.push_back(mark(cursor));
                    }
                    self.phase = DeletePhase::Successor {
                        target,
                        cursor: left,
                    };
                }
                None => {
                    let Some(successor) = self.tree.value(cursor) else {
                        self.phase = DeletePhase::Done;
                        return true;
                    };
                    if self.tree.set_value(target, successor).is_ok() {
                        out.push_back(StepEvent::SetValue {
                            node: target,
                            value: successor,
                        });
                    }
                    self.remove(cursor, out);
                }
            },
            DeletePhase::Done => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SAMPLE_VALUES;
    use proptest::prelude::*;

    fn visited_values(tree: &BinarySearchTree, events: &[StepEvent]) -> Vec<i64> {
        events
            .iter()
            .filter_map(|e| match e {
                StepEvent::Visit {
                    element: VisualElement::TreeNode(id),
                } => tree.value(*id),
                _ => None,
            })
            .collect()
    }

    fn run_insert(tree: &mut BinarySearchTree, value: i64) -> Vec<StepEvent> {
        let events: Vec<_> = insert(tree.clone(), value).collect();
        tree.replay(&events).unwrap();
        events
    }

    fn run_delete(tree: &mut BinarySearchTree, value: i64) -> Vec<StepEvent> {
        let events: Vec<_> = delete(tree.clone(), value).unwrap().collect();
        tree.replay(&events).unwrap();
        events
    }

    #[test]
    fn traversal_orders_on_sample_tree() {
        let tree = BinarySearchTree::sample();
        let events: Vec<_> = inorder(tree.clone()).unwrap().collect();
        assert_eq!(visited_values(&tree, &events), vec![20, 30, 40, 50, 60, 70, 80]);
        let events: Vec<_> = preorder(tree.clone()).unwrap().collect();
        assert_eq!(visited_values(&tree, &events), vec![50, 30, 20, 40, 70, 60, 80]);
        let events: Vec<_> = postorder(tree.clone()).unwrap().collect();
        assert_eq!(visited_values(&tree, &events), vec![20, 40, 30, 60, 80, 70, 50]);
    }

    #[test]
    fn traversal_does_not_mutate() {
        let tree = BinarySearchTree::sample();
        let events: Vec<_> = postorder(tree.clone()).unwrap().collect();
        assert!(events.iter().all(|e| !e.is_mutation()));
    }

    #[test]
    fn insert_attaches_under_expected_parent() {
        let mut tree = BinarySearchTree::sample();
        let events = run_insert(&mut tree, 65);
        let sixty = tree.find(60).unwrap();
        assert!(events.contains(&StepEvent::InsertAt {
            parent: Some(sixty),
            is_left: false,
            value: 65,
        }));
        assert_eq!(events.last(), Some(&StepEvent::message("Inserted Node 65 under Node 60")));
        assert_eq!(tree.in_order(), vec![20, 30, 40, 50, 60, 65, 70, 80]);
        assert_eq!(tree.node(tree.find(65).unwrap()).map(|n| n.depth), Some(3));
    }

    #[test]
    fn insert_into_empty_tree_creates_root() {
        let mut tree = BinarySearchTree::new();
        run_insert(&mut tree, 7);
        assert_eq!(tree.in_order(), vec![7]);
        assert!(tree.root().is_some());
    }

    #[test]
    fn duplicate_insert_leaves_tree_unchanged() {
        let mut tree = BinarySearchTree::sample();
        let before = tree.clone();
        let events = run_insert(&mut tree, 40);
        assert_eq!(tree, before);
        assert_eq!(events.last(), Some(&StepEvent::message("Node 40 already exists")));
    }

    #[test]
    fn delete_leaf_then_insert_restores_in_order() {
        let mut tree = BinarySearchTree::sample();
        let before = tree.in_order();
        run_delete(&mut tree, 20);
        assert_eq!(tree.in_order(), vec![30, 40, 50, 60, 70, 80]);
        run_insert(&mut tree, 20);
        assert_eq!(tree.in_order(), before);
        assert!(tree.is_valid_bst());
    }

    #[test]
    fn delete_two_children_copies_successor() {
        let mut tree = BinarySearchTree::sample();
        let thirty = tree.find(30).unwrap();
        let forty = tree.find(40).unwrap();
        let events = run_delete(&mut tree, 30);
        let structural: Vec<_> = events.iter().filter(|e| e.is_mutation()).cloned().collect();
        assert_eq!(
            structural,
            vec![
                StepEvent::SetValue { node: thirty, value: 40 },
                StepEvent::DeleteNode { node: forty },
            ]
        );
        assert_eq!(tree.in_order(), vec![20, 40, 50, 60, 70, 80]);
        assert!(tree.is_valid_bst());
    }

    #[test]
    fn delete_root_walks_to_successor() {
        let mut tree = BinarySearchTree::sample();
        let events = run_delete(&mut tree, 50);
        assert!(events.contains(&StepEvent::message("Finding Inorder Successor at Node 70")));
        assert_eq!(tree.value(tree.root().unwrap()), Some(60));
        assert!(tree.is_valid_bst());
    }

    #[test]
    fn delete_one_child_splices() {
        let mut tree = BinarySearchTree::from_values(&[10, 5, 3]);
        run_delete(&mut tree, 5);
        let ten = tree.root().unwrap();
        assert_eq!(tree.left(ten).and_then(|id| tree.value(id)), Some(3));
        assert_eq!(tree.node(tree.find(3).unwrap()).map(|n| n.depth), Some(1));
    }

    #[test]
    fn delete_missing_value_reports_not_found() {
        let mut tree = BinarySearchTree::sample();
        let before = tree.clone();
        let events = run_delete(&mut tree, 65);
        assert_eq!(tree, before);
        assert_eq!(events.last(), Some(&StepEvent::message("Node 65 not found!")));
    }

    #[test]
    fn empty_tree_fails_except_insert() {
        let empty = BinarySearchTree::new();
        assert_eq!(inorder(empty.clone()).err(), Some(StepError::EmptyInput));
        assert_eq!(delete(empty.clone(), 1).err(), Some(StepError::EmptyInput));
        assert!(insert(empty, 1).count() > 0);
    }

    #[test]
    fn working_tree_matches_replayed_tree() {
        let mut replayed = BinarySearchTree::sample();
        let mut generator = delete(replayed.clone(), 70).unwrap();
        let events: Vec<_> = generator.by_ref().collect();
        replayed.replay(&events).unwrap();
        assert_eq!(generator.machine().tree(), &replayed);
    }

    proptest! {
        #[test]
        fn invariant_holds_after_every_insert(values in prop::collection::vec(-100i64..100, 1..30)) {
            let mut tree = BinarySearchTree::new();
            for value in values {
                run_insert(&mut tree, value);
                prop_assert!(tree.is_valid_bst());
            }
        }

        #[test]
        fn deletes_keep_invariant(victims in prop::collection::vec(0usize..SAMPLE_VALUES.len(), 1..7)) {
            let mut tree = BinarySearchTree::sample();
            for index in victims {
                if tree.is_empty() {
                    break;
                }
                run_delete(&mut tree, SAMPLE_VALUES[index]);
                prop_assert!(tree.is_valid_bst());
            }
        }
    }
}
