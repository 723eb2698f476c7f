//! Arena-backed binary search tree.
//!
//! Nodes live in an append-only arena and are addressed by [`TreeNodeId`].
//! Removing a node leaves a hole, so ids stay stable for the lifetime of a
//! tree and a generator's working copy hands out the same ids as any
//! replayed copy cloned from the same starting tree.

use crate::error::{Result, StepError};
use crate::event::StepEvent;

/// Values of the sample tree, in insertion order.
pub const SAMPLE_VALUES: [i64; 7] = [50, 30, 70, 20, 40, 60, 80];

/// Handle to a node in a [`BinarySearchTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeNodeId(pub usize);

/// A node and its exclusively owned children.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeNode {
    pub value: i64,
    pub left: Option<TreeNodeId>,
    pub right: Option<TreeNodeId>,
    /// Distance from the root, recomputed on every structural change.
    pub depth: usize,
}

/// Binary search tree with strict ordering: left < node < right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinarySearchTree {
    nodes: Vec<Option<TreeNode>>,
    root: Option<TreeNodeId>,
}

impl BinarySearchTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build by inserting `values` in order. Duplicates are skipped.
    pub fn from_values(values: &[i64]) -> Self {
        let mut tree = Self::new();
        for &value in values {
            tree.insert(value);
        }
        tree
    }

    /// The seven-node sample tree rooted at 50.
    pub fn sample() -> Self {
        Self::from_values(&SAMPLE_VALUES)
    }

    pub fn root(&self) -> Option<TreeNodeId> {
        self.root
    }

    pub fn node(&self, id: TreeNodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Id the next attached node will get.
    pub fn next_id(&self) -> TreeNodeId {
        TreeNodeId(self.nodes.len())
    }

    /// Value stored at `id`.
    pub fn value(&self, id: TreeNodeId) -> Option<i64> {
        self.node(id).map(|n| n.value)
    }

    pub fn left(&self, id: TreeNodeId) -> Option<TreeNodeId> {
        self.node(id).and_then(|n| n.left)
    }

    pub fn right(&self, id: TreeNodeId) -> Option<TreeNodeId> {
        self.node(id).and_then(|n| n.right)
    }

    /// Locate the node holding `value`.
    pub fn find(&self, value: i64) -> Option<TreeNodeId> {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id)?;
            if value == node.value {
                return Some(id);
            }
            current = if value < node.value { node.left } else { node.right };
        }
        None
    }

    /// Parent of `id` and whether `id` is its left child.
    pub fn parent_of(&self, id: TreeNodeId) -> Option<(TreeNodeId, bool)> {
        self.nodes.iter().enumerate().find_map(|(index, slot)| {
            let node = slot.as_ref()?;
            if node.left == Some(id) {
                Some((TreeNodeId(index), true))
            } else if node.right == Some(id) {
                Some((TreeNodeId(index), false))
            } else {
                None
            }
        })
    }

    /// Insert without narration. Returns `None` when `value` is already present.
    pub fn insert(&mut self, value: i64) -> Option<TreeNodeId> {
        let mut parent = None;
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id)?;
            if value == node.value {
                return None;
            }
            let is_left = value < node.value;
            parent = Some((id, is_left));
            current = if is_left { node.left } else { node.right };
        }
        match parent {
            Some((id, is_left)) => self.attach(Some(id), is_left, value).ok(),
            None => self.attach(None, false, value).ok(),
        }
    }

    /// Attach a new node in an empty child slot (or as root when `parent` is `None`).
    pub fn attach(
        &mut self,
        parent: Option<TreeNodeId>,
        is_left: bool,
        value: i64,
    ) -> Result<TreeNodeId> {
        let id = self.next_id();
        let depth = match parent {
            None => {
                if self.root.is_some() {
                    return Err(StepError::InvalidReplay("tree already has a root".into()));
                }
                0
            }
            Some(parent_id) => {
                let parent = self.node_mut(parent_id)?;
                let slot = if is_left { &mut parent.left } else { &mut parent.right };
                if slot.is_some() {
                    return Err(StepError::InvalidReplay(format!(
                        "child slot of node {} is occupied",
                        parent_id.0
                    )));
                }
                *slot = Some(id);
                parent.depth + 1
            }
        };
        self.nodes.push(Some(TreeNode {
            value,
            left: None,
            right: None,
            depth,
        }));
        if parent.is_none() {
            self.root = Some(id);
        }
        Ok(id)
    }

    /// Overwrite the value at `id`.
    pub fn set_value(&mut self, id: TreeNodeId, value: i64) -> Result<()> {
        self.node_mut(id)?.value = value;
        Ok(())
    }

    /// Remove a node with at most one child, splicing that child into its place.
    pub fn remove_node(&mut self, id: TreeNodeId) -> Result<()> {
        let node = self.node(id).ok_or_else(|| self.missing(id))?;
        let child = match (node.left, node.right) {
            (Some(_), Some(_)) => {
                return Err(StepError::InvalidReplay(format!(
                    "node {} has two children",
                    id.0
                )))
            }
            (left, right) => left.or(right),
        };
        match self.parent_of(id) {
            Some((parent, true)) => self.node_mut(parent)?.left = child,
            Some((parent, false)) => self.node_mut(parent)?.right = child,
            None => self.root = child,
        }
        self.nodes[id.0] = None;
        self.recompute_depths();
        Ok(())
    }

    /// Delete `value` using the three textbook cases.
    pub fn delete(&mut self, value: i64) -> Result<()> {
        let id = self.find(value).ok_or(StepError::NotFound(value))?;
        if let (Some(_), Some(right)) = (self.left(id), self.right(id)) {
            let successor = self.leftmost(right);
            let successor_value = self.value(successor).ok_or_else(|| self.missing(successor))?;
            self.set_value(id, successor_value)?;
            self.remove_node(successor)
        } else {
            self.remove_node(id)
        }
    }

    /// Leftmost node of the subtree at `id`.
    pub fn leftmost(&self, mut id: TreeNodeId) -> TreeNodeId {
        while let Some(left) = self.left(id) {
            id = left;
        }
        id
    }

    /// Values in ascending (in-order) sequence.
    pub fn in_order(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.left(id);
            }
            if let Some(id) = stack.pop() {
                if let Some(value) = self.value(id) {
                    out.push(value);
                }
                current = self.right(id);
            }
        }
        out
    }

    /// Height in levels (0 for an empty tree).
    pub fn height(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .map(|n| n.depth + 1)
            .max()
            .unwrap_or(0)
    }

    /// Check the strict ordering invariant over every subtree.
    pub fn is_valid_bst(&self) -> bool {
        let mut stack = match self.root {
            Some(root) => vec![(root, None::<i64>, None::<i64>)],
            None => return true,
        };
        while let Some((id, low, high)) = stack.pop() {
            let Some(node) = self.node(id) else {
                return false;
            };
            if low.is_some_and(|low| node.value <= low) || high.is_some_and(|high| node.value >= high) {
                return false;
            }
            if let Some(left) = node.left {
                stack.push((left, low, Some(node.value)));
            }
            if let Some(right) = node.right {
                stack.push((right, Some(node.value), high));
            }
        }
        true
    }

    /// Apply a tree event. Non-tree events are ignored.
    pub fn apply(&mut self, event: &StepEvent) -> Result<()> {
        match *event {
            StepEvent::InsertAt {
                parent,
                is_left,
                value,
            } => self.attach(parent, is_left, value).map(|_| ()),
            StepEvent::SetValue { node, value } => self.set_value(node, value),
            StepEvent::DeleteNode { node } => self.remove_node(node),
            _ => Ok(()),
        }
    }

    /// Apply a whole event sequence in order.
    pub fn replay<'a>(&mut self, events: impl IntoIterator<Item = &'a StepEvent>) -> Result<()> {
        for event in events {
            self.apply(event)?;
        }
        Ok(())
    }

    fn node_mut(&mut self, id: TreeNodeId) -> Result<&mut TreeNode> {
        let len = self.nodes.len();
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(StepError::NodeOutOfRange { node: id.0, len })
    }

    fn missing(&self, id: TreeNodeId) -> StepError {
        StepError::NodeOutOfRange {
            node: id.0,
            len: self.nodes.len(),
        }
    }

    fn recompute_depths(&mut self) {
        let mut stack: Vec<(TreeNodeId, usize)> = self.root.map(|r| (r, 0)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::as_mut) {
                node.depth = depth;
                stack.extend(node.left.map(|l| (l, depth + 1)));
                stack.extend(node.right.map(|r| (r, depth + 1)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_tree_is_balanced_bst() {
        let tree = BinarySearchTree::sample();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.height(), 3);
        assert!(tree.is_valid_bst());
        assert_eq!(tree.in_order(), vec![20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(tree.root().and_then(|r| tree.value(r)), Some(50));
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut tree = BinarySearchTree::sample();
        assert!(tree.insert(40).is_none());
        assert_eq!(tree.len(), 7);
        let id = tree.insert(65).unwrap();
        assert_eq!(tree.node(id).unwrap().depth, 3);
        assert!(tree.is_valid_bst());
    }

    #[test]
    fn delete_leaf() {
        let mut tree = BinarySearchTree::sample();
        tree.delete(20).unwrap();
        assert_eq!(tree.in_order(), vec![30, 40, 50, 60, 70, 80]);
        assert!(tree.is_valid_bst());
    }

    #[test]
    fn delete_single_child_splices() {
        let mut tree = BinarySearchTree::sample();
        tree.delete(20).unwrap();
        tree.delete(30).unwrap();
        let forty = tree.find(40).unwrap();
        assert_eq!(tree.node(forty).unwrap().depth, 1);
        assert_eq!(tree.in_order(), vec![40, 50, 60, 70, 80]);
    }

    #[test]
    fn delete_two_children_uses_successor() {
        let mut tree = BinarySearchTree::sample();
        tree.delete(30).unwrap();
        let root = tree.root().unwrap();
        let left = tree.left(root).unwrap();
        assert_eq!(tree.value(left), Some(40));
        assert_eq!(tree.in_order(), vec![20, 40, 50, 60, 70, 80]);
        assert!(tree.is_valid_bst());
    }

    #[test]
    fn delete_root_of_single_node_tree() {
        let mut tree = BinarySearchTree::from_values(&[5]);
        tree.delete(5).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn delete_missing_value() {
        let mut tree = BinarySearchTree::sample();
        assert_eq!(tree.delete(99), Err(StepError::NotFound(99)));
    }

    #[test]
    fn remove_node_rejects_two_children() {
        let mut tree = BinarySearchTree::sample();
        let root = tree.root().unwrap();
        assert!(matches!(tree.remove_node(root), Err(StepError::InvalidReplay(_))));
    }

    #[test]
    fn attach_to_occupied_slot_fails() {
        let mut tree = BinarySearchTree::sample();
        let root = tree.root();
        assert!(tree.attach(root, true, 10).is_err());
        assert!(tree.attach(None, true, 10).is_err());
    }

    #[test]
    fn ids_stay_stable_after_delete() {
        let mut tree = BinarySearchTree::sample();
        let eighty = tree.find(80).unwrap();
        tree.delete(20).unwrap();
        assert_eq!(tree.find(80), Some(eighty));
        assert_eq!(tree.next_id(), TreeNodeId(7));
    }
}
