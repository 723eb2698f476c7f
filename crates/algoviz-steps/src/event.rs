//! Step events for the visualization timeline.
//!
//! Generators never touch a renderer. They emit these events, and whoever
//! observes them owns every visual representation.

use crate::position::Position;
use crate::tree::TreeNodeId;

/// An element inside one of the three container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VisualElement {
    ArraySlot(usize),
    GraphNode(usize),
    TreeNode(TreeNodeId),
}

/// One discrete step of an algorithm run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum StepEvent {
    /// Two array slots are being compared.
    Compare { i: usize, j: usize },

    /// Two array slots exchange values.
    Swap { i: usize, j: usize },

    /// A value is written into an array slot (merge write-back).
    Move { index: usize, value: i64 },

    /// An element is highlighted as the current focus.
    Visit { element: VisualElement },

    /// An element is finished with.
    MarkVisited { element: VisualElement },

    /// A graph node's tentative distance improved.
    UpdateDistance { node: usize, distance: u32 },

    /// A new tree node is attached below `parent` (`None` creates the root).
    InsertAt {
        parent: Option<TreeNodeId>,
        is_left: bool,
        value: i64,
    },

    /// A tree node takes over another value (in-order successor copy).
    SetValue { node: TreeNodeId, value: i64 },

    /// A tree node with at most one child is removed and its child spliced up.
    DeleteNode { node: TreeNodeId },

    /// Narration for the current step.
    Message { text: String },

    /// A data point appears on the plot.
    PlacePoint { point: usize, position: Position },

    /// A data point joins a cluster.
    AssignCluster { point: usize, cluster: usize },

    /// A cluster centroid moves.
    MoveCentroid { cluster: usize, position: Position },

    /// A regression line after one gradient-descent iteration.
    FitLine {
        iteration: usize,
        slope: f64,
        intercept: f64,
        loss: f64,
    },

    /// A decision node splits on `feature > threshold`.
    SplitNode {
        node: usize,
        feature: String,
        threshold: f64,
    },

    /// A decision node becomes a leaf predicting `label`.
    LeafNode { node: usize, label: String },

    /// A neuron's activation during a forward pass.
    Activate {
        layer: usize,
        neuron: usize,
        value: f64,
    },

    /// One tree of a forest casts its vote.
    Vote { tree: usize, label: String },
}

impl StepEvent {
    /// Build a narration event.
    pub fn message(text: impl Into<String>) -> Self {
        StepEvent::Message { text: text.into() }
    }

    /// The narration text, if this is a `Message`.
    pub fn text(&self) -> Option<&str> {
        match self {
            StepEvent::Message { text } => Some(text),
            _ => None,
        }
    }

    /// Whether applying this event changes the visualized state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            StepEvent::Swap { .. }
                | StepEvent::Move { .. }
                | StepEvent::InsertAt { .. }
                | StepEvent::SetValue { .. }
                | StepEvent::DeleteNode { .. }
        )
    }

    /// Short name of the event kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StepEvent::Compare { .. } => "compare",
            StepEvent::Swap { .. } => "swap",
            StepEvent::Move { .. } => "move",
            StepEvent::Visit { .. } => "visit",
            StepEvent::MarkVisited { .. } => "mark_visited",
            StepEvent::UpdateDistance { .. } => "update_distance",
            StepEvent::InsertAt { .. } => "insert_at",
            StepEvent::SetValue { .. } => "set_value",
            StepEvent::DeleteNode { .. } => "delete_node",
            StepEvent::Message { .. } => "message",
            StepEvent::PlacePoint { .. } => "place_point",
            StepEvent::AssignCluster { .. } => "assign_cluster",
            StepEvent::MoveCentroid { .. } => "move_centroid",
            StepEvent::FitLine { .. } => "fit_line",
            StepEvent::SplitNode { .. } => "split_node",
            StepEvent::LeafNode { .. } => "leaf_node",
            StepEvent::Activate { .. } => "activate",
            StepEvent::Vote { .. } => "vote",
        }
    }
}
