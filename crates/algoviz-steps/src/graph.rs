//! Undirected graph state for the traversal visualizations.

use std::f64::consts::TAU;

use crate::error::{Result, StepError};
use crate::event::{StepEvent, VisualElement};
use crate::position::Position;

/// Number of nodes in the sample graph.
pub const SAMPLE_NODES: usize = 6;

/// Edges of the sample graph, by node index.
pub const SAMPLE_EDGES: [(usize, usize); 7] =
    [(0, 1), (0, 2), (1, 3), (2, 3), (2, 4), (3, 5), (4, 5)];

/// A graph node: a value and its laid-out position.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphNode {
    pub value: i64,
    pub position: Position,
}

/// Nodes plus a symmetric adjacency relation.
///
/// Adjacency lists keep insertion order, which fixes the order traversals
/// discover neighbors in.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphState {
    nodes: Vec<GraphNode>,
    adjacency: Vec<Vec<usize>>,
}

impl GraphState {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The six-node sample graph, values 1..=6 on a unit circle.
    pub fn sample() -> Self {
        let values: Vec<i64> = (1..=SAMPLE_NODES as i64).collect();
        let mut graph = Self::circle(&values, 1.0);
        for (a, b) in SAMPLE_EDGES {
            graph.link(a, b);
        }
        graph
    }

    /// Lay `values` out evenly on a circle, with no edges.
    pub fn circle(values: &[i64], radius: f64) -> Self {
        let count = values.len().max(1) as f64;
        let mut graph = Self::new();
        for (i, &value) in values.iter().enumerate() {
            graph.add_node(value, Position::on_circle(i as f64 * TAU / count, radius));
        }
        graph
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self, value: i64, position: Position) -> usize {
        self.nodes.push(GraphNode { value, position });
        self.adjacency.push(Vec::new());
        self.nodes.len() - 1
    }

    /// Connect two nodes in both directions. Repeated edges are ignored.
    pub fn connect(&mut self, a: usize, b: usize) -> Result<()> {
        self.check(a)?;
        self.check(b)?;
        self.link(a, b);
        Ok(())
    }

    /// Add the edge in both directions. Both indices must be in range.
    fn link(&mut self, a: usize, b: usize) {
        if !self.adjacency[a].contains(&b) {
            self.adjacency[a].push(b);
        }
        if !self.adjacency[b].contains(&a) {
            self.adjacency[b].push(a);
        }
    }

    /// Fail with `NodeOutOfRange` unless `node` exists.
    pub fn check(&self, node: usize) -> Result<()> {
        if node < self.nodes.len() {
            Ok(())
        } else {
            Err(StepError::NodeOutOfRange {
                node,
                len: self.nodes.len(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Neighbors of `node` in insertion order (empty if out of range).
    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Each undirected edge once, as `(lower, higher)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, list)| list.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
    }

    /// Length of the longest edge in layout units (0 for an edgeless graph).
    pub fn longest_edge(&self) -> f64 {
        self.edges()
            .map(|(a, b)| self.nodes[a].position.distance(&self.nodes[b].position))
            .fold(0.0, f64::max)
    }

    /// Straight-line distance between two nodes.
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(a), Some(b)) => a.position.distance(&b.position),
            _ => f64::INFINITY,
        }
    }

    /// Whether every adjacency entry has its mirror.
    pub fn is_symmetric(&self) -> bool {
        self.adjacency
            .iter()
            .enumerate()
            .all(|(a, list)| list.iter().all(|&b| self.adjacency[b].contains(&a)))
    }
}

/// What a traversal did to each node, rebuilt from its events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalTrace {
    /// How many times each node was visited.
    pub visits: Vec<u32>,
    /// Nodes marked finished.
    pub marked: Vec<bool>,
    /// Last distance reported per node.
    pub distances: Vec<Option<u32>>,
    /// Node indices in first-visit order.
    pub order: Vec<usize>,
}

impl TraversalTrace {
    /// Empty trace for a graph of `len` nodes.
    pub fn new(len: usize) -> Self {
        Self {
            visits: vec![0; len],
            marked: vec![false; len],
            distances: vec![None; len],
            order: Vec::new(),
        }
    }

    /// Record one event. Non-graph events are ignored.
    pub fn apply(&mut self, event: &StepEvent) -> Result<()> {
        let len = self.visits.len();
        let bad = |node: usize| StepError::NodeOutOfRange { node, len };
        match *event {
            StepEvent::Visit {
                element: VisualElement::GraphNode(node),
            } => {
                let count = self.visits.get_mut(node).ok_or_else(|| bad(node))?;
                if *count == 0 {
                    self.order.push(node);
                }
                *count += 1;
            }
            StepEvent::MarkVisited {
                element: VisualElement::GraphNode(node),
            } => {
                *self.marked.get_mut(node).ok_or_else(|| bad(node))? = true;
            }
            StepEvent::UpdateDistance { node, distance } => {
                *self.distances.get_mut(node).ok_or_else(|| bad(node))? = Some(distance);
            }
            _ => {}
        }
        Ok(())
    }

    /// Build a trace from a full event sequence.
    pub fn from_events<'a>(
        len: usize,
        events: impl IntoIterator<Item = &'a StepEvent>,
    ) -> Result<Self> {
        let mut trace = Self::new(len);
        for event in events {
            trace.apply(event)?;
        }
        Ok(trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_graph_shape() {
        let graph = GraphState::sample();
        assert_eq!(graph.len(), SAMPLE_NODES);
        assert_eq!(graph.edges().count(), SAMPLE_EDGES.len());
        assert!(graph.is_symmetric());
        assert_eq!(graph.neighbors(0), &[1, 2]);
        assert_eq!(graph.node(5).map(|n| n.value), Some(6));
    }

    #[test]
    fn sample_graph_has_every_listed_edge() {
        let graph = GraphState::sample();
        let edges: Vec<_> = graph.edges().collect();
        for (a, b) in SAMPLE_EDGES {
            assert!(edges.contains(&(a, b)), "missing edge {a}-{b}");
        }
        assert_eq!(graph.neighbors(3), &[1, 2, 5]);
    }

    #[test]
    fn connect_is_symmetric_and_idempotent() {
        let mut graph = GraphState::circle(&[1, 2, 3], 1.0);
        graph.connect(0, 2).unwrap();
        graph.connect(2, 0).unwrap();
        assert_eq!(graph.neighbors(0), &[2]);
        assert_eq!(graph.neighbors(2), &[0]);
        assert!(graph.is_symmetric());
    }

    #[test]
    fn connect_out_of_range_fails() {
        let mut graph = GraphState::circle(&[1], 1.0);
        assert_eq!(
            graph.connect(0, 4),
            Err(StepError::NodeOutOfRange { node: 4, len: 1 })
        );
    }

    #[test]
    fn longest_edge_on_unit_hexagon() {
        // 0-2 spans two sixths of the circle: sqrt(3).
        let graph = GraphState::sample();
        assert!((graph.longest_edge() - 3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn trace_counts_visits() {
        let events = [
            StepEvent::Visit { element: VisualElement::GraphNode(1) },
            StepEvent::Visit { element: VisualElement::GraphNode(1) },
            StepEvent::MarkVisited { element: VisualElement::GraphNode(1) },
            StepEvent::UpdateDistance { node: 0, distance: 3 },
        ];
        let trace = TraversalTrace::from_events(2, &events).unwrap();
        assert_eq!(trace.visits, vec![0, 2]);
        assert_eq!(trace.marked, vec![false, true]);
        assert_eq!(trace.distances, vec![Some(3), None]);
        assert_eq!(trace.order, vec![1]);
    }
}
