//! Graph traversal step machines.
//!
//! Every edge weighs 1. Nodes are addressed by index into the
//! [`GraphState`]; messages name them by value.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use crate::catalog::Algorithm;
use crate::error::{Result, StepError};
use crate::event::{StepEvent, VisualElement};
use crate::generator::{StepMachine, Steps};
use crate::graph::GraphState;

const EDGE_WEIGHT: u32 = 1;

fn validate(graph: &GraphState, nodes: &[usize]) -> Result<()> {
    if graph.is_empty() {
        return Err(StepError::EmptyInput);
    }
    nodes.iter().try_for_each(|&node| graph.check(node))
}

fn value(graph: &GraphState, node: usize) -> i64 {
    graph.node(node).map_or(0, |n| n.value)
}

fn visit(node: usize) -> StepEvent {
    StepEvent::Visit {
        element: VisualElement::GraphNode(node),
    }
}

fn mark(node: usize) -> StepEvent {
    StepEvent::MarkVisited {
        element: VisualElement::GraphNode(node),
    }
}

/// Breadth-first search from `start`.
pub fn bfs(graph: GraphState, start: usize) -> Result<Steps<Bfs>> {
    validate(&graph, &[start])?;
    let mut discovered = vec![false; graph.len()];
    discovered[start] = true;
    Ok(Steps::new(Bfs {
        graph,
        queue: VecDeque::from([start]),
        discovered,
    }))
}

#[derive(Debug, Clone)]
pub struct Bfs {
    graph: GraphState,
    queue: VecDeque<usize>,
    discovered: Vec<bool>,
}

impl StepMachine for Bfs {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bfs
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        let Some(current) = self.queue.pop_front() else {
            return false;
        };
        out.push_back(visit(current));
        out.push_back(StepEvent::message(format!(
            "Visiting Node {}",
            value(&self.graph, current)
        )));
        out.push_back(mark(current));
        for &neighbor in self.graph.neighbors(current) {
            if !self.discovered[neighbor] {
                self.discovered[neighbor] = true;
                self.queue.push_back(neighbor);
            }
        }
        true
    }
}

/// Depth-first search from `start`, on an explicit stack.
pub fn dfs(graph: GraphState, start: usize) -> Result<Steps<Dfs>> {
    validate(&graph, &[start])?;
    let visited = vec![false; graph.len()];
    Ok(Steps::new(Dfs {
        graph,
        stack: vec![start],
        visited,
    }))
}

#[derive(Debug, Clone)]
pub struct Dfs {
    graph: GraphState,
    stack: Vec<usize>,
    visited: Vec<bool>,
}

impl StepMachine for Dfs {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dfs
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        let Some(current) = self.stack.pop() else {
            return false;
        };
        // Nodes can be pushed more than once before their first visit.
        if self.visited[current] {
            return true;
        }
        self.visited[current] = true;
        out.push_back(visit(current));
        out.push_back(StepEvent::message(format!(
            "Visiting Node {}",
            value(&self.graph, current)
        )));
        out.push_back(mark(current));
        for &neighbor in self.graph.neighbors(current) {
            if !self.visited[neighbor] {
                self.stack.push(neighbor);
            }
        }
        true
    }
}

/// Min-heap entry ordered by priority, then by insertion order.
#[derive(Debug, Clone, Copy)]
struct Open {
    priority: f64,
    seq: usize,
    node: usize,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue shared by Dijkstra and A*.
#[derive(Debug, Clone, Default)]
struct OpenSet {
    heap: BinaryHeap<Open>,
    seq: usize,
}

impl OpenSet {
    fn push(&mut self, node: usize, priority: f64) {
        self.heap.push(Open {
            priority,
            seq: self.seq,
            node,
        });
        self.seq += 1;
    }

    fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|open| open.node)
    }
}

/// Dijkstra's shortest paths from `start`.
pub fn dijkstra(graph: GraphState, start: usize) -> Result<Steps<Dijkstra>> {
    validate(&graph, &[start])?;
    let mut distance = vec![None; graph.len()];
    distance[start] = Some(0);
    let mut open = OpenSet::default();
    open.push(start, 0.0);
    let visited = vec![false; graph.len()];
    Ok(Steps::new(Dijkstra {
        graph,
        start,
        started: false,
        distance,
        visited,
        open,
    }))
}

#[derive(Debug, Clone)]
pub struct Dijkstra {
    graph: GraphState,
    start: usize,
    started: bool,
    distance: Vec<Option<u32>>,
    visited: Vec<bool>,
    open: OpenSet,
}

impl StepMachine for Dijkstra {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dijkstra
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        if !self.started {
            self.started = true;
            out.push_back(StepEvent::UpdateDistance {
                node: self.start,
                distance: 0,
            });
            return true;
        }
        let Some(current) = self.open.pop() else {
            return false;
        };
        if self.visited[current] {
            return true;
        }
        self.visited[current] = true;
        let Some(dist) = self.distance[current] else {
            return true;
        };
        out.push_back(visit(current));
        out.push_back(StepEvent::message(format!(
            "Visiting Node {} with distance {dist}",
            value(&self.graph, current)
        )));
        out.push_back(mark(current));
        let candidate = dist + EDGE_WEIGHT;
        for &neighbor in self.graph.neighbors(current) {
            if self.distance[neighbor].map_or(true, |known| candidate < known) {
                self.distance[neighbor] = Some(candidate);
                self.open.push(neighbor, f64::from(candidate));
                out.push_back(StepEvent::UpdateDistance {
                    node: neighbor,
                    distance: candidate,
                });
            }
        }
        true
    }
}

/// A* search from `start` to `goal`.
///
/// The heuristic is the straight-line distance to the goal divided by the
/// longest edge, so it never exceeds the remaining hop count.
pub fn a_star(graph: GraphState, start: usize, goal: usize) -> Result<Steps<AStar>> {
    validate(&graph, &[start, goal])?;
    let scale = graph.longest_edge();
    let mut machine = AStar {
        g_score: vec![None; graph.len()],
        closed: vec![false; graph.len()],
        open: OpenSet::default(),
        start,
        goal,
        scale,
        started: false,
        done: false,
        graph,
    };
    machine.g_score[start] = Some(0);
    let h = machine.heuristic(start);
    machine.open.push(start, h);
    Ok(Steps::new(machine))
}

#[derive(Debug, Clone)]
pub struct AStar {
    graph: GraphState,
    start: usize,
    goal: usize,
    scale: f64,
    g_score: Vec<Option<u32>>,
    closed: Vec<bool>,
    open: OpenSet,
    started: bool,
    done: bool,
}

impl AStar {
    /// Estimated hops from `node` to the goal.
    pub fn heuristic(&self, node: usize) -> f64 {
        if self.scale > 0.0 {
            self.graph.distance(node, self.goal) / self.scale
        } else {
            0.0
        }
    }
}

impl StepMachine for AStar {
    fn algorithm(&self) -> Algorithm {
        Algorithm::AStar
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        if self.done {
            return false;
        }
        if !self.started {
            self.started = true;
            out.push_back(StepEvent::UpdateDistance {
                node: self.start,
                distance: 0,
            });
            return true;
        }
        let Some(current) = self.open.pop() else {
            out.push_back(StepEvent::message(format!(
                "Goal Node {} is unreachable",
                value(&self.graph, self.goal)
            )));
            self.done = true;
            return true;
        };
        if self.closed[current] {
            return true;
        }
        self.closed[current] = true;
        out.push_back(visit(current));
        out.push_back(StepEvent::message(format!(
            "Visiting Node {}",
            value(&self.graph, current)
        )));
        if current == self.goal {
            out.push_back(StepEvent::message(format!(
                "Reached Goal Node {}",
                value(&self.graph, current)
            )));
            out.push_back(mark(current));
            self.done = true;
            return true;
        }
        out.push_back(mark(current));
        let Some(g) = self.g_score[current] else {
            return true;
        };
        let tentative = g + EDGE_WEIGHT;
        let neighbors = self.graph.neighbors(current).to_vec();
        for neighbor in neighbors {
            if self.closed[neighbor] {
                continue;
            }
            if self.g_score[neighbor].map_or(true, |known| tentative < known) {
                self.g_score[neighbor] = Some(tentative);
                let f = f64::from(tentative) + self.heuristic(neighbor);
                self.open.push(neighbor, f);
                out.push_back(StepEvent::UpdateDistance {
                    node: neighbor,
                    distance: tentative,
                });
            }
        }
        true
    }
}

/// Bellman-Ford from `start`, running all `n - 1` relaxation rounds.
pub fn bellman_ford(graph: GraphState, start: usize) -> Result<Steps<BellmanFord>> {
    validate(&graph, &[start])?;
    let mut distance = vec![None; graph.len()];
    distance[start] = Some(0);
    Ok(Steps::new(BellmanFord {
        graph,
        start,
        distance,
        phase: BellmanPhase::Start,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BellmanPhase {
    Start,
    /// Relaxing the edges of `node` during round `iteration`.
    Relax { iteration: usize, node: usize },
    Done,
}

#[derive(Debug, Clone)]
pub struct BellmanFord {
    graph: GraphState,
    start: usize,
    distance: Vec<Option<u32>>,
    phase: BellmanPhase,
}

impl BellmanFord {
    /// Distances settled so far, by node index.
    pub fn distances(&self) -> &[Option<u32>] {
        &self.distance
    }

    fn relax(&mut self, node: usize, out: &mut VecDeque<StepEvent>) {
        let Some(dist) = self.distance[node] else {
            return;
        };
        let candidate = dist + EDGE_WEIGHT;
        for &neighbor in self.graph.neighbors(node) {
            if self.distance[neighbor].map_or(true, |known| candidate < known) {
                self.distance[neighbor] = Some(candidate);
                out.push_back(visit(neighbor));
                out.push_back(StepEvent::UpdateDistance {
                    node: neighbor,
                    distance: candidate,
                });
                out.push_back(StepEvent::message(format!(
                    "Updated distance for Node {} to {candidate}",
                    value(&self.graph, neighbor)
                )));
                out.push_back(mark(neighbor));
            }
        }
    }
}

impl StepMachine for BellmanFord {
    fn algorithm(&self) -> Algorithm {
        Algorithm::BellmanFord
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        let rounds = self.graph.len() - 1;
        match self.phase {
            BellmanPhase::Start => {
                out.push_back(StepEvent::UpdateDistance {
                    node: self.start,
                    distance: 0,
                });
                self.phase = BellmanPhase::Relax {
                    iteration: 0,
                    node: 0,
                };
            }
            BellmanPhase::Relax { iteration, .. } if iteration >= rounds => {
                out.push_back(StepEvent::message("Bellman-Ford completed!"));
                self.phase = BellmanPhase::Done;
            }
            BellmanPhase::Relax { iteration, node } => {
                self.relax(node, out);
                self.phase = if node + 1 < self.graph.len() {
                    BellmanPhase::Relax {
                        iteration,
                        node: node + 1,
                    }
                } else {
                    out.push_back(StepEvent::message(format!(
                        "Iteration {} completed",
                        iteration + 1
                    )));
                    BellmanPhase::Relax {
                        iteration: iteration + 1,
                        node: 0,
                    }
                };
            }
            BellmanPhase::Done => return false,
        }
        true
    }
}
