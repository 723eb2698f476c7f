//! AlgoViz Step Generators
//!
//! Turns an initial state into a lazy, restartable sequence of
//! visualization events for 21 algorithms across four categories.
//!
//! # Data Model
//!
//! - [`ArrayState`]: bar heights for the sorting demos
//! - [`GraphState`]: nodes on a circle with a symmetric adjacency list
//! - [`BinarySearchTree`]: an arena of nodes addressed by [`TreeNodeId`]
//!
//! # Generators
//!
//! Each algorithm is a [`StepMachine`] wrapped in [`Steps`], which is both an
//! `Iterator<Item = StepEvent>` and a [`StepGenerator`]. Generators never
//! touch a renderer: replaying their events against a copy of the initial
//! state is enough to reproduce every visible change.
//!
//! ```
//! use algoviz_steps::{sort, ArrayState};
//!
//! let input = vec![5, 1, 4, 2, 8];
//! let events: Vec<_> = sort::bubble_sort(input.clone()).unwrap().collect();
//! let mut state = ArrayState::new(input);
//! state.replay(&events).unwrap();
//! assert!(state.is_sorted());
//! ```
//!
//! The [`Algorithm`] catalog builds any generator from an [`AlgorithmInput`].

mod array;
mod catalog;
mod error;
mod event;
mod generator;
mod graph;
mod position;
mod tree;

pub mod ml;
pub mod sort;
pub mod traverse;
pub mod treeops;

pub use array::{ArrayState, MAX_BAR, MIN_BAR};
pub use catalog::{
    Algorithm, AlgorithmInput, Category, DEFAULT_BAR_COUNT, DEFAULT_DELETE_VALUE,
    DEFAULT_INSERT_VALUE,
};
pub use error::{Result, StepError};
pub use event::{StepEvent, VisualElement};
pub use generator::{BoxedGenerator, StepGenerator, StepMachine, Steps};
pub use graph::{GraphNode, GraphState, TraversalTrace, SAMPLE_EDGES, SAMPLE_NODES};
pub use position::Position;
pub use tree::{BinarySearchTree, TreeNode, TreeNodeId, SAMPLE_VALUES};

/// Number of algorithms in the catalog.
pub const ALGORITHM_COUNT: usize = 21;
