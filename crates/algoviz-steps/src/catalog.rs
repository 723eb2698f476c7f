//! Algorithm catalog: names, categories, learning order and generator construction.

use std::fmt;
use std::str::FromStr;

use crate::array::ArrayState;
use crate::error::{Result, StepError};
use crate::generator::BoxedGenerator;
use crate::graph::GraphState;
use crate::tree::BinarySearchTree;
use crate::{ml, sort, traverse, treeops};

/// Value inserted by the tree insert demo.
pub const DEFAULT_INSERT_VALUE: i64 = 65;

/// Value removed by the tree delete demo.
pub const DEFAULT_DELETE_VALUE: i64 = 30;

/// Default number of bars for the sorting demos.
pub const DEFAULT_BAR_COUNT: usize = 10;

/// Every algorithm the visualizer can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    BubbleSort,
    SelectionSort,
    InsertionSort,
    QuickSort,
    MergeSort,
    HeapSort,
    InorderTraversal,
    PreorderTraversal,
    PostorderTraversal,
    InsertNode,
    DeleteNode,
    Dijkstra,
    Bfs,
    Dfs,
    AStar,
    BellmanFord,
    LinearRegression,
    KMeansClustering,
    DecisionTree,
    NeuralNetwork,
    RandomForest,
}

/// Groups of algorithms that are learned in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    Sorting,
    Tree,
    Graph,
    MachineLearning,
}

const SORTING: [Algorithm; 6] = [
    Algorithm::BubbleSort,
    Algorithm::SelectionSort,
    Algorithm::InsertionSort,
    Algorithm::QuickSort,
    Algorithm::MergeSort,
    Algorithm::HeapSort,
];

const TREE: [Algorithm; 5] = [
    Algorithm::InorderTraversal,
    Algorithm::PreorderTraversal,
    Algorithm::PostorderTraversal,
    Algorithm::InsertNode,
    Algorithm::DeleteNode,
];

const GRAPH: [Algorithm; 5] = [
    Algorithm::Dijkstra,
    Algorithm::Bfs,
    Algorithm::Dfs,
    Algorithm::AStar,
    Algorithm::BellmanFord,
];

const MACHINE_LEARNING: [Algorithm; 5] = [
    Algorithm::LinearRegression,
    Algorithm::KMeansClustering,
    Algorithm::DecisionTree,
    Algorithm::NeuralNetwork,
    Algorithm::RandomForest,
];

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Sorting,
        Category::Tree,
        Category::Graph,
        Category::MachineLearning,
    ];

    /// Algorithms of this category in learning order.
    pub fn sequence(&self) -> &'static [Algorithm] {
        match self {
            Category::Sorting => &SORTING,
            Category::Tree => &TREE,
            Category::Graph => &GRAPH,
            Category::MachineLearning => &MACHINE_LEARNING,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::Sorting => "sorting",
            Category::Tree => "tree",
            Category::Graph => "graph",
            Category::MachineLearning => "ml",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| StepError::UnknownAlgorithm(s.to_string()))
    }
}

impl Algorithm {
    /// All algorithms, grouped by category in learning order.
    pub fn all() -> impl Iterator<Item = Algorithm> {
        Category::ALL.into_iter().flat_map(|c| c.sequence().iter().copied())
    }

    /// Stable key, shared with the quiz banks.
    pub fn key(&self) -> &'static str {
        match self {
            Algorithm::BubbleSort => "BubbleSort",
            Algorithm::SelectionSort => "SelectionSort",
            Algorithm::InsertionSort => "InsertionSort",
            Algorithm::QuickSort => "QuickSort",
            Algorithm::MergeSort => "MergeSort",
            Algorithm::HeapSort => "HeapSort",
            Algorithm::InorderTraversal => "InorderTraversal",
            Algorithm::PreorderTraversal => "PreorderTraversal",
            Algorithm::PostorderTraversal => "PostorderTraversal",
            Algorithm::InsertNode => "InsertNode",
            Algorithm::DeleteNode => "DeleteNode",
            Algorithm::Dijkstra => "Dijkstra",
            Algorithm::Bfs => "BFS",
            Algorithm::Dfs => "DFS",
            Algorithm::AStar => "AStar",
            Algorithm::BellmanFord => "BellmanFord",
            Algorithm::LinearRegression => "LinearRegression",
            Algorithm::KMeansClustering => "KMeansClustering",
            Algorithm::DecisionTree => "DecisionTree",
            Algorithm::NeuralNetwork => "NeuralNetwork",
            Algorithm::RandomForest => "RandomForest",
        }
    }

    pub fn category(&self) -> Category {
        Category::ALL
            .into_iter()
            .find(|c| c.sequence().contains(self))
            .unwrap_or(Category::Sorting)
    }

    /// The algorithm that follows this one in its category, if any.
    pub fn next_in_category(&self) -> Option<Algorithm> {
        let sequence = self.category().sequence();
        let index = sequence.iter().position(|a| a == self)?;
        sequence.get(index + 1).copied()
    }

    /// Build a generator for this algorithm over `input`.
    pub fn generator(&self, input: &AlgorithmInput) -> Result<BoxedGenerator> {
        let array = || input.array.values().to_vec();
        let graph = || input.graph.clone();
        let tree = || input.tree.clone();
        let generator: BoxedGenerator = match self {
            Algorithm::BubbleSort => Box::new(sort::bubble_sort(array())?),
            Algorithm::SelectionSort => Box::new(sort::selection_sort(array())?),
            Algorithm::InsertionSort => Box::new(sort::insertion_sort(array())?),
            Algorithm::QuickSort => Box::new(sort::quick_sort(array())?),
            Algorithm::MergeSort => Box::new(sort::merge_sort(array())?),
            Algorithm::HeapSort => Box::new(sort::heap_sort(array())?),
            Algorithm::InorderTraversal => Box::new(treeops::inorder(tree())?),
            Algorithm::PreorderTraversal => Box::new(treeops::preorder(tree())?),
            Algorithm::PostorderTraversal => Box::new(treeops::postorder(tree())?),
            Algorithm::InsertNode => Box::new(treeops::insert(tree(), input.insert_value)),
            Algorithm::DeleteNode => Box::new(treeops::delete(tree(), input.delete_value)?),
            Algorithm::Dijkstra => Box::new(traverse::dijkstra(graph(), input.start)?),
            Algorithm::Bfs => Box::new(traverse::bfs(graph(), input.start)?),
            Algorithm::Dfs => Box::new(traverse::dfs(graph(), input.start)?),
            Algorithm::AStar => {
                let goal = input.goal.unwrap_or_else(|| input.graph.len().saturating_sub(1));
                Box::new(traverse::a_star(graph(), input.start, goal)?)
            }
            Algorithm::BellmanFord => Box::new(traverse::bellman_ford(graph(), input.start)?),
            Algorithm::LinearRegression => Box::new(ml::linear_regression()),
            Algorithm::KMeansClustering => Box::new(ml::k_means(input.seed)),
            Algorithm::DecisionTree => Box::new(ml::decision_tree()),
            Algorithm::NeuralNetwork => Box::new(ml::neural_network()),
            Algorithm::RandomForest => Box::new(ml::random_forest(input.seed)),
        };
        Ok(generator)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Algorithm {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::all()
            .find(|a| a.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| StepError::UnknownAlgorithm(s.to_string()))
    }
}

/// Initial state handed to a generator.
///
/// Defaults reproduce the sample data of each demo: random bars, the
/// six-node graph searched from node 0 to the last node, and the seven-node
/// tree with 65 inserted or 30 deleted.
#[derive(Debug, Clone)]
pub struct AlgorithmInput {
    pub array: ArrayState,
    pub graph: GraphState,
    pub start: usize,
    /// Goal for A*. `None` means the last node.
    pub goal: Option<usize>,
    pub tree: BinarySearchTree,
    pub insert_value: i64,
    pub delete_value: i64,
    /// Seed for the sampled ML datasets.
    pub seed: u64,
}

impl Default for AlgorithmInput {
    fn default() -> Self {
        Self {
            array: ArrayState::random(DEFAULT_BAR_COUNT, 42),
            graph: GraphState::sample(),
            start: 0,
            goal: None,
            tree: BinarySearchTree::sample(),
            insert_value: DEFAULT_INSERT_VALUE,
            delete_value: DEFAULT_DELETE_VALUE,
            seed: 42,
        }
    }
}

impl AlgorithmInput {
    /// Use explicit array values.
    #[must_use]
    pub fn with_array(mut self, values: Vec<i64>) -> Self {
        self.array = ArrayState::new(values);
        self
    }

    /// Use `count` random bars drawn from `seed`.
    #[must_use]
    pub fn with_random_bars(mut self, count: usize, seed: u64) -> Self {
        self.array = ArrayState::random(count, seed);
        self
    }

    #[must_use]
    pub fn with_graph(mut self, graph: GraphState) -> Self {
        self.graph = graph;
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_goal(mut self, goal: usize) -> Self {
        self.goal = Some(goal);
        self
    }

    #[must_use]
    pub fn with_tree(mut self, tree: BinarySearchTree) -> Self {
        self.tree = tree;
        self
    }

    #[must_use]
    pub fn with_insert_value(mut self, value: i64) -> Self {
        self.insert_value = value;
        self
    }

    #[must_use]
    pub fn with_delete_value(mut self, value: i64) -> Self {
        self.delete_value = value;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::StepGenerator;

    #[test]
    fn keys_round_trip() {
        for algorithm in Algorithm::all() {
            assert_eq!(algorithm.key().parse::<Algorithm>(), Ok(algorithm));
        }
        assert_eq!("bfs".parse::<Algorithm>(), Ok(Algorithm::Bfs));
        assert!("Bogosort".parse::<Algorithm>().is_err());
    }

    #[test]
    fn catalog_covers_every_algorithm_once() {
        assert_eq!(Algorithm::all().count(), 21);
    }

    #[test]
    fn learning_order() {
        assert_eq!(Algorithm::BubbleSort.next_in_category(), Some(Algorithm::SelectionSort));
        assert_eq!(Algorithm::MergeSort.next_in_category(), Some(Algorithm::HeapSort));
        assert_eq!(Algorithm::HeapSort.next_in_category(), None);
        assert_eq!(Algorithm::Dijkstra.next_in_category(), Some(Algorithm::Bfs));
        assert_eq!(Algorithm::DeleteNode.category(), Category::Tree);
    }

    #[test]
    fn every_algorithm_builds_and_terminates() {
        let input = AlgorithmInput::default();
        for algorithm in Algorithm::all() {
            let generator = algorithm.generator(&input).unwrap();
            assert_eq!(generator.algorithm(), algorithm);
            let count = generator.count();
            assert!(count > 0, "{algorithm} produced no events");
        }
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let input = AlgorithmInput::default()
            .with_array(Vec::new())
            .with_graph(GraphState::new())
            .with_tree(BinarySearchTree::new());
        for algorithm in [
            Algorithm::BubbleSort,
            Algorithm::HeapSort,
            Algorithm::Bfs,
            Algorithm::AStar,
            Algorithm::InorderTraversal,
            Algorithm::DeleteNode,
        ] {
            assert_eq!(algorithm.generator(&input).err(), Some(StepError::EmptyInput));
        }
    }

    #[test]
    fn category_parse() {
        assert_eq!("ML".parse::<Category>(), Ok(Category::MachineLearning));
        assert_eq!(Category::Graph.to_string(), "graph");
    }
}
