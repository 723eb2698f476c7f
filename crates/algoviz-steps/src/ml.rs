//! Machine-learning demos as step machines.
//!
//! Each demo runs a small, fixed problem to completion: gradient descent on a
//! line, k-means on three seeded blobs, a Gini decision tree, a forward pass
//! through a tiny sigmoid network and a bootstrapped forest of stumps.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::Algorithm;
use crate::event::StepEvent;
use crate::generator::{StepMachine, Steps};
use crate::position::Position;

// ---------------------------------------------------------------------------
// Linear regression
// ---------------------------------------------------------------------------

/// Points fitted by the regression demo, in layout units.
pub const REGRESSION_POINTS: [(f64, f64); 9] = [
    (-200.0, 100.0),
    (-150.0, 50.0),
    (-100.0, 0.0),
    (-50.0, -20.0),
    (0.0, -50.0),
    (50.0, -70.0),
    (100.0, -100.0),
    (150.0, -120.0),
    (200.0, -150.0),
];

/// Layout units per model unit.
const REGRESSION_SCALE: f64 = 100.0;
const LEARNING_RATE: f64 = 0.1;
const REGRESSION_ITERATIONS: usize = 5;

/// Gradient descent on mean squared error, starting from a flat line.
pub fn linear_regression() -> Steps<LinearRegression> {
    Steps::new(LinearRegression {
        slope: 0.0,
        intercept: 0.0,
        loss: None,
        phase: RegressionPhase::Start,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegressionPhase {
    Start,
    Place(usize),
    Fit(usize),
    Done,
}

#[derive(Debug, Clone)]
pub struct LinearRegression {
    slope: f64,
    intercept: f64,
    loss: Option<f64>,
    phase: RegressionPhase,
}

impl LinearRegression {
    /// Slope in model units.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Intercept in model units.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Loss after the latest iteration.
    pub fn loss(&self) -> Option<f64> {
        self.loss
    }

    fn scaled() -> impl Iterator<Item = (f64, f64)> {
        REGRESSION_POINTS
            .iter()
            .map(|&(x, y)| (x / REGRESSION_SCALE, y / REGRESSION_SCALE))
    }

    fn mse(&self) -> f64 {
        let n = REGRESSION_POINTS.len() as f64;
        Self::scaled()
            .map(|(x, y)| (y - (self.slope * x + self.intercept)).powi(2))
            .sum::<f64>()
            / n
    }

    fn descend(&mut self) {
        let n = REGRESSION_POINTS.len() as f64;
        let (grad_m, grad_b) = Self::scaled().fold((0.0, 0.0), |(gm, gb), (x, y)| {
            let error = y - (self.slope * x + self.intercept);
            (gm - 2.0 * x * error / n, gb - 2.0 * error / n)
        });
        self.slope -= LEARNING_RATE * grad_m;
        self.intercept -= LEARNING_RATE * grad_b;
    }
}

impl StepMachine for LinearRegression {
    fn algorithm(&self) -> Algorithm {
        Algorithm::LinearRegression
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        match self.phase {
            RegressionPhase::Start => {
                out.push_back(StepEvent::message("Initializing Linear Regression Model"));
                self.phase = RegressionPhase::Place(0);
            }
            RegressionPhase::Place(point) if point < REGRESSION_POINTS.len() => {
                let (x, y) = REGRESSION_POINTS[point];
                out.push_back(StepEvent::PlacePoint {
                    point,
                    position: Position::new(x, y),
                });
                self.phase = RegressionPhase::Place(point + 1);
            }
            RegressionPhase::Place(_) => {
                out.push_back(StepEvent::message("Calculating Best Fit Line"));
                self.phase = RegressionPhase::Fit(0);
            }
            RegressionPhase::Fit(iteration) if iteration < REGRESSION_ITERATIONS => {
                self.descend();
                let loss = self.mse();
                self.loss = Some(loss);
                out.push_back(StepEvent::message(format!(
                    "Gradient Descent Iteration {}",
                    iteration + 1
                )));
                out.push_back(StepEvent::FitLine {
                    iteration: iteration + 1,
                    slope: self.slope,
                    intercept: self.intercept * REGRESSION_SCALE,
                    loss,
                });
                self.phase = RegressionPhase::Fit(iteration + 1);
            }
            RegressionPhase::Fit(_) => {
                out.push_back(StepEvent::message("Linear Regression Complete"));
                self.phase = RegressionPhase::Done;
            }
            RegressionPhase::Done => return false,
        }
        true
    }
}

// ---------------------------------------------------------------------------
// K-means
// ---------------------------------------------------------------------------

pub const CLUSTERS: usize = 3;
pub const POINTS_PER_CLUSTER: usize = 8;
const KMEANS_ITERATIONS: usize = 3;

/// Half-open x and y ranges each blob is drawn from.
const BLOB_RANGES: [((i32, i32), (i32, i32)); CLUSTERS] = [
    ((-200, -100), (-100, 100)),
    ((100, 200), (-100, 100)),
    ((-50, 50), (-200, -100)),
];

pub const INITIAL_CENTROIDS: [Position; CLUSTERS] = [
    Position::new(-150.0, 0.0),
    Position::new(150.0, 0.0),
    Position::new(0.0, -150.0),
];

/// K-means with k = 3 over three seeded blobs of eight points.
pub fn k_means(seed: u64) -> Steps<KMeans> {
    let mut rng = StdRng::seed_from_u64(seed);
    let points = BLOB_RANGES
        .iter()
        .flat_map(|&range| std::iter::repeat(range).take(POINTS_PER_CLUSTER))
        .map(|((x0, x1), (y0, y1))| {
            Position::new(
                f64::from(rng.gen_range(x0..x1)),
                f64::from(rng.gen_range(y0..y1)),
            )
        })
        .collect::<Vec<_>>();
    let assignments = vec![None; points.len()];
    Steps::new(KMeans {
        points,
        assignments,
        centroids: INITIAL_CENTROIDS,
        phase: KMeansPhase::Start,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KMeansPhase {
    Start,
    Place(usize),
    Seed,
    Assign { iteration: usize, point: usize },
    Update { iteration: usize },
    Done,
}

#[derive(Debug, Clone)]
pub struct KMeans {
    points: Vec<Position>,
    assignments: Vec<Option<usize>>,
    centroids: [Position; CLUSTERS],
    phase: KMeansPhase,
}

impl KMeans {
    pub fn points(&self) -> &[Position] {
        &self.points
    }

    /// Cluster of each point, once assigned.
    pub fn assignments(&self) -> &[Option<usize>] {
        &self.assignments
    }

    pub fn centroids(&self) -> &[Position; CLUSTERS] {
        &self.centroids
    }

    /// Sum of squared distances from each assigned point to its centroid.
    pub fn inertia(&self) -> f64 {
        self.points
            .iter()
            .zip(&self.assignments)
            .filter_map(|(point, cluster)| cluster.map(|c| point.distance(&self.centroids[c]).powi(2)))
            .sum()
    }

    fn nearest(&self, point: &Position) -> usize {
        let mut best = 0;
        let mut best_distance = f64::MAX;
        for (cluster, centroid) in self.centroids.iter().enumerate() {
            let distance = point.distance(centroid);
            if distance < best_distance {
                best = cluster;
                best_distance = distance;
            }
        }
        best
    }

    /// Move every centroid to the mean of its points. Empty clusters stay put.
    fn update_centroids(&mut self, out: &mut VecDeque<StepEvent>) {
        for cluster in 0..CLUSTERS {
            let members: Vec<&Position> = self
                .points
                .iter()
                .zip(&self.assignments)
                .filter(|(_, assigned)| **assigned == Some(cluster))
                .map(|(point, _)| point)
                .collect();
            if members.is_empty() {
                continue;
            }
            let count = members.len() as f64;
            let position = Position::new(
                members.iter().map(|p| p.x).sum::<f64>() / count,
                members.iter().map(|p| p.y).sum::<f64>() / count,
            );
            self.centroids[cluster] = position;
            out.push_back(StepEvent::MoveCentroid { cluster, position });
        }
    }
}

impl StepMachine for KMeans {
    fn algorithm(&self) -> Algorithm {
        Algorithm::KMeansClustering
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        match self.phase {
            KMeansPhase::Start => {
                out.push_back(StepEvent::message("Initializing K-Means Clustering"));
                self.phase = KMeansPhase::Place(0);
            }
            KMeansPhase::Place(point) if point < self.points.len() => {
                out.push_back(StepEvent::PlacePoint {
                    point,
                    position: self.points[point],
                });
                self.phase = KMeansPhase::Place(point + 1);
            }
            KMeansPhase::Place(_) => self.phase = KMeansPhase::Seed,
            KMeansPhase::Seed => {
                for (cluster, &position) in self.centroids.iter().enumerate() {
                    out.push_back(StepEvent::MoveCentroid { cluster, position });
                }
                out.push_back(StepEvent::message("Initialized Centroids"));
                self.phase = KMeansPhase::Assign {
                    iteration: 0,
                    point: 0,
                };
            }
            KMeansPhase::Assign { iteration, point } if point < self.points.len() => {
                if point == 0 {
                    out.push_back(StepEvent::message(format!(
                        "K-Means Iteration {}: Assigning Points to Clusters",
                        iteration + 1
                    )));
                }
                let cluster = self.nearest(&self.points[point]);
                self.assignments[point] = Some(cluster);
                out.push_back(StepEvent::AssignCluster { point, cluster });
                self.phase = KMeansPhase::Assign {
                    iteration,
                    point: point + 1,
                };
            }
            KMeansPhase::Assign { iteration, .. } => {
                self.phase = KMeansPhase::Update { iteration };
            }
            KMeansPhase::Update { iteration } => {
                out.push_back(StepEvent::message(format!(
                    "K-Means Iteration {}: Updating Centroids",
                    iteration + 1
                )));
                self.update_centroids(out);
                self.phase = if iteration + 1 < KMEANS_ITERATIONS {
                    KMeansPhase::Assign {
                        iteration: iteration + 1,
                        point: 0,
                    }
                } else {
                    out.push_back(StepEvent::message("K-Means Clustering Complete"));
                    KMeansPhase::Done
                };
            }
            KMeansPhase::Done => return false,
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Decision tree and random forest
// ---------------------------------------------------------------------------

/// Feature names, by index into [`Sample::features`].
pub const FEATURES: [&str; 2] = ["Age", "Income"];

/// Class predicted by the tree demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    A,
    B,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::A => write!(f, "Class A"),
            Label::B => write!(f, "Class B"),
        }
    }
}

/// One training row: age in years, income in thousands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub features: [f64; 2],
    pub label: Label,
}

const fn sample(age: f64, income: f64, label: Label) -> Sample {
    Sample {
        features: [age, income],
        label,
    }
}

/// Younger people are Class A only with a high income; older people always are.
pub const DATASET: [Sample; 12] = [
    sample(22.0, 30.0, Label::B),
    sample(25.0, 70.0, Label::A),
    sample(29.0, 40.0, Label::B),
    sample(28.0, 85.0, Label::A),
    sample(26.0, 48.0, Label::B),
    sample(24.0, 52.0, Label::A),
    sample(31.0, 35.0, Label::A),
    sample(45.0, 90.0, Label::A),
    sample(38.0, 46.0, Label::A),
    sample(51.0, 25.0, Label::A),
    sample(36.0, 20.0, Label::A),
    sample(58.0, 75.0, Label::A),
];

/// The example classified after training: age 25, income 60K.
pub const QUERY: [f64; 2] = [25.0, 60.0];

pub const MAX_TREE_DEPTH: usize = 2;
const FOREST_SIZE: usize = 3;

/// Gini impurity of a set of samples (0 when empty).
pub fn gini(samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let a = samples.iter().filter(|s| s.label == Label::A).count() as f64;
    1.0 - (a / n).powi(2) - ((n - a) / n).powi(2)
}

/// Most common label. Ties go to `Label::A`.
pub fn majority(samples: &[Sample]) -> Label {
    let a = samples.iter().filter(|s| s.label == Label::A).count();
    if a * 2 >= samples.len() {
        Label::A
    } else {
        Label::B
    }
}

/// A `feature > threshold` test and the weighted impurity it leaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
    pub impurity: f64,
}

impl Split {
    pub fn goes_right(&self, features: &[f64; 2]) -> bool {
        features[self.feature] > self.threshold
    }

    fn partition(&self, samples: &[Sample]) -> (Vec<Sample>, Vec<Sample>) {
        samples.iter().partition(|s| !self.goes_right(&s.features))
    }
}

/// Lowest weighted Gini split over midpoints between distinct feature values.
/// Only splits that reduce impurity are returned.
pub fn best_split(samples: &[Sample]) -> Option<Split> {
    let n = samples.len() as f64;
    let mut best: Option<Split> = None;
    for feature in 0..FEATURES.len() {
        let mut values: Vec<f64> = samples.iter().map(|s| s.features[feature]).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let candidate = Split {
                feature,
                threshold,
                impurity: 0.0,
            };
            let (left, right) = candidate.partition(samples);
            let impurity =
                (left.len() as f64 * gini(&left) + right.len() as f64 * gini(&right)) / n;
            if best.map_or(true, |b| impurity < b.impurity - 1e-12) {
                best = Some(Split { impurity, ..candidate });
            }
        }
    }
    best.filter(|split| split.impurity < gini(samples) - 1e-12)
}

fn split_event(node: usize, split: &Split) -> StepEvent {
    StepEvent::SplitNode {
        node,
        feature: FEATURES[split.feature].to_string(),
        threshold: split.threshold,
    }
}

/// A node of a grown decision tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecisionNode {
    Split(Split),
    Leaf(Label),
}

/// Grow a Gini decision tree over [`DATASET`], then classify [`QUERY`].
///
/// Nodes are numbered heap-style: the children of `n` are `2n + 1` (test
/// false) and `2n + 2` (test true).
pub fn decision_tree() -> Steps<DecisionTree> {
    Steps::new(DecisionTree {
        frames: vec![GrowFrame {
            node: 0,
            depth: 0,
            samples: DATASET.to_vec(),
        }],
        nodes: BTreeMap::new(),
        phase: TreePhase::Start,
    })
}

#[derive(Debug, Clone)]
struct GrowFrame {
    node: usize,
    depth: usize,
    samples: Vec<Sample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TreePhase {
    Start,
    Grow,
    Classify(usize),
    Finish,
    Done,
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    frames: Vec<GrowFrame>,
    nodes: BTreeMap<usize, DecisionNode>,
    phase: TreePhase,
}

impl DecisionTree {
    /// Nodes grown so far.
    pub fn nodes(&self) -> &BTreeMap<usize, DecisionNode> {
        &self.nodes
    }

    /// Classify `features` with the grown tree.
    pub fn predict(&self, features: &[f64; 2]) -> Option<Label> {
        let mut node = 0;
        loop {
            match self.nodes.get(&node)? {
                DecisionNode::Split(split) => {
                    node = if split.goes_right(features) {
                        2 * node + 2
                    } else {
                        2 * node + 1
                    };
                }
                DecisionNode::Leaf(label) => return Some(*label),
            }
        }
    }

    fn grow(&mut self, frame: GrowFrame, out: &mut VecDeque<StepEvent>) {
        let split = if frame.depth < MAX_TREE_DEPTH {
            best_split(&frame.samples)
        } else {
            None
        };
        match split {
            Some(split) => {
                out.push_back(split_event(frame.node, &split));
                self.nodes.insert(frame.node, DecisionNode::Split(split));
                let (left, right) = split.partition(&frame.samples);
                self.frames.push(GrowFrame {
                    node: 2 * frame.node + 2,
                    depth: frame.depth + 1,
                    samples: right,
                });
                self.frames.push(GrowFrame {
                    node: 2 * frame.node + 1,
                    depth: frame.depth + 1,
                    samples: left,
                });
            }
            None => {
                let label = majority(&frame.samples);
                out.push_back(StepEvent::LeafNode {
                    node: frame.node,
                    label: label.to_string(),
                });
                self.nodes.insert(frame.node, DecisionNode::Leaf(label));
            }
        }
    }
}

impl StepMachine for DecisionTree {
    fn algorithm(&self) -> Algorithm {
        Algorithm::DecisionTree
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        match self.phase {
            TreePhase::Start => {
                out.push_back(StepEvent::message("Building Decision Tree"));
                self.phase = TreePhase::Grow;
            }
            TreePhase::Grow => match self.frames.pop() {
                Some(frame) => self.grow(frame, out),
                None => {
                    out.push_back(StepEvent::message(format!(
                        "Decision Path Example: Age={}, Income={}K",
                        QUERY[0], QUERY[1]
                    )));
                    self.phase = TreePhase::Classify(0);
                }
            },
            TreePhase::Classify(node) => {
                self.phase = match self.nodes.get(&node) {
                    Some(DecisionNode::Split(split)) => {
                        let yes = split.goes_right(&QUERY);
                        out.push_back(StepEvent::message(format!(
                            "{} > {}? {}",
                            FEATURES[split.feature],
                            split.threshold,
                            if yes { "Yes" } else { "No" }
                        )));
                        TreePhase::Classify(if yes { 2 * node + 2 } else { 2 * node + 1 })
                    }
                    Some(DecisionNode::Leaf(label)) => {
                        out.push_back(StepEvent::message(format!("Prediction: {label}")));
                        TreePhase::Finish
                    }
                    None => TreePhase::Finish,
                };
            }
            TreePhase::Finish => {
                out.push_back(StepEvent::message("Decision Tree Classification Complete"));
                self.phase = TreePhase::Done;
            }
            TreePhase::Done => return false,
        }
        true
    }
}

/// Three stumps, each grown on a bootstrap sample of [`DATASET`], voting on [`QUERY`].
///
/// Tree `t` uses node ids `3t` (root) and `3t + 1`, `3t + 2` (leaves).
pub fn random_forest(seed: u64) -> Steps<RandomForest> {
    Steps::new(RandomForest {
        rng: StdRng::seed_from_u64(seed),
        votes: Vec::with_capacity(FOREST_SIZE),
        prediction: None,
        phase: ForestPhase::Start,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForestPhase {
    Start,
    Tree(usize),
    Aggregate,
    Done,
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    rng: StdRng,
    votes: Vec<Label>,
    prediction: Option<Label>,
    phase: ForestPhase,
}

impl RandomForest {
    pub fn votes(&self) -> &[Label] {
        &self.votes
    }

    /// The majority vote, once aggregated.
    pub fn prediction(&self) -> Option<Label> {
        self.prediction
    }

    fn grow_stump(&mut self, tree: usize, out: &mut VecDeque<StepEvent>) -> Label {
        let bootstrap: Vec<Sample> = (0..DATASET.len())
            .map(|_| DATASET[self.rng.gen_range(0..DATASET.len())])
            .collect();
        out.push_back(StepEvent::message(format!(
            "Tree {}: bootstrap sample of {}",
            tree + 1,
            bootstrap.len()
        )));
        let root = 3 * tree;
        let Some(split) = best_split(&bootstrap) else {
            let label = majority(&bootstrap);
            out.push_back(StepEvent::LeafNode {
                node: root,
                label: label.to_string(),
            });
            return label;
        };
        out.push_back(split_event(root, &split));
        let (left, right) = split.partition(&bootstrap);
        let (left, right) = (majority(&left), majority(&right));
        for (node, label) in [(root + 1, left), (root + 2, right)] {
            out.push_back(StepEvent::LeafNode {
                node,
                label: label.to_string(),
            });
        }
        if split.goes_right(&QUERY) {
            right
        } else {
            left
        }
    }
}

impl StepMachine for RandomForest {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RandomForest
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        match self.phase {
            ForestPhase::Start => {
                out.push_back(StepEvent::message("Building Random Forest"));
                self.phase = ForestPhase::Tree(0);
            }
            ForestPhase::Tree(tree) if tree < FOREST_SIZE => {
                let label = self.grow_stump(tree, out);
                self.votes.push(label);
                out.push_back(StepEvent::Vote {
                    tree,
                    label: label.to_string(),
                });
                self.phase = ForestPhase::Tree(tree + 1);
            }
            ForestPhase::Tree(_) => {
                out.push_back(StepEvent::message("Aggregating Trees..."));
                self.phase = ForestPhase::Aggregate;
            }
            ForestPhase::Aggregate => {
                let a = self.votes.iter().filter(|&&v| v == Label::A).count();
                let winner = if a * 2 > self.votes.len() {
                    Label::A
                } else {
                    Label::B
                };
                let count = self.votes.iter().filter(|&&v| v == winner).count();
                out.push_back(StepEvent::message(format!(
                    "Majority vote: {winner} ({count} of {})",
                    self.votes.len()
                )));
                out.push_back(StepEvent::message("Random Forest Prediction Ready!"));
                self.prediction = Some(winner);
                self.phase = ForestPhase::Done;
            }
            ForestPhase::Done => return false,
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Neural network
// ---------------------------------------------------------------------------

pub const NETWORK_INPUT: [f64; 3] = [0.5, 0.8, 0.2];

const HIDDEN_WEIGHTS: [[f64; 3]; 4] = [
    [0.2, -0.4, 0.7],
    [0.5, 0.3, -0.6],
    [-0.3, 0.8, 0.1],
    [0.6, -0.1, 0.4],
];
const HIDDEN_BIAS: [f64; 4] = [0.1, -0.2, 0.05, 0.0];

const OUTPUT_WEIGHTS: [[f64; 4]; 2] = [[0.7, -0.5, 0.9, 0.2], [-0.4, 0.6, -0.2, 0.8]];
const OUTPUT_BIAS: [f64; 2] = [-0.1, 0.1];

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Forward pass of [`NETWORK_INPUT`] through a fixed 3-4-2 sigmoid network.
pub fn neural_network() -> Steps<NeuralNetwork> {
    Steps::new(NeuralNetwork {
        layers: vec![Vec::with_capacity(3), Vec::with_capacity(4), Vec::with_capacity(2)],
        phase: NetworkPhase::Start,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NetworkPhase {
    Start,
    /// Activating neuron `neuron` of layer `layer`.
    Activate { layer: usize, neuron: usize },
    Finish,
    Done,
}

#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    layers: Vec<Vec<f64>>,
    phase: NetworkPhase,
}

impl NeuralNetwork {
    /// Activations computed so far for `layer` (0 input, 1 hidden, 2 output).
    pub fn activations(&self, layer: usize) -> &[f64] {
        self.layers.get(layer).map(Vec::as_slice).unwrap_or(&[])
    }

    fn width(layer: usize) -> usize {
        match layer {
            0 => NETWORK_INPUT.len(),
            1 => HIDDEN_BIAS.len(),
            _ => OUTPUT_BIAS.len(),
        }
    }

    fn activation(&self, layer: usize, neuron: usize) -> f64 {
        let weighted = |weights: &[f64], bias: f64, inputs: &[f64]| {
            weights.iter().zip(inputs).map(|(w, x)| w * x).sum::<f64>() + bias
        };
        match layer {
            0 => NETWORK_INPUT[neuron],
            1 => sigmoid(weighted(
                &HIDDEN_WEIGHTS[neuron],
                HIDDEN_BIAS[neuron],
                &self.layers[0],
            )),
            _ => sigmoid(weighted(
                &OUTPUT_WEIGHTS[neuron],
                OUTPUT_BIAS[neuron],
                &self.layers[1],
            )),
        }
    }
}

impl StepMachine for NeuralNetwork {
    fn algorithm(&self) -> Algorithm {
        Algorithm::NeuralNetwork
    }

    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool {
        match self.phase {
            NetworkPhase::Start => {
                out.push_back(StepEvent::message("Building Neural Network"));
                self.phase = NetworkPhase::Activate {
                    layer: 0,
                    neuron: 0,
                };
            }
            NetworkPhase::Activate { layer, neuron } => {
                if layer == 1 && neuron == 0 {
                    out.push_back(StepEvent::message("Forward Propagation"));
                }
                let value = self.activation(layer, neuron);
                self.layers[layer].push(value);
                out.push_back(StepEvent::Activate {
                    layer,
                    neuron,
                    value,
                });
                self.phase = if neuron + 1 < Self::width(layer) {
                    NetworkPhase::Activate {
                        layer,
                        neuron: neuron + 1,
                    }
                } else if layer + 1 < self.layers.len() {
                    NetworkPhase::Activate {
                        layer: layer + 1,
                        neuron: 0,
                    }
                } else {
                    NetworkPhase::Finish
                };
            }
            NetworkPhase::Finish => {
                let outputs = self.activations(2);
                let winner = outputs
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .map_or(0, |(index, _)| index);
                out.push_back(StepEvent::message(format!("Predicted Output {winner}")));
                out.push_back(StepEvent::message("Forward Pass Complete"));
                self.phase = NetworkPhase::Done;
            }
            NetworkPhase::Done => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::StepGenerator;

    fn count(events: &[StepEvent], kind: &str) -> usize {
        events.iter().filter(|e| e.kind() == kind).count()
    }

    #[test]
    fn regression_loss_decreases() {
        let mut generator = linear_regression();
        let events: Vec<_> = generator.by_ref().collect();
        assert_eq!(count(&events, "place_point"), 9);
        let losses: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                StepEvent::FitLine { loss, .. } => Some(*loss),
                _ => None,
            })
            .collect();
        assert_eq!(losses.len(), REGRESSION_ITERATIONS);
        assert!(losses.windows(2).all(|w| w[1] < w[0]), "{losses:?}");
        assert!(generator.machine().slope() < 0.0);
        assert_eq!(events.last(), Some(&StepEvent::message("Linear Regression Complete")));
    }

    #[test]
    fn k_means_event_shape() {
        let events: Vec<_> = k_means(42).collect();
        let points = CLUSTERS * POINTS_PER_CLUSTER;
        assert_eq!(count(&events, "place_point"), points);
        assert_eq!(count(&events, "assign_cluster"), points * KMEANS_ITERATIONS);
        assert!(count(&events, "move_centroid") >= CLUSTERS);
        assert_eq!(events.last(), Some(&StepEvent::message("K-Means Clustering Complete")));
    }

    #[test]
    fn k_means_points_stay_in_blob_ranges() {
        let generator = k_means(9);
        for (index, point) in generator.machine().points().iter().enumerate() {
            let ((x0, x1), (y0, y1)) = BLOB_RANGES[index / POINTS_PER_CLUSTER];
            assert!(point.x >= f64::from(x0) && point.x < f64::from(x1));
            assert!(point.y >= f64::from(y0) && point.y < f64::from(y1));
        }
    }

    #[test]
    fn k_means_recovers_blobs() {
        for seed in [1, 42, 2024] {
            let mut generator = k_means(seed);
            generator.by_ref().for_each(drop);
            let machine = generator.machine();
            let matching = machine
                .assignments()
                .iter()
                .enumerate()
                .filter(|(index, cluster)| **cluster == Some(index / POINTS_PER_CLUSTER))
                .count();
            assert!(matching >= 20, "seed {seed}: {matching} of 24");
            assert!(machine.inertia().is_finite());
        }
    }

    #[test]
    fn k_means_is_seed_deterministic() {
        let a: Vec<_> = k_means(5).collect();
        let b: Vec<_> = k_means(5).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn gini_of_pure_and_even_sets() {
        assert_eq!(gini(&DATASET[7..]), 0.0);
        assert!((gini(&DATASET[..2]) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[]), 0.0);
    }

    #[test]
    fn decision_tree_splits_on_age_then_income() {
        let mut generator = decision_tree();
        let events: Vec<_> = generator.by_ref().collect();
        let structure: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, StepEvent::SplitNode { .. } | StepEvent::LeafNode { .. }))
            .cloned()
            .collect();
        assert_eq!(
            structure,
            vec![
                StepEvent::SplitNode { node: 0, feature: "Age".into(), threshold: 30.0 },
                StepEvent::SplitNode { node: 1, feature: "Income".into(), threshold: 50.0 },
                StepEvent::LeafNode { node: 3, label: "Class B".into() },
                StepEvent::LeafNode { node: 4, label: "Class A".into() },
                StepEvent::LeafNode { node: 2, label: "Class A".into() },
            ]
        );
        assert!(events.contains(&StepEvent::message("Age > 30? No")));
        assert!(events.contains(&StepEvent::message("Prediction: Class A")));
        assert_eq!(generator.machine().predict(&QUERY), Some(Label::A));
        assert_eq!(generator.machine().predict(&[23.0, 20.0]), Some(Label::B));
    }

    #[test]
    fn tree_depth_is_bounded() {
        let mut generator = decision_tree();
        generator.by_ref().for_each(drop);
        // Depth 2 means heap ids stay below 7.
        assert!(generator.machine().nodes().keys().all(|&node| node < 7));
    }

    #[test]
    fn forest_votes_and_aggregates() {
        let mut generator = random_forest(42);
        let events: Vec<_> = generator.by_ref().collect();
        assert_eq!(count(&events, "vote"), FOREST_SIZE);
        let machine = generator.machine();
        let a = machine.votes().iter().filter(|&&v| v == Label::A).count();
        let expected = if a >= 2 { Label::A } else { Label::B };
        assert_eq!(machine.prediction(), Some(expected));
        assert_eq!(events.last(), Some(&StepEvent::message("Random Forest Prediction Ready!")));
    }

    #[test]
    fn forest_restart_reuses_seed() {
        let mut generator = random_forest(3);
        let first: Vec<_> = generator.by_ref().collect();
        generator.restart();
        let second: Vec<_> = generator.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn network_activations_are_sigmoid_bounded() {
        let mut generator = neural_network();
        let events: Vec<_> = generator.by_ref().collect();
        assert_eq!(count(&events, "activate"), 9);
        let machine = generator.machine();
        assert_eq!(machine.activations(0), &NETWORK_INPUT);
        for layer in 1..=2 {
            assert!(machine.activations(layer).iter().all(|&v| v > 0.0 && v < 1.0));
        }
        let h0 = sigmoid(0.2 * 0.5 - 0.4 * 0.8 + 0.7 * 0.2 + 0.1);
        assert!((machine.activations(1)[0] - h0).abs() < 1e-12);
    }
}
