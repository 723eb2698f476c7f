//! Quiz results and where they are recorded.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProgressError;

/// Opaque id of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Which progress table a topic's score is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressBucket {
    Algorithm,
    TreeOperation,
}

impl ProgressBucket {
    /// Tree topics are the traversals and the node insert/delete demos.
    pub fn for_topic(topic: &str) -> Self {
        if topic.contains("Traversal") || topic.contains("Node") {
            ProgressBucket::TreeOperation
        } else {
            ProgressBucket::Algorithm
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ProgressBucket::Algorithm => "algorithmProgress",
            ProgressBucket::TreeOperation => "treeOperationProgress",
        }
    }
}

/// Outcome of one completed quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub topic: String,
    /// Percentage of correct answers, 0 to 100.
    pub score: f64,
    pub correct: usize,
    pub total: usize,
    pub elapsed: Duration,
    pub timestamp: DateTime<Utc>,
}

impl QuizResult {
    pub fn new(topic: impl Into<String>, correct: usize, total: usize, elapsed: Duration) -> Self {
        let score = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        Self {
            topic: topic.into(),
            score,
            correct,
            total,
            elapsed,
            timestamp: Utc::now(),
        }
    }

    pub fn bucket(&self) -> ProgressBucket {
        ProgressBucket::for_topic(&self.topic)
    }

    /// Recent-activity line for this result.
    pub fn activity_description(&self) -> String {
        format!("Completed {} quiz with score {:.0}%", self.topic, self.score)
    }

    pub fn activity(&self) -> ActivityEntry {
        ActivityEntry {
            kind: "Quiz".to_string(),
            description: self.activity_description(),
            timestamp: self.timestamp,
        }
    }
}

/// A line in a user's recent activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Destination for quiz results.
///
/// Writes are fire-and-forget from the quiz engine's point of view: an error
/// is logged and the quiz completes regardless.
pub trait ProgressSink: Send {
    /// The signed-in user, if any. Nothing is recorded without one.
    fn current_user(&self) -> Option<UserId>;

    fn record_result(&mut self, user: &UserId, result: &QuizResult) -> Result<(), ProgressError>;
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn current_user(&self) -> Option<UserId> {
        (**self).current_user()
    }

    fn record_result(&mut self, user: &UserId, result: &QuizResult) -> Result<(), ProgressError> {
        (**self).record_result(user, result)
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn current_user(&self) -> Option<UserId> {
        (**self).current_user()
    }

    fn record_result(&mut self, user: &UserId, result: &QuizResult) -> Result<(), ProgressError> {
        (**self).record_result(user, result)
    }
}

/// Everything recorded for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    /// Latest score per non-tree topic.
    pub algorithm_progress: BTreeMap<String, f64>,
    /// Latest score per tree topic.
    pub tree_operation_progress: BTreeMap<String, f64>,
    /// Newest last.
    pub recent_activity: Vec<ActivityEntry>,
}

impl UserProgress {
    pub fn score(&self, topic: &str) -> Option<f64> {
        let table = match ProgressBucket::for_topic(topic) {
            ProgressBucket::Algorithm => &self.algorithm_progress,
            ProgressBucket::TreeOperation => &self.tree_operation_progress,
        };
        table.get(topic).copied()
    }

    fn record(&mut self, result: &QuizResult) {
        let table = match result.bucket() {
            ProgressBucket::Algorithm => &mut self.algorithm_progress,
            ProgressBucket::TreeOperation => &mut self.tree_operation_progress,
        };
        table.insert(result.topic.clone(), result.score);
        self.recent_activity.push(result.activity());
    }
}

/// Progress kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryProgress {
    signed_in: Option<UserId>,
    users: HashMap<UserId, UserProgress>,
    unavailable: bool,
}

impl InMemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, user: UserId) {
        debug!(%user, "Progress user signed in");
        self.signed_in = Some(user);
    }

    pub fn sign_out(&mut self) {
        self.signed_in = None;
    }

    /// Make every write fail, as if the store were offline.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    pub fn progress(&self, user: &UserId) -> Option<&UserProgress> {
        self.users.get(user)
    }

    /// JSON dump of one user's progress.
    pub fn to_json(&self, user: &UserId) -> serde_json::Result<String> {
        let progress = self.users.get(user).cloned().unwrap_or_default();
        serde_json::to_string_pretty(&progress)
    }
}

impl ProgressSink for InMemoryProgress {
    fn current_user(&self) -> Option<UserId> {
        self.signed_in.clone()
    }

    fn record_result(&mut self, user: &UserId, result: &QuizResult) -> Result<(), ProgressError> {
        if self.unavailable {
            return Err(ProgressError::Unavailable("store offline".to_string()));
        }
        self.users.entry(user.clone()).or_default().record(result);
        debug!(%user, topic = %result.topic, score = result.score, "Recorded quiz result");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_topics_use_tree_bucket() {
        for topic in ["InorderTraversal", "PostorderTraversal", "InsertNode", "DeleteNode"] {
            assert_eq!(ProgressBucket::for_topic(topic), ProgressBucket::TreeOperation);
        }
        for topic in ["BubbleSort", "Dijkstra", "DecisionTree", "RandomForest"] {
            assert_eq!(ProgressBucket::for_topic(topic), ProgressBucket::Algorithm);
        }
    }

    #[test]
    fn score_and_activity_text() {
        let result = QuizResult::new("QuickSort", 5, 6, Duration::from_secs(42));
        assert!((result.score - 83.333).abs() < 0.01);
        assert_eq!(
            result.activity_description(),
            "Completed QuickSort quiz with score 83%"
        );
        let perfect = QuizResult::new("BFS", 6, 6, Duration::ZERO);
        assert_eq!(perfect.activity_description(), "Completed BFS quiz with score 100%");
    }

    #[test]
    fn records_into_bucket_and_activity() {
        let mut store = InMemoryProgress::new();
        let user = UserId::from("u1");
        store.record_result(&user, &QuizResult::new("InsertNode", 3, 6, Duration::ZERO)).unwrap();
        store.record_result(&user, &QuizResult::new("HeapSort", 6, 6, Duration::ZERO)).unwrap();

        let progress = store.progress(&user).unwrap();
        assert_eq!(progress.tree_operation_progress.get("InsertNode"), Some(&50.0));
        assert_eq!(progress.algorithm_progress.get("HeapSort"), Some(&100.0));
        assert_eq!(progress.score("InsertNode"), Some(50.0));
        assert_eq!(progress.recent_activity.len(), 2);
        assert_eq!(progress.recent_activity[0].kind, "Quiz");
    }

    #[test]
    fn unavailable_store_rejects_writes() {
        let mut store = InMemoryProgress::new();
        store.set_unavailable(true);
        let user = UserId::from("u1");
        let err = store
            .record_result(&user, &QuizResult::new("DFS", 1, 6, Duration::ZERO))
            .unwrap_err();
        assert!(matches!(err, ProgressError::Unavailable(_)));
        assert!(store.progress(&user).is_none());
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let mut store = InMemoryProgress::new();
        let user = UserId::from("u1");
        store.record_result(&user, &QuizResult::new("DFS", 6, 6, Duration::ZERO)).unwrap();
        let json = store.to_json(&user).unwrap();
        assert!(json.contains("\"algorithmProgress\""));
        assert!(json.contains("\"recentActivity\""));
        assert!(json.contains("\"type\": \"Quiz\""));
    }
}
