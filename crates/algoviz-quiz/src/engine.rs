//! Quiz state machine.
//!
//! `Idle → InProgress → AnswerRevealed → (InProgress | Completed)`. Starting a
//! quiz is allowed from any state and discards the previous session.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bank::{AnswerOption, QuestionBanks, QuizQuestion};
use crate::error::{QuizError, Result};
use crate::progress::{ProgressSink, QuizResult};

/// Where the engine is in a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizState {
    Idle,
    InProgress,
    AnswerRevealed,
    Completed,
}

impl fmt::Display for QuizState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizState::Idle => write!(f, "IDLE"),
            QuizState::InProgress => write!(f, "IN_PROGRESS"),
            QuizState::AnswerRevealed => write!(f, "ANSWER_REVEALED"),
            QuizState::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// The answer check shown after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub selected: AnswerOption,
    pub correct_answer: AnswerOption,
    pub is_correct: bool,
}

/// What `next_question` moved to.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizAdvance<'a> {
    Question(&'a QuizQuestion),
    Completed(QuizResult),
}

/// Counters and timer for the quiz being taken.
#[derive(Debug, Clone)]
pub struct QuizSession {
    topic: String,
    questions: Vec<QuizQuestion>,
    index: usize,
    correct: usize,
    wrong: usize,
    elapsed: Duration,
}

impl QuizSession {
    fn new(topic: &str, questions: &[QuizQuestion]) -> Self {
        Self {
            topic: topic.to_string(),
            questions: questions.to_vec(),
            index: 0,
            correct: 0,
            wrong: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The question being shown, `None` once past the end.
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.index)
    }

    /// Zero-based index of the current question.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn wrong(&self) -> usize {
        self.wrong
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn result(&self) -> QuizResult {
        QuizResult::new(&self.topic, self.correct, self.total(), self.elapsed)
    }
}

/// Format a duration as `m:ss`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Runs quizzes from a set of banks and reports completions to a sink.
pub struct QuizEngine<S: ProgressSink> {
    banks: QuestionBanks,
    sink: S,
    state: QuizState,
    session: Option<QuizSession>,
}

impl<S: ProgressSink> QuizEngine<S> {
    pub fn new(banks: QuestionBanks, sink: S) -> Self {
        Self {
            banks,
            sink,
            state: QuizState::Idle,
            session: None,
        }
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn banks(&self) -> &QuestionBanks {
        &self.banks
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// The question awaiting an answer or showing its verdict.
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match self.state {
            QuizState::InProgress | QuizState::AnswerRevealed => {
                self.session.as_ref()?.current_question()
            }
            QuizState::Idle | QuizState::Completed => None,
        }
    }

    /// Load `topic`'s bank, reset counters and timer, and show question one.
    pub fn start_quiz(&mut self, topic: &str) -> Result<&QuizQuestion> {
        let questions = self
            .banks
            .get(topic)
            .ok_or_else(|| QuizError::UnknownTopic(topic.to_string()))?;
        info!(topic, questions = questions.len(), "Quiz started");
        self.state = QuizState::InProgress;
        let session = self.session.insert(QuizSession::new(topic, questions));
        session
            .current_question()
            .ok_or_else(|| QuizError::UnknownTopic(topic.to_string()))
    }

    /// Check the selected option against the current question.
    ///
    /// No selection is rejected without changing state, so the player can
    /// pick an option and submit again.
    pub fn submit_answer(&mut self, selected: Option<AnswerOption>) -> Result<AnswerFeedback> {
        self.expect_state(QuizState::InProgress)?;
        let Some(selected) = selected else {
            debug!("Submit without a selection");
            return Err(QuizError::NoSelection);
        };
        let session = self.session.as_mut().ok_or(QuizError::InvalidState {
            expected: QuizState::InProgress,
            actual: QuizState::Idle,
        })?;
        let question = session
            .questions
            .get(session.index)
            .ok_or(QuizError::InvalidState {
                expected: QuizState::InProgress,
                actual: QuizState::Completed,
            })?;

        let correct_answer = question.answer;
        let is_correct = correct_answer == selected;
        if is_correct {
            session.correct += 1;
        } else {
            session.wrong += 1;
        }
        debug!(
            question = session.index + 1,
            %selected,
            %correct_answer,
            is_correct,
            "Answer submitted"
        );
        self.state = QuizState::AnswerRevealed;
        Ok(AnswerFeedback {
            selected,
            correct_answer,
            is_correct,
        })
    }

    /// Move past a revealed answer.
    ///
    /// After the last question the quiz completes and, when a user is signed
    /// in, the result goes to the progress sink. A failed write is logged and
    /// does not stop completion.
    pub fn next_question(&mut self) -> Result<QuizAdvance<'_>> {
        self.expect_state(QuizState::AnswerRevealed)?;
        let session = self.session.as_mut().ok_or(QuizError::InvalidState {
            expected: QuizState::AnswerRevealed,
            actual: QuizState::Idle,
        })?;
        session.index += 1;

        if session.index < session.total() {
            self.state = QuizState::InProgress;
            let question = self
                .session
                .as_ref()
                .and_then(QuizSession::current_question)
                .ok_or(QuizError::InvalidState {
                    expected: QuizState::InProgress,
                    actual: QuizState::Completed,
                })?;
            return Ok(QuizAdvance::Question(question));
        }

        self.state = QuizState::Completed;
        let result = session.result();
        info!(
            topic = %result.topic,
            correct = result.correct,
            total = result.total,
            score = result.score,
            "Quiz completed"
        );
        self.report(&result);
        Ok(QuizAdvance::Completed(result))
    }

    /// Advance the quiz timer. Counts only while a quiz is open.
    pub fn tick(&mut self, dt: Duration) {
        if matches!(self.state, QuizState::InProgress | QuizState::AnswerRevealed) {
            if let Some(session) = self.session.as_mut() {
                session.elapsed += dt;
            }
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.session
            .as_ref()
            .map_or(Duration::ZERO, QuizSession::elapsed)
    }

    /// Timer text, `m:ss`.
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed())
    }

    /// Correct answers so far.
    pub fn score(&self) -> usize {
        self.session.as_ref().map_or(0, QuizSession::correct)
    }

    fn report(&mut self, result: &QuizResult) {
        let Some(user) = self.sink.current_user() else {
            debug!(topic = %result.topic, "No user signed in, result not recorded");
            return;
        };
        if let Err(e) = self.sink.record_result(&user, result) {
            warn!(%user, topic = %result.topic, error = %e, "Failed to record quiz result");
        }
    }

    fn expect_state(&self, expected: QuizState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(QuizError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}
