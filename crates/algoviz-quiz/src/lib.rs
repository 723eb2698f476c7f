//! AlgoViz Quiz
//!
//! Six-question quizzes for every algorithm, with results filed per user.
//!
//! - [`QuestionBanks`]: embedded per-topic banks
//! - [`QuizEngine`]: start, submit, next, tick
//! - [`ProgressSink`]: where completed quizzes go, with [`InMemoryProgress`]
//! - [`IdentityProvider`]: sign-in and registration, with [`InMemoryIdentity`]
//!
//! ```
//! use algoviz_quiz::{InMemoryProgress, QuestionBanks, QuizEngine};
//!
//! let mut engine = QuizEngine::new(QuestionBanks::builtin()?, InMemoryProgress::new());
//! let question = engine.start_quiz("BubbleSort")?;
//! assert_eq!(question.options.len(), 4);
//! # Ok::<(), algoviz_quiz::QuizError>(())
//! ```

mod bank;
mod engine;
mod error;
mod identity;
mod progress;

pub use bank::{AnswerOption, QuestionBanks, QuizQuestion};
pub use engine::{format_elapsed, AnswerFeedback, QuizAdvance, QuizEngine, QuizSession, QuizState};
pub use error::{AuthErrorKind, ProgressError, QuizError, Result};
pub use identity::{AuthResult, IdentityProvider, InMemoryIdentity};
pub use progress::{
    ActivityEntry, InMemoryProgress, ProgressBucket, ProgressSink, QuizResult, UserId, UserProgress,
};

/// Questions in every built-in bank.
pub const QUESTIONS_PER_TOPIC: usize = 6;

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_steps::Algorithm;

    #[test]
    fn every_algorithm_has_a_bank() {
        let banks = QuestionBanks::builtin().unwrap();
        for algorithm in Algorithm::all() {
            let questions = banks.get(algorithm.key());
            assert_eq!(
                questions.map(<[QuizQuestion]>::len),
                Some(QUESTIONS_PER_TOPIC),
                "{algorithm}"
            );
        }
        assert_eq!(banks.len(), Algorithm::all().count());
    }

    #[test]
    fn signed_in_identity_feeds_progress() {
        let mut identity = InMemoryIdentity::new();
        let user = identity
            .register_verified("Grace", "grace@example.com", "hopper")
            .unwrap();
        identity.sign_in("grace@example.com", "hopper").unwrap();

        let mut progress = InMemoryProgress::new();
        progress.sign_in(identity.current_user().unwrap());
        let mut engine = QuizEngine::new(QuestionBanks::builtin().unwrap(), progress);

        engine.start_quiz("Dijkstra").unwrap();
        loop {
            let answer = engine.current_question().unwrap().answer;
            engine.submit_answer(Some(answer)).unwrap();
            if let QuizAdvance::Completed(result) = engine.next_question().unwrap() {
                assert_eq!(result.score, 100.0);
                break;
            }
        }
        let recorded = engine.sink().progress(&user).unwrap();
        assert_eq!(recorded.score("Dijkstra"), Some(100.0));
    }
}
