//! Learning session: run an algorithm, quiz on it, record, move on.

use std::io::Write;
use std::time::Instant;

use algoviz_player::{Recorder, RenderObserver, RunOutcome, Sequencer, SequencerHandle};
use algoviz_quiz::{
    AnswerFeedback, AnswerOption, ProgressSink, QuestionBanks, QuizAdvance, QuizEngine,
    QuizError, QuizQuestion, QuizResult, QuizState,
};
use algoviz_steps::{Algorithm, AlgorithmInput, Category};
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::console::ConsoleObserver;
use crate::error::{Result, SessionError};

/// Prompts per question before giving up on an answerer that never selects.
pub const MAX_PROMPTS: usize = 3;

/// A render observer that wants to know what is about to run.
pub trait SessionObserver: RenderObserver {
    fn on_run_start(&mut self, _algorithm: Algorithm, _input: &AlgorithmInput) {}
}

impl SessionObserver for Recorder {}

impl<W: Write + Send> SessionObserver for ConsoleObserver<W> {
    fn on_run_start(&mut self, algorithm: Algorithm, input: &AlgorithmInput) {
        if algorithm.category() == Category::Sorting {
            self.with_array(input.array.clone());
        } else {
            self.clear_array();
        }
    }
}

/// Picks answers for quiz questions.
pub trait Answerer {
    /// `None` means submit without a selection.
    fn answer(&mut self, question: &QuizQuestion) -> Option<AnswerOption>;

    fn reveal(&mut self, _feedback: &AnswerFeedback) {}
}

impl<F> Answerer for F
where
    F: FnMut(&QuizQuestion) -> Option<AnswerOption>,
{
    fn answer(&mut self, question: &QuizQuestion) -> Option<AnswerOption> {
        self(question)
    }
}

/// One algorithm's run and, if the run completed, its quiz.
#[derive(Debug, Clone)]
pub struct Lesson {
    pub algorithm: Algorithm,
    pub outcome: RunOutcome,
    pub result: Option<QuizResult>,
}

/// Drives one learner through algorithms and their quizzes.
///
/// Holds a single current-algorithm token. Runs and quizzes use it;
/// [`return_to_menu`](Self::return_to_menu) clears it.
pub struct LearningSession<O: SessionObserver, S: ProgressSink> {
    config: SessionConfig,
    sequencer: Sequencer<O>,
    quiz: QuizEngine<S>,
    current: Option<Algorithm>,
}

impl<O: SessionObserver, S: ProgressSink> LearningSession<O, S> {
    pub fn new(config: SessionConfig, observer: O, banks: QuestionBanks, sink: S) -> Self {
        Self {
            config,
            sequencer: Sequencer::new(observer),
            quiz: QuizEngine::new(banks, sink),
            current: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_algorithm(&self) -> Option<Algorithm> {
        self.current
    }

    /// Control handle for the sequencer, usable from other tasks.
    pub fn handle(&self) -> SequencerHandle {
        self.sequencer.handle()
    }

    pub fn observer(&self) -> &O {
        self.sequencer.observer()
    }

    pub fn observer_mut(&mut self) -> &mut O {
        self.sequencer.observer_mut()
    }

    pub fn quiz(&self) -> &QuizEngine<S> {
        &self.quiz
    }

    pub fn quiz_mut(&mut self) -> &mut QuizEngine<S> {
        &mut self.quiz
    }

    /// Make `algorithm` the current one.
    pub fn select(&mut self, algorithm: Algorithm) {
        info!(%algorithm, "Algorithm selected");
        self.current = Some(algorithm);
    }

    /// Stop any run and forget the current algorithm.
    pub fn return_to_menu(&mut self) {
        self.sequencer.cancel();
        self.sequencer.reset();
        if let Some(algorithm) = self.current.take() {
            info!(%algorithm, "Returned to menu");
        }
    }

    /// Visualize the current algorithm with the configured input and pace.
    ///
    /// The sequencer is reset afterwards, so the next run can start.
    pub async fn run_current(&mut self) -> Result<RunOutcome> {
        let algorithm = self.current.ok_or(SessionError::NoAlgorithmSelected)?;
        let input = self.config.algorithm_input();
        let generator = algorithm.generator(&input)?;
        self.sequencer.observer_mut().on_run_start(algorithm, &input);
        let outcome = self
            .sequencer
            .start(generator, self.config.step_delay())
            .await?;
        self.sequencer.reset();
        Ok(outcome)
    }

    /// Quiz on the current algorithm until its last question.
    ///
    /// The quiz timer counts the time spent waiting on the answerer.
    pub fn take_quiz(&mut self, answerer: &mut impl Answerer) -> Result<QuizResult> {
        let algorithm = self.current.ok_or(SessionError::NoAlgorithmSelected)?;
        self.quiz.start_quiz(algorithm.key())?;

        loop {
            let started = Instant::now();
            let feedback = self.answer_current(answerer)?;
            answerer.reveal(&feedback);
            self.quiz.tick(started.elapsed());

            if let QuizAdvance::Completed(result) = self.quiz.next_question()? {
                return Ok(result);
            }
        }
    }

    fn answer_current(&mut self, answerer: &mut impl Answerer) -> Result<AnswerFeedback> {
        for _ in 0..MAX_PROMPTS {
            let Some(question) = self.quiz.current_question() else {
                return Err(QuizError::InvalidState {
                    expected: QuizState::InProgress,
                    actual: self.quiz.state(),
                }
                .into());
            };
            let selected = answerer.answer(question);
            match self.quiz.submit_answer(selected) {
                Ok(feedback) => return Ok(feedback),
                Err(QuizError::NoSelection) => warn!("No option selected!"),
                Err(e) => return Err(e.into()),
            }
        }
        Err(SessionError::NoAnswer(MAX_PROMPTS))
    }

    /// Advance to the next algorithm of the current category.
    ///
    /// At the end of the category the token is cleared and `None` returned.
    pub fn next_algorithm(&mut self) -> Option<Algorithm> {
        let current = self.current?;
        match current.next_in_category() {
            Some(next) => {
                self.select(next);
                Some(next)
            }
            None => {
                info!(category = %current.category(), "All algorithms in category completed");
                self.current = None;
                None
            }
        }
    }

    /// Run the current algorithm, then quiz on it if the run completed.
    pub async fn run_lesson(&mut self, answerer: &mut impl Answerer) -> Result<Lesson> {
        let algorithm = self.current.ok_or(SessionError::NoAlgorithmSelected)?;
        let outcome = self.run_current().await?;
        let result = if outcome.is_completed() {
            Some(self.take_quiz(answerer)?)
        } else {
            None
        };
        Ok(Lesson {
            algorithm,
            outcome,
            result,
        })
    }

    /// Every algorithm of `category` in order, stopping early on a cancelled
    /// run.
    pub async fn tour(
        &mut self,
        category: Category,
        answerer: &mut impl Answerer,
    ) -> Result<Vec<Lesson>> {
        let Some(&first) = category.sequence().first() else {
            return Ok(Vec::new());
        };
        self.select(first);
        let mut lessons = Vec::new();
        loop {
            let lesson = self.run_lesson(answerer).await?;
            let cancelled = !lesson.outcome.is_completed();
            lessons.push(lesson);
            if cancelled || self.next_algorithm().is_none() {
                break;
            }
        }
        Ok(lessons)
    }

    /// Tear down, handing back the observer and progress sink.
    pub fn into_parts(self) -> (O, S) {
        (self.sequencer.into_observer(), self.quiz.into_sink())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_player::PlayerState;
    use algoviz_quiz::{InMemoryProgress, UserId};
    use std::time::Duration;

    fn session() -> LearningSession<Recorder, InMemoryProgress> {
        let config = SessionConfig::default()
            .with_bar_count(6)
            .with_base_delay(Duration::from_millis(10));
        let mut progress = InMemoryProgress::new();
        progress.sign_in(UserId::from("learner"));
        LearningSession::new(
            config,
            Recorder::new(),
            QuestionBanks::builtin().unwrap(),
            progress,
        )
    }

    fn always_right(question: &QuizQuestion) -> Option<AnswerOption> {
        Some(question.answer)
    }

    #[tokio::test(start_paused = true)]
    async fn run_requires_selection() {
        let mut session = session();
        assert!(matches!(
            session.run_current().await,
            Err(SessionError::NoAlgorithmSelected)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn lesson_runs_then_records_quiz() {
        let mut session = session();
        session.select(Algorithm::InsertNode);
        let lesson = session.run_lesson(&mut always_right).await.unwrap();
        assert!(lesson.outcome.is_completed());
        assert_eq!(lesson.result.unwrap().score, 100.0);
        assert_eq!(session.handle().state(), PlayerState::Idle);

        let (recorder, progress) = session.into_parts();
        assert_eq!(recorder.completions(), 1);
        let recorded = progress.progress(&UserId::from("learner")).unwrap();
        assert_eq!(recorded.tree_operation_progress.get("InsertNode"), Some(&100.0));
    }

    #[tokio::test(start_paused = true)]
    async fn tour_walks_whole_category() {
        let mut session = session();
        let lessons = session
            .tour(Category::Graph, &mut always_right)
            .await
            .unwrap();
        let order: Vec<_> = lessons.iter().map(|l| l.algorithm).collect();
        assert_eq!(order, Category::Graph.sequence());
        assert!(lessons.iter().all(|l| l.result.is_some()));
        assert_eq!(session.current_algorithm(), None);

        let (_, progress) = session.into_parts();
        let recorded = progress.progress(&UserId::from("learner")).unwrap();
        assert_eq!(recorded.algorithm_progress.len(), 5);
        assert_eq!(recorded.recent_activity.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn next_algorithm_follows_category_order() {
        let mut session = session();
        session.select(Algorithm::MergeSort);
        assert_eq!(session.next_algorithm(), Some(Algorithm::HeapSort));
        assert_eq!(session.current_algorithm(), Some(Algorithm::HeapSort));
        assert_eq!(session.next_algorithm(), None);
        assert_eq!(session.current_algorithm(), None);
        assert_eq!(session.next_algorithm(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_run_skips_quiz() {
        let mut session = session();
        session.select(Algorithm::BubbleSort);
        let handle = session.handle();
        let mut answer = always_right;
        let (lesson, _) = tokio::join!(session.run_lesson(&mut answer), async {
            tokio::time::sleep(Duration::from_millis(25)).await;
            handle.cancel();
        });
        let lesson = lesson.unwrap();
        assert_eq!(lesson.outcome, RunOutcome::Cancelled { delivered: 2 });
        assert!(lesson.result.is_none());
        assert_eq!(session.handle().state(), PlayerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn return_to_menu_clears_token() {
        let mut session = session();
        session.select(Algorithm::Dfs);
        session.return_to_menu();
        assert_eq!(session.current_algorithm(), None);
        assert!(matches!(
            session.take_quiz(&mut always_right),
            Err(SessionError::NoAlgorithmSelected)
        ));
    }

    #[test]
    fn silent_answerer_gives_up() {
        let mut session = session();
        session.select(Algorithm::QuickSort);
        let mut prompts = 0;
        let mut silent = |_: &QuizQuestion| -> Option<AnswerOption> {
            prompts += 1;
            None
        };
        assert!(matches!(
            session.take_quiz(&mut silent),
            Err(SessionError::NoAnswer(MAX_PROMPTS))
        ));
        assert_eq!(prompts, MAX_PROMPTS);
    }
}
