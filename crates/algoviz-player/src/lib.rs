//! AlgoViz Player
//!
//! Paces step events from a generator into a render observer.
//!
//! # Architecture
//!
//! - **Sequencer**: one run at a time, with a cooperative delay before each event
//! - **Handle**: pause, resume, cancel and reset from any task
//! - **Observers**: a [`Recorder`] for timelines and tests, a [`TracingObserver`] for logs
//! - **Speed**: [`PlaybackSpeed`] multipliers over a base delay
//!
//! # Usage
//!
//! ```ignore
//! let mut sequencer = Sequencer::new(Recorder::new());
//! let generator = Algorithm::QuickSort.generator(&AlgorithmInput::default())?;
//! let outcome = sequencer.start(generator, PlaybackSpeed::Double.delay(base)).await?;
//! ```

mod error;
mod observer;
mod sequencer;
mod speed;
mod state;

pub use error::{PlayerError, Result};
pub use observer::{Recorder, RenderObserver, TimedEvent, TracingObserver};
pub use sequencer::{RunOutcome, Sequencer, SequencerHandle, SequencerStatus};
pub use speed::PlaybackSpeed;
pub use state::PlayerState;

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_steps::{AlgorithmInput, ArrayState, Category};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn recorded_sort_replays_to_sorted() {
        let input = AlgorithmInput::default().with_random_bars(8, 11);
        let mut sequencer = Sequencer::new(Recorder::new());
        for &algorithm in Category::Sorting.sequence() {
            let generator = algorithm.generator(&input).unwrap();
            let delay = PlaybackSpeed::TenX.delay(Duration::from_secs(1));
            let outcome = sequencer.start(generator, delay).await.unwrap();
            assert!(outcome.is_completed());

            let events = sequencer.observer_mut().take_events();
            let mut state: ArrayState = input.array.clone();
            state.replay(&events).unwrap();
            assert!(state.is_sorted(), "{algorithm}");
            assert!(sequencer.reset());
        }
    }
}
