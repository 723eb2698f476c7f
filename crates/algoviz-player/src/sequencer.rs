//! Step sequencer: paces a generator's events into an observer.
//!
//! A run waits `delay` before each event, then hands it to the observer
//! synchronously. Control (pause, resume, cancel, reset) goes through a
//! shared state cell, so any task holding a [`SequencerHandle`] can steer
//! the run. Time spent paused does not count toward the delay, and a
//! cancel is observed at the next wait.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use algoviz_steps::{Algorithm, StepGenerator};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{PlayerError, Result};
use crate::observer::RenderObserver;
use crate::state::PlayerState;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every event was delivered.
    Completed { delivered: usize },
    /// Stopped early. Events already delivered are not rolled back.
    Cancelled { delivered: usize },
}

impl RunOutcome {
    pub fn delivered(&self) -> usize {
        match *self {
            RunOutcome::Completed { delivered } | RunOutcome::Cancelled { delivered } => delivered,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// Sequencer snapshot for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerStatus {
    pub state: PlayerState,
    pub delivered: usize,
}

impl From<&SequencerHandle> for SequencerStatus {
    fn from(handle: &SequencerHandle) -> Self {
        Self {
            state: handle.state(),
            delivered: handle.delivered(),
        }
    }
}

/// Cloneable control surface for a [`Sequencer`].
#[derive(Debug, Clone)]
pub struct SequencerHandle {
    control: Arc<watch::Sender<PlayerState>>,
    delivered: Arc<AtomicUsize>,
}

impl SequencerHandle {
    fn new() -> Self {
        let (control, _) = watch::channel(PlayerState::Idle);
        Self {
            control: Arc::new(control),
            delivered: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn state(&self) -> PlayerState {
        *self.control.borrow()
    }

    /// Events delivered by the current or last run.
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Acquire)
    }

    pub fn status(&self) -> SequencerStatus {
        self.into()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<PlayerState> {
        self.control.subscribe()
    }

    /// `Running -> Paused`. Returns whether the state changed.
    pub fn pause(&self) -> bool {
        self.transition(|state| (state == PlayerState::Running).then_some(PlayerState::Paused))
    }

    /// `Paused -> Running`. Returns whether the state changed.
    pub fn resume(&self) -> bool {
        self.transition(|state| (state == PlayerState::Paused).then_some(PlayerState::Running))
    }

    /// `Running | Paused -> Cancelled`. Returns whether the state changed.
    ///
    /// Has no effect once a run has ended: a `Completed` run stays
    /// `Completed` and only [`reset`](Self::reset) leaves it.
    pub fn cancel(&self) -> bool {
        self.transition(|state| state.is_active().then_some(PlayerState::Cancelled))
    }

    /// `Completed | Cancelled -> Idle`, clearing the delivered count.
    pub fn reset(&self) -> bool {
        let reset =
            self.transition(|state| state.is_finished().then_some(PlayerState::Idle));
        if reset {
            self.delivered.store(0, Ordering::Release);
        }
        reset
    }

    /// Wait until the current run, if any, has ended.
    pub async fn finished(&self) -> PlayerState {
        let mut rx = self.subscribe();
        loop {
            let state = *rx.borrow_and_update();
            if !state.is_active() {
                return state;
            }
            if rx.changed().await.is_err() {
                return state;
            }
        }
    }

    fn transition(&self, next: impl FnOnce(PlayerState) -> Option<PlayerState>) -> bool {
        let changed = self.control.send_if_modified(|state| match next(*state) {
            Some(new_state) => {
                *state = new_state;
                true
            }
            None => false,
        });
        if changed {
            debug!(state = %self.state(), "Sequencer state changed");
        }
        changed
    }
}

/// Drives one generator at a time into an owned observer.
#[derive(Debug)]
pub struct Sequencer<O> {
    observer: O,
    handle: SequencerHandle,
}

impl<O: RenderObserver> Sequencer<O> {
    pub fn new(observer: O) -> Self {
        Self {
            observer,
            handle: SequencerHandle::new(),
        }
    }

    /// A control handle usable from other tasks.
    pub fn handle(&self) -> SequencerHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> PlayerState {
        self.handle.state()
    }

    pub fn status(&self) -> SequencerStatus {
        self.handle.status()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    pub fn pause(&self) -> bool {
        self.handle.pause()
    }

    pub fn resume(&self) -> bool {
        self.handle.resume()
    }

    pub fn cancel(&self) -> bool {
        self.handle.cancel()
    }

    pub fn reset(&self) -> bool {
        self.handle.reset()
    }

    /// Run `generator` to completion or cancellation.
    ///
    /// Fails with `AlreadyRunning` unless the sequencer is `Idle`.
    pub async fn start<G>(&mut self, mut generator: G, delay: Duration) -> Result<RunOutcome>
    where
        G: StepGenerator,
    {
        let accepted = self.handle.transition(|state| {
            (state == PlayerState::Idle).then_some(PlayerState::Running)
        });
        if !accepted {
            return Err(PlayerError::AlreadyRunning(self.state()));
        }
        self.handle.delivered.store(0, Ordering::Release);

        let algorithm = generator.algorithm();
        info!(%algorithm, ?delay, "Run started");
        let mut control = self.handle.subscribe();
        let mut delivered = 0;

        while let Some(event) = generator.next() {
            if !wait_running(&mut control, delay).await {
                return Ok(self.cancelled(algorithm, delivered));
            }
            debug!(kind = event.kind(), index = delivered, "Step delivered");
            self.observer.on_step_event(&event);
            delivered += 1;
            self.handle.delivered.store(delivered, Ordering::Release);
        }

        let completed = self.handle.transition(|state| {
            state.is_active().then_some(PlayerState::Completed)
        });
        if !completed {
            return Ok(self.cancelled(algorithm, delivered));
        }
        self.observer.on_complete();
        info!(%algorithm, delivered, "Run completed");
        Ok(RunOutcome::Completed { delivered })
    }

    fn cancelled(&self, algorithm: Algorithm, delivered: usize) -> RunOutcome {
        info!(%algorithm, delivered, "Run cancelled");
        RunOutcome::Cancelled { delivered }
    }
}

/// Wait out `delay` of running time.
///
/// Returns `false` once the run has been cancelled (or reset underneath us).
async fn wait_running(control: &mut watch::Receiver<PlayerState>, delay: Duration) -> bool {
    let mut remaining = delay;
    loop {
        let state = *control.borrow_and_update();
        match state {
            PlayerState::Running if remaining.is_zero() => {
                // Still a suspension point, so cancels from other tasks land.
                tokio::task::yield_now().await;
                if *control.borrow() == PlayerState::Running {
                    return true;
                }
            }
            PlayerState::Running => {
                let started = Instant::now();
                tokio::select! {
                    _ = tokio::time::sleep(remaining) => {
                        remaining = Duration::ZERO;
                        if *control.borrow() == PlayerState::Running {
                            return true;
                        }
                    }
                    changed = control.changed() => {
                        if changed.is_err() {
                            return false;
                        }
                        remaining = remaining.saturating_sub(started.elapsed());
                    }
                }
            }
            PlayerState::Paused => {
                if control.changed().await.is_err() {
                    return false;
                }
            }
            PlayerState::Idle | PlayerState::Completed | PlayerState::Cancelled => return false,
        }
    }
}
