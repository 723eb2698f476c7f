//! Render observers: whatever consumes delivered step events.

use std::time::Duration;

use algoviz_steps::StepEvent;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

/// Receives events from a sequencer, in order, one at a time.
///
/// Calls are synchronous: the sequencer does not pull the next event until
/// `on_step_event` returns.
pub trait RenderObserver: Send {
    fn on_step_event(&mut self, event: &StepEvent);

    /// The generator ran out. Not called for cancelled runs.
    fn on_complete(&mut self) {}
}

impl<O: RenderObserver + ?Sized> RenderObserver for Box<O> {
    fn on_step_event(&mut self, event: &StepEvent) {
        (**self).on_step_event(event);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }
}

impl<O: RenderObserver + ?Sized> RenderObserver for &mut O {
    fn on_step_event(&mut self, event: &StepEvent) {
        (**self).on_step_event(event);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }
}

/// Fan out to two observers, first then second.
impl<A: RenderObserver, B: RenderObserver> RenderObserver for (A, B) {
    fn on_step_event(&mut self, event: &StepEvent) {
        self.0.on_step_event(event);
        self.1.on_step_event(event);
    }

    fn on_complete(&mut self) {
        self.0.on_complete();
        self.1.on_complete();
    }
}

/// A delivered event and when it arrived, relative to the first delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at: Duration,
    pub event: StepEvent,
}

/// Keeps the delivered timeline.
#[derive(Debug, Default)]
pub struct Recorder {
    timeline: Vec<TimedEvent>,
    first: Option<Instant>,
    completions: usize,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered events with their arrival offsets.
    pub fn timeline(&self) -> &[TimedEvent] {
        &self.timeline
    }

    /// Delivered events, in order.
    pub fn events(&self) -> impl Iterator<Item = &StepEvent> + '_ {
        self.timeline.iter().map(|timed| &timed.event)
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// How many runs reached `on_complete`.
    pub fn completions(&self) -> usize {
        self.completions
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.timeline.clear();
        self.first = None;
        self.completions = 0;
    }

    /// Take the recorded events, leaving the recorder empty.
    pub fn take_events(&mut self) -> Vec<StepEvent> {
        self.first = None;
        self.timeline.drain(..).map(|timed| timed.event).collect()
    }
}

impl RenderObserver for Recorder {
    fn on_step_event(&mut self, event: &StepEvent) {
        let now = Instant::now();
        let first = *self.first.get_or_insert(now);
        self.timeline.push(TimedEvent {
            at: now.duration_since(first),
            event: event.clone(),
        });
    }

    fn on_complete(&mut self) {
        self.completions += 1;
    }
}

/// Logs narration at `info` and every other event at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RenderObserver for TracingObserver {
    fn on_step_event(&mut self, event: &StepEvent) {
        match event.text() {
            Some(text) => info!(target: "algoviz::narration", "{text}"),
            None => debug!(target: "algoviz::steps", kind = event.kind(), ?event, "Step"),
        }
    }

    fn on_complete(&mut self) {
        info!(target: "algoviz::narration", "Visualization complete");
    }
}
