//! Lazy, restartable step generators.
//!
//! Every algorithm is written as a [`StepMachine`]: an explicit state
//! machine that advances by one small unit of work per call and pushes the
//! events that unit produced. [`Steps`] wraps a machine into an iterator,
//! buffering those events and handing them out one at a time.

use std::collections::VecDeque;

use crate::catalog::Algorithm;
use crate::event::StepEvent;

/// A lazy sequence of step events for one algorithm run.
pub trait StepGenerator: Iterator<Item = StepEvent> + Send {
    /// Which algorithm this generator runs.
    fn algorithm(&self) -> Algorithm;

    /// Rewind to the initial state so the same sequence is produced again.
    fn restart(&mut self);
}

impl<G: StepGenerator + ?Sized> StepGenerator for Box<G> {
    fn algorithm(&self) -> Algorithm {
        (**self).algorithm()
    }

    fn restart(&mut self) {
        (**self).restart();
    }
}

/// Boxed generator, as handed out by the catalog.
pub type BoxedGenerator = Box<dyn StepGenerator>;

/// An algorithm expressed as an explicit state machine.
pub trait StepMachine: Clone + Send {
    fn algorithm(&self) -> Algorithm;

    /// Do one unit of work, pushing any events onto `out`.
    ///
    /// Returns `false` once the machine has nothing left to do. A call that
    /// returns `true` may push no events.
    fn advance(&mut self, out: &mut VecDeque<StepEvent>) -> bool;
}

/// Iterator adapter over a [`StepMachine`].
#[derive(Debug, Clone)]
pub struct Steps<M> {
    initial: M,
    machine: M,
    pending: VecDeque<StepEvent>,
    finished: bool,
}

impl<M: StepMachine> Steps<M> {
    pub fn new(machine: M) -> Self {
        Self {
            initial: machine.clone(),
            machine,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// The machine in its current state.
    pub fn machine(&self) -> &M {
        &self.machine
    }
}

impl<M: StepMachine> Iterator for Steps<M> {
    type Item = StepEvent;

    fn next(&mut self) -> Option<StepEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.finished {
                return None;
            }
            if !self.machine.advance(&mut self.pending) {
                self.finished = true;
            }
        }
    }
}

impl<M: StepMachine> StepGenerator for Steps<M> {
    fn algorithm(&self) -> Algorithm {
        self.machine.algorithm()
    }

    fn restart(&mut self) {
        self.machine = self.initial.clone();
        self.pending.clear();
        self.finished = false;
    }
}
