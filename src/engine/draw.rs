//! Step highlighting, kept off the audio path.
//!
//! The transport posts `(time, step)` as it schedules each tick; the renderer
//! drains whatever has come due on its own frame boundary. A slow frame only
//! delays the highlight, never a tick.

use std::collections::VecDeque;
use std::time::Duration;

use crate::model::pattern::StepIndex;

#[derive(Debug, Default)]
pub struct DrawQueue {
    pending: VecDeque<(Duration, StepIndex)>,
    shown: StepIndex,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Duration, step: StepIndex) {
        self.pending.push_back((at, step));
    }

    /// Consumes entries due by `now` and returns the step to display.
    pub fn drain_due(&mut self, now: Duration) -> StepIndex {
        while let Some(&(at, step)) = self.pending.front() {
            if at > now {
                break;
            }
            self.shown = step;
            self.pending.pop_front();
        }
        self.shown
    }

    pub fn shown(&self) -> StepIndex {
        self.shown
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drops queued entries and shows step 0.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.shown = StepIndex::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(i: usize) -> StepIndex {
        StepIndex::new(i).unwrap()
    }

    #[test]
    fn shows_latest_due_step_only() {
        let mut q = DrawQueue::new();
        q.schedule(Duration::from_millis(0), step(0));
        q.schedule(Duration::from_millis(100), step(1));
        q.schedule(Duration::from_millis(200), step(2));

        assert_eq!(q.drain_due(Duration::from_millis(150)), step(1));
        assert_eq!(q.pending(), 1);
        assert_eq!(q.drain_due(Duration::from_millis(160)), step(1));
        assert_eq!(q.drain_due(Duration::from_millis(200)), step(2));
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn clear_resets_to_first_step() {
        let mut q = DrawQueue::new();
        q.schedule(Duration::ZERO, step(7));
        q.drain_due(Duration::ZERO);
        q.schedule(Duration::from_secs(1), step(8));
        q.clear();
        assert_eq!(q.shown(), StepIndex::ZERO);
        assert_eq!(q.drain_due(Duration::from_secs(5)), StepIndex::ZERO);
    }
}
