//! The transport loop: playback state, step cursor and the per-tick work.

use std::time::Duration;

use super::draw::DrawQueue;
use super::schedule::{RepeatingHandle, Scheduler, TaskId};
use crate::audio::output::AudioOutput;
use crate::audio::registry::SoundRegistry;
use crate::model::pattern::StepIndex;
use crate::model::store::PatternStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Running,
}

/// The step loop. While running it owns one repeating task whose firings are
/// the ticks; each tick plays the active tracks at the current step and
/// moves the cursor on.
pub struct Transport {
    state: PlaybackState,
    cursor: StepIndex,
    task: Option<RepeatingHandle>,
}

impl Transport {
    pub fn new() -> Self {
        Self { state: PlaybackState::Stopped, cursor: StepIndex::ZERO, task: None }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    pub fn cursor(&self) -> StepIndex {
        self.cursor
    }

    pub fn owns(&self, task: TaskId) -> bool {
        self.task.as_ref().is_some_and(|h| h.id() == task)
    }

    /// Begins ticking at `first_at`, one tick per `interval`, from step 0.
    /// Does nothing when already running.
    pub fn start(&mut self, scheduler: &mut Scheduler, first_at: Duration, interval: Duration) {
        if self.is_running() {
            return;
        }
        self.cursor = StepIndex::ZERO;
        self.task = Some(scheduler.schedule_repeating(first_at, interval));
        self.state = PlaybackState::Running;
    }

    /// Cancels the loop task and rewinds. Voices already handed to the output
    /// are left to finish on their own.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.state = PlaybackState::Stopped;
        self.cursor = StepIndex::ZERO;
    }

    pub fn rewind(&mut self) {
        self.cursor = StepIndex::ZERO;
    }

    /// New tick period, effective from the next tick boundary.
    pub fn retime(&self, scheduler: &mut Scheduler, interval: Duration) {
        if let Some(task) = &self.task {
            scheduler.set_interval(task.id(), interval);
        }
    }

    /// Plays one tick scheduled at `at`. Every track hit at the cursor gets
    /// the same time. Returns the step that was played.
    pub fn tick(
        &mut self,
        at: Duration,
        store: &PatternStore,
        registry: &mut SoundRegistry,
        output: &mut dyn AudioOutput,
        draw: &mut DrawQueue,
    ) -> StepIndex {
        let step = self.cursor;
        for track in store.pattern().active_at(step) {
            registry.trigger(track, at, output);
        }
        draw.schedule(at, step);
        self.cursor = step.next();
        step
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::output::RecordingOutput;
    use crate::model::kit::KitConfig;
    use crate::model::track::TrackId;

    fn rig() -> (Transport, Scheduler, PatternStore, SoundRegistry, RecordingOutput, DrawQueue) {
        let mut out = RecordingOutput::new();
        out.activate().unwrap();
        (
            Transport::new(),
            Scheduler::new(),
            PatternStore::default(),
            SoundRegistry::new(&KitConfig::default(), Duration::from_millis(125)),
            out,
            DrawQueue::new(),
        )
    }

    #[test]
    fn tick_plays_active_tracks_and_advances() {
        let (mut tr, mut sched, mut store, mut reg, mut out, mut draw) = rig();
        store.toggle_step(TrackId::Tone, StepIndex::ZERO);
        store.toggle_step(TrackId::NoiseBrown, StepIndex::ZERO);
        tr.start(&mut sched, Duration::ZERO, Duration::from_millis(125));

        let played = tr.tick(Duration::from_millis(7), &store, &mut reg, &mut out, &mut draw);

        assert_eq!(played, StepIndex::ZERO);
        assert_eq!(tr.cursor(), StepIndex::new(1).unwrap());
        assert_eq!(out.started().len(), 2);
        assert!(out.started().iter().all(|v| v.at == Duration::from_millis(7)));
        assert_eq!(draw.pending(), 1);
    }

    #[test]
    fn cursor_wraps_after_sixteen_ticks() {
        let (mut tr, mut sched, store, mut reg, mut out, mut draw) = rig();
        tr.start(&mut sched, Duration::ZERO, Duration::from_millis(125));
        for i in 0..16u64 {
            tr.tick(Duration::from_millis(125 * i), &store, &mut reg, &mut out, &mut draw);
        }
        assert_eq!(tr.cursor(), StepIndex::ZERO);
    }

    #[test]
    fn stop_cancels_the_task_and_rewinds() {
        let (mut tr, mut sched, store, mut reg, mut out, mut draw) = rig();
        tr.start(&mut sched, Duration::ZERO, Duration::from_millis(125));
        let task = sched.next_due(Duration::ZERO).unwrap().task;
        assert!(tr.owns(task));
        tr.tick(Duration::ZERO, &store, &mut reg, &mut out, &mut draw);

        tr.stop();

        assert_eq!(tr.state(), PlaybackState::Stopped);
        assert_eq!(tr.cursor(), StepIndex::ZERO);
        assert!(!tr.owns(task));
        assert_eq!(sched.pending(), 0);
        assert!(sched.next_due(Duration::from_secs(60)).is_none());
    }

    #[test]
    fn start_while_running_keeps_the_same_task() {
        let (mut tr, mut sched, ..) = rig();
        tr.start(&mut sched, Duration::ZERO, Duration::from_millis(125));
        tr.start(&mut sched, Duration::from_secs(1), Duration::from_millis(50));
        assert_eq!(sched.pending(), 1);
    }
}
