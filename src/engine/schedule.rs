//! A single-threaded scheduler of repeating tasks.
//!
//! The host loop asks for firings up to a time horizon; each task fires at
//! `first_at`, `first_at + interval`, ... until its handle is cancelled.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Handle to a repeating task. Cancelling is idempotent, and a cancelled
/// task never fires again.
#[derive(Debug, Clone)]
pub struct RepeatingHandle {
    id: TaskId,
    live: Rc<Cell<bool>>,
}

impl RepeatingHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancel(&self) {
        self.live.set(false);
    }

    pub fn is_cancelled(&self) -> bool {
        !self.live.get()
    }
}

/// One due firing of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub task: TaskId,
    pub at: Duration,
}

struct Task {
    id: TaskId,
    next_at: Duration,
    interval: Duration,
    live: Rc<Cell<bool>>,
}

#[derive(Default)]
pub struct Scheduler {
    next_id: u64,
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_repeating(&mut self, first_at: Duration, interval: Duration) -> RepeatingHandle {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let live = Rc::new(Cell::new(true));
        self.tasks.push(Task {
            id,
            next_at: first_at,
            interval: interval.max(Duration::from_nanos(1)),
            live: Rc::clone(&live),
        });
        RepeatingHandle { id, live }
    }

    /// Changes a task's period. The firing already scheduled keeps its time;
    /// the new interval applies from there on.
    pub fn set_interval(&mut self, task: TaskId, interval: Duration) {
        if let Some(t) = self.tasks.iter_mut().find(|t| t.id == task) {
            t.interval = interval.max(Duration::from_nanos(1));
        }
    }

    /// Earliest firing at or before `horizon`, advancing that task past it.
    /// Cancelled tasks are dropped first.
    pub fn next_due(&mut self, horizon: Duration) -> Option<Firing> {
        self.tasks.retain(|t| t.live.get());
        let task = self
            .tasks
            .iter_mut()
            .filter(|t| t.next_at <= horizon)
            .min_by_key(|t| t.next_at)?;
        let firing = Firing { task: task.id, at: task.next_at };
        task.next_at += task.interval;
        Some(firing)
    }

    /// When the given task fires next, if it is still scheduled.
    pub fn next_at(&self, task: TaskId) -> Option<Duration> {
        self.tasks.iter().find(|t| t.id == task && t.live.get()).map(|t| t.next_at)
    }

    /// Number of tasks that have not been cancelled.
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|t| t.live.get()).count()
    }
}
