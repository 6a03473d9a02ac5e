//! Deferred tasks keyed to elapsed time
//!
//! Nothing runs on its own: the owner advances the clock once per tick and
//! receives the payloads that came due, in due order. Tasks carry an owner so
//! everything an object scheduled can be cancelled when it goes away.

use std::fmt;
use std::time::Duration;

/// Handle for cancelling a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct ScheduledTask<O, T> {
    id: TaskId,
    owner: O,
    due: Duration,
    payload: T,
}

/// Timer queue of owned, cancellable payloads
#[derive(Debug, Clone)]
pub struct Scheduler<O, T> {
    now: Duration,
    next_id: u64,
    tasks: Vec<ScheduledTask<O, T>>,
}

impl<O, T> Default for Scheduler<O, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, T> Scheduler<O, T> {
    /// Empty queue at time zero
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// Elapsed time since creation
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Queue `payload` to come due after `delay`
    ///
    /// A zero delay comes due on the next [`Scheduler::advance`], even when
    /// that advance is itself zero.
    pub fn schedule(&mut self, owner: O, delay: Duration, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            id,
            owner,
            due: self.now.saturating_add(delay),
            payload,
        });
        id
    }

    /// Cancel one task; returns whether it was still pending
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    /// Cancel everything; returns how many tasks were dropped
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.tasks.len();
        self.tasks.clear();
        dropped
    }

    /// Earliest due time among pending tasks
    pub fn next_due(&self) -> Option<Duration> {
        self.tasks.iter().map(|task| task.due).min()
    }

    /// Move the clock forward and return the payloads that came due
    ///
    /// Payloads are ordered by due time, then by scheduling order.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|task| task.due <= now);
        self.tasks = pending;

        due.sort_by_key(|task| (task.due, task.id));
        due.into_iter().map(|task| task.payload).collect()
    }
}

impl<O: PartialEq, T> Scheduler<O, T> {
    /// Cancel every task scheduled by `owner`
    pub fn cancel_owner(&mut self, owner: &O) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.owner != *owner);
        before - self.tasks.len()
    }

    /// Whether `owner` has anything pending
    pub fn has_pending(&self, owner: &O) -> bool {
        self.tasks.iter().any(|task| task.owner == *owner)
    }
}
