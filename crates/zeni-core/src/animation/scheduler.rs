//! Deterministic timer queue

use std::time::{Duration, Instant};

/// Handle to a scheduled task, usable for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Scheduled<T> {
    id: TaskId,
    due: Instant,
    task: T,
}

/// Queue of tasks keyed by due time.
///
/// Nothing runs on its own. The owner calls [`take_due`](Self::take_due)
/// with the current instant and executes what comes back, which keeps every
/// timer observable from tests without sleeping.
#[derive(Debug)]
pub struct AnimationScheduler<T> {
    next_id: u64,
    queue: Vec<Scheduled<T>>,
}

impl<T> Default for AnimationScheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            queue: Vec::new(),
        }
    }
}

impl<T> AnimationScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, due: Instant, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.push(Scheduled { id, due, task });
        id
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration, task: T) -> TaskId {
        self.schedule_at(now + delay, task)
    }

    /// Returns false if the task already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|s| s.id != id);
        self.queue.len() != before
    }

    /// Cancel every task matching `pred`, returning how many were dropped.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|s| !pred(&s.task));
        before - self.queue.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    /// Remove and return every task due at or before `now`.
    ///
    /// Ordered by due time, then by scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|s| s.due <= now);
        self.queue = pending;
        due.sort_by_key(|s| (s.due, s.id));
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.queue.iter().map(|s| s.due).min()
    }

    pub fn contains(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.queue.iter().any(|s| pred(&s.task))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
