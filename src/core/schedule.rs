//! Scheduled-task abstraction
//!
//! Deferred work (notification expiry, the retention sweep) goes through
//! an explicit scheduler instead of ambient timers. The composition root
//! drains due tasks and feeds them back to the owning engine, so the
//! whole timing story stays on one logical thread.

use std::sync::Arc;

use uuid::Uuid;

use crate::core::time::Clock;

/// Work deferred to a later point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    /// Auto-expire a notification. Harmless if it was already removed.
    ExpireNotification(Uuid),
    /// Purge notifications older than the retention window.
    RetentionSweep,
}

/// Handle for best-effort cancellation of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// One-shot deferral of a task
///
/// Cancellation is best-effort only: correctness never depends on it,
/// because every task is a no-op when its target is already gone.
pub trait Scheduler {
    fn schedule_after(&mut self, delay_ms: u64, task: TimerTask) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone)]
struct Entry {
    due_ms: u64,
    handle: TimerHandle,
    task: TimerTask,
}

/// Single-threaded delay queue driven by an injected clock
pub struct DelayQueue {
    clock: Arc<dyn Clock>,
    entries: Vec<Entry>,
    next_handle: u64,
}

impl DelayQueue {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Vec::new(),
            next_handle: 0,
        }
    }

    /// Drain every task whose deadline has passed, earliest first
    pub fn due(&mut self) -> Vec<TimerTask> {
        let now = self.clock.now_ms();
        let (mut ready, pending): (Vec<Entry>, Vec<Entry>) =
            self.entries.drain(..).partition(|e| e.due_ms <= now);
        self.entries = pending;
        ready.sort_by_key(|e| e.due_ms);
        ready.into_iter().map(|e| e.task).collect()
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}

impl Scheduler for DelayQueue {
    fn schedule_after(&mut self, delay_ms: u64, task: TimerTask) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.entries.push(Entry {
            due_ms: self.clock.now_ms().saturating_add(delay_ms),
            handle,
            task,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|e| e.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::ManualClock;

    fn queue(clock: &ManualClock) -> DelayQueue {
        DelayQueue::new(Arc::new(clock.clone()))
    }

    #[test]
    fn test_tasks_fire_in_deadline_order() {
        let clock = ManualClock::new(0);
        let mut q = queue(&clock);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        q.schedule_after(500, TimerTask::ExpireNotification(b));
        q.schedule_after(100, TimerTask::ExpireNotification(a));

        clock.advance(99);
        assert!(q.due().is_empty());

        clock.advance(500);
        let fired = q.due();
        assert_eq!(
            fired,
            vec![TimerTask::ExpireNotification(a), TimerTask::ExpireNotification(b)]
        );
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn test_cancel_removes_pending_task() {
        let clock = ManualClock::new(0);
        let mut q = queue(&clock);
        let handle = q.schedule_after(100, TimerTask::RetentionSweep);
        q.cancel(handle);
        clock.advance(1000);
        assert!(q.due().is_empty());
    }

    #[test]
    fn test_cancel_after_fire_is_a_noop() {
        let clock = ManualClock::new(0);
        let mut q = queue(&clock);
        let handle = q.schedule_after(100, TimerTask::RetentionSweep);
        clock.advance(100);
        assert_eq!(q.due().len(), 1);
        q.cancel(handle);
        assert_eq!(q.pending(), 0);
    }
}
