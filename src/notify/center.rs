//! Bounded, priority-ordered notification queue
//!
//! The queue is re-sorted after every mutation (priority descending,
//! then newest first) and never exceeds its configured capacity. Expiry
//! and the hourly retention sweep run through the scheduler; a timer
//! that fires for an already-removed entry is a harmless no-op.

use ahash::AHashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::config::CoreConfig;
use crate::core::observer::{Listeners, SubscriptionId};
use crate::core::schedule::{Scheduler, TimerHandle, TimerTask};
use crate::core::time::Clock;

use super::notification::{
    Notification, NotificationKind, NotificationRequest, NotificationUpdate, Priority,
};

/// Published after each successful queue mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    Added(Uuid),
    Removed(Uuid),
    Updated(Uuid),
    Cleared,
}

/// Capability for emitting notifications without owning the queue
pub trait NotificationSink {
    fn push(&mut self, request: NotificationRequest) -> Uuid;
}

/// Sink that buffers requests instead of displaying them; the headless
/// and test implementation.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub requests: Vec<NotificationRequest>,
}

impl NotificationSink for MemorySink {
    fn push(&mut self, request: NotificationRequest) -> Uuid {
        self.requests.push(request);
        Uuid::new_v4()
    }
}

/// The notification engine
pub struct NotificationCenter<S: Scheduler> {
    queue: Vec<Notification>,
    timers: AHashMap<Uuid, TimerHandle>,
    max_notifications: usize,
    retention_ms: u64,
    sweep_interval_ms: u64,
    clock: Arc<dyn Clock>,
    scheduler: S,
    listeners: Listeners<NotifyEvent>,
}

impl<S: Scheduler> NotificationCenter<S> {
    pub fn new(config: &CoreConfig, clock: Arc<dyn Clock>, mut scheduler: S) -> Self {
        // First retention sweep; dispatch re-arms it each time it fires.
        scheduler.schedule_after(config.retention_sweep_interval_ms, TimerTask::RetentionSweep);
        Self {
            queue: Vec::new(),
            timers: AHashMap::new(),
            max_notifications: config.max_notifications,
            retention_ms: config.notification_retention_ms,
            sweep_interval_ms: config.retention_sweep_interval_ms,
            clock,
            scheduler,
            listeners: Listeners::new(),
        }
    }

    /// Insert a notification, resolving its duration from the priority
    /// table unless the request carried an override. Returns the
    /// generated id so the caller can update or remove it later.
    pub fn add(&mut self, request: NotificationRequest) -> Uuid {
        let id = Uuid::new_v4();
        let duration_ms = request
            .duration_ms
            .unwrap_or_else(|| request.priority.default_duration_ms());
        let persistent = request.persistent;
        self.queue.push(Notification {
            id,
            kind: request.kind,
            priority: request.priority,
            title: request.title,
            message: request.message,
            actions: request.actions,
            persistent,
            category: request.category,
            created_at: self.clock.now_ms(),
            duration_ms,
        });
        self.sort_queue();
        self.evict_over_capacity();

        // The new entry may itself have been the eviction victim.
        if !persistent && duration_ms > 0 && self.get(id).is_some() {
            let handle = self
                .scheduler
                .schedule_after(duration_ms, TimerTask::ExpireNotification(id));
            self.timers.insert(id, handle);
        }
        self.listeners.emit(&NotifyEvent::Added(id));
        id
    }

    /// Remove by id. Idempotent: absent ids are ignored, so a late
    /// expiry timer never causes trouble.
    pub fn remove(&mut self, id: Uuid) {
        if self.remove_entry(id) {
            self.listeners.emit(&NotifyEvent::Removed(id));
        }
    }

    pub fn clear_all(&mut self) {
        for entry in &self.queue {
            if let Some(handle) = self.timers.remove(&entry.id) {
                self.scheduler.cancel(handle);
            }
        }
        self.queue.clear();
        self.timers.clear();
        self.listeners.emit(&NotifyEvent::Cleared);
    }

    pub fn clear_by_category(&mut self, category: &str) {
        let ids: Vec<Uuid> = self
            .queue
            .iter()
            .filter(|n| n.category.as_deref() == Some(category))
            .map(|n| n.id)
            .collect();
        for id in ids {
            self.remove(id);
        }
    }

    /// Merge fields into an existing entry without resetting its timer
    /// or creation timestamp. Returns false if the id is unknown.
    pub fn update(&mut self, id: Uuid, update: NotificationUpdate) -> bool {
        let Some(entry) = self.queue.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        if let Some(kind) = update.kind {
            entry.kind = kind;
        }
        if let Some(priority) = update.priority {
            entry.priority = priority;
        }
        if let Some(title) = update.title {
            entry.title = title;
        }
        if let Some(message) = update.message {
            entry.message = message;
        }
        if let Some(actions) = update.actions {
            entry.actions = actions;
        }
        // Priority may have changed; keep the ordering invariant.
        self.sort_queue();
        self.listeners.emit(&NotifyEvent::Updated(id));
        true
    }

    pub fn show_success(&mut self, title: &str, message: &str) -> Uuid {
        self.add(NotificationRequest::new(NotificationKind::Success, title, message))
    }

    /// Errors default to high priority (8 second display).
    pub fn show_error(&mut self, title: &str, message: &str) -> Uuid {
        self.add(
            NotificationRequest::new(NotificationKind::Error, title, message)
                .with_priority(Priority::High),
        )
    }

    pub fn show_warning(&mut self, title: &str, message: &str) -> Uuid {
        self.add(NotificationRequest::new(NotificationKind::Warning, title, message))
    }

    pub fn show_info(&mut self, title: &str, message: &str) -> Uuid {
        self.add(NotificationRequest::new(NotificationKind::Info, title, message))
    }

    /// Purge entries older than `max_age_ms`, persistent ones included.
    pub fn clear_old(&mut self, max_age_ms: u64) {
        let cutoff = self.clock.now_ms().saturating_sub(max_age_ms);
        let stale: Vec<Uuid> = self
            .queue
            .iter()
            .filter(|n| n.created_at < cutoff)
            .map(|n| n.id)
            .collect();
        for id in stale {
            self.remove(id);
        }
    }

    /// Entry point for fired timers.
    pub fn dispatch(&mut self, task: TimerTask) {
        match task {
            TimerTask::ExpireNotification(id) => self.remove(id),
            TimerTask::RetentionSweep => {
                self.clear_old(self.retention_ms);
                self.scheduler
                    .schedule_after(self.sweep_interval_ms, TimerTask::RetentionSweep);
            }
        }
    }

    /// Snapshot of the queue, priority descending then newest first
    pub fn notifications(&self) -> &[Notification] {
        &self.queue
    }

    pub fn get(&self, id: Uuid) -> Option<&Notification> {
        self.queue.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn subscribe(&mut self, listener: Box<dyn FnMut(&NotifyEvent)>) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.unsubscribe(id);
    }

    fn sort_queue(&mut self) {
        self.queue
            .sort_by(|a, b| b.priority.cmp(&a.priority).then(b.created_at.cmp(&a.created_at)));
    }

    fn remove_entry(&mut self, id: Uuid) -> bool {
        let before = self.queue.len();
        self.queue.retain(|n| n.id != id);
        let removed = self.queue.len() != before;
        if removed {
            if let Some(handle) = self.timers.remove(&id) {
                self.scheduler.cancel(handle);
            }
        }
        removed
    }

    /// Drop the oldest low-priority entry first; with no low-priority
    /// entries the sorted queue is truncated, which discards the oldest
    /// entry of the lowest priority present.
    fn evict_over_capacity(&mut self) {
        while self.queue.len() > self.max_notifications {
            let low_oldest = self
                .queue
                .iter()
                .filter(|n| n.priority == Priority::Low)
                .min_by_key(|n| n.created_at)
                .map(|n| n.id);
            let victim = match low_oldest {
                Some(id) => id,
                None => match self.queue.last() {
                    Some(n) => n.id,
                    None => break,
                },
            };
            if self.remove_entry(victim) {
                self.listeners.emit(&NotifyEvent::Removed(victim));
            }
        }
    }
}

impl<S: Scheduler> NotificationSink for NotificationCenter<S> {
    fn push(&mut self, request: NotificationRequest) -> Uuid {
        self.add(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schedule::DelayQueue;
    use crate::core::time::ManualClock;

    fn center(clock: &ManualClock) -> NotificationCenter<DelayQueue> {
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        NotificationCenter::new(&CoreConfig::default(), shared.clone(), DelayQueue::new(shared))
    }

    fn drain(center: &mut NotificationCenter<DelayQueue>) {
        for task in center.scheduler_mut().due() {
            center.dispatch(task);
        }
    }

    fn info(title: &str) -> NotificationRequest {
        NotificationRequest::new(NotificationKind::Info, title, "msg")
    }

    #[test]
    fn test_queue_sorted_by_priority_then_recency() {
        let clock = ManualClock::new(0);
        let mut c = center(&clock);
        c.add(info("low").with_priority(Priority::Low));
        clock.advance(1);
        c.add(info("critical").with_priority(Priority::Critical));
        clock.advance(1);
        c.add(info("medium"));
        clock.advance(1);
        c.add(info("medium-newer"));

        let titles: Vec<&str> = c.notifications().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["critical", "medium-newer", "medium", "low"]);
    }

    #[test]
    fn test_expiry_timer_removes_entry() {
        let clock = ManualClock::new(0);
        let mut c = center(&clock);
        let id = c.add(info("short"));
        assert!(c.get(id).is_some());

        clock.advance(5_000);
        drain(&mut c);
        assert!(c.get(id).is_none());
    }

    #[test]
    fn test_persistent_and_critical_never_auto_expire() {
        let clock = ManualClock::new(0);
        let mut c = center(&clock);
        let sticky = c.add(info("sticky").persistent());
        let critical = c.add(info("critical").with_priority(Priority::Critical));

        clock.advance(60_000);
        drain(&mut c);
        assert!(c.get(sticky).is_some());
        assert!(c.get(critical).is_some());
    }

    #[test]
    fn test_remove_is_idempotent_with_late_timer() {
        let clock = ManualClock::new(0);
        let mut c = center(&clock);
        let id = c.add(info("gone"));
        c.remove(id);
        c.remove(id);

        // The timer may still fire; it must find nothing to do.
        c.dispatch(TimerTask::ExpireNotification(id));
        assert!(c.is_empty());
    }

    #[test]
    fn test_eviction_drops_oldest_low_priority() {
        let clock = ManualClock::new(0);
        let mut c = center(&clock);
        let mut first = None;
        for i in 0..11 {
            let id = c.add(info(&format!("n{i}")).with_priority(Priority::Low));
            first.get_or_insert(id);
            clock.advance(1);
        }
        assert_eq!(c.len(), 10);
        assert!(c.get(first.unwrap()).is_none());
    }

    #[test]
    fn test_eviction_truncates_without_low_priority() {
        let clock = ManualClock::new(0);
        let mut c = center(&clock);
        let oldest = c.add(info("oldest"));
        clock.advance(1);
        for i in 0..10 {
            c.add(info(&format!("n{i}")));
            clock.advance(1);
        }
        assert_eq!(c.len(), 10);
        assert!(c.get(oldest).is_none());
    }

    #[test]
    fn test_update_merges_without_touching_created_at() {
        let clock = ManualClock::new(100);
        let mut c = center(&clock);
        let id = c.add(info("before"));
        clock.advance(1_000);

        let ok = c.update(
            id,
            NotificationUpdate {
                title: Some("after".into()),
                priority: Some(Priority::Critical),
                ..NotificationUpdate::default()
            },
        );
        assert!(ok);
        let entry = c.get(id).unwrap();
        assert_eq!(entry.title, "after");
        assert_eq!(entry.created_at, 100);
        // Promoted entry moved to the front of the queue.
        assert_eq!(c.notifications()[0].id, id);

        assert!(!c.update(Uuid::new_v4(), NotificationUpdate::default()));
    }

    #[test]
    fn test_clear_by_category() {
        let clock = ManualClock::new(0);
        let mut c = center(&clock);
        c.add(info("a").with_category("skills"));
        c.add(info("b").with_category("skills"));
        c.add(info("c").with_category("trade"));
        c.clear_by_category("skills");
        assert_eq!(c.len(), 1);
        assert_eq!(c.notifications()[0].title, "c");
    }

    #[test]
    fn test_retention_sweep_purges_old_persistent_entries() {
        let clock = ManualClock::new(0);
        let mut c = center(&clock);
        let old = c.add(info("ancient").persistent());

        // A day plus one sweep interval later, the sweep collects it.
        clock.advance(25 * 60 * 60 * 1000);
        drain(&mut c);
        assert!(c.get(old).is_none());

        // Sweep re-armed itself.
        let fresh = c.add(info("fresh").persistent());
        clock.advance(60 * 60 * 1000);
        drain(&mut c);
        assert!(c.get(fresh).is_some());
    }

    #[test]
    fn test_show_error_defaults_to_high_priority() {
        let clock = ManualClock::new(0);
        let mut c = center(&clock);
        let id = c.show_error("fail", "boom");
        let entry = c.get(id).unwrap();
        assert_eq!(entry.priority, Priority::High);
        assert_eq!(entry.duration_ms, 8_000);
    }
}
