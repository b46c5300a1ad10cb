//! Transient UI notifications
//!
//! A bounded, priority-ordered queue with timed expiry and category
//! bulk removal. Producers (the skill engine, UI handlers) push through
//! the [`NotificationSink`] capability.

mod center;
mod notification;

pub use center::{MemorySink, NotificationCenter, NotificationSink, NotifyEvent};
pub use notification::{
    Notification, NotificationAction, NotificationKind, NotificationRequest, NotificationUpdate,
    Priority,
};
