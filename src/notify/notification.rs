//! Notification records and priority policy

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visual flavor of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Queue ordering and default lifetime
///
/// Variant order matters: `Ord` drives the priority sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    /// Display duration before auto-expiry. Critical notifications
    /// never expire on their own (0 means "until explicitly removed").
    pub fn default_duration_ms(self) -> u64 {
        match self {
            Priority::Low => 3_000,
            Priority::Medium => 5_000,
            Priority::High => 8_000,
            Priority::Critical => 0,
        }
    }
}

/// Action button attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub label: String,
    /// Opaque command the UI layer dispatches when clicked
    pub command: String,
}

/// A live entry in the notification queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub actions: Vec<NotificationAction>,
    /// Never auto-expires when set
    pub persistent: bool,
    pub category: Option<String>,
    /// Clock milliseconds at creation
    pub created_at: u64,
    /// Resolved display duration; 0 means no expiry timer
    pub duration_ms: u64,
}

/// Everything a producer supplies; id, timestamp and resolved duration
/// are filled in by the center.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub kind: NotificationKind,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub actions: Vec<NotificationAction>,
    pub persistent: bool,
    pub category: Option<String>,
    /// Overrides the priority's default duration when set
    pub duration_ms: Option<u64>,
}

impl NotificationRequest {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            priority: Priority::default(),
            title: title.into(),
            message: message.into(),
            actions: Vec::new(),
            persistent: false,
            category: None,
            duration_ms: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_action(mut self, label: impl Into<String>, command: impl Into<String>) -> Self {
        self.actions.push(NotificationAction {
            label: label.into(),
            command: command.into(),
        });
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

/// Partial update merged into an existing notification
///
/// Timers and the creation timestamp are untouched by an update.
#[derive(Debug, Clone, Default)]
pub struct NotificationUpdate {
    pub kind: Option<NotificationKind>,
    pub priority: Option<Priority>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub actions: Option<Vec<NotificationAction>>,
}
