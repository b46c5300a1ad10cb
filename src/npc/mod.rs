//! Per-NPC activity and resource metrics

mod metrics;

pub use metrics::{Activity, NpcRecord, NpcTracker};
