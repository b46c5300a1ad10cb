//! Cumulative work/idle counters and collection totals per NPC
//!
//! Time is credited on activity transitions: the elapsed span since the
//! previous transition goes to whichever bucket the *previous* activity
//! belonged to. Combat and traveling belong to neither bucket.

use ahash::AHashMap;
use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::config::CoreConfig;
use crate::core::time::Clock;

/// What an NPC is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Idle,
    Working,
    Gathering,
    Combat,
    Traveling,
}

impl Activity {
    /// Working and gathering both count as productive time.
    pub fn counts_as_work(self) -> bool {
        matches!(self, Activity::Working | Activity::Gathering)
    }

    pub fn counts_as_idle(self) -> bool {
        matches!(self, Activity::Idle)
    }

    pub fn name(self) -> &'static str {
        match self {
            Activity::Idle => "idle",
            Activity::Working => "working",
            Activity::Gathering => "gathering",
            Activity::Combat => "combat",
            Activity::Traveling => "traveling",
        }
    }
}

/// Mutable aggregate for one NPC
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcRecord {
    pub id: String,
    pub name: String,
    pub npc_type: String,
    /// Resource type -> cumulative amount collected
    pub resources_collected: AHashMap<String, u64>,
    pub work_time_secs: f64,
    pub idle_time_secs: f64,
    pub activity: Activity,
    /// Clock milliseconds when the current activity began
    pub activity_since_ms: u64,
    /// 0-100, externally set
    pub efficiency: f32,
}

/// The metrics tracker
pub struct NpcTracker {
    records: AHashMap<String, NpcRecord>,
    /// Registration order; keeps leaderboard ties deterministic
    order: Vec<String>,
    clock: Arc<dyn Clock>,
    top_count: usize,
    default_efficiency: f32,
}

impl NpcTracker {
    pub fn new(config: &CoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: AHashMap::new(),
            order: Vec::new(),
            clock,
            top_count: config.top_performer_count,
            default_efficiency: config.default_efficiency,
        }
    }

    /// Register an NPC with zeroed counters. Overwrites any existing
    /// record for the id.
    pub fn initialize_npc(&mut self, id: &str, npc_type: &str, name: &str) {
        if !self.records.contains_key(id) {
            self.order.push(id.to_string());
        }
        self.records.insert(
            id.to_string(),
            NpcRecord {
                id: id.to_string(),
                name: name.to_string(),
                npc_type: npc_type.to_string(),
                resources_collected: AHashMap::new(),
                work_time_secs: 0.0,
                idle_time_secs: 0.0,
                activity: Activity::Idle,
                activity_since_ms: self.clock.now_ms(),
                efficiency: self.default_efficiency,
            },
        );
    }

    /// Credit elapsed time to the previous activity's bucket, then
    /// switch to the new activity.
    pub fn update_activity(&mut self, id: &str, activity: Activity) {
        let now = self.clock.now_ms();
        let Some(record) = self.records.get_mut(id) else {
            tracing::debug!("activity update for unknown NPC {id}");
            return;
        };
        let elapsed_secs = now.saturating_sub(record.activity_since_ms) as f64 / 1000.0;
        if record.activity.counts_as_work() {
            record.work_time_secs += elapsed_secs;
        } else if record.activity.counts_as_idle() {
            record.idle_time_secs += elapsed_secs;
        }
        record.activity = activity;
        record.activity_since_ms = now;
    }

    pub fn record_resource_collection(&mut self, id: &str, resource: &str, amount: u64) {
        let Some(record) = self.records.get_mut(id) else {
            tracing::debug!("resource collection for unknown NPC {id}");
            return;
        };
        *record
            .resources_collected
            .entry(resource.to_string())
            .or_insert(0) += amount;
    }

    /// Direct overwrite; callers are expected to pass 0-100.
    pub fn update_efficiency(&mut self, id: &str, value: f32) {
        if let Some(record) = self.records.get_mut(id) {
            record.efficiency = value;
        }
    }

    pub fn remove_npc(&mut self, id: &str) {
        self.records.remove(id);
        self.order.retain(|existing| existing != id);
    }

    pub fn get(&self, id: &str) -> Option<&NpcRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest-efficiency NPCs, best first. The sort is stable, so
    /// ties keep registration order.
    pub fn top_performers(&self) -> Vec<&NpcRecord> {
        let mut all: Vec<&NpcRecord> = self
            .order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect();
        all.sort_by(|a, b| {
            b.efficiency
                .partial_cmp(&a.efficiency)
                .unwrap_or(Ordering::Equal)
        });
        all.truncate(self.top_count);
        all
    }

    /// Sum of every NPC's per-resource counters
    pub fn total_resources_collected(&self) -> AHashMap<String, u64> {
        let mut totals: AHashMap<String, u64> = AHashMap::new();
        for record in self.records.values() {
            for (resource, amount) in &record.resources_collected {
                *totals.entry(resource.clone()).or_insert(0) += amount;
            }
        }
        totals
    }
}
