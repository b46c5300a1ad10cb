//! Core configuration with documented constants
//!
//! All tuning numbers for the progression and notification systems are
//! collected here with explanations of their purpose and how they
//! interact with each other.

use serde::Deserialize;

use crate::core::error::Result;

/// Configuration for the game core
///
/// These values have been tuned to produce good pacing. Changing them
/// will affect how quickly players accumulate skill points and how
/// noisy the notification feed feels.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    // === NOTIFICATIONS ===
    /// Maximum entries kept in the notification queue
    ///
    /// When an add would exceed this, the oldest low-priority entry is
    /// evicted first; if none exists the sorted queue is truncated.
    pub max_notifications: usize,

    /// Age past which the retention sweep purges a notification (ms)
    ///
    /// At the default (24 hours), even persistent notifications
    /// eventually disappear rather than pile up across a long session.
    pub notification_retention_ms: u64,

    /// Interval between retention sweeps (ms)
    ///
    /// One sweep per hour keeps the queue tidy without noticeable work.
    pub retention_sweep_interval_ms: u64,

    // === SKILL PROGRESSION ===
    /// Experience required per skill level
    ///
    /// The threshold for reaching level N+1 is N+1 times this value,
    /// so later levels take proportionally longer.
    pub xp_per_level: u64,

    /// Share of category experience trickled to each learned skill
    ///
    /// When a category gains X experience, every learned skill in that
    /// category gains floor(X * trickle). At 0.1, category play slowly
    /// levels the whole category.
    pub category_trickle: f64,

    /// Number of active skill slots
    ///
    /// Learned skills can be equipped into these slots for manual
    /// triggering. Slots beyond this count are rejected.
    pub active_skill_slots: usize,

    /// Skill points awarded when a skill levels up through experience
    pub level_up_point_reward: u32,

    // === NPC METRICS ===
    /// How many NPCs the leaderboard query returns
    pub top_performer_count: usize,

    /// Efficiency score assigned to a freshly registered NPC
    ///
    /// Mid-scale (0-100) so early efficiency updates can move an NPC
    /// in either direction.
    pub default_efficiency: f32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_notifications: 10,
            notification_retention_ms: 24 * 60 * 60 * 1000,
            retention_sweep_interval_ms: 60 * 60 * 1000,
            xp_per_level: 100,
            category_trickle: 0.1,
            active_skill_slots: 4,
            level_up_point_reward: 1,
            top_performer_count: 5,
            default_efficiency: 50.0,
        }
    }
}

impl CoreConfig {
    /// Parse a config from TOML. Missing fields fall back to defaults,
    /// so partial override files work.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.max_notifications, 10);
        assert_eq!(config.xp_per_level, 100);
        assert_eq!(config.retention_sweep_interval_ms, 3_600_000);
    }

    #[test]
    fn test_partial_toml_override() {
        let config = CoreConfig::from_toml_str("max_notifications = 3\nxp_per_level = 50\n").unwrap();
        assert_eq!(config.max_notifications, 3);
        assert_eq!(config.xp_per_level, 50);
        // Untouched fields keep their defaults
        assert_eq!(config.active_skill_slots, 4);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(CoreConfig::from_toml_str("max_notifications = \"ten\"").is_err());
    }
}
