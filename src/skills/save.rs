//! Versioned skill-progress save format
//!
//! The exported blob carries an explicit version so old saves are
//! rejected cleanly instead of half-applied. New fields must be
//! additive and defaulted; incompatible changes bump the version.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::definitions::SkillCategory;
use super::progression::LearnedSkill;

pub const SAVE_VERSION: u32 = 1;

/// Version 1 of the exported skill blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSaveV1 {
    pub version: u32,
    pub skill_points: u32,
    pub learned: AHashMap<String, LearnedSkill>,
    pub learned_order: Vec<String>,
    #[serde(default)]
    pub category_xp: AHashMap<SkillCategory, u64>,
    #[serde(default)]
    pub active_slots: Vec<Option<String>>,
}
