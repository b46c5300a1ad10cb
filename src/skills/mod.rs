//! Skill and specialization progression
//!
//! Skills move through locked -> learnable -> learned -> maxed. The
//! transitions are driven by a point economy: learning costs a point,
//! upgrading costs the current level, experience level-ups pay one
//! back. Specializations are a parallel, village-gated unlock track.

mod definitions;
mod progression;
mod save;
mod specialization;

pub use definitions::{
    Rarity, SkillCatalog, SkillCategory, SkillDefinition, SkillEffect, SkillTreeNode,
    UnlockRequirements,
};
pub use progression::{LearnedSkill, PlayerStats, SkillBook, SkillEvent, StatProvider};
pub use save::{SkillSaveV1, SAVE_VERSION};
pub use specialization::{
    SpecialAbility, SpecializationCatalog, SpecializationDefinition, VillageSnapshot,
};
