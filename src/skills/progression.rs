//! Skill learning, upgrading and experience
//!
//! The point economy: learning costs 1 point, upgrading from level L
//! costs L points, and experience-driven level-ups award a point back.
//! Every mutator rejects with `false` and zero state change when a
//! precondition fails.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::CoreConfig;
use crate::core::observer::{Listeners, SubscriptionId};
use crate::notify::{NotificationKind, NotificationRequest, NotificationSink};

use super::definitions::{SkillCatalog, SkillCategory, SkillEffect};
use super::save::{SkillSaveV1, SAVE_VERSION};

/// Read-only view of player stats the unlock predicate needs
pub trait StatProvider {
    fn level(&self) -> u32;
    fn has_achievement(&self, id: &str) -> bool;
}

/// Plain value implementation of [`StatProvider`]
#[derive(Debug, Clone, Default)]
pub struct PlayerStats {
    pub level: u32,
    pub achievements: Vec<String>,
}

impl StatProvider for PlayerStats {
    fn level(&self) -> u32 {
        self.level
    }

    fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a == id)
    }
}

/// Live state of one learned skill
///
/// Invariants: `1 <= level <= max_level` of its definition, and
/// `experience < experience_to_next` whenever level is below max.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedSkill {
    pub level: u32,
    pub experience: u64,
    pub experience_to_next: u64,
}

/// Published after each successful progression mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillEvent {
    Learned(String),
    Upgraded { id: String, level: u32 },
    LeveledUp { id: String, level: u32 },
}

/// The progression engine: definitions plus the player's live progress
pub struct SkillBook {
    catalog: SkillCatalog,
    learned: AHashMap<String, LearnedSkill>,
    learned_order: Vec<String>,
    skill_points: u32,
    category_xp: AHashMap<SkillCategory, u64>,
    active_slots: Vec<Option<String>>,
    stat_bonuses: AHashMap<String, f64>,
    xp_per_level: u64,
    category_trickle: f64,
    level_up_point_reward: u32,
    listeners: Listeners<SkillEvent>,
}

impl SkillBook {
    pub fn new(catalog: SkillCatalog, config: &CoreConfig) -> Self {
        Self {
            catalog,
            learned: AHashMap::new(),
            learned_order: Vec::new(),
            skill_points: 0,
            category_xp: AHashMap::new(),
            active_slots: vec![None; config.active_skill_slots],
            stat_bonuses: AHashMap::new(),
            xp_per_level: config.xp_per_level,
            category_trickle: config.category_trickle,
            level_up_point_reward: config.level_up_point_reward,
            listeners: Listeners::new(),
        }
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    pub fn skill_points(&self) -> u32 {
        self.skill_points
    }

    /// External award entry point (quests, events)
    pub fn grant_skill_points(&mut self, amount: u32) {
        self.skill_points += amount;
    }

    pub fn learned(&self, id: &str) -> Option<&LearnedSkill> {
        self.learned.get(id)
    }

    /// Ids in the order they were learned
    pub fn learned_ids(&self) -> &[String] {
        &self.learned_order
    }

    /// 0 means not learned
    pub fn skill_level(&self, id: &str) -> u32 {
        self.learned.get(id).map(|s| s.level).unwrap_or(0)
    }

    pub fn category_experience(&self, category: SkillCategory) -> u64 {
        self.category_xp.get(&category).copied().unwrap_or(0)
    }

    /// Pure unlock predicate over player level, prerequisite skill
    /// levels and achievements. Unknown ids are locked.
    pub fn is_skill_unlocked(&self, id: &str, stats: &dyn StatProvider) -> bool {
        let Some(def) = self.catalog.get(id) else {
            return false;
        };
        let req = &def.requirements;
        if let Some(min_level) = req.player_level {
            if stats.level() < min_level {
                return false;
            }
        }
        if req
            .skills
            .iter()
            .any(|(prereq, min)| self.skill_level(prereq) < *min)
        {
            return false;
        }
        if req.achievements.iter().any(|a| !stats.has_achievement(a)) {
            return false;
        }
        true
    }

    /// Spend 1 point to learn a skill at level 1
    pub fn learn_skill(
        &mut self,
        id: &str,
        stats: &dyn StatProvider,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        if self.learned.contains_key(id) {
            return false;
        }
        if self.skill_points < 1 {
            return false;
        }
        if !self.is_skill_unlocked(id, stats) {
            return false;
        }
        let Some(name) = self.catalog.get(id).map(|d| d.name.clone()) else {
            return false;
        };

        self.skill_points -= 1;
        self.learned.insert(
            id.to_string(),
            LearnedSkill {
                level: 1,
                experience: 0,
                experience_to_next: self.xp_per_level,
            },
        );
        self.learned_order.push(id.to_string());
        self.recompute_stat_bonuses();
        sink.push(
            NotificationRequest::new(
                NotificationKind::Success,
                "Skill learned",
                format!("You learned {name}."),
            )
            .with_category("skills"),
        );
        self.listeners.emit(&SkillEvent::Learned(id.to_string()));
        true
    }

    /// Pay points equal to the current level to advance one level
    pub fn upgrade_skill(&mut self, id: &str, sink: &mut dyn NotificationSink) -> bool {
        let Some((max_level, name)) = self.catalog.get(id).map(|d| (d.max_level, d.name.clone()))
        else {
            return false;
        };
        let Some(current) = self.learned.get(id).map(|s| s.level) else {
            return false;
        };
        if current >= max_level {
            return false;
        }
        if self.skill_points < current {
            return false;
        }

        self.skill_points -= current;
        let new_level = current + 1;
        if let Some(skill) = self.learned.get_mut(id) {
            skill.level = new_level;
            skill.experience = 0;
            skill.experience_to_next = new_level as u64 * self.xp_per_level;
        }
        self.recompute_stat_bonuses();
        sink.push(
            NotificationRequest::new(
                NotificationKind::Success,
                "Skill upgraded",
                format!("{name} is now level {new_level}."),
            )
            .with_category("skills"),
        );
        self.listeners.emit(&SkillEvent::Upgraded {
            id: id.to_string(),
            level: new_level,
        });
        true
    }

    /// Add experience to a learned skill. At most one level-up per
    /// call; surplus above the threshold is discarded. A level-up
    /// awards a skill point. Maxed skills stop accumulating entirely.
    /// Returns whether a level-up occurred.
    pub fn gain_skill_experience(
        &mut self,
        id: &str,
        amount: u64,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        let Some((max_level, name)) = self.catalog.get(id).map(|d| (d.max_level, d.name.clone()))
        else {
            return false;
        };
        let Some(skill) = self.learned.get_mut(id) else {
            return false;
        };
        if skill.level >= max_level {
            return false;
        }

        skill.experience += amount;
        if skill.experience < skill.experience_to_next {
            return false;
        }

        skill.level += 1;
        skill.experience = 0;
        skill.experience_to_next = skill.level as u64 * self.xp_per_level;
        let new_level = skill.level;
        self.skill_points += self.level_up_point_reward;
        self.recompute_stat_bonuses();
        sink.push(
            NotificationRequest::new(
                NotificationKind::Success,
                "Level up!",
                format!("{name} reached level {new_level}."),
            )
            .with_category("skills"),
        );
        self.listeners.emit(&SkillEvent::LeveledUp {
            id: id.to_string(),
            level: new_level,
        });
        true
    }

    /// Credit a category counter and trickle a share of the amount to
    /// every learned skill in that category.
    pub fn gain_category_experience(
        &mut self,
        category: SkillCategory,
        amount: u64,
        sink: &mut dyn NotificationSink,
    ) {
        *self.category_xp.entry(category).or_insert(0) += amount;
        let trickle = (amount as f64 * self.category_trickle).floor() as u64;
        if trickle == 0 {
            return;
        }
        let in_category: Vec<String> = self
            .learned_order
            .iter()
            .filter(|id| {
                self.catalog
                    .get(id)
                    .map_or(false, |d| d.category == category)
            })
            .cloned()
            .collect();
        for id in in_category {
            self.gain_skill_experience(&id, trickle, sink);
        }
    }

    /// Equip a learned skill into an active slot
    pub fn set_active_skill(&mut self, slot: usize, id: &str) -> bool {
        if slot >= self.active_slots.len() || !self.learned.contains_key(id) {
            return false;
        }
        self.active_slots[slot] = Some(id.to_string());
        true
    }

    pub fn clear_active_skill(&mut self, slot: usize) {
        if let Some(entry) = self.active_slots.get_mut(slot) {
            *entry = None;
        }
    }

    pub fn active_skills(&self) -> &[Option<String>] {
        &self.active_slots
    }

    /// Effects of all learned skills (optionally one category),
    /// magnitudes scaled by current level.
    pub fn skill_effects(&self, category: Option<SkillCategory>) -> Vec<SkillEffect> {
        let mut effects = Vec::new();
        for id in &self.learned_order {
            let (Some(def), Some(state)) = (self.catalog.get(id), self.learned.get(id)) else {
                continue;
            };
            if category.is_some_and(|c| def.category != c) {
                continue;
            }
            for effect in &def.effects {
                effects.push(effect.scaled(state.level));
            }
        }
        effects
    }

    /// Aggregated stat bonuses, recomputed eagerly after every
    /// learn/upgrade/level-up. Consumers push these into player stats.
    pub fn stat_bonuses(&self) -> &AHashMap<String, f64> {
        &self.stat_bonuses
    }

    pub fn subscribe(&mut self, listener: Box<dyn FnMut(&SkillEvent)>) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.unsubscribe(id);
    }

    /// Export progress as a versioned JSON blob
    pub fn export_skill_data(&self) -> String {
        let save = SkillSaveV1 {
            version: SAVE_VERSION,
            skill_points: self.skill_points,
            learned: self.learned.clone(),
            learned_order: self.learned_order.clone(),
            category_xp: self.category_xp.clone(),
            active_slots: self.active_slots.clone(),
        };
        match serde_json::to_string(&save) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!("skill export failed: {e}");
                String::new()
            }
        }
    }

    /// Import a previously exported blob. Malformed input, a version
    /// mismatch, or references to unknown skills reject the whole blob
    /// with no state change.
    pub fn import_skill_data(&mut self, data: &str) -> bool {
        let save: SkillSaveV1 = match serde_json::from_str(data) {
            Ok(save) => save,
            Err(e) => {
                tracing::warn!("skill import rejected: {e}");
                return false;
            }
        };
        if save.version != SAVE_VERSION {
            tracing::warn!("skill import rejected: unsupported version {}", save.version);
            return false;
        }
        // Validate the whole blob before touching live state.
        for (id, state) in &save.learned {
            let Some(def) = self.catalog.get(id) else {
                tracing::warn!("skill import rejected: unknown skill {id}");
                return false;
            };
            let valid_level = state.level >= 1 && state.level <= def.max_level;
            let valid_xp = state.level == def.max_level || state.experience < state.experience_to_next;
            if !valid_level || !valid_xp {
                tracing::warn!("skill import rejected: corrupt state for {id}");
                return false;
            }
        }
        if save.learned_order.len() != save.learned.len()
            || save
                .learned_order
                .iter()
                .any(|id| !save.learned.contains_key(id))
        {
            tracing::warn!("skill import rejected: inconsistent learned list");
            return false;
        }
        if save
            .active_slots
            .iter()
            .flatten()
            .any(|id| !save.learned.contains_key(id))
        {
            tracing::warn!("skill import rejected: active slot references unlearned skill");
            return false;
        }

        let slot_count = self.active_slots.len();
        self.skill_points = save.skill_points;
        self.learned = save.learned;
        self.learned_order = save.learned_order;
        self.category_xp = save.category_xp;
        self.active_slots = save.active_slots;
        self.active_slots.resize(slot_count, None);
        self.active_slots.truncate(slot_count);
        self.recompute_stat_bonuses();
        true
    }

    fn recompute_stat_bonuses(&mut self) {
        let mut bonuses: AHashMap<String, f64> = AHashMap::new();
        for id in &self.learned_order {
            let (Some(def), Some(state)) = (self.catalog.get(id), self.learned.get(id)) else {
                continue;
            };
            for effect in &def.effects {
                if let SkillEffect::StatBonus { stat, per_level } = effect {
                    *bonuses.entry(stat.clone()).or_insert(0.0) += per_level * state.level as f64;
                }
            }
        }
        self.stat_bonuses = bonuses;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemorySink;
    use crate::skills::definitions::SkillCatalog;

    fn book() -> SkillBook {
        SkillBook::new(SkillCatalog::with_defaults(), &CoreConfig::default())
    }

    fn stats(level: u32) -> PlayerStats {
        PlayerStats {
            level,
            achievements: Vec::new(),
        }
    }

    #[test]
    fn test_learn_requires_a_point() {
        let mut b = book();
        let mut sink = MemorySink::default();
        assert!(!b.learn_skill("basic_combat", &stats(1), &mut sink));
        assert_eq!(b.skill_points(), 0);

        b.grant_skill_points(1);
        assert!(b.learn_skill("basic_combat", &stats(1), &mut sink));
        assert_eq!(b.skill_points(), 0);
        assert_eq!(b.skill_level("basic_combat"), 1);
        assert_eq!(sink.requests.len(), 1);
    }

    #[test]
    fn test_learn_rejects_relearning_and_unknown_ids() {
        let mut b = book();
        let mut sink = MemorySink::default();
        b.grant_skill_points(5);
        assert!(b.learn_skill("basic_combat", &stats(1), &mut sink));
        assert!(!b.learn_skill("basic_combat", &stats(1), &mut sink));
        assert!(!b.learn_skill("no_such_skill", &stats(99), &mut sink));
        assert_eq!(b.skill_points(), 4);
    }

    #[test]
    fn test_unlock_predicate() {
        let mut b = book();
        let mut sink = MemorySink::default();

        // Locked: needs basic_combat 3 and player level 5.
        assert!(!b.is_skill_unlocked("sword_mastery", &stats(10)));

        b.grant_skill_points(10);
        assert!(b.learn_skill("basic_combat", &stats(1), &mut sink));
        assert!(b.upgrade_skill("basic_combat", &mut sink));
        assert!(b.upgrade_skill("basic_combat", &mut sink));
        assert_eq!(b.skill_level("basic_combat"), 3);

        assert!(!b.is_skill_unlocked("sword_mastery", &stats(4)));
        assert!(b.is_skill_unlocked("sword_mastery", &stats(5)));

        // Pure predicate: repeated calls with unchanged inputs agree.
        assert!(b.is_skill_unlocked("sword_mastery", &stats(5)));
    }

    #[test]
    fn test_achievement_gating() {
        let b = book();
        assert!(!b.is_skill_unlocked("arcane_focus", &stats(20)));
        let adept = PlayerStats {
            level: 20,
            achievements: vec!["first_spell".into()],
        };
        assert!(b.is_skill_unlocked("arcane_focus", &adept));
    }

    #[test]
    fn test_upgrade_cost_scales_with_level() {
        let mut b = book();
        let mut sink = MemorySink::default();
        b.grant_skill_points(3);

        assert!(b.learn_skill("basic_combat", &stats(1), &mut sink));
        assert_eq!(b.skill_points(), 2);

        // Level 1 -> 2 costs 1 point.
        assert!(b.upgrade_skill("basic_combat", &mut sink));
        assert_eq!(b.skill_points(), 1);
        assert_eq!(b.skill_level("basic_combat"), 2);

        // Level 2 -> 3 costs 2 points; only 1 left.
        assert!(!b.upgrade_skill("basic_combat", &mut sink));
        assert_eq!(b.skill_points(), 1);
        assert_eq!(b.skill_level("basic_combat"), 2);
    }

    #[test]
    fn test_experience_levels_at_most_once_per_call() {
        let mut b = book();
        let mut sink = MemorySink::default();
        b.grant_skill_points(1);
        b.learn_skill("woodcutting", &stats(1), &mut sink);

        // Below the threshold: no level change, however often applied.
        for _ in 0..9 {
            assert!(!b.gain_skill_experience("woodcutting", 10, &mut sink));
        }
        assert_eq!(b.skill_level("woodcutting"), 1);
        assert_eq!(b.learned("woodcutting").unwrap().experience, 90);

        // A huge grant still advances exactly one level, discards the
        // surplus and awards one point.
        assert!(b.gain_skill_experience("woodcutting", 500, &mut sink));
        let skill = b.learned("woodcutting").unwrap();
        assert_eq!(skill.level, 2);
        assert_eq!(skill.experience, 0);
        assert_eq!(skill.experience_to_next, 200);
        assert_eq!(b.skill_points(), 1);
    }

    #[test]
    fn test_maxed_skill_ignores_experience() {
        let mut b = book();
        let mut sink = MemorySink::default();
        b.grant_skill_points(100);
        b.learn_skill("rally_cry", &stats(8), &mut sink);
        for _ in 0..4 {
            assert!(b.upgrade_skill("rally_cry", &mut sink));
        }
        assert_eq!(b.skill_level("rally_cry"), 5);

        assert!(!b.gain_skill_experience("rally_cry", 10_000, &mut sink));
        assert_eq!(b.learned("rally_cry").unwrap().experience, 0);
    }

    #[test]
    fn test_category_experience_trickles_to_learned_skills() {
        let mut b = book();
        let mut sink = MemorySink::default();
        b.grant_skill_points(2);
        b.learn_skill("woodcutting", &stats(1), &mut sink);
        b.learn_skill("herbalism", &stats(1), &mut sink);

        b.gain_category_experience(SkillCategory::Gathering, 250, &mut sink);
        assert_eq!(b.category_experience(SkillCategory::Gathering), 250);
        // floor(250 * 0.1) = 25 experience each.
        assert_eq!(b.learned("woodcutting").unwrap().experience, 25);
        assert_eq!(b.learned("herbalism").unwrap().experience, 25);

        // A learned skill of another category is untouched.
        assert_eq!(b.category_experience(SkillCategory::Combat), 0);
    }

    #[test]
    fn test_stat_bonus_aggregation() {
        let mut b = book();
        let mut sink = MemorySink::default();
        b.grant_skill_points(10);
        b.learn_skill("masonry", &stats(1), &mut sink);
        b.learn_skill("bartering", &stats(1), &mut sink);
        b.upgrade_skill("masonry", &mut sink);

        let bonuses = b.stat_bonuses();
        assert_eq!(bonuses.get("construction_speed"), Some(&4.0));
        assert_eq!(bonuses.get("trade_margin"), Some(&1.5));

        let building_only = b.skill_effects(Some(SkillCategory::Building));
        assert_eq!(building_only.len(), 1);
        assert_eq!(b.skill_effects(None).len(), 2);
    }

    #[test]
    fn test_active_slots() {
        let mut b = book();
        let mut sink = MemorySink::default();
        b.grant_skill_points(1);
        b.learn_skill("basic_combat", &stats(1), &mut sink);

        assert!(b.set_active_skill(0, "basic_combat"));
        assert!(!b.set_active_skill(0, "woodcutting")); // not learned
        assert!(!b.set_active_skill(99, "basic_combat")); // out of range
        assert_eq!(b.active_skills()[0].as_deref(), Some("basic_combat"));

        b.clear_active_skill(0);
        assert!(b.active_skills()[0].is_none());
    }

    #[test]
    fn test_level_invariants_hold_under_mixed_progression() {
        let mut b = book();
        let mut sink = MemorySink::default();
        b.grant_skill_points(6);
        b.learn_skill("basic_combat", &stats(1), &mut sink);
        b.learn_skill("foraging", &stats(1), &mut sink);

        for step in 0..40 {
            match step % 3 {
                0 => {
                    b.gain_skill_experience("basic_combat", 60, &mut sink);
                }
                1 => {
                    b.gain_category_experience(SkillCategory::Survival, 300, &mut sink);
                }
                _ => {
                    b.upgrade_skill("foraging", &mut sink);
                }
            }
            for id in b.learned_ids() {
                let def = b.catalog().get(id).unwrap();
                let state = b.learned(id).unwrap();
                assert!(state.level >= 1 && state.level <= def.max_level);
                assert!(state.level == def.max_level || state.experience < state.experience_to_next);
            }
        }
    }
}
