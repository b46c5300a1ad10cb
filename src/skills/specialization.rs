//! Worker specializations
//!
//! Coarser unlocks than skills, gated on village state (population,
//! buildings, stocked resources) rather than a prerequisite graph.
//! Structurally parallel to skills but with no point economy.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::definitions::SkillCategory;
use super::progression::StatProvider;

/// Ability unlocked once a specialization reaches its threshold level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAbility {
    pub threshold: u32,
    pub description: String,
}

/// One worker specialization archetype
///
/// Ability thresholds are distinct within a definition, so the
/// highest-qualifying lookup never ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecializationDefinition {
    pub id: String,
    pub name: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub required_level: u32,
    #[serde(default)]
    pub required_population: u32,
    #[serde(default)]
    pub required_buildings: Vec<String>,
    /// Resource type -> minimum stocked amount
    #[serde(default)]
    pub required_resources: AHashMap<String, u32>,
    pub base_efficiency: f64,
    pub per_level_bonus: f64,
    #[serde(default)]
    pub abilities: Vec<SpecialAbility>,
}

/// Village-level state the unlock check reads
#[derive(Debug, Clone, Default)]
pub struct VillageSnapshot {
    pub population: u32,
    pub buildings: Vec<String>,
    pub resources: AHashMap<String, u32>,
}

/// Catalog of specialization definitions
#[derive(Debug, Clone, Default)]
pub struct SpecializationCatalog {
    specs: AHashMap<String, SpecializationDefinition>,
}

impl SpecializationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, def: SpecializationDefinition) {
        self.specs.insert(def.id.clone(), def);
    }

    pub fn get(&self, id: &str) -> Option<&SpecializationDefinition> {
        self.specs.get(id)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Whether the village currently satisfies every gate. Unknown ids
    /// are never unlockable.
    pub fn can_unlock(
        &self,
        id: &str,
        stats: &dyn StatProvider,
        village: &VillageSnapshot,
    ) -> bool {
        let Some(def) = self.specs.get(id) else {
            return false;
        };
        if stats.level() < def.required_level {
            return false;
        }
        if village.population < def.required_population {
            return false;
        }
        if def
            .required_buildings
            .iter()
            .any(|needed| !village.buildings.iter().any(|have| have == needed))
        {
            return false;
        }
        if def
            .required_resources
            .iter()
            .any(|(resource, min)| village.resources.get(resource).copied().unwrap_or(0) < *min)
        {
            return false;
        }
        true
    }

    /// Linear efficiency curve: base plus a per-level bonus
    pub fn efficiency(&self, id: &str, level: u32) -> Option<f64> {
        self.specs
            .get(id)
            .map(|def| def.base_efficiency + def.per_level_bonus * level as f64)
    }

    /// The highest-threshold ability earned at this level, if any
    pub fn ability(&self, id: &str, level: u32) -> Option<&SpecialAbility> {
        self.specs
            .get(id)?
            .abilities
            .iter()
            .filter(|a| a.threshold <= level)
            .max_by_key(|a| a.threshold)
    }

    /// Built-in starter archetypes
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        catalog.add(SpecializationDefinition {
            id: "master_smith".into(),
            name: "Master Smith".into(),
            category: SkillCategory::Crafting,
            required_level: 5,
            required_population: 10,
            required_buildings: vec!["forge".into()],
            required_resources: [("iron".to_string(), 50u32)].into_iter().collect(),
            base_efficiency: 60.0,
            per_level_bonus: 4.0,
            abilities: vec![
                SpecialAbility {
                    threshold: 3,
                    description: "Repair tools without material cost".into(),
                },
                SpecialAbility {
                    threshold: 7,
                    description: "Forge masterwork weapons".into(),
                },
            ],
        });

        catalog.add(SpecializationDefinition {
            id: "forest_warden".into(),
            name: "Forest Warden".into(),
            category: SkillCategory::Gathering,
            required_level: 3,
            required_population: 5,
            required_buildings: vec!["lumber_camp".into()],
            required_resources: AHashMap::new(),
            base_efficiency: 55.0,
            per_level_bonus: 3.0,
            abilities: vec![SpecialAbility {
                threshold: 5,
                description: "Replant felled groves automatically".into(),
            }],
        });

        catalog.add(SpecializationDefinition {
            id: "battle_captain".into(),
            name: "Battle Captain".into(),
            category: SkillCategory::Leadership,
            required_level: 8,
            required_population: 20,
            required_buildings: vec!["barracks".into(), "watchtower".into()],
            required_resources: [("weapons".to_string(), 10u32)].into_iter().collect(),
            base_efficiency: 50.0,
            per_level_bonus: 5.0,
            abilities: vec![
                SpecialAbility {
                    threshold: 2,
                    description: "Drill militia twice as fast".into(),
                },
                SpecialAbility {
                    threshold: 6,
                    description: "Rally routed defenders".into(),
                },
            ],
        });

        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::progression::PlayerStats;

    fn stats(level: u32) -> PlayerStats {
        PlayerStats {
            level,
            achievements: Vec::new(),
        }
    }

    fn smith_village() -> VillageSnapshot {
        VillageSnapshot {
            population: 12,
            buildings: vec!["forge".into(), "granary".into()],
            resources: [("iron".to_string(), 80u32)].into_iter().collect(),
        }
    }

    #[test]
    fn test_unlock_checks_every_gate() {
        let catalog = SpecializationCatalog::with_defaults();
        let village = smith_village();

        assert!(catalog.can_unlock("master_smith", &stats(5), &village));
        assert!(!catalog.can_unlock("master_smith", &stats(4), &village));

        let mut poor = village.clone();
        poor.resources.insert("iron".into(), 10);
        assert!(!catalog.can_unlock("master_smith", &stats(5), &poor));

        let mut small = village.clone();
        small.population = 3;
        assert!(!catalog.can_unlock("master_smith", &stats(5), &small));

        let mut unbuilt = village;
        unbuilt.buildings.clear();
        assert!(!catalog.can_unlock("master_smith", &stats(5), &unbuilt));
    }

    #[test]
    fn test_unknown_specialization_is_locked() {
        let catalog = SpecializationCatalog::with_defaults();
        assert!(!catalog.can_unlock("no_such_spec", &stats(99), &smith_village()));
        assert!(catalog.efficiency("no_such_spec", 3).is_none());
        assert!(catalog.ability("no_such_spec", 3).is_none());
    }

    #[test]
    fn test_efficiency_is_linear_in_level() {
        let catalog = SpecializationCatalog::with_defaults();
        assert_eq!(catalog.efficiency("master_smith", 0), Some(60.0));
        assert_eq!(catalog.efficiency("master_smith", 5), Some(80.0));
    }

    #[test]
    fn test_highest_qualifying_ability_wins() {
        let catalog = SpecializationCatalog::with_defaults();
        assert!(catalog.ability("master_smith", 2).is_none());
        assert_eq!(catalog.ability("master_smith", 3).unwrap().threshold, 3);
        assert_eq!(catalog.ability("master_smith", 6).unwrap().threshold, 3);
        assert_eq!(catalog.ability("master_smith", 7).unwrap().threshold, 7);
        assert_eq!(catalog.ability("master_smith", 10).unwrap().threshold, 7);
    }
}
