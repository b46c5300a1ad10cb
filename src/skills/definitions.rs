//! Static skill definitions
//!
//! Definitions are immutable data; live progress lives in the
//! [`SkillBook`](super::SkillBook). A skill only materializes there
//! once a point is spent learning it.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;

/// The fixed category enumeration shared by skills and specializations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Combat,
    Crafting,
    Gathering,
    Building,
    Magic,
    Leadership,
    Survival,
    Trade,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 8] = [
        SkillCategory::Combat,
        SkillCategory::Crafting,
        SkillCategory::Gathering,
        SkillCategory::Building,
        SkillCategory::Magic,
        SkillCategory::Leadership,
        SkillCategory::Survival,
        SkillCategory::Trade,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SkillCategory::Combat => "Combat",
            SkillCategory::Crafting => "Crafting",
            SkillCategory::Gathering => "Gathering",
            SkillCategory::Building => "Building",
            SkillCategory::Magic => "Magic",
            SkillCategory::Leadership => "Leadership",
            SkillCategory::Survival => "Survival",
            SkillCategory::Trade => "Trade",
        }
    }
}

/// Cosmetic rarity tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Default for Rarity {
    fn default() -> Self {
        Rarity::Common
    }
}

impl Rarity {
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// A passive effect granted by a learned skill
///
/// Magnitudes are per skill level; consumers scale by the current level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkillEffect {
    StatBonus { stat: String, per_level: f64 },
    ResourceBonus { resource: String, per_level: f64 },
    CraftBonus { recipe: String, per_level: f64 },
    CombatBonus { aspect: String, per_level: f64 },
    Special { ability: String },
}

impl SkillEffect {
    /// Same effect with its magnitude scaled to a concrete level
    pub fn scaled(&self, level: u32) -> SkillEffect {
        let level = level as f64;
        match self {
            SkillEffect::StatBonus { stat, per_level } => SkillEffect::StatBonus {
                stat: stat.clone(),
                per_level: per_level * level,
            },
            SkillEffect::ResourceBonus { resource, per_level } => SkillEffect::ResourceBonus {
                resource: resource.clone(),
                per_level: per_level * level,
            },
            SkillEffect::CraftBonus { recipe, per_level } => SkillEffect::CraftBonus {
                recipe: recipe.clone(),
                per_level: per_level * level,
            },
            SkillEffect::CombatBonus { aspect, per_level } => SkillEffect::CombatBonus {
                aspect: aspect.clone(),
                per_level: per_level * level,
            },
            SkillEffect::Special { .. } => self.clone(),
        }
    }
}

/// Gating for learning a skill
///
/// Unset categories are vacuously satisfied. The `items` list is
/// carried as data for the inventory layer; the unlock predicate
/// evaluates player level, prerequisite skills and achievements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnlockRequirements {
    #[serde(default)]
    pub player_level: Option<u32>,
    /// Prerequisite skill id -> minimum level
    #[serde(default)]
    pub skills: AHashMap<String, u32>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

/// One learnable ability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub category: SkillCategory,
    pub max_level: u32,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub requirements: UnlockRequirements,
    #[serde(default)]
    pub effects: Vec<SkillEffect>,
}

/// Layout metadata for the skill tree screen
///
/// Purely cosmetic; never consulted by progression logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTreeNode {
    pub skill_id: String,
    pub position: (f32, f32),
    #[serde(default)]
    pub connections: Vec<String>,
    pub tier: u32,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    skills: Vec<SkillDefinition>,
    #[serde(default)]
    tree: Vec<SkillTreeNode>,
}

/// Catalog of all skill definitions plus the tree layout
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    skills: AHashMap<String, SkillDefinition>,
    tree: Vec<SkillTreeNode>,
}

impl SkillCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, def: SkillDefinition) {
        self.skills.insert(def.id.clone(), def);
    }

    pub fn add_node(&mut self, node: SkillTreeNode) {
        self.tree.push(node);
    }

    pub fn get(&self, id: &str) -> Option<&SkillDefinition> {
        self.skills.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.skills.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values()
    }

    pub fn in_category(&self, category: SkillCategory) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values().filter(move |d| d.category == category)
    }

    pub fn tree(&self) -> &[SkillTreeNode] {
        &self.tree
    }

    /// Load definitions from TOML game data
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut catalog = Self::new();
        for def in file.skills {
            catalog.add(def);
        }
        for node in file.tree {
            catalog.add_node(node);
        }
        Ok(catalog)
    }

    /// Built-in starter catalog
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        catalog.add(SkillDefinition {
            id: "basic_combat".into(),
            name: "Basic Combat".into(),
            description: "Fundamentals of melee fighting.".into(),
            icon: "sword".into(),
            category: SkillCategory::Combat,
            max_level: 10,
            rarity: Rarity::Common,
            requirements: UnlockRequirements::default(),
            effects: vec![SkillEffect::CombatBonus {
                aspect: "attack".into(),
                per_level: 2.0,
            }],
        });

        catalog.add(SkillDefinition {
            id: "sword_mastery".into(),
            name: "Sword Mastery".into(),
            description: "Precise bladework building on combat basics.".into(),
            icon: "longsword".into(),
            category: SkillCategory::Combat,
            max_level: 10,
            rarity: Rarity::Rare,
            requirements: UnlockRequirements {
                player_level: Some(5),
                skills: [("basic_combat".to_string(), 3u32)].into_iter().collect(),
                items: Vec::new(),
                achievements: Vec::new(),
            },
            effects: vec![
                SkillEffect::CombatBonus {
                    aspect: "attack".into(),
                    per_level: 3.0,
                },
                SkillEffect::StatBonus {
                    stat: "strength".into(),
                    per_level: 1.0,
                },
            ],
        });

        catalog.add(SkillDefinition {
            id: "woodcutting".into(),
            name: "Woodcutting".into(),
            description: "Fell trees faster and waste less timber.".into(),
            icon: "axe".into(),
            category: SkillCategory::Gathering,
            max_level: 10,
            rarity: Rarity::Common,
            requirements: UnlockRequirements::default(),
            effects: vec![SkillEffect::ResourceBonus {
                resource: "wood".into(),
                per_level: 5.0,
            }],
        });

        catalog.add(SkillDefinition {
            id: "herbalism".into(),
            name: "Herbalism".into(),
            description: "Identify and harvest wild herbs.".into(),
            icon: "herb".into(),
            category: SkillCategory::Gathering,
            max_level: 8,
            rarity: Rarity::Uncommon,
            requirements: UnlockRequirements::default(),
            effects: vec![SkillEffect::ResourceBonus {
                resource: "herbs".into(),
                per_level: 4.0,
            }],
        });

        catalog.add(SkillDefinition {
            id: "carpentry".into(),
            name: "Carpentry".into(),
            description: "Turn raw timber into furniture and fittings.".into(),
            icon: "plane".into(),
            category: SkillCategory::Crafting,
            max_level: 10,
            rarity: Rarity::Common,
            requirements: UnlockRequirements {
                player_level: None,
                skills: [("woodcutting".to_string(), 2u32)].into_iter().collect(),
                items: Vec::new(),
                achievements: Vec::new(),
            },
            effects: vec![SkillEffect::CraftBonus {
                recipe: "furniture".into(),
                per_level: 3.0,
            }],
        });

        catalog.add(SkillDefinition {
            id: "masonry".into(),
            name: "Masonry".into(),
            description: "Raise stone walls that last generations.".into(),
            icon: "trowel".into(),
            category: SkillCategory::Building,
            max_level: 10,
            rarity: Rarity::Common,
            requirements: UnlockRequirements::default(),
            effects: vec![SkillEffect::StatBonus {
                stat: "construction_speed".into(),
                per_level: 2.0,
            }],
        });

        catalog.add(SkillDefinition {
            id: "arcane_focus".into(),
            name: "Arcane Focus".into(),
            description: "Channel raw mana without burning out.".into(),
            icon: "rune".into(),
            category: SkillCategory::Magic,
            max_level: 5,
            rarity: Rarity::Epic,
            requirements: UnlockRequirements {
                player_level: Some(10),
                skills: AHashMap::new(),
                items: Vec::new(),
                achievements: vec!["first_spell".into()],
            },
            effects: vec![
                SkillEffect::StatBonus {
                    stat: "mana".into(),
                    per_level: 10.0,
                },
                SkillEffect::Special {
                    ability: "mana_shield".into(),
                },
            ],
        });

        catalog.add(SkillDefinition {
            id: "bartering".into(),
            name: "Bartering".into(),
            description: "Squeeze better prices out of traveling merchants.".into(),
            icon: "scales".into(),
            category: SkillCategory::Trade,
            max_level: 10,
            rarity: Rarity::Uncommon,
            requirements: UnlockRequirements::default(),
            effects: vec![SkillEffect::StatBonus {
                stat: "trade_margin".into(),
                per_level: 1.5,
            }],
        });

        catalog.add(SkillDefinition {
            id: "rally_cry".into(),
            name: "Rally Cry".into(),
            description: "Lift the spirits of nearby villagers.".into(),
            icon: "banner".into(),
            category: SkillCategory::Leadership,
            max_level: 5,
            rarity: Rarity::Rare,
            requirements: UnlockRequirements {
                player_level: Some(8),
                skills: AHashMap::new(),
                items: Vec::new(),
                achievements: Vec::new(),
            },
            effects: vec![SkillEffect::StatBonus {
                stat: "morale".into(),
                per_level: 4.0,
            }],
        });

        catalog.add(SkillDefinition {
            id: "foraging".into(),
            name: "Foraging".into(),
            description: "Live off the land when stores run low.".into(),
            icon: "basket".into(),
            category: SkillCategory::Survival,
            max_level: 8,
            rarity: Rarity::Common,
            requirements: UnlockRequirements::default(),
            effects: vec![SkillEffect::ResourceBonus {
                resource: "food".into(),
                per_level: 3.0,
            }],
        });

        catalog.add_node(SkillTreeNode {
            skill_id: "basic_combat".into(),
            position: (0.0, 0.0),
            connections: vec!["sword_mastery".into()],
            tier: 1,
        });
        catalog.add_node(SkillTreeNode {
            skill_id: "sword_mastery".into(),
            position: (1.0, 0.0),
            connections: Vec::new(),
            tier: 2,
        });
        catalog.add_node(SkillTreeNode {
            skill_id: "woodcutting".into(),
            position: (0.0, 1.0),
            connections: vec!["carpentry".into()],
            tier: 1,
        });
        catalog.add_node(SkillTreeNode {
            skill_id: "carpentry".into(),
            position: (1.0, 1.0),
            connections: Vec::new(),
            tier: 2,
        });

        catalog
    }
}
