//! Item definitions: footprints and leveled stats per kind

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::Deserialize;
use tracing::warn;

use crate::io::configuration::ItemConfig;
use crate::io::error::Result;
use crate::spatial::footprint::Footprint;

/// Numeric item type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ItemKind(pub u16);

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind:{}", self.0)
    }
}

/// Stats of one item level
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LevelStats {
    /// Level number, starting at 1
    pub level: u32,
    /// Damage dealt per attack
    #[serde(default)]
    pub damage: u32,
    /// Seconds between attacks
    #[serde(default)]
    pub cooldown_secs: f32,
}

/// Everything authored about one item kind
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDefinition {
    /// Kind this definition describes
    pub kind: ItemKind,
    /// Display name
    pub name: String,
    /// Occupancy footprint, shared by every level
    pub footprint: Footprint,
    /// Stats per level
    pub levels: Vec<LevelStats>,
}

impl ItemDefinition {
    /// Stats for `level`, if authored
    pub fn level_stats(&self, level: u32) -> Option<LevelStats> {
        self.levels.iter().find(|stats| stats.level == level).copied()
    }

    /// Lowest authored level, or 1 when none are authored
    pub fn base_level(&self) -> u32 {
        self.levels.iter().map(|stats| stats.level).min().unwrap_or(1)
    }
}

/// Read-only source of item data
pub trait ItemDataProvider {
    /// Definition for `kind`
    fn definition(&self, kind: ItemKind) -> Option<&ItemDefinition>;

    /// Stats for `kind` at `level`
    fn level_stats(&self, kind: ItemKind, level: u32) -> Option<LevelStats> {
        self.definition(kind)
            .and_then(|definition| definition.level_stats(level))
    }
}

/// Item definitions indexed by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCatalog {
    definitions: BTreeMap<ItemKind, ItemDefinition>,
}

impl ItemDataProvider for ItemCatalog {
    fn definition(&self, kind: ItemKind) -> Option<&ItemDefinition> {
        self.definitions.get(&kind)
    }
}

impl ItemCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock items: a mix of single cells, bars, a square and an L shape
    ///
    /// # Errors
    ///
    /// Only fails if a built-in footprint is malformed.
    pub fn builtin() -> Result<Self> {
        let stock: [(u16, &str, &[&str]); 5] = [
            (1, "Dagger", &["#"]),
            (2, "Sword", &["#", "#"]),
            (3, "Shield", &["##", "##"]),
            (4, "Bow", &["#.", "##"]),
            (5, "Spear", &["###"]),
        ];

        let mut catalog = Self::new();
        for (kind, name, rows) in stock {
            let levels = (1..=3)
                .map(|level| LevelStats {
                    level,
                    damage: u32::from(kind) * 2 + level * 3,
                    cooldown_secs: 1.5 - 0.25 * level as f32,
                })
                .collect();
            catalog.insert(ItemDefinition {
                kind: ItemKind(kind),
                name: name.to_owned(),
                footprint: Footprint::from_rows(rows)?,
                levels,
            });
        }
        Ok(catalog)
    }

    /// Build from authored item entries
    ///
    /// # Errors
    ///
    /// Returns an error if any footprint fails to parse.
    pub fn from_config(items: &[ItemConfig]) -> Result<Self> {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(ItemDefinition {
                kind: ItemKind(item.kind),
                name: item.name.clone(),
                footprint: Footprint::from_rows(item.footprint.as_slice())?,
                levels: item.levels.clone(),
            });
        }
        Ok(catalog)
    }

    /// Add or replace a definition, returning the replaced one
    pub fn insert(&mut self, definition: ItemDefinition) -> Option<ItemDefinition> {
        let replaced = self.definitions.insert(definition.kind, definition);
        if let Some(old) = &replaced {
            warn!(kind = %old.kind, name = %old.name, "item definition replaced");
        }
        replaced
    }

    /// Definition for `kind`
    pub fn get(&self, kind: ItemKind) -> Option<&ItemDefinition> {
        self.definitions.get(&kind)
    }

    /// Every kind in ascending order
    pub fn kinds(&self) -> Vec<ItemKind> {
        self.definitions.keys().copied().collect()
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True when no kinds are defined
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Uniformly random kind, `None` for an empty catalog
    pub fn random_kind<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ItemKind> {
        if self.definitions.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.definitions.len());
        self.definitions.keys().nth(index).copied()
    }
}
