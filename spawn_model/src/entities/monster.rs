//! Monster definitions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::attributes::AttrValue;

/// Display name used when a spawn references a monster index nobody defined.
pub const UNKNOWN_MONSTER_NAME: &str = "Unknown";

/// A monster type as defined by the monster list.
///
/// Only `index` and `name` are required; every other attribute (level, hp,
/// drop rates, skills, ...) is kept in `attributes` under its lower-camel name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub index: i32,
    pub name: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Monster {
    /// Create a monster with no extra attributes.
    pub fn new(index: i32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an extra attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Get an extra attribute by lower-camel name.
    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Get a numeric extra attribute.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.attribute(key).and_then(AttrValue::as_number)
    }

    /// Monster level, when the source provides one.
    pub fn level(&self) -> Option<i64> {
        self.attribute("level").and_then(AttrValue::as_int)
    }
}

/// Read-only monster table, in source order and indexed by monster index.
#[derive(Debug, Clone, Default)]
pub struct MonsterTable {
    monsters: Vec<Monster>,
    by_index: HashMap<i32, usize>,
}

impl MonsterTable {
    /// Build a table. When several monsters share an index the first one wins lookups.
    pub fn new(monsters: Vec<Monster>) -> Self {
        let mut by_index = HashMap::with_capacity(monsters.len());
        for (position, monster) in monsters.iter().enumerate() {
            by_index.entry(monster.index).or_insert(position);
        }
        Self { monsters, by_index }
    }

    /// Get a monster by index.
    pub fn get(&self, index: i32) -> Option<&Monster> {
        self.by_index.get(&index).map(|&pos| &self.monsters[pos])
    }

    /// Display name for a monster index, [`UNKNOWN_MONSTER_NAME`] when undefined.
    pub fn name_of(&self, index: i32) -> &str {
        self.get(index)
            .map(|m| m.name.as_str())
            .unwrap_or(UNKNOWN_MONSTER_NAME)
    }

    /// Iterate over monsters in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.iter()
    }

    /// Get the total number of monsters.
    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }
}

impl FromIterator<Monster> for MonsterTable {
    fn from_iter<T: IntoIterator<Item = Monster>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
