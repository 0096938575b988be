//! Spawn catalog - the map -> spot -> spawn hierarchy and every edit on it.
//!
//! The catalog is a persistent value: each mutation takes `&self` and returns
//! the next catalog. Maps are stored behind `Arc`, so an edit clones only the
//! map it touches and every other map stays pointer-shared with the previous
//! snapshot. Failed preconditions (unknown map, unknown uuid) are no-ops.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::entities::{
    placeholder_map_name, GridBounds, MapRecord, MonsterTable, Spawn, SpawnDraft, SpawnId,
    SpawnPatch, Spot, SpotType,
};

const LOG_TARGET: &str = "spawn_model::catalog";

/// Every map with spawn data, keyed by map number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnCatalog {
    maps: BTreeMap<i32, Arc<MapRecord>>,
    grid: GridBounds,
}

impl SpawnCatalog {
    /// Create an empty catalog on the given grid.
    pub fn new(grid: GridBounds) -> Self {
        Self {
            maps: BTreeMap::new(),
            grid,
        }
    }

    /// Build a catalog from finished maps. A later map replaces an earlier one with the same number.
    pub fn from_maps(maps: impl IntoIterator<Item = MapRecord>, grid: GridBounds) -> Self {
        Self {
            maps: maps
                .into_iter()
                .map(|map| (map.number, Arc::new(map)))
                .collect(),
            grid,
        }
    }

    /// The grid spawn coordinates are clamped to.
    pub fn grid(&self) -> GridBounds {
        self.grid
    }

    /// Get a map by number.
    pub fn map(&self, number: i32) -> Option<&MapRecord> {
        self.maps.get(&number).map(Arc::as_ref)
    }

    /// Get the shared handle of a map, for identity comparisons across snapshots.
    pub fn map_handle(&self, number: i32) -> Option<&Arc<MapRecord>> {
        self.maps.get(&number)
    }

    /// Iterate over maps in ascending number order.
    pub fn maps(&self) -> impl Iterator<Item = &MapRecord> {
        self.maps.values().map(Arc::as_ref)
    }

    /// Check if a map exists.
    pub fn contains_map(&self, number: i32) -> bool {
        self.maps.contains_key(&number)
    }

    /// Get the number of maps.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Check if the catalog holds no maps.
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Find a spawn on a map.
    pub fn find_spawn(&self, map_number: i32, uuid: SpawnId) -> Option<&Spawn> {
        self.map(map_number)?.find_spawn(uuid)
    }

    /// Find the spot holding a spawn.
    pub fn spot_of(&self, map_number: i32, uuid: SpawnId) -> Option<&Spot> {
        self.map(map_number)?.spot_of(uuid)
    }

    /// Sum of `count` over every spawn of every map.
    pub fn total_monster_count(&self) -> u64 {
        self.maps().map(MapRecord::monster_count).sum()
    }

    /// Sum of `count` over one map, 0 when the map is unknown.
    pub fn map_monster_count(&self, map_number: i32) -> u64 {
        self.map(map_number).map_or(0, MapRecord::monster_count)
    }

    /// Append an empty spot to a map.
    ///
    /// An empty description becomes `New Spot {n}`, `n` being the spot's
    /// position counted from 1.
    pub fn add_spot(&self, map_number: i32, spot_type: SpotType, description: &str) -> Self {
        let description = description.trim();
        let next = self.edit_map(map_number, |map| {
            let description = if description.is_empty() {
                format!("New Spot {}", map.spots.len() + 1)
            } else {
                description.to_string()
            };
            map.spots.push(Spot::new(spot_type, description));
            true
        });
        if next.is_none() {
            tracing::debug!(target: LOG_TARGET, map = map_number, "add_spot.missing_map");
        }
        next.unwrap_or_else(|| self.clone())
    }

    /// Place a new spawn, returning the next catalog and the minted uuid.
    ///
    /// The spawn goes into the first spot of `spot_type` on the map; the spot
    /// (and the map itself) are created when missing.
    pub fn add_spawn(
        &self,
        map_number: i32,
        spot_type: SpotType,
        spot_description: &str,
        draft: SpawnDraft,
        monsters: &MonsterTable,
    ) -> (Self, SpawnId) {
        let monster_name = monsters.name_of(draft.index).to_string();
        let spawn = draft.into_spawn(self.grid, monster_name);
        let uuid = spawn.uuid;

        let mut map = self
            .map(map_number)
            .cloned()
            .unwrap_or_else(|| MapRecord::new(map_number, placeholder_map_name(map_number)));

        match map.spots.iter_mut().find(|s| s.spot_type == spot_type) {
            Some(spot) => spot.spawns.push(spawn),
            None => map
                .spots
                .push(Spot::new(spot_type, spot_description).with_spawn(spawn)),
        }

        tracing::debug!(target: LOG_TARGET, map = map_number, uuid = %uuid, "add_spawn");
        (self.with_map(map), uuid)
    }

    /// Remove a spawn and prune any spot left empty.
    pub fn delete_spawn(&self, map_number: i32, uuid: SpawnId) -> Self {
        let next = self.edit_map(map_number, |map| {
            let before = map.spots.iter().map(|s| s.spawns.len()).sum::<usize>();
            for spot in &mut map.spots {
                spot.spawns.retain(|s| s.uuid != uuid);
            }
            let after = map.spots.iter().map(|s| s.spawns.len()).sum::<usize>();
            if before == after {
                return false;
            }
            map.spots.retain(|s| !s.is_empty());
            true
        });
        if next.is_none() {
            tracing::debug!(target: LOG_TARGET, map = map_number, uuid = %uuid, "delete_spawn.not_found");
        }
        next.unwrap_or_else(|| self.clone())
    }

    /// Overlay `patch` on a spawn. The uuid is preserved; an empty patch changes nothing.
    pub fn update_spawn(&self, map_number: i32, uuid: SpawnId, patch: &SpawnPatch) -> Self {
        if patch.is_empty() {
            return self.clone();
        }
        let grid = self.grid;
        let next = self.edit_map(map_number, |map| {
            for spot in &mut map.spots {
                if let Some(spawn) = spot.spawns.iter_mut().find(|s| s.uuid == uuid) {
                    *spawn = spawn.patched(patch, grid);
                    return true;
                }
            }
            false
        });
        if next.is_none() {
            tracing::debug!(target: LOG_TARGET, map = map_number, uuid = %uuid, "update_spawn.not_found");
        }
        next.unwrap_or_else(|| self.clone())
    }

    /// Copy-on-write edit of one map. `None` when the map is missing or `edit` reports no change.
    fn edit_map<F>(&self, map_number: i32, edit: F) -> Option<Self>
    where
        F: FnOnce(&mut MapRecord) -> bool,
    {
        let mut map = self.map(map_number)?.clone();
        if edit(&mut map) {
            Some(self.with_map(map))
        } else {
            None
        }
    }

    fn with_map(&self, map: MapRecord) -> Self {
        let mut maps = self.maps.clone();
        maps.insert(map.number, Arc::new(map));
        Self {
            maps,
            grid: self.grid,
        }
    }
}
