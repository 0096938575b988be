//! Entity definitions for the spawn model.

mod map;
mod monster;
mod spawn;

pub use map::*;
pub use monster::*;
pub use spawn::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest grid coordinate used when nothing else is configured.
pub const DEFAULT_GRID_MAX: i32 = 255;

/// Unique identifier for spawn placements.
///
/// Minted once when a spawn is created and never reused; it survives every
/// update so it is the only stable handle on a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpawnId(pub Uuid);

impl SpawnId {
    /// Create a new random spawn ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a spawn ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a spawn ID from its hyphenated string form.
    pub fn parse_str(input: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(input).map(Self)
    }

    /// Create a nil/empty spawn ID.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for SpawnId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SpawnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of spot a map groups its spawns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpotType {
    /// NPCs and traps.
    Npc = 0,
    MultiSpawn = 1,
    SingleSpawn = 2,
    ElementalSpawn = 3,
}

impl SpotType {
    pub const ALL: [SpotType; 4] = [
        SpotType::Npc,
        SpotType::MultiSpawn,
        SpotType::SingleSpawn,
        SpotType::ElementalSpawn,
    ];

    /// Look up a spot type by its numeric code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SpotType::Npc),
            1 => Some(SpotType::MultiSpawn),
            2 => Some(SpotType::SingleSpawn),
            3 => Some(SpotType::ElementalSpawn),
            _ => None,
        }
    }

    /// The numeric code used by the source files.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Heading used in spot listings.
    pub fn label(self) -> &'static str {
        match self {
            SpotType::Npc => "NPC/Traps",
            SpotType::MultiSpawn => "Multiple Monsters Spawn",
            SpotType::SingleSpawn => "Single Monster Spawn",
            SpotType::ElementalSpawn => "Elemental Monster Spawn",
        }
    }

    /// Compact label for tooltips.
    pub fn short_label(self) -> &'static str {
        match self {
            SpotType::Npc => "NPC/Trap",
            SpotType::MultiSpawn => "Multi-Spawn",
            SpotType::SingleSpawn => "Single",
            SpotType::ElementalSpawn => "Elemental",
        }
    }
}

/// The square placement grid, `0..=max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub max: i32,
}

impl GridBounds {
    /// Create grid bounds with the given maximum coordinate.
    pub fn new(max: i32) -> Self {
        Self { max: max.max(0) }
    }

    /// Saturate a coordinate into the grid.
    pub fn clamp(&self, value: i64) -> i32 {
        value.clamp(0, self.max as i64) as i32
    }

    /// Check if a coordinate pair lies on the grid.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..=self.max).contains(&x) && (0..=self.max).contains(&y)
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_MAX)
    }
}
