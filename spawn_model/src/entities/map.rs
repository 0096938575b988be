//! Maps, their spots, and the lightweight map-list summaries.

use serde::{Deserialize, Serialize};

use super::{Spawn, SpawnId, SpotType};

/// Name given to maps nobody has named.
pub fn placeholder_map_name(number: i32) -> String {
    format!("Map {}", number)
}

/// Derive a display name from a map file path such as `World1/01_Lorencia_Town.att`.
///
/// Finds the first `<digits>_<label>.att` run and returns the label with
/// underscores turned into spaces.
pub fn map_name_from_file(file: &str) -> Option<String> {
    let bytes = file.as_bytes();
    for start in 0..bytes.len() {
        if !bytes[start].is_ascii_digit() {
            continue;
        }
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if bytes.get(end) != Some(&b'_') {
            continue;
        }
        let rest = &file[end + 1..];
        let first = match rest.chars().next() {
            Some(c) if c != '\n' => c.len_utf8(),
            _ => continue,
        };
        if let Some(pos) = rest[first..].find(".att") {
            let label = &rest[..first + pos];
            if !label.contains('\n') {
                return Some(label.replace('_', " "));
            }
        }
    }
    None
}

/// A typed, described group of spawns within a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    #[serde(rename = "type")]
    pub spot_type: SpotType,
    pub description: String,
    pub spawns: Vec<Spawn>,
}

impl Spot {
    /// Create an empty spot.
    pub fn new(spot_type: SpotType, description: impl Into<String>) -> Self {
        Self {
            spot_type,
            description: description.into(),
            spawns: Vec::new(),
        }
    }

    /// Add a spawn to this spot.
    pub fn with_spawn(mut self, spawn: Spawn) -> Self {
        self.spawns.push(spawn);
        self
    }

    /// Find a spawn by uuid.
    pub fn find(&self, uuid: SpawnId) -> Option<&Spawn> {
        self.spawns.iter().find(|s| s.uuid == uuid)
    }

    /// Sum of spawn counts.
    pub fn monster_count(&self) -> u64 {
        self.spawns.iter().map(|s| s.count as u64).sum()
    }

    /// Check if the spot holds no spawns.
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }
}

/// A map and every spot placed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRecord {
    pub number: i32,
    pub name: String,
    pub spots: Vec<Spot>,
}

impl MapRecord {
    /// Create a map with no spots.
    pub fn new(number: i32, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            spots: Vec::new(),
        }
    }

    /// Create a map carrying the placeholder name.
    pub fn unnamed(number: i32) -> Self {
        Self::new(number, placeholder_map_name(number))
    }

    /// Iterate over every spawn on the map, spot by spot.
    pub fn spawns(&self) -> impl Iterator<Item = &Spawn> {
        self.spots.iter().flat_map(|spot| spot.spawns.iter())
    }

    /// Find a spawn by uuid.
    pub fn find_spawn(&self, uuid: SpawnId) -> Option<&Spawn> {
        self.spots.iter().find_map(|spot| spot.find(uuid))
    }

    /// Find the spot holding a spawn.
    pub fn spot_of(&self, uuid: SpawnId) -> Option<&Spot> {
        self.spots.iter().find(|spot| spot.find(uuid).is_some())
    }

    /// Sum of spawn counts on the map.
    pub fn monster_count(&self) -> u64 {
        self.spots.iter().map(Spot::monster_count).sum()
    }

    /// Check if the map still carries the synthesized name.
    pub fn has_placeholder_name(&self) -> bool {
        self.name == placeholder_map_name(self.number)
    }
}

/// Map-list entry, known before any spawn data is loaded for the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    pub number: i32,
    pub file: Option<String>,
    pub name: Option<String>,
}

impl MapSummary {
    /// Create a summary from a map-list entry, deriving the name from the file.
    pub fn from_file(number: i32, file: Option<String>) -> Self {
        let name = file
            .as_deref()
            .and_then(map_name_from_file)
            .unwrap_or_else(|| placeholder_map_name(number));
        Self {
            number,
            file,
            name: Some(name),
        }
    }

    /// Check if the summary has a human-authored name.
    pub fn has_real_name(&self) -> bool {
        match &self.name {
            Some(name) => !name.is_empty() && *name != placeholder_map_name(self.number),
            None => false,
        }
    }

    /// Name to display, falling back to the placeholder.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| placeholder_map_name(self.number))
    }
}
