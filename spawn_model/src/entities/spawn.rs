//! Spawn placements and the value types used to create and edit them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{GridBounds, SpawnId};
use crate::attributes::{normalize_key, AttrValue};

/// `dir` value for spawns without a fixed facing.
pub const NO_DIRECTION: i32 = -1;

/// One placement of a monster type inside a spot.
///
/// A spawn is either a point (start == end, `distance` is the wander radius)
/// or an axis-aligned rectangle from start to end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spawn {
    pub uuid: SpawnId,
    /// Monster index; not validated against the monster table.
    pub index: i32,
    pub distance: u32,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub dir: i32,
    /// Number of monsters this placement stands for. Always at least 1.
    pub count: u32,
    pub element: Option<i32>,
    pub monster_name: String,
}

impl Spawn {
    /// Check if this is an area spawn rather than a point spawn.
    pub fn is_area(&self) -> bool {
        self.end_x > self.start_x || self.end_y > self.start_y
    }

    /// Check if a grid cell falls on this spawn's footprint.
    ///
    /// Areas cover their rectangle; points cover a square of half-size
    /// `distance` (at least one cell) around the start cell.
    pub fn covers(&self, x: i32, y: i32) -> bool {
        if self.is_area() {
            (self.start_x..=self.end_x).contains(&x) && (self.start_y..=self.end_y).contains(&y)
        } else {
            let reach = self.distance.max(1) as i64;
            (x as i64 - self.start_x as i64).abs() <= reach
                && (y as i64 - self.start_y as i64).abs() <= reach
        }
    }

    /// Read one editable field.
    pub fn field(&self, field: SpawnField) -> Option<i64> {
        match field {
            SpawnField::Index => Some(self.index as i64),
            SpawnField::Distance => Some(self.distance as i64),
            SpawnField::StartX => Some(self.start_x as i64),
            SpawnField::StartY => Some(self.start_y as i64),
            SpawnField::EndX => Some(self.end_x as i64),
            SpawnField::EndY => Some(self.end_y as i64),
            SpawnField::Dir => Some(self.dir as i64),
            SpawnField::Count => Some(self.count as i64),
            SpawnField::Element => self.element.map(i64::from),
        }
    }

    /// Return a copy with `patch` laid over this spawn. The uuid never changes.
    pub fn patched(&self, patch: &SpawnPatch, grid: GridBounds) -> Spawn {
        let clamp = |v: Option<i32>, current: i32| v.map_or(current, |v| grid.clamp(v as i64));
        Spawn {
            uuid: self.uuid,
            index: patch.index.unwrap_or(self.index),
            distance: patch.distance.unwrap_or(self.distance),
            start_x: clamp(patch.start_x, self.start_x),
            start_y: clamp(patch.start_y, self.start_y),
            end_x: clamp(patch.end_x, self.end_x),
            end_y: clamp(patch.end_y, self.end_y),
            dir: patch.dir.unwrap_or(self.dir),
            count: patch.count.map_or(self.count, |c| c.max(1)),
            element: patch.element.unwrap_or(self.element),
            monster_name: patch
                .monster_name
                .clone()
                .unwrap_or_else(|| self.monster_name.clone()),
        }
    }
}

/// The fields of a spawn that exist before it is placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnDraft {
    pub index: i32,
    pub distance: u32,
    pub start_x: i32,
    pub start_y: i32,
    /// Defaults to `start_x`.
    pub end_x: Option<i32>,
    /// Defaults to `start_y`.
    pub end_y: Option<i32>,
    pub dir: i32,
    pub count: u32,
    pub element: Option<i32>,
}

impl SpawnDraft {
    /// Create a single-monster point draft at the given cell.
    pub fn new(index: i32, x: i32, y: i32) -> Self {
        Self {
            index,
            distance: 0,
            start_x: x,
            start_y: y,
            end_x: None,
            end_y: None,
            dir: NO_DIRECTION,
            count: 1,
            element: None,
        }
    }

    /// Set the end corner.
    pub fn with_end(mut self, x: i32, y: i32) -> Self {
        self.end_x = Some(x);
        self.end_y = Some(y);
        self
    }

    /// Set the radius.
    pub fn with_distance(mut self, distance: u32) -> Self {
        self.distance = distance;
        self
    }

    /// Set the monster count.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Set the facing direction.
    pub fn with_dir(mut self, dir: i32) -> Self {
        self.dir = dir;
        self
    }

    /// Set the elemental variant.
    pub fn with_element(mut self, element: i32) -> Self {
        self.element = Some(element);
        self
    }

    /// Turn the draft into a spawn with a freshly minted uuid.
    ///
    /// Coordinates are clamped to the grid after the end corner defaults to
    /// the start corner, and `count` is raised to at least 1.
    pub fn into_spawn(self, grid: GridBounds, monster_name: impl Into<String>) -> Spawn {
        let end_x = self.end_x.unwrap_or(self.start_x);
        let end_y = self.end_y.unwrap_or(self.start_y);
        Spawn {
            uuid: SpawnId::new(),
            index: self.index,
            distance: self.distance,
            start_x: grid.clamp(self.start_x as i64),
            start_y: grid.clamp(self.start_y as i64),
            end_x: grid.clamp(end_x as i64),
            end_y: grid.clamp(end_y as i64),
            dir: self.dir,
            count: self.count.max(1),
            element: self.element,
            monster_name: monster_name.into(),
        }
    }
}

/// A partial spawn update. Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnPatch {
    pub index: Option<i32>,
    pub distance: Option<u32>,
    pub start_x: Option<i32>,
    pub start_y: Option<i32>,
    pub end_x: Option<i32>,
    pub end_y: Option<i32>,
    pub dir: Option<i32>,
    pub count: Option<u32>,
    /// `Some(None)` clears the element.
    pub element: Option<Option<i32>>,
    pub monster_name: Option<String>,
}

impl SpawnPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a single-field patch from an already coerced value.
    ///
    /// Every editable field is numeric; a text value is rejected, except that
    /// empty text clears `element`.
    pub fn from_field(field: SpawnField, value: &AttrValue) -> Result<Self, FieldError> {
        let number = match (field, value) {
            (SpawnField::Element, AttrValue::Text(t)) if t.is_empty() => {
                return Ok(Self {
                    element: Some(None),
                    ..Self::default()
                });
            }
            (_, AttrValue::Number(_)) => value.as_int().unwrap_or_default(),
            (_, AttrValue::Text(t)) => {
                return Err(FieldError::NotNumeric {
                    field,
                    value: t.clone(),
                });
            }
        };

        let signed = saturate_i32(number);
        let unsigned = number.clamp(0, u32::MAX as i64) as u32;
        let mut patch = Self::default();
        match field {
            SpawnField::Index => patch.index = Some(signed),
            SpawnField::Distance => patch.distance = Some(unsigned),
            SpawnField::StartX => patch.start_x = Some(signed),
            SpawnField::StartY => patch.start_y = Some(signed),
            SpawnField::EndX => patch.end_x = Some(signed),
            SpawnField::EndY => patch.end_y = Some(signed),
            SpawnField::Dir => patch.dir = Some(signed),
            SpawnField::Count => patch.count = Some(unsigned),
            SpawnField::Element => patch.element = Some(Some(signed)),
        }
        Ok(patch)
    }
}

pub(crate) fn saturate_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Editable spawn fields, named as in the source files (lower-camel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpawnField {
    Index,
    Distance,
    StartX,
    StartY,
    EndX,
    EndY,
    Dir,
    Count,
    Element,
}

impl SpawnField {
    /// Fields in detail-view order.
    pub const ALL: [SpawnField; 9] = [
        SpawnField::Index,
        SpawnField::Distance,
        SpawnField::StartX,
        SpawnField::StartY,
        SpawnField::EndX,
        SpawnField::EndY,
        SpawnField::Dir,
        SpawnField::Count,
        SpawnField::Element,
    ];

    /// Resolve a field from its attribute name, in any leading-letter case.
    pub fn parse(name: &str) -> Result<Self, FieldError> {
        let key = normalize_key(name.trim());
        Self::ALL
            .into_iter()
            .find(|field| field.name() == key)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))
    }

    /// The lower-camel attribute name.
    pub fn name(self) -> &'static str {
        match self {
            SpawnField::Index => "index",
            SpawnField::Distance => "distance",
            SpawnField::StartX => "startX",
            SpawnField::StartY => "startY",
            SpawnField::EndX => "endX",
            SpawnField::EndY => "endY",
            SpawnField::Dir => "dir",
            SpawnField::Count => "count",
            SpawnField::Element => "element",
        }
    }
}

impl std::fmt::Display for SpawnField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected spawn field edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown spawn field `{0}`")]
    UnknownField(String),
    #[error("spawn field `{field}` expects a number, got `{value}`")]
    NotNumeric { field: SpawnField, value: String },
}
