//! Placement controller - turns pointer gestures on the map canvas into spawn placements.
//!
//! The gesture is a two-state machine:
//! 1. **Idle**: nothing pending. A pointer-down with a monster armed starts a drag.
//! 2. **Dragging**: every pointer-move drags the end corner along.
//! 3. On pointer-up the gesture resolves to a point spawn when the pointer barely
//!    moved, or to an area spawn over the normalized rectangle otherwise.
//!
//! Pixel positions are mapped to grid cells with a fixed scale and saturated
//! to the grid, so drags leaving the canvas stick to its edge. Hovering is
//! read-only and never affects the gesture.

mod gesture;

pub use gesture::*;

use serde::{Deserialize, Serialize};
use spawn_model::{GridBounds, MapRecord, SpawnDraft, SpawnId, SpotType, NO_DIRECTION};

/// Settings for the placement gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    pub grid: GridBounds,
    /// Canvas pixels per grid cell.
    pub pixels_per_cell: f32,
    /// Gestures moving less than this many cells on both axes count as clicks.
    pub click_threshold: i32,
    /// Radius of clicked point spawns.
    pub point_radius: u32,
    /// Monster count of dragged areas unless the operator entered one.
    pub area_default_count: u32,
    /// Lower bound for the radius derived from a dragged area.
    pub min_area_radius: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            grid: GridBounds::default(),
            pixels_per_cell: 2.0,
            click_threshold: 5,
            point_radius: 10,
            area_default_count: 10,
            min_area_radius: 1,
        }
    }
}

/// What a finished gesture asks the model to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementCommand {
    /// Place a single monster at a cell.
    Point { x: i32, y: i32 },
    /// Place `count` monsters over a normalized rectangle.
    Area {
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        count: u32,
    },
}

impl PlacementCommand {
    /// The kind of spot this placement is filed under.
    pub fn spot_type(&self) -> SpotType {
        match self {
            PlacementCommand::Point { .. } => SpotType::SingleSpawn,
            PlacementCommand::Area { .. } => SpotType::MultiSpawn,
        }
    }

    /// Description for the spot when it has to be created.
    pub fn spot_description(&self) -> &'static str {
        self.spot_type().label()
    }

    /// Build the spawn draft for a monster.
    ///
    /// Coordinates are saturated into the grid first; an area's radius is
    /// measured on the rectangle that will be stored.
    pub fn into_draft(self, monster_index: i32, config: &PlacementConfig) -> SpawnDraft {
        let grid = config.grid;
        match self {
            PlacementCommand::Point { x, y } => {
                SpawnDraft::new(monster_index, grid.clamp(x as i64), grid.clamp(y as i64))
                    .with_distance(config.point_radius)
                    .with_count(1)
                    .with_dir(NO_DIRECTION)
            }
            PlacementCommand::Area {
                start_x,
                start_y,
                end_x,
                end_y,
                count,
            } => {
                let rect = GridRect::new(GridPoint::new(start_x, start_y), GridPoint::new(end_x, end_y))
                    .clamped(grid)
                    .normalized();
                let radius = (rect.half_diagonal().floor() as u32).max(config.min_area_radius);
                SpawnDraft::new(monster_index, rect.start.x, rect.start.y)
                    .with_end(rect.end.x, rect.end.y)
                    .with_distance(radius)
                    .with_count(count)
                    .with_dir(NO_DIRECTION)
            }
        }
    }
}

/// What the pointer is resting on, for the tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverInfo {
    pub uuid: SpawnId,
    pub monster_name: String,
    pub spot_label: String,
    pub x: i32,
    pub y: i32,
    pub count: u32,
    pub radius: u32,
    pub dir: i32,
}

/// Click-or-drag placement state for one map view.
#[derive(Debug, Clone)]
pub struct PlacementController {
    config: PlacementConfig,
    state: GestureState,
    armed: Option<i32>,
    area_count: Option<u32>,
    active_map: Option<i32>,
}

impl PlacementController {
    /// Create an idle controller.
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
            armed: None,
            area_count: None,
            active_map: None,
        }
    }

    /// Create a controller with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PlacementConfig::default())
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Check if a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging()
    }

    /// The monster index that placements will use, if one is armed.
    pub fn armed(&self) -> Option<i32> {
        self.armed
    }

    /// Arm a monster for placement.
    pub fn arm(&mut self, monster_index: i32) {
        self.armed = Some(monster_index);
    }

    /// Drop the armed monster and any gesture in flight.
    pub fn disarm(&mut self) {
        self.armed = None;
        self.reset();
    }

    /// Set the operator-entered monster count for dragged areas; `None` restores the default.
    pub fn set_area_count(&mut self, count: Option<u32>) {
        self.area_count = count.map(|c| c.max(1));
    }

    /// Count the next dragged area will get.
    pub fn area_count(&self) -> u32 {
        self.area_count.unwrap_or(self.config.area_default_count)
    }

    pub fn active_map(&self) -> Option<i32> {
        self.active_map
    }

    /// Switch the map this view shows, dropping any gesture in flight.
    pub fn set_active_map(&mut self, map_number: Option<i32>) {
        self.active_map = map_number;
        self.reset();
    }

    /// Return to idle, discarding the pending rectangle.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Map a pixel position to its grid cell, saturating at the grid edges.
    pub fn to_grid(&self, pos: PixelPos) -> GridPoint {
        let (x, y) = self.raw_cell(pos);
        GridPoint::new(self.config.grid.clamp(x), self.config.grid.clamp(y))
    }

    fn raw_cell(&self, pos: PixelPos) -> (i64, i64) {
        let scale = self.config.pixels_per_cell;
        ((pos.x / scale).floor() as i64, (pos.y / scale).floor() as i64)
    }

    /// Pointer pressed on the canvas. Returns whether a drag started.
    pub fn pointer_down(&mut self, pos: PixelPos) -> bool {
        if self.armed.is_none() {
            return false;
        }
        let cell = self.to_grid(pos);
        self.state = GestureState::Dragging {
            start: cell,
            end: cell,
        };
        true
    }

    /// Pointer moved over the canvas. Only a drag in progress reacts.
    pub fn pointer_move(&mut self, pos: PixelPos) {
        if let GestureState::Dragging { start, .. } = self.state {
            self.state = GestureState::Dragging {
                start,
                end: self.to_grid(pos),
            };
        }
    }

    /// Pointer released. Resolves a drag in progress into a placement.
    pub fn pointer_up(&mut self, pos: PixelPos) -> Option<PlacementCommand> {
        let GestureState::Dragging { start, .. } = self.state else {
            return None;
        };
        let end = self.to_grid(pos);
        self.state = GestureState::Idle;

        let threshold = self.config.click_threshold;
        let is_click = (start.x - end.x).abs() < threshold && (start.y - end.y).abs() < threshold;
        if is_click {
            return Some(PlacementCommand::Point {
                x: start.x,
                y: start.y,
            });
        }

        let rect = GridRect::new(start, end).normalized();
        Some(PlacementCommand::Area {
            start_x: rect.start.x,
            start_y: rect.start.y,
            end_x: rect.end.x,
            end_y: rect.end.y,
            count: self.area_count(),
        })
    }

    /// The normalized rectangle being dragged, for preview drawing.
    pub fn pending_rect(&self) -> Option<GridRect> {
        self.state.rect().map(|rect| rect.normalized())
    }

    /// Report the topmost spawn under the pointer. Never touches the gesture.
    pub fn hover(&self, pos: PixelPos, map: &MapRecord) -> Option<HoverInfo> {
        let (x, y) = self.raw_cell(pos);
        let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
            return None;
        };
        if !self.config.grid.contains(x, y) {
            return None;
        }

        map.spots
            .iter()
            .flat_map(|spot| spot.spawns.iter().map(move |spawn| (spot, spawn)))
            .filter(|(_, spawn)| spawn.covers(x, y))
            .last()
            .map(|(spot, spawn)| HoverInfo {
                uuid: spawn.uuid,
                monster_name: spawn.monster_name.clone(),
                spot_label: spot.spot_type.short_label().to_string(),
                x: spawn.start_x,
                y: spawn.start_y,
                count: spawn.count,
                radius: spawn.distance,
                dir: spawn.dir,
            })
    }
}

impl Default for PlacementController {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spawn_model::Spot;

    fn armed_controller() -> PlacementController {
        let mut controller = PlacementController::with_defaults();
        controller.arm(3);
        controller
    }

    fn px(x: f32, y: f32) -> PixelPos {
        PixelPos::new(x, y)
    }

    #[test]
    fn test_click_places_point() {
        let mut controller = armed_controller();

        assert!(controller.pointer_down(px(20.0, 20.0)));
        controller.pointer_move(px(24.0, 22.0));
        let command = controller.pointer_up(px(24.0, 22.0));

        assert_eq!(command, Some(PlacementCommand::Point { x: 10, y: 10 }));
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_drag_places_area() {
        let mut controller = armed_controller();

        controller.pointer_down(px(20.0, 20.0));
        controller.pointer_move(px(60.0, 90.0));
        let command = controller.pointer_up(px(100.0, 160.0));

        assert_eq!(
            command,
            Some(PlacementCommand::Area {
                start_x: 10,
                start_y: 10,
                end_x: 50,
                end_y: 80,
                count: 10,
            })
        );
    }

    #[test]
    fn test_reverse_drag_is_normalized() {
        let mut controller = armed_controller();

        controller.pointer_down(px(100.0, 160.0));
        let command = controller.pointer_up(px(20.0, 20.0));

        assert_eq!(
            command,
            Some(PlacementCommand::Area {
                start_x: 10,
                start_y: 10,
                end_x: 50,
                end_y: 80,
                count: 10,
            })
        );
    }

    #[test]
    fn test_threshold_is_per_axis() {
        let mut controller = armed_controller();

        controller.pointer_down(px(20.0, 20.0));
        let command = controller.pointer_up(px(20.0, 30.0));

        assert!(matches!(command, Some(PlacementCommand::Area { .. })));
    }

    #[test]
    fn test_out_of_bounds_drag_is_clamped() {
        let mut controller = armed_controller();

        controller.pointer_down(px(-40.0, 30.0));
        controller.pointer_move(px(9000.0, -12.0));
        let rect = controller.pending_rect().unwrap();
        assert_eq!(rect.start, GridPoint::new(0, 0));
        assert_eq!(rect.end, GridPoint::new(255, 15));

        let command = controller.pointer_up(px(2000.0, 2000.0));
        assert_eq!(
            command,
            Some(PlacementCommand::Area {
                start_x: 0,
                start_y: 15,
                end_x: 255,
                end_y: 255,
                count: 10,
            })
        );
    }

    #[test]
    fn test_unarmed_controller_ignores_pointer() {
        let mut controller = PlacementController::with_defaults();

        assert!(!controller.pointer_down(px(20.0, 20.0)));
        controller.pointer_move(px(80.0, 80.0));
        assert_eq!(controller.pointer_up(px(80.0, 80.0)), None);
        assert_eq!(controller.state(), GestureState::Idle);
    }

    #[test]
    fn test_up_without_down_emits_nothing() {
        let mut controller = armed_controller();
        assert_eq!(controller.pointer_up(px(10.0, 10.0)), None);
    }

    #[test]
    fn test_switching_map_discards_gesture() {
        let mut controller = armed_controller();

        controller.pointer_down(px(20.0, 20.0));
        controller.set_active_map(Some(4));

        assert!(!controller.is_dragging());
        assert_eq!(controller.pointer_up(px(100.0, 100.0)), None);
        assert_eq!(controller.active_map(), Some(4));
    }

    #[test]
    fn test_disarm_discards_gesture() {
        let mut controller = armed_controller();

        controller.pointer_down(px(20.0, 20.0));
        controller.disarm();

        assert!(controller.pending_rect().is_none());
        assert_eq!(controller.pointer_up(px(100.0, 100.0)), None);
        assert!(controller.armed().is_none());
    }

    #[test]
    fn test_operator_area_count() {
        let mut controller = armed_controller();
        controller.set_area_count(Some(25));

        controller.pointer_down(px(0.0, 0.0));
        let command = controller.pointer_up(px(100.0, 100.0)).unwrap();

        assert!(matches!(command, PlacementCommand::Area { count: 25, .. }));
    }

    #[test]
    fn test_point_draft() {
        let draft = PlacementCommand::Point { x: 10, y: 10 }.into_draft(3, &PlacementConfig::default());

        assert_eq!(draft.distance, 10);
        assert_eq!(draft.count, 1);
        assert_eq!((draft.start_x, draft.start_y), (10, 10));
        assert_eq!(draft.end_x.unwrap_or(draft.start_x), 10);
    }

    #[test]
    fn test_area_draft_radius() {
        let config = PlacementConfig::default();
        let area = PlacementCommand::Area {
            start_x: 10,
            start_y: 10,
            end_x: 16,
            end_y: 18,
            count: 7,
        };

        let draft = area.into_draft(3, &config);
        assert_eq!(draft.distance, 5);
        assert_eq!(draft.count, 7);
        assert_eq!((draft.end_x, draft.end_y), (Some(16), Some(18)));

        let sliver = PlacementCommand::Area {
            start_x: 10,
            start_y: 10,
            end_x: 11,
            end_y: 10,
            count: 1,
        };
        assert_eq!(sliver.into_draft(3, &config).distance, config.min_area_radius);
    }

    #[test]
    fn test_out_of_grid_drafts_are_clamped() {
        let config = PlacementConfig::default();

        let point = PlacementCommand::Point { x: i32::MIN, y: 300 }.into_draft(3, &config);
        assert_eq!((point.start_x, point.start_y), (0, 255));

        let area = PlacementCommand::Area {
            start_x: 0,
            start_y: 0,
            end_x: 1000,
            end_y: 1000,
            count: 5,
        }
        .into_draft(3, &config);
        assert_eq!((area.end_x, area.end_y), (Some(255), Some(255)));
        assert_eq!(area.distance, 180);

        let extreme = PlacementCommand::Area {
            start_x: i32::MIN,
            start_y: 0,
            end_x: i32::MAX,
            end_y: 10,
            count: 5,
        }
        .into_draft(3, &config);
        assert_eq!((extreme.start_x, extreme.start_y), (0, 0));
        assert_eq!((extreme.end_x, extreme.end_y), (Some(255), Some(10)));
        assert_eq!(extreme.distance, 127);
    }

    #[test]
    fn test_command_spot_routing() {
        assert_eq!(PlacementCommand::Point { x: 0, y: 0 }.spot_type(), SpotType::SingleSpawn);
        let area = PlacementCommand::Area {
            start_x: 0,
            start_y: 0,
            end_x: 9,
            end_y: 9,
            count: 1,
        };
        assert_eq!(area.spot_description(), "Multiple Monsters Spawn");
    }

    #[test]
    fn test_hover_is_read_only() {
        let grid = GridBounds::default();
        let mut map = MapRecord::new(0, "Lorencia");
        map.spots.push(
            Spot::new(SpotType::MultiSpawn, "Spiders").with_spawn(
                SpawnDraft::new(3, 10, 10)
                    .with_end(40, 40)
                    .with_count(8)
                    .into_spawn(grid, "Spider"),
            ),
        );
        map.spots.push(
            Spot::new(SpotType::SingleSpawn, "Guard")
                .with_spawn(SpawnDraft::new(14, 20, 20).with_distance(2).into_spawn(grid, "Skeleton")),
        );

        let mut controller = armed_controller();
        controller.pointer_down(px(0.0, 0.0));
        let before = controller.state();

        let hovered = controller.hover(px(41.0, 41.0), &map).unwrap();
        assert_eq!(hovered.monster_name, "Skeleton");
        assert_eq!(hovered.spot_label, "Single");

        let hovered = controller.hover(px(70.0, 70.0), &map).unwrap();
        assert_eq!(hovered.monster_name, "Spider");
        assert_eq!(hovered.count, 8);

        assert!(controller.hover(px(200.0, 200.0), &map).is_none());
        assert!(controller.hover(px(-3.0, 20.0), &map).is_none());
        assert_eq!(controller.state(), before);
    }
}
