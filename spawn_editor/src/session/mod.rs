//! Editor session - the command boundary the UI talks to.
//!
//! The session owns the loaded monster table, the map list, the current
//! spawn catalog snapshot, the selection, the placement controller and the
//! image cache. Every spawn edit swaps in the catalog's next snapshot.
//! Commands that cannot apply (no map selected, no monster armed, unknown
//! uuid) leave the model untouched and are logged at debug.

use std::path::Path;

use spawn_model::{
    combine_map_list, ingest_map_spawns_from_file, ingest_map_spawns_from_json,
    ingest_map_spawns_with_report, ingest_map_summaries_from_file, ingest_map_summaries_from_json,
    ingest_monsters_from_file, ingest_monsters_from_json, AttrValue, FieldError, IngestError,
    IngestReport, MapFragment, MapRecord, MapSummary, MonsterTable, Spawn, SpawnCatalog,
    SpawnField, SpawnId, SpawnPatch, SpotType,
};

use crate::config::EditorConfig;
use crate::imagery::{ImageRequest, ImageResolution, ImageStatus, MonsterImageCache};
use crate::placement::{
    GridPoint, GridRect, HoverInfo, PixelPos, PlacementCommand, PlacementController,
};

const LOG_TARGET: &str = "spawn_editor::session";

/// State of one editing session.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    controller: PlacementController,
    monsters: MonsterTable,
    summaries: Vec<MapSummary>,
    catalog: SpawnCatalog,
    selected_map: Option<i32>,
    selected_spawn: Option<SpawnId>,
    images: MonsterImageCache,
}

impl EditorSession {
    /// Create an empty session.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            controller: PlacementController::new(config.placement()),
            monsters: MonsterTable::default(),
            summaries: Vec::new(),
            catalog: SpawnCatalog::new(config.grid()),
            selected_map: None,
            selected_spawn: None,
            images: MonsterImageCache::new(config.placeholder_image_base.clone()),
            config,
        }
    }

    /// Create a session with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EditorConfig::default())
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn monsters(&self) -> &MonsterTable {
        &self.monsters
    }

    /// The current catalog snapshot.
    pub fn catalog(&self) -> &SpawnCatalog {
        &self.catalog
    }

    pub fn controller(&self) -> &PlacementController {
        &self.controller
    }

    /// Replace the monster table.
    pub fn load_monsters(&mut self, monsters: MonsterTable) {
        tracing::debug!(target: LOG_TARGET, monsters = monsters.len(), "load_monsters");
        self.monsters = monsters;
    }

    /// Parse and load a JSON monster list. On error nothing changes.
    pub fn load_monsters_json(&mut self, json: &str) -> Result<IngestReport, IngestError> {
        let (monsters, report) = ingest_monsters_from_json(json)?;
        self.load_monsters(monsters);
        Ok(report)
    }

    /// Read and load a JSON monster list file. On error nothing changes.
    pub fn load_monsters_file(&mut self, path: &Path) -> Result<IngestReport, IngestError> {
        let (monsters, report) = ingest_monsters_from_file(path)?;
        self.load_monsters(monsters);
        Ok(report)
    }

    /// Replace the map list.
    pub fn load_map_summaries(&mut self, summaries: Vec<MapSummary>) {
        self.summaries = summaries;
    }

    pub fn load_map_summaries_json(&mut self, json: &str) -> Result<IngestReport, IngestError> {
        let (summaries, report) = ingest_map_summaries_from_json(json)?;
        self.load_map_summaries(summaries);
        Ok(report)
    }

    pub fn load_map_summaries_file(&mut self, path: &Path) -> Result<IngestReport, IngestError> {
        let (summaries, report) = ingest_map_summaries_from_file(path)?;
        self.load_map_summaries(summaries);
        Ok(report)
    }

    /// Replace the catalog with freshly ingested spawn data.
    ///
    /// Monster names resolve against the table loaded at this point.
    pub fn load_map_spawns(&mut self, fragments: &[MapFragment]) -> IngestReport {
        let (catalog, report) = ingest_map_spawns_with_report(fragments, &self.monsters, self.config.grid());
        self.replace_catalog(catalog);
        report
    }

    pub fn load_map_spawns_json(&mut self, json: &str) -> Result<IngestReport, IngestError> {
        let (catalog, report) = ingest_map_spawns_from_json(json, &self.monsters, self.config.grid())?;
        self.replace_catalog(catalog);
        Ok(report)
    }

    pub fn load_map_spawns_file(&mut self, path: &Path) -> Result<IngestReport, IngestError> {
        let (catalog, report) = ingest_map_spawns_from_file(path, &self.monsters, self.config.grid())?;
        self.replace_catalog(catalog);
        Ok(report)
    }

    fn replace_catalog(&mut self, catalog: SpawnCatalog) {
        self.catalog = catalog;
        if self.selected_spawn.is_some() && self.selected_spawn().is_none() {
            self.selected_spawn = None;
        }
    }

    /// Map list merged with the maps that have spawn data.
    pub fn map_list(&self) -> Vec<MapSummary> {
        combine_map_list(&self.summaries, &self.catalog)
    }

    /// Monsters placed across every map.
    pub fn total_monster_count(&self) -> u64 {
        self.catalog.total_monster_count()
    }

    pub fn map_monster_count(&self, map_number: i32) -> u64 {
        self.catalog.map_monster_count(map_number)
    }

    /// Select a map, or clear the selection. Drops the selected spawn and any gesture.
    pub fn select_map(&mut self, map_number: Option<i32>) {
        self.selected_map = map_number;
        self.selected_spawn = None;
        self.controller.set_active_map(map_number);
    }

    pub fn selected_map_number(&self) -> Option<i32> {
        self.selected_map
    }

    /// The selected map, if it has spawn data.
    pub fn selected_map(&self) -> Option<&MapRecord> {
        self.selected_map.and_then(|n| self.catalog.map(n))
    }

    /// Select a spawn on the selected map, or clear the selection.
    pub fn select_spawn(&mut self, uuid: Option<SpawnId>) {
        self.selected_spawn = uuid;
    }

    /// The selected spawn, as it is in the current snapshot.
    pub fn selected_spawn(&self) -> Option<&Spawn> {
        let map = self.selected_map?;
        self.catalog.find_spawn(map, self.selected_spawn?)
    }

    /// Editable fields of the selected spawn in detail-view order; `None` for an unset element.
    pub fn selected_spawn_fields(&self) -> Vec<(SpawnField, Option<i64>)> {
        self.selected_spawn()
            .map(|spawn| {
                SpawnField::ALL
                    .into_iter()
                    .map(|field| (field, spawn.field(field)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Arm a monster for the next placement.
    pub fn arm_monster(&mut self, monster_index: i32) {
        self.controller.arm(monster_index);
    }

    pub fn disarm(&mut self) {
        self.controller.disarm();
    }

    /// Set the monster count for dragged areas; `None` restores the default.
    pub fn set_area_count(&mut self, count: Option<u32>) {
        self.controller.set_area_count(count);
    }

    pub fn pointer_down(&mut self, pos: PixelPos) -> bool {
        if self.selected_map.is_none() {
            return false;
        }
        self.controller.pointer_down(pos)
    }

    pub fn pointer_move(&mut self, pos: PixelPos) {
        self.controller.pointer_move(pos);
    }

    /// Finish a gesture and place the resulting spawn.
    pub fn pointer_up(&mut self, pos: PixelPos) -> Option<SpawnId> {
        let command = self.controller.pointer_up(pos)?;
        self.apply(command)
    }

    /// The rectangle being dragged, normalized.
    pub fn pending_rect(&self) -> Option<GridRect> {
        self.controller.pending_rect()
    }

    /// What the pointer rests on in the selected map.
    pub fn hover(&self, pos: PixelPos) -> Option<HoverInfo> {
        self.controller.hover(pos, self.selected_map()?)
    }

    /// Place the armed monster at a cell of the selected map.
    pub fn on_add_point_spawn(&mut self, x: i32, y: i32) -> Option<SpawnId> {
        self.apply(PlacementCommand::Point { x, y })
    }

    /// Place the armed monster over an area of the selected map.
    pub fn on_add_area_spawn(
        &mut self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
        count: u32,
    ) -> Option<SpawnId> {
        let rect = GridRect::new(GridPoint::new(start_x, start_y), GridPoint::new(end_x, end_y)).normalized();
        self.apply(PlacementCommand::Area {
            start_x: rect.start.x,
            start_y: rect.start.y,
            end_x: rect.end.x,
            end_y: rect.end.y,
            count,
        })
    }

    /// Apply a placement to the selected map. The monster is disarmed on success.
    pub fn apply(&mut self, command: PlacementCommand) -> Option<SpawnId> {
        let Some(map) = self.selected_map else {
            tracing::debug!(target: LOG_TARGET, "place.no_map");
            return None;
        };
        let Some(monster) = self.controller.armed() else {
            tracing::debug!(target: LOG_TARGET, map, "place.not_armed");
            return None;
        };

        let draft = command.into_draft(monster, self.controller.config());
        let (catalog, uuid) = self.catalog.add_spawn(
            map,
            command.spot_type(),
            command.spot_description(),
            draft,
            &self.monsters,
        );
        self.catalog = catalog;
        self.controller.disarm();
        tracing::debug!(target: LOG_TARGET, map, uuid = %uuid, monster, "place.done");
        Some(uuid)
    }

    /// Delete a spawn from the selected map.
    pub fn on_delete_spawn(&mut self, uuid: SpawnId) {
        let Some(map) = self.selected_map else {
            tracing::debug!(target: LOG_TARGET, uuid = %uuid, "delete.no_map");
            return;
        };
        self.catalog = self.catalog.delete_spawn(map, uuid);
        if self.selected_spawn == Some(uuid) {
            self.selected_spawn = None;
        }
    }

    /// Edit one field of a spawn on the selected map from raw operator input.
    ///
    /// Unknown fields and non-numeric input are rejected and the model is left
    /// as it was. Changing `index` also re-resolves the monster name.
    pub fn on_update_spawn_field(&mut self, uuid: SpawnId, field: &str, raw_value: &str) -> Result<(), FieldError> {
        let patch = SpawnField::parse(field).and_then(|field| {
            let value = AttrValue::coerce(raw_value);
            SpawnPatch::from_field(field, &value)
        });
        let mut patch = match patch {
            Ok(patch) => patch,
            Err(err) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    uuid = %uuid,
                    field,
                    value = raw_value,
                    error = %err,
                    "update.rejected"
                );
                return Err(err);
            }
        };

        let Some(map) = self.selected_map else {
            tracing::debug!(target: LOG_TARGET, uuid = %uuid, "update.no_map");
            return Ok(());
        };
        if let Some(index) = patch.index {
            patch.monster_name = Some(self.monsters.name_of(index).to_string());
        }
        self.catalog = self.catalog.update_spawn(map, uuid, &patch);
        Ok(())
    }

    /// Add an empty spot to the selected map.
    pub fn add_spot(&mut self, spot_type: SpotType, description: &str) {
        let Some(map) = self.selected_map else {
            tracing::debug!(target: LOG_TARGET, "add_spot.no_map");
            return;
        };
        self.catalog = self.catalog.add_spot(map, spot_type, description);
    }

    /// Start an image request for a monster, unless one is cached or in flight.
    pub fn request_monster_image(&mut self, name: &str) -> Option<ImageRequest> {
        self.images.begin(name)
    }

    pub fn finish_monster_image(&mut self, resolution: ImageResolution) {
        self.images.finish(resolution);
    }

    pub fn abandon_monster_image(&mut self, name: &str) {
        self.images.abandon(name);
    }

    pub fn monster_image_status(&self, name: &str) -> ImageStatus<'_> {
        self.images.status(name)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn loaded_session() -> EditorSession {
        let mut session = EditorSession::with_defaults();
        let monsters = json!([
            {"Index": 3, "Name": "Spider"},
            {"Index": 14, "Name": "Skeleton"}
        ]);
        let maps = json!([
            {"Number": 0, "File": "World1/00_Lorencia.att"},
            {"Number": 2, "File": "World3/02_Devias.att"}
        ]);
        let spawns = json!([
            {"Number": 0, "Name": "Lorencia", "Spots": [
                {"Type": 1, "Description": "Spiders", "Spawns": [
                    {"Index": 3, "Distance": 20, "StartX": 10, "StartY": 10, "EndX": 40, "EndY": 40, "Count": 8}
                ]}
            ]},
            {"Number": 1, "Name": "Dungeon", "Spots": [
                {"Type": 2, "Description": "Guards", "Spawns": [
                    {"Index": 14, "StartX": 100, "StartY": 100}
                ]}
            ]}
        ]);

        session.load_monsters_json(&monsters.to_string()).unwrap();
        session.load_map_summaries_json(&maps.to_string()).unwrap();
        session.load_map_spawns_json(&spawns.to_string()).unwrap();
        session
    }

    fn first_spawn(session: &EditorSession, map: i32) -> SpawnId {
        session.catalog().map(map).unwrap().spawns().next().unwrap().uuid
    }

    #[test]
    fn test_load_and_counts() {
        let session = loaded_session();

        assert_eq!(session.total_monster_count(), 9);
        assert_eq!(session.map_monster_count(0), 8);
        assert_eq!(session.map_monster_count(2), 0);

        let list = session.map_list();
        let numbers: Vec<i32> = list.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
        assert_eq!(list[1].file, None);
        assert_eq!(list[1].display_name(), "Dungeon");
        assert_eq!(list[2].display_name(), "Devias");
    }

    #[test]
    fn test_failed_load_keeps_model() {
        let mut session = loaded_session();
        let before = session.catalog().clone();

        assert!(session.load_map_spawns_json("{not json").is_err());
        assert!(session.load_monsters_json("[{").is_err());

        assert_eq!(session.catalog(), &before);
        assert_eq!(session.monsters().len(), 2);
    }

    #[test]
    fn test_click_gesture_places_single_spawn() {
        let mut session = loaded_session();
        session.select_map(Some(0));
        session.arm_monster(14);

        assert!(session.pointer_down(PixelPos::new(20.0, 20.0)));
        let uuid = session.pointer_up(PixelPos::new(22.0, 22.0)).unwrap();

        let map = session.selected_map().unwrap();
        let spot = map.spot_of(uuid).unwrap();
        assert_eq!(spot.spot_type, SpotType::SingleSpawn);
        assert_eq!(spot.description, "Single Monster Spawn");

        let spawn = map.find_spawn(uuid).unwrap();
        assert_eq!((spawn.start_x, spawn.start_y), (10, 10));
        assert_eq!(spawn.distance, 10);
        assert_eq!(spawn.monster_name, "Skeleton");
        assert!(session.controller().armed().is_none());
        assert_eq!(session.total_monster_count(), 10);
    }

    #[test]
    fn test_area_joins_existing_multi_spot() {
        let mut session = loaded_session();
        session.select_map(Some(0));
        session.arm_monster(3);

        let uuid = session.on_add_area_spawn(80, 90, 50, 60, 4).unwrap();

        let map = session.selected_map().unwrap();
        assert_eq!(map.spots.len(), 1);
        assert_eq!(map.spot_of(uuid).unwrap().description, "Spiders");
        let spawn = map.find_spawn(uuid).unwrap();
        assert_eq!((spawn.start_x, spawn.start_y, spawn.end_x, spawn.end_y), (50, 60, 80, 90));
        assert_eq!(spawn.count, 4);
        assert_eq!(session.map_monster_count(0), 12);
    }

    #[test]
    fn test_point_command_outside_grid_is_clamped() {
        let mut session = loaded_session();
        session.select_map(Some(1));

        session.arm_monster(3);
        let low = session.on_add_point_spawn(-5, 9999).unwrap();
        session.arm_monster(3);
        let extreme = session.on_add_point_spawn(i32::MIN, i32::MAX).unwrap();

        for uuid in [low, extreme] {
            let spawn = session.catalog().find_spawn(1, uuid).unwrap();
            assert_eq!((spawn.start_x, spawn.start_y), (0, 255));
            assert_eq!((spawn.end_x, spawn.end_y), (0, 255));
            assert!(!spawn.is_area());
        }
    }

    #[test]
    fn test_area_command_outside_grid_is_clamped() {
        let mut session = loaded_session();
        session.select_map(Some(1));

        session.arm_monster(3);
        let wide = session.on_add_area_spawn(0, 0, 1000, 1000, 5).unwrap();
        session.arm_monster(3);
        let extreme = session.on_add_area_spawn(i32::MIN, 0, i32::MAX, 10, 5).unwrap();
        session.arm_monster(3);
        let reversed = session.on_add_area_spawn(i32::MAX, i32::MAX, -20, -20, 5).unwrap();

        let spawn = session.catalog().find_spawn(1, wide).unwrap();
        assert_eq!((spawn.start_x, spawn.start_y, spawn.end_x, spawn.end_y), (0, 0, 255, 255));
        assert_eq!(spawn.distance, 180);

        let spawn = session.catalog().find_spawn(1, extreme).unwrap();
        assert_eq!((spawn.start_x, spawn.start_y, spawn.end_x, spawn.end_y), (0, 0, 255, 10));
        assert_eq!(spawn.distance, 127);

        let spawn = session.catalog().find_spawn(1, reversed).unwrap();
        assert_eq!((spawn.start_x, spawn.start_y, spawn.end_x, spawn.end_y), (0, 0, 255, 255));
        assert_eq!(spawn.count, 5);
    }

    #[test]
    fn test_selected_spawn_fields() {
        let mut session = loaded_session();
        session.select_map(Some(0));
        assert!(session.selected_spawn_fields().is_empty());

        session.select_spawn(Some(first_spawn(&session, 0)));
        let fields = session.selected_spawn_fields();

        assert_eq!(fields.len(), SpawnField::ALL.len());
        assert_eq!(fields[0], (SpawnField::Index, Some(3)));
        assert_eq!(fields[1], (SpawnField::Distance, Some(20)));
        assert_eq!(fields[4], (SpawnField::EndX, Some(40)));
        assert_eq!(fields[8], (SpawnField::Element, None));
    }

    #[test]
    fn test_placement_needs_map_and_monster() {
        let mut session = loaded_session();

        session.arm_monster(3);
        assert!(session.on_add_point_spawn(5, 5).is_none());
        assert!(!session.pointer_down(PixelPos::new(10.0, 10.0)));

        session.select_map(Some(0));
        session.disarm();
        assert!(session.on_add_point_spawn(5, 5).is_none());
        assert_eq!(session.total_monster_count(), 9);
    }

    #[test]
    fn test_placing_on_map_without_spawns() {
        let mut session = loaded_session();
        session.select_map(Some(2));
        session.arm_monster(3);

        session.on_add_point_spawn(1, 1).unwrap();

        assert_eq!(session.map_monster_count(2), 1);
        let list = session.map_list();
        assert_eq!(list.iter().find(|m| m.number == 2).unwrap().display_name(), "Devias");
    }

    #[test]
    fn test_delete_selected_spawn_clears_selection() {
        let mut session = loaded_session();
        session.select_map(Some(0));
        let uuid = first_spawn(&session, 0);
        let untouched = Arc::clone(session.catalog().map_handle(1).unwrap());

        session.select_spawn(Some(uuid));
        assert!(session.selected_spawn().is_some());

        session.on_delete_spawn(uuid);

        assert!(session.selected_spawn().is_none());
        assert!(session.selected_map().unwrap().spots.is_empty());
        assert!(Arc::ptr_eq(&untouched, session.catalog().map_handle(1).unwrap()));
    }

    #[test]
    fn test_update_field_from_raw_input() {
        let mut session = loaded_session();
        session.select_map(Some(0));
        let uuid = first_spawn(&session, 0);

        session.on_update_spawn_field(uuid, "StartX", " 999 ").unwrap();
        session.on_update_spawn_field(uuid, "count", "3").unwrap();

        let spawn = session.catalog().find_spawn(0, uuid).unwrap();
        assert_eq!(spawn.start_x, 255);
        assert_eq!(spawn.count, 3);
        assert_eq!(session.map_monster_count(0), 3);
    }

    #[test]
    fn test_update_index_renames_monster() {
        let mut session = loaded_session();
        session.select_map(Some(0));
        let uuid = first_spawn(&session, 0);

        session.on_update_spawn_field(uuid, "index", "14").unwrap();
        assert_eq!(session.catalog().find_spawn(0, uuid).unwrap().monster_name, "Skeleton");

        session.on_update_spawn_field(uuid, "index", "99").unwrap();
        assert_eq!(session.catalog().find_spawn(0, uuid).unwrap().monster_name, "Unknown");
    }

    #[test]
    fn test_update_rejects_bad_input() {
        let mut session = loaded_session();
        session.select_map(Some(0));
        let uuid = first_spawn(&session, 0);
        let before = session.catalog().clone();

        let err = session.on_update_spawn_field(uuid, "speed", "3").unwrap_err();
        assert!(matches!(err, FieldError::UnknownField(_)));

        let err = session.on_update_spawn_field(uuid, "startX", "left").unwrap_err();
        assert!(matches!(err, FieldError::NotNumeric { field: SpawnField::StartX, .. }));

        assert_eq!(session.catalog(), &before);
    }

    #[test]
    fn test_select_map_resets_gesture() {
        let mut session = loaded_session();
        session.select_map(Some(0));
        session.arm_monster(3);
        session.pointer_down(PixelPos::new(20.0, 20.0));
        assert!(session.pending_rect().is_some());

        session.select_map(Some(1));

        assert!(session.pending_rect().is_none());
        assert!(session.pointer_up(PixelPos::new(90.0, 90.0)).is_none());
        assert_eq!(session.total_monster_count(), 9);
    }

    #[test]
    fn test_hover_on_selected_map() {
        let mut session = loaded_session();
        assert!(session.hover(PixelPos::new(40.0, 40.0)).is_none());

        session.select_map(Some(0));
        let info = session.hover(PixelPos::new(40.0, 40.0)).unwrap();
        assert_eq!(info.monster_name, "Spider");
        assert_eq!(info.spot_label, "Multi-Spawn");
        assert_eq!(info.count, 8);
    }

    #[test]
    fn test_add_spot_to_selected_map() {
        let mut session = loaded_session();
        session.select_map(Some(1));

        session.add_spot(SpotType::Npc, "");

        let map = session.selected_map().unwrap();
        assert_eq!(map.spots.len(), 2);
        assert_eq!(map.spots[1].description, "New Spot 2");
    }

    #[test]
    fn test_image_status_flow() {
        let mut session = loaded_session();

        let request = session.request_monster_image("Spider").unwrap();
        assert_eq!(session.monster_image_status("Spider"), ImageStatus::Loading);
        assert!(session.request_monster_image("Spider").is_none());

        session.abandon_monster_image(request.name());
        assert_eq!(session.monster_image_status("Spider"), ImageStatus::Missing);
    }
}
