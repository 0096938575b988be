//! Map list and map spawn ingestion.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::{parse_stream, read_stream, IngestError, IngestReport, MapFragment, SpotNode, LOG_TARGET};
use crate::attributes::RawRecord;
use crate::catalog::SpawnCatalog;
use crate::entities::{
    placeholder_map_name, saturate_i32, GridBounds, MapRecord, MapSummary, MonsterTable, Spawn,
    SpawnDraft, Spot, SpotType, NO_DIRECTION,
};

const SUMMARY_STREAM: &str = "map list";
const SPAWN_STREAM: &str = "map spawn";

/// Description given to spots whose source omits one.
pub const DEFAULT_SPOT_DESCRIPTION: &str = "Spot";

fn map_number(record: &RawRecord) -> Option<i32> {
    record.int("number").map(saturate_i32)
}

/// Ingest map-list records, skipping entries whose number does not parse.
pub fn ingest_map_summaries(records: &[RawRecord]) -> Vec<MapSummary> {
    ingest_map_summaries_with_report(records).0
}

/// Ingest map-list records and report skipped entries.
pub fn ingest_map_summaries_with_report(records: &[RawRecord]) -> (Vec<MapSummary>, IngestReport) {
    let mut report = IngestReport::default();
    let mut summaries = Vec::with_capacity(records.len());

    for record in records {
        let Some(number) = map_number(record) else {
            report.skip();
            tracing::warn!(
                target: LOG_TARGET,
                number = record.text("number").unwrap_or_default(),
                "map_summary.skipped: number is not numeric"
            );
            continue;
        };
        report.accept();
        summaries.push(MapSummary::from_file(
            number,
            record.text("file").map(str::to_string),
        ));
    }

    tracing::info!(
        target: LOG_TARGET,
        accepted = report.accepted,
        skipped = report.skipped,
        "map_summaries.loaded"
    );
    (summaries, report)
}

/// Parse a JSON array of map-list records and ingest it.
pub fn ingest_map_summaries_from_json(json: &str) -> Result<(Vec<MapSummary>, IngestReport), IngestError> {
    let records: Vec<RawRecord> = parse_stream(SUMMARY_STREAM, json)?;
    Ok(ingest_map_summaries_with_report(&records))
}

/// Read, parse and ingest a JSON map-list file.
pub fn ingest_map_summaries_from_file(path: &Path) -> Result<(Vec<MapSummary>, IngestReport), IngestError> {
    let contents = read_stream(SUMMARY_STREAM, path)?;
    ingest_map_summaries_from_json(&contents)
}

/// Build a spawn from one record, minting a fresh uuid. `None` when `index` is not numeric.
pub fn spawn_from_record(record: &RawRecord, monsters: &MonsterTable, grid: GridBounds) -> Option<Spawn> {
    let index = saturate_i32(record.int("index")?);
    let int = |key: &str| record.int(key).map(saturate_i32);

    let start_x = int("startX").unwrap_or(0);
    let start_y = int("startY").unwrap_or(0);
    let draft = SpawnDraft {
        index,
        distance: record.int("distance").unwrap_or(0).clamp(0, u32::MAX as i64) as u32,
        start_x,
        start_y,
        end_x: Some(int("endX").unwrap_or(start_x)),
        end_y: Some(int("endY").unwrap_or(start_y)),
        dir: int("dir").unwrap_or(NO_DIRECTION),
        count: record.int("count").unwrap_or(1).clamp(1, u32::MAX as i64) as u32,
        element: int("element"),
    };
    Some(draft.into_spawn(grid, monsters.name_of(index)))
}

fn spot_from_node(
    node: &SpotNode,
    monsters: &MonsterTable,
    grid: GridBounds,
    report: &mut IngestReport,
) -> Option<Spot> {
    let Some(spot_type) = node.attributes.int("type").and_then(SpotType::from_code) else {
        report.skip();
        tracing::warn!(
            target: LOG_TARGET,
            spot_type = node.attributes.text("type").unwrap_or_default(),
            "spot.skipped: unknown spot type"
        );
        return None;
    };
    let description = node
        .attributes
        .text("description")
        .unwrap_or(DEFAULT_SPOT_DESCRIPTION);

    let mut spot = Spot::new(spot_type, description);
    for record in &node.spawns {
        match spawn_from_record(record, monsters, grid) {
            Some(spawn) => {
                report.accept();
                spot.spawns.push(spawn);
            }
            None => {
                report.skip();
                tracing::warn!(
                    target: LOG_TARGET,
                    index = record.text("index").unwrap_or_default(),
                    "spawn.skipped: index is not numeric"
                );
            }
        }
    }
    Some(spot)
}

/// Ingest map spawn fragments into a catalog, skipping defective records.
pub fn ingest_map_spawns(fragments: &[MapFragment], monsters: &MonsterTable, grid: GridBounds) -> SpawnCatalog {
    ingest_map_spawns_with_report(fragments, monsters, grid).0
}

/// Ingest map spawn fragments and report skipped records.
///
/// Fragments sharing a map number merge into one map, their spots appended
/// in input order. Every spot node becomes its own spot; nodes are never
/// merged, even when type and description match.
pub fn ingest_map_spawns_with_report(
    fragments: &[MapFragment],
    monsters: &MonsterTable,
    grid: GridBounds,
) -> (SpawnCatalog, IngestReport) {
    let mut report = IngestReport::default();
    let mut maps: BTreeMap<i32, MapRecord> = BTreeMap::new();

    for fragment in fragments {
        let Some(number) = map_number(&fragment.attributes) else {
            report.skip();
            tracing::warn!(
                target: LOG_TARGET,
                number = fragment.attributes.text("number").unwrap_or_default(),
                "map.skipped: number is not numeric"
            );
            continue;
        };

        let map = maps.entry(number).or_insert_with(|| {
            let name = fragment
                .attributes
                .text("name")
                .map(str::to_string)
                .unwrap_or_else(|| placeholder_map_name(number));
            MapRecord::new(number, name)
        });

        for node in &fragment.spots {
            if let Some(spot) = spot_from_node(node, monsters, grid, &mut report) {
                map.spots.push(spot);
            }
        }
    }

    tracing::info!(
        target: LOG_TARGET,
        maps = maps.len(),
        accepted = report.accepted,
        skipped = report.skipped,
        "map_spawns.loaded"
    );
    (SpawnCatalog::from_maps(maps.into_values(), grid), report)
}

/// Parse a JSON array of map fragments and ingest it.
pub fn ingest_map_spawns_from_json(
    json: &str,
    monsters: &MonsterTable,
    grid: GridBounds,
) -> Result<(SpawnCatalog, IngestReport), IngestError> {
    let fragments: Vec<MapFragment> = parse_stream(SPAWN_STREAM, json)?;
    Ok(ingest_map_spawns_with_report(&fragments, monsters, grid))
}

/// Read, parse and ingest a JSON map spawn file.
pub fn ingest_map_spawns_from_file(
    path: &Path,
    monsters: &MonsterTable,
    grid: GridBounds,
) -> Result<(SpawnCatalog, IngestReport), IngestError> {
    let contents = read_stream(SPAWN_STREAM, path)?;
    ingest_map_spawns_from_json(&contents, monsters, grid)
}

/// A spawn row from a flat export, carrying its map and spot inline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatSpawnRow {
    pub map_number: String,
    pub spot_type: String,
    pub spot_description: String,
    pub spawn: RawRecord,
}

/// Group flat rows into map fragments.
///
/// Rows are grouped by map number (maps in first-seen order, rows with an
/// unparsable number skipped). Within a map, rows sharing a spot type and
/// description share one spot, spots ordered by first appearance.
pub fn group_flat_spawns(rows: &[FlatSpawnRow]) -> Vec<MapFragment> {
    group_flat_spawns_with_report(rows).0
}

/// Group flat rows into map fragments and report skipped rows.
pub fn group_flat_spawns_with_report(rows: &[FlatSpawnRow]) -> (Vec<MapFragment>, IngestReport) {
    let mut report = IngestReport::default();
    let mut order: Vec<i32> = Vec::new();
    let mut by_map: BTreeMap<i32, (MapFragment, HashMap<(String, String), usize>)> = BTreeMap::new();

    for row in rows {
        let Some(number) = RawRecord::new()
            .with("number", row.map_number.as_str())
            .int("number")
            .map(saturate_i32)
        else {
            report.skip();
            tracing::warn!(
                target: LOG_TARGET,
                number = row.map_number.as_str(),
                "flat_spawn.skipped: map number is not numeric"
            );
            continue;
        };

        let (fragment, spot_slots) = by_map.entry(number).or_insert_with(|| {
            order.push(number);
            (MapFragment::new(number.to_string()), HashMap::new())
        });

        let key = flat_spot_key(row);
        let slot = *spot_slots.entry(key).or_insert_with_key(|(spot_type, description)| {
            fragment
                .spots
                .push(SpotNode::new(spot_type.as_str(), description.as_str()));
            fragment.spots.len() - 1
        });
        if let Some(spot) = fragment.spots.get_mut(slot) {
            spot.spawns.push(row.spawn.clone());
            report.accept();
        }
    }

    tracing::info!(
        target: LOG_TARGET,
        maps = order.len(),
        accepted = report.accepted,
        skipped = report.skipped,
        "flat_spawns.grouped"
    );
    let fragments = order
        .into_iter()
        .filter_map(|number| by_map.remove(&number).map(|(fragment, _)| fragment))
        .collect();
    (fragments, report)
}

/// Spot grouping key: numeric type code (raw text when not numeric) and trimmed description.
fn flat_spot_key(row: &FlatSpawnRow) -> (String, String) {
    let raw_type = row.spot_type.trim();
    let spot_type = RawRecord::new()
        .with("type", raw_type)
        .int("type")
        .map_or_else(|| raw_type.to_string(), |code| code.to_string());
    (spot_type, row.spot_description.trim().to_string())
}

/// Merge the map list with the maps that have spawn data.
///
/// The union is keyed by number. A summary without a name, or with only the
/// placeholder, takes the spawn source's name; spawn-only maps are listed
/// without a file. The result is sorted by number.
pub fn combine_map_list(summaries: &[MapSummary], catalog: &SpawnCatalog) -> Vec<MapSummary> {
    let mut combined: BTreeMap<i32, MapSummary> = BTreeMap::new();
    for summary in summaries {
        combined.insert(summary.number, summary.clone());
    }

    for map in catalog.maps() {
        combined
            .entry(map.number)
            .and_modify(|existing| {
                if !existing.has_real_name() {
                    existing.name = Some(map.name.clone());
                }
            })
            .or_insert_with(|| MapSummary {
                number: map.number,
                file: None,
                name: Some(map.name.clone()),
            });
    }

    combined.into_values().collect()
}
