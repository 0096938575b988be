//! Monster list ingestion.

use std::path::Path;

use super::{parse_stream, read_stream, IngestError, IngestReport, LOG_TARGET};
use crate::attributes::RawRecord;
use crate::entities::{saturate_i32, Monster, MonsterTable};

const STREAM: &str = "monster list";

/// Build a monster from one record. `None` when the record has no numeric `index`.
pub fn monster_from_record(record: &RawRecord) -> Option<Monster> {
    let index = saturate_i32(record.int("index")?);
    let name = record.text("name").unwrap_or_default().to_string();

    let attributes = record
        .coerced()
        .filter(|(key, _)| *key != "index" && *key != "name")
        .map(|(key, value)| (key.to_string(), value))
        .collect();

    Some(Monster {
        index,
        name,
        attributes,
    })
}

/// Ingest monster records into a table, skipping defective records.
pub fn ingest_monsters(records: &[RawRecord]) -> MonsterTable {
    ingest_monsters_with_report(records).0
}

/// Ingest monster records and report how many were skipped.
pub fn ingest_monsters_with_report(records: &[RawRecord]) -> (MonsterTable, IngestReport) {
    let mut report = IngestReport::default();
    let mut monsters = Vec::with_capacity(records.len());

    for (position, record) in records.iter().enumerate() {
        match monster_from_record(record) {
            Some(monster) => {
                report.accept();
                monsters.push(monster);
            }
            None => {
                report.skip();
                tracing::warn!(
                    target: LOG_TARGET,
                    position,
                    index = record.text("index").unwrap_or_default(),
                    "monster.skipped: missing numeric index"
                );
            }
        }
    }

    tracing::info!(
        target: LOG_TARGET,
        accepted = report.accepted,
        skipped = report.skipped,
        "monsters.loaded"
    );
    (MonsterTable::new(monsters), report)
}

/// Parse a JSON array of monster records and ingest it.
pub fn ingest_monsters_from_json(json: &str) -> Result<(MonsterTable, IngestReport), IngestError> {
    let records: Vec<RawRecord> = parse_stream(STREAM, json)?;
    Ok(ingest_monsters_with_report(&records))
}

/// Read, parse and ingest a JSON monster list file.
pub fn ingest_monsters_from_file(path: &Path) -> Result<(MonsterTable, IngestReport), IngestError> {
    let contents = read_stream(STREAM, path)?;
    ingest_monsters_from_json(&contents)
}
