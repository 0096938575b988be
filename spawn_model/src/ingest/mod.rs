//! Ingestion - turns parsed attribute records into validated entities.
//!
//! Three independent streams are accepted:
//! - **monsters**: one flat record per monster type
//! - **map summaries**: one flat record per map-list entry
//! - **map spawns**: nested map -> spot -> spawn fragments
//!
//! A bad record is skipped and ingestion carries on; a stream that cannot be
//! read as the expected tree fails the whole call with an [`IngestError`].

mod maps;
mod monsters;

pub use maps::*;
pub use monsters::*;

use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::attributes::RawRecord;

pub(crate) const LOG_TARGET: &str = "spawn_model::ingest";

/// Whole-stream ingestion failures. No partial data accompanies them.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to parse {stream} stream: {source}")]
    Parse {
        stream: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {stream} stream from {path:?}: {source}")]
    Read {
        stream: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Tally of records taken in and records skipped as defective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub skipped: usize,
}

impl IngestReport {
    pub(crate) fn accept(&mut self) {
        self.accepted += 1;
    }

    pub(crate) fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Check if every record was taken in.
    pub fn is_clean(&self) -> bool {
        self.skipped == 0
    }
}

/// One `Map` element of the spawn source. Several fragments may share a number.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MapFragment {
    #[serde(flatten)]
    pub attributes: RawRecord,
    #[serde(default, alias = "Spots", alias = "Spot")]
    pub spots: Vec<SpotNode>,
}

impl MapFragment {
    /// Create a fragment for a map number given as source text.
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            attributes: RawRecord::new().with("number", number),
            spots: Vec::new(),
        }
    }

    /// Set the map name attribute.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert("name", name);
        self
    }

    /// Add a spot node.
    pub fn with_spot(mut self, spot: SpotNode) -> Self {
        self.spots.push(spot);
        self
    }
}

/// One `Spot` element with its `Spawn` children.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpotNode {
    #[serde(flatten)]
    pub attributes: RawRecord,
    #[serde(default, alias = "Spawns", alias = "Spawn")]
    pub spawns: Vec<RawRecord>,
}

impl SpotNode {
    /// Create a spot node from source text for its type and description.
    pub fn new(spot_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            attributes: RawRecord::new()
                .with("type", spot_type)
                .with("description", description),
            spawns: Vec::new(),
        }
    }

    /// Add a spawn record.
    pub fn with_spawn(mut self, spawn: RawRecord) -> Self {
        self.spawns.push(spawn);
        self
    }
}

fn parse_stream<T>(stream: &'static str, json: &str) -> Result<T, IngestError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_str(json).map_err(|source| IngestError::Parse { stream, source })
}

fn read_stream(stream: &'static str, path: &Path) -> Result<String, IngestError> {
    std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        stream,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_from_json() {
        let fragment: MapFragment = serde_json::from_str(
            r#"{
                "Number": 5,
                "Name": "Atlans",
                "Spots": [
                    {"Type": 1, "Description": "Bahamuts", "Spawns": [{"Index": 49, "StartX": 10}]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(fragment.attributes.int("number"), Some(5));
        assert_eq!(fragment.attributes.text("name"), Some("Atlans"));
        assert_eq!(fragment.spots.len(), 1);
        assert_eq!(fragment.spots[0].attributes.text("description"), Some("Bahamuts"));
        assert_eq!(fragment.spots[0].spawns[0].int("startX"), Some(10));
    }

    #[test]
    fn test_fragment_without_spots() {
        let fragment: MapFragment = serde_json::from_str(r#"{"Number": "3"}"#).unwrap();
        assert!(fragment.spots.is_empty());
        assert_eq!(fragment, MapFragment::new("3"));
    }

    #[test]
    fn test_report() {
        let mut report = IngestReport::default();
        report.accept();
        assert!(report.is_clean());
        report.skip();
        assert!(!report.is_clean());
        assert_eq!(report, IngestReport { accepted: 1, skipped: 1 });
    }
}
