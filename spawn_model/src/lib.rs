//! # Spawn Model
//!
//! The data side of the spawn editor: monster definitions, maps, spots and
//! spawn placements, the ingestion of parsed source records into those
//! entities, and the catalog that applies every edit as a new snapshot.
//! This crate knows nothing about pointers, canvases or image services.

pub mod attributes;
pub mod catalog;
pub mod entities;
pub mod ingest;

pub use attributes::*;
pub use catalog::*;
pub use entities::*;
pub use ingest::*;
