//! # Spawn Editor
//!
//! The interactive side of the spawn editor, built on `spawn_model`. This
//! crate turns pointer gestures into placements, tracks monster image
//! requests, and exposes the editing session the UI drives.
//!
//! ## Core Components
//!
//! - **placement**: Click-or-drag gesture state machine and hover lookup
//! - **imagery**: Async image generator boundary with a per-name request cache
//! - **session**: Selection, loading and the spawn edit commands
//! - **config**: TOML-backed tunables
//!
//! The crate never installs a `tracing` subscriber; the host application does.

pub mod config;
pub mod imagery;
pub mod placement;
pub mod session;

pub use config::*;
pub use imagery::*;
pub use placement::*;
pub use session::*;
