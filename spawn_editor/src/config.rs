//! Editor configuration, loaded from TOML.

use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use spawn_model::{GridBounds, DEFAULT_GRID_MAX};

use crate::imagery::DEFAULT_PLACEHOLDER_BASE;
use crate::placement::PlacementConfig;

const LOG_TARGET: &str = "spawn_editor::config";

/// Tunables for the editor. Every key is optional in the TOML source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Largest grid coordinate on both axes.
    pub grid_max: i32,
    /// Canvas pixels per grid cell.
    pub pixels_per_cell: f32,
    /// Gestures moving less than this many cells on both axes are clicks.
    pub click_threshold: i32,
    /// Radius given to spawns placed with a click.
    pub point_radius: u32,
    /// Monster count for dragged areas when the operator entered none.
    pub area_default_count: u32,
    /// Smallest radius derived for a dragged area.
    pub min_area_radius: u32,
    /// Base URL of the placeholder image service.
    pub placeholder_image_base: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_max: DEFAULT_GRID_MAX,
            pixels_per_cell: 2.0,
            click_threshold: 5,
            point_radius: 10,
            area_default_count: 10,
            min_area_radius: 1,
            placeholder_image_base: DEFAULT_PLACEHOLDER_BASE.to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load a TOML file, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!(target: LOG_TARGET, path = %path.display(), "config.loaded=file");
                config
            }
            Err(err) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    path = %path.display(),
                    error = %err,
                    "config.load_failed"
                );
                tracing::info!(target: LOG_TARGET, "config.loaded=default");
                Self::default()
            }
        }
    }

    /// The placement grid.
    pub fn grid(&self) -> GridBounds {
        GridBounds::new(self.grid_max)
    }

    /// Settings for the placement controller.
    pub fn placement(&self) -> PlacementConfig {
        PlacementConfig {
            grid: self.grid(),
            pixels_per_cell: if self.pixels_per_cell > 0.0 {
                self.pixels_per_cell
            } else {
                1.0
            },
            click_threshold: self.click_threshold.max(0),
            point_radius: self.point_radius,
            area_default_count: self.area_default_count.max(1),
            min_area_radius: self.min_area_radius,
        }
    }
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse editor config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read editor config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
