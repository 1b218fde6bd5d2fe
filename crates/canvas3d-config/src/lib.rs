//! Shared configuration for the canvas3d renderer bridge.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then an
//! optional configuration file, then `CANVAS3D_*` environment variables, then
//! command-line flags. The resolved [`Config`] carries the renderer launch
//! settings, the placement constants used when stacking layers in 3D, and the
//! logging setup consumed by the binary.

pub mod defaults;
mod logging;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{default_log_filter, default_log_format};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by the synchronizer and the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CANVAS3D")]
pub struct Config {
    /// Renderer executable spawned when a session starts.
    #[ortho_config(default = defaults::DEFAULT_VIEWER_EXECUTABLE.to_owned())]
    pub viewer_executable: String,
    /// `tracing` filter expression.
    #[ortho_config(default = defaults::DEFAULT_LOG_FILTER.to_owned())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Vertical gap between stacked layers.
    #[ortho_config(default = defaults::DEFAULT_VECTOR_Z_GAP)]
    pub vector_z_gap: f64,
    /// Vertical gap between a terrain layer and the vector layer above it.
    #[ortho_config(default = defaults::DEFAULT_TERRAIN_Z_GAP)]
    pub terrain_z_gap: f64,
    /// Tile edge length forwarded to the renderer.
    #[ortho_config(default = defaults::DEFAULT_TILE_SIZE)]
    pub tile_size: f64,
    /// Far LOD distance used when a layer declares no scale thresholds.
    #[ortho_config(default = defaults::DEFAULT_LOD_DISTANCE)]
    pub default_lod_distance: f64,
    /// Elevation mesh resolution forwarded as `mesh_size_0`.
    #[ortho_config(default = defaults::DEFAULT_ELEVATION_MESH_SIZE)]
    pub elevation_mesh_size: f64,
    /// Drape 2D polygon layers onto the terrain layer when one is loaded.
    ///
    /// An absent CLI flag keeps the value from the lower layers.
    #[ortho_config(default = true, cli_default_as_absent)]
    pub drape_enabled: bool,
    /// Extension of the mesh cache file stored beside raster sources.
    #[ortho_config(default = defaults::DEFAULT_MESH_CACHE_EXTENSION.to_owned())]
    pub mesh_cache_extension: String,
    /// Diffuse colour of the ground plane.
    #[ortho_config(default = defaults::DEFAULT_GROUND_COLOR.to_owned())]
    pub ground_color: String,
    /// Grace period before an unresponsive renderer is killed.
    #[ortho_config(default = defaults::DEFAULT_SHUTDOWN_GRACE_MS)]
    pub shutdown_grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewer_executable: defaults::DEFAULT_VIEWER_EXECUTABLE.to_owned(),
            log_filter: defaults::DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
            vector_z_gap: defaults::DEFAULT_VECTOR_Z_GAP,
            terrain_z_gap: defaults::DEFAULT_TERRAIN_Z_GAP,
            tile_size: defaults::DEFAULT_TILE_SIZE,
            default_lod_distance: defaults::DEFAULT_LOD_DISTANCE,
            elevation_mesh_size: defaults::DEFAULT_ELEVATION_MESH_SIZE,
            drape_enabled: true,
            mesh_cache_extension: defaults::DEFAULT_MESH_CACHE_EXTENSION.to_owned(),
            ground_color: defaults::DEFAULT_GROUND_COLOR.to_owned(),
            shutdown_grace_ms: defaults::DEFAULT_SHUTDOWN_GRACE_MS,
        }
    }
}

impl Config {
    /// Renderer executable path or command name.
    #[must_use]
    pub fn viewer_executable(&self) -> &str {
        self.viewer_executable.as_str()
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Grace period granted to the renderer on shutdown.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
