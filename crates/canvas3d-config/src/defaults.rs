//! Built-in defaults shared by the configuration loader and its callers.

use crate::logging::LogFormat;

/// Renderer executable launched when no override is configured.
pub const DEFAULT_VIEWER_EXECUTABLE: &str = "simpleViewer";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Vertical distance between two stacked layers.
pub const DEFAULT_VECTOR_Z_GAP: f64 = 1.0;

/// Vertical distance between a terrain layer and the vector layer above it.
pub const DEFAULT_TERRAIN_Z_GAP: f64 = 20.0;

/// Edge length of the square tiles the renderer pages in.
pub const DEFAULT_TILE_SIZE: f64 = 1000.0;

/// Far level-of-detail distance for layers without scale thresholds.
pub const DEFAULT_LOD_DISTANCE: f64 = 100_000.0;

/// Grid resolution of elevation meshes, in map units.
pub const DEFAULT_ELEVATION_MESH_SIZE: f64 = 10.0;

/// Extension of the pre-converted terrain mesh stored beside a raster.
pub const DEFAULT_MESH_CACHE_EXTENSION: &str = "ive";

/// Diffuse colour of the ground plane spanning the full extent.
pub const DEFAULT_GROUND_COLOR: &str = "#d9d9d9";

/// Milliseconds granted to the renderer to exit after its input closes.
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 200;

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
