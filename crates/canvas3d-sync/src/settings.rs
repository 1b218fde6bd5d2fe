//! Constants the synchronizer is built with.

use canvas3d_config::Config;
use canvas3d_protocol::ViewerLaunch;

/// Renderer object id of the ground plane.
pub const GROUND_PLANE_ID: &str = "ground";

/// Placement, level-of-detail and launch settings for one synchronizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    /// Renderer command line.
    pub launch: ViewerLaunch,
    /// Gap between stacked layers.
    pub vector_z_gap: f64,
    /// Gap between a raster and the vector layer placed above it.
    pub terrain_z_gap: f64,
    /// Tile edge length.
    pub tile_size: f64,
    /// Far distance for layers without a distance band.
    pub default_lod_distance: f64,
    /// Elevation mesh resolution.
    pub elevation_mesh_size: f64,
    /// Whether 2D polygons are draped onto the terrain layer.
    pub drape_enabled: bool,
    /// Extension of mesh caches beside raster files.
    pub mesh_cache_extension: String,
    /// Ground plane colour.
    pub ground_color: String,
    /// Ground plane object id.
    pub ground_plane_id: String,
}

impl From<&Config> for SceneSettings {
    fn from(config: &Config) -> Self {
        Self {
            launch: ViewerLaunch::new(config.viewer_executable()),
            vector_z_gap: config.vector_z_gap,
            terrain_z_gap: config.terrain_z_gap,
            tile_size: config.tile_size,
            default_lod_distance: config.default_lod_distance,
            elevation_mesh_size: config.elevation_mesh_size,
            drape_enabled: config.drape_enabled,
            mesh_cache_extension: config.mesh_cache_extension.clone(),
            ground_color: config.ground_color.clone(),
            ground_plane_id: GROUND_PLANE_ID.to_owned(),
        }
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}
