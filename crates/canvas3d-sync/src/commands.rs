//! Builders for the renderer commands the synchronizer emits.

use std::path::Path;

use canvas3d_protocol::Command;

use crate::layer::Extent;

/// Loads a tiled PostGIS layer.
pub const LOAD_VECTOR_POSTGIS: &str = "loadVectorPostgis";
/// Loads a tiled elevation mesh.
pub const LOAD_ELEVATION: &str = "loadElevation";
/// Removes an object from the scene.
pub const UNLOAD_LAYER: &str = "unloadLayer";
/// Shows an object.
pub const SHOW_LAYER: &str = "showLayer";
/// Hides an object.
pub const HIDE_LAYER: &str = "hideLayer";
/// Sets an object's material colours.
pub const SET_SYMBOLOGY: &str = "setSymbology";
/// Adds a flat rectangle.
pub const ADD_PLANE: &str = "addPlane";
/// Moves the camera.
pub const LOOK_AT: &str = "lookAt";
/// Declares the extent of the whole scene.
pub const SET_FULL_EXTENT: &str = "setFullExtent";

/// Arguments of a `loadVectorPostgis` command.
#[derive(Debug, Clone)]
pub struct VectorLoad<'a> {
    /// Renderer object id.
    pub id: &'a str,
    /// Forwarded connection parameters.
    pub conn_info: String,
    /// Layer extent.
    pub extent: &'a Extent,
    /// Placement origin, `"x y z"`.
    pub origin: String,
    /// Level-of-detail list.
    pub lod: String,
    /// Tile edge length.
    pub tile_size: f64,
    /// Query for the single level of detail.
    pub query: String,
    /// Geometry column, when the descriptor names one.
    pub geocolumn: Option<&'a str>,
    /// Terrain file to drape onto.
    pub elevation: Option<&'a Path>,
}

impl VectorLoad<'_> {
    /// Builds the command.
    #[must_use]
    pub fn into_command(self) -> Command {
        let mut command = Command::new(LOAD_VECTOR_POSTGIS)
            .arg("id", self.id)
            .arg("conn_info", self.conn_info)
            .arg("extent", self.extent.to_wire())
            .arg("origin", self.origin)
            .arg("lod", self.lod)
            .arg("tile_size", self.tile_size)
            .arg("query_0", self.query);
        if let Some(column) = self.geocolumn {
            command.insert("geocolumn", column);
        }
        if let Some(file) = self.elevation {
            command.insert("elevation", file.display());
        }
        command
    }
}

/// Arguments of a `loadElevation` command.
#[derive(Debug, Clone)]
pub struct ElevationLoad<'a> {
    /// Renderer object id.
    pub id: &'a str,
    /// Mesh cache or raster file.
    pub file: &'a Path,
    /// Layer extent.
    pub extent: &'a Extent,
    /// Placement origin, `"x y z"`.
    pub origin: String,
    /// Mesh resolution for the single level of detail.
    pub mesh_size: f64,
    /// Level-of-detail list.
    pub lod: String,
    /// Tile edge length.
    pub tile_size: f64,
}

impl ElevationLoad<'_> {
    /// Builds the command.
    #[must_use]
    pub fn into_command(self) -> Command {
        Command::new(LOAD_ELEVATION)
            .arg("id", self.id)
            .arg("file", self.file.display())
            .arg("extent", self.extent.to_wire())
            .arg("origin", self.origin)
            .arg("mesh_size_0", self.mesh_size)
            .arg("lod", self.lod)
            .arg("tile_size", self.tile_size)
    }
}

/// `unloadLayer` for `id`.
#[must_use]
pub fn unload_layer(id: &str) -> Command {
    Command::new(UNLOAD_LAYER).arg("id", id)
}

/// `showLayer` or `hideLayer` for `id`.
#[must_use]
pub fn set_visibility(id: &str, visible: bool) -> Command {
    let name = if visible { SHOW_LAYER } else { HIDE_LAYER };
    Command::new(name).arg("id", id)
}

/// `addPlane` covering `extent`.
#[must_use]
pub fn add_plane(id: &str, extent: &Extent, origin: &str) -> Command {
    Command::new(ADD_PLANE)
        .arg("id", id)
        .arg("extent", extent.to_wire())
        .arg("origin", origin)
}

/// `lookAt` framing `extent`.
#[must_use]
pub fn look_at(origin: &str, extent: &Extent) -> Command {
    Command::new(LOOK_AT)
        .arg("origin", origin)
        .arg("extent", extent.to_wire())
}

/// `setFullExtent` with one argument per corner coordinate.
#[must_use]
pub fn set_full_extent(extent: &Extent) -> Command {
    Command::new(SET_FULL_EXTENT)
        .arg("x_min", extent.x_min)
        .arg("y_min", extent.y_min)
        .arg("x_max", extent.x_max)
        .arg("y_max", extent.y_max)
}
