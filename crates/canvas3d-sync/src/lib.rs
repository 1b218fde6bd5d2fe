//! Keeps an external 3D renderer in step with a 2D map host.
//!
//! The host owns an ordered stack of layers and emits notifications as the
//! user adds, removes, restyles, shows or hides them. [`SceneSynchronizer`]
//! turns each notification into renderer commands sent over a
//! [`ViewerChannel`](canvas3d_protocol::ViewerChannel), tracking what it last
//! asked the renderer to do so that repeated notifications send nothing new.
//!
//! Layers are stacked vertically in the order they are loaded. Vector layers
//! sit a small gap apart; the first vector layer above a terrain raster is
//! lifted clear of the surface. PostGIS layers are described to the renderer
//! through connection info and a query synthesized from the host's source
//! string (see [`DatabaseSource`]), and single-band rasters load as terrain.
//!
//! Transport failures never abort an operation. They are passed to the
//! [`SyncReporter`] and the layer stays tracked, so the session keeps running
//! in a degraded state until the host stops it.

pub mod commands;
pub mod descriptor;
pub mod error;
pub mod geometry;
pub mod host;
pub mod layer;
pub mod placement;
pub mod reporter;
pub mod settings;
pub mod symbology;
pub mod synchronizer;

#[cfg(test)]
mod tests;

pub use self::descriptor::{DatabaseSource, DescriptorError, FileSource, TableSpec};
pub use self::error::{SessionError, SyncError};
pub use self::geometry::GeometryClass;
pub use self::host::{HostEvent, HostRegistry, layers_extent};
pub use self::layer::{
    Extent, Layer, LayerId, LayerKind, RasterDataType, RasterInfo, ScaleRange, Style,
};
pub use self::placement::{Stratum, ZStack};
pub use self::reporter::{SkipReason, StructuredSyncReporter, SyncReporter};
pub use self::settings::SceneSettings;
pub use self::synchronizer::{SceneSynchronizer, ViewerObjectInfo, Visibility};
