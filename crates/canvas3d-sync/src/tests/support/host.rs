//! In-memory host registry.

use std::collections::BTreeMap;

use crate::host::HostRegistry;
use crate::layer::{Extent, Layer, LayerId, RasterDataType, RasterInfo};

/// Registry backed by plain collections.
#[derive(Debug)]
pub(crate) struct FakeHost {
    pub(crate) layers: Vec<Layer>,
    pub(crate) visible: Vec<LayerId>,
    pub(crate) full: Extent,
    pub(crate) view: Extent,
    pub(crate) geometry_codes: BTreeMap<LayerId, i64>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            visible: Vec::new(),
            full: Extent::new(0.0, 0.0, 1000.0, 1000.0),
            view: Extent::new(100.0, 100.0, 400.0, 300.0),
            geometry_codes: BTreeMap::new(),
        }
    }
}

impl FakeHost {
    /// Registers `layer` on top of the stack and marks it visible.
    pub(crate) fn add_visible(&mut self, layer: Layer) {
        self.visible.insert(0, layer.id.clone());
        self.layers.push(layer);
    }

    /// Registers `layer` without drawing it.
    pub(crate) fn add_hidden(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Replaces the drawn layers, top-most first.
    pub(crate) fn set_visible(&mut self, ids: &[&str]) {
        self.visible = ids.iter().map(|id| LayerId::new(*id)).collect();
    }

    /// Drops a layer from the registry.
    pub(crate) fn remove(&mut self, id: &str) {
        self.layers.retain(|layer| layer.id.as_str() != id);
        self.visible.retain(|visible| visible.as_str() != id);
    }

    /// Records the geometry code of a layer's first feature.
    pub(crate) fn set_geometry_code(&mut self, id: &str, code: i64) {
        self.geometry_codes.insert(LayerId::new(id), code);
    }

    /// Mutable access to a registered layer.
    pub(crate) fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id.as_str() == id)
    }
}

impl HostRegistry for FakeHost {
    fn layers(&self) -> Vec<&Layer> {
        self.layers.iter().collect()
    }

    fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| &layer.id == id)
    }

    fn visible_layer_ids(&self) -> Vec<LayerId> {
        self.visible.clone()
    }

    fn full_extent(&self) -> Extent {
        self.full
    }

    fn view_extent(&self) -> Extent {
        self.view
    }

    fn first_feature_geometry(&self, id: &LayerId) -> Option<i64> {
        self.geometry_codes.get(id).copied()
    }
}

fn layer_extent() -> Extent {
    Extent::new(0.0, 0.0, 500.0, 500.0)
}

/// PostGIS layer over `public.<table>`.
pub(crate) fn postgis_layer(id: &str, table: &str) -> Layer {
    Layer::vector(
        id,
        "postgres",
        format!("dbname='gis' user='bob' port=5432 table=\"public\".\"{table}\" (geom) sql="),
        layer_extent(),
    )
}

/// Single-band float raster at `path`.
pub(crate) fn dem_layer(id: &str, path: &str) -> Layer {
    Layer::raster(
        id,
        "gdal",
        path,
        layer_extent(),
        RasterInfo {
            band_count: 1,
            data_type: RasterDataType::Float32,
        },
    )
}

/// Three-band byte raster.
pub(crate) fn imagery_layer(id: &str) -> Layer {
    Layer::raster(
        id,
        "gdal",
        "/data/ortho.tif",
        layer_extent(),
        RasterInfo {
            band_count: 3,
            data_type: RasterDataType::Byte,
        },
    )
}

/// Shapefile layer, which the renderer cannot load.
pub(crate) fn shapefile_layer(id: &str) -> Layer {
    Layer::vector(id, "ogr", "/data/parcels.shp", layer_extent())
}
