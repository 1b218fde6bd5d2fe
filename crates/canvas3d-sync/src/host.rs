//! The host application as seen by the synchronizer.

use crate::layer::{Extent, Layer, LayerId};

const NO_EXTENT: Extent = Extent::new(0.0, 0.0, 0.0, 0.0);

/// Read access to the host's layer registry and map canvas.
pub trait HostRegistry {
    /// Every layer the registry holds.
    fn layers(&self) -> Vec<&Layer>;

    /// Looks up one layer.
    fn layer(&self, id: &LayerId) -> Option<&Layer>;

    /// Ids of the layers the canvas currently draws, top-most first.
    fn visible_layer_ids(&self) -> Vec<LayerId>;

    /// Project extent; by default the union of every non-empty layer extent.
    fn full_extent(&self) -> Extent {
        layers_extent(self)
    }

    /// Extent the canvas currently shows.
    fn view_extent(&self) -> Extent;

    /// WKB type code of the layer's first feature, if it has one.
    fn first_feature_geometry(&self, id: &LayerId) -> Option<i64>;
}

impl<T> HostRegistry for &T
where
    T: HostRegistry + ?Sized,
{
    fn layers(&self) -> Vec<&Layer> {
        (**self).layers()
    }

    fn layer(&self, id: &LayerId) -> Option<&Layer> {
        (**self).layer(id)
    }

    fn visible_layer_ids(&self) -> Vec<LayerId> {
        (**self).visible_layer_ids()
    }

    fn full_extent(&self) -> Extent {
        (**self).full_extent()
    }

    fn view_extent(&self) -> Extent {
        (**self).view_extent()
    }

    fn first_feature_geometry(&self, id: &LayerId) -> Option<i64> {
        (**self).first_feature_geometry(id)
    }
}

/// Union of the non-empty extents of `host`'s layers.
///
/// A registry without such layers yields an all-zero, empty extent.
#[must_use]
pub fn layers_extent<H>(host: &H) -> Extent
where
    H: HostRegistry + ?Sized,
{
    host.layers()
        .into_iter()
        .map(|layer| layer.extent)
        .filter(|extent| !extent.is_empty())
        .reduce(|covered, extent| covered.union(&extent))
        .unwrap_or(NO_EXTENT)
}

/// Notifications the host delivers, in the order it delivers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A layer joined the registry.
    LayerAdded(LayerId),
    /// A layer is about to leave the registry.
    LayerRemoved(LayerId),
    /// The set of drawn layers changed.
    LayersChanged,
    /// A layer's style changed.
    PropertiesChanged(LayerId),
    /// The canvas moved.
    ExtentChanged,
    /// The user opened the 3D view.
    Run,
    /// The user closed the 3D view.
    Stop,
}
