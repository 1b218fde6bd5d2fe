//! Host notifications as they arrive on the wire.
//!
//! Each line of input is one JSON object tagged by `event`:
//!
//! ```text
//! {"event":"registry_snapshot","layers":[...],"visible":["roads","dem"]}
//! {"event":"run"}
//! {"event":"layers_changed","visible":["dem"]}
//! ```

use std::collections::BTreeMap;

use canvas3d_sync::{Extent, Layer, LayerId};
use serde::{Deserialize, Serialize};

/// One host notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostMessage {
    /// Replaces the whole registry.
    RegistrySnapshot {
        /// Every registered layer.
        layers: Vec<Layer>,
        /// Drawn layers, top-most first.
        #[serde(default)]
        visible: Vec<LayerId>,
        /// Project extent; the union of layer extents when absent.
        #[serde(default)]
        full_extent: Option<Extent>,
        /// Canvas extent; the full extent when absent.
        #[serde(default)]
        view_extent: Option<Extent>,
        /// Geometry type code of each vector layer's first feature.
        #[serde(default)]
        geometry_codes: BTreeMap<LayerId, i64>,
    },
    /// A layer was registered and drawn on top.
    LayerAdded {
        /// The new layer.
        layer: Layer,
        /// Geometry type code of its first feature.
        #[serde(default)]
        geometry_type: Option<i64>,
    },
    /// A layer is being removed.
    LayerRemoved {
        /// Removed layer.
        id: LayerId,
    },
    /// The set of drawn layers changed.
    LayersChanged {
        /// Drawn layers, top-most first.
        visible: Vec<LayerId>,
    },
    /// A layer's style or other properties changed.
    PropertiesChanged {
        /// The layer as it now stands.
        layer: Layer,
    },
    /// The canvas was panned or zoomed.
    ExtentChanged {
        /// New canvas extent.
        view_extent: Extent,
    },
    /// The user opened the 3D view.
    Run,
    /// The user closed the 3D view.
    Stop,
}

impl HostMessage {
    /// Wire name of the message.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RegistrySnapshot { .. } => "registry_snapshot",
            Self::LayerAdded { .. } => "layer_added",
            Self::LayerRemoved { .. } => "layer_removed",
            Self::LayersChanged { .. } => "layers_changed",
            Self::PropertiesChanged { .. } => "properties_changed",
            Self::ExtentChanged { .. } => "extent_changed",
            Self::Run => "run",
            Self::Stop => "stop",
        }
    }
}
