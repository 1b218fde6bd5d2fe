//! Host registry rebuilt from the adapter's input.

use std::collections::BTreeMap;

use canvas3d_sync::{Extent, HostEvent, HostRegistry, Layer, LayerId, layers_extent};

use crate::message::HostMessage;

/// [`HostRegistry`] kept current by applying [`HostMessage`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotRegistry {
    layers: Vec<Layer>,
    visible: Vec<LayerId>,
    full_extent: Option<Extent>,
    view_extent: Option<Extent>,
    geometry_codes: BTreeMap<LayerId, i64>,
}

impl SnapshotRegistry {
    /// Empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            layers: Vec::new(),
            visible: Vec::new(),
            full_extent: None,
            view_extent: None,
            geometry_codes: BTreeMap::new(),
        }
    }

    /// Folds `message` into the registry and returns the event the
    /// synchronizer should see.
    ///
    /// A snapshot only replaces state; it maps to no event.
    pub fn apply(&mut self, message: HostMessage) -> Option<HostEvent> {
        match message {
            HostMessage::RegistrySnapshot {
                layers,
                visible,
                full_extent,
                view_extent,
                geometry_codes,
            } => {
                self.layers = layers;
                self.visible = visible;
                self.full_extent = full_extent;
                self.view_extent = view_extent;
                self.geometry_codes = geometry_codes;
                None
            }
            HostMessage::LayerAdded {
                layer,
                geometry_type,
            } => {
                let id = layer.id.clone();
                self.remove(&id);
                if let Some(code) = geometry_type {
                    self.geometry_codes.insert(id.clone(), code);
                }
                self.visible.insert(0, id.clone());
                self.layers.push(layer);
                Some(HostEvent::LayerAdded(id))
            }
            HostMessage::LayerRemoved { id } => {
                self.remove(&id);
                Some(HostEvent::LayerRemoved(id))
            }
            HostMessage::LayersChanged { visible } => {
                self.visible = visible;
                Some(HostEvent::LayersChanged)
            }
            HostMessage::PropertiesChanged { layer } => {
                let id = layer.id.clone();
                match self.layers.iter_mut().find(|known| known.id == id) {
                    Some(known) => *known = layer,
                    None => self.layers.push(layer),
                }
                Some(HostEvent::PropertiesChanged(id))
            }
            HostMessage::ExtentChanged { view_extent } => {
                self.view_extent = Some(view_extent);
                Some(HostEvent::ExtentChanged)
            }
            HostMessage::Run => Some(HostEvent::Run),
            HostMessage::Stop => Some(HostEvent::Stop),
        }
    }

    fn remove(&mut self, id: &LayerId) {
        self.layers.retain(|layer| &layer.id != id);
        self.visible.retain(|visible| visible != id);
        self.geometry_codes.remove(id);
    }
}

impl HostRegistry for SnapshotRegistry {
    fn layers(&self) -> Vec<&Layer> {
        self.layers.iter().collect()
    }

    fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| &layer.id == id)
    }

    fn visible_layer_ids(&self) -> Vec<LayerId> {
        self.visible
            .iter()
            .filter(|id| self.layer(id).is_some())
            .cloned()
            .collect()
    }

    fn full_extent(&self) -> Extent {
        self.full_extent.unwrap_or_else(|| layers_extent(self))
    }

    fn view_extent(&self) -> Extent {
        self.view_extent.unwrap_or_else(|| self.full_extent())
    }

    fn first_feature_geometry(&self, id: &LayerId) -> Option<i64> {
        self.geometry_codes.get(id).copied()
    }
}
