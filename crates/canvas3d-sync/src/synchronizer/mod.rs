//! Keeps the renderer's scene in step with the host's layers.
//!
//! [`SceneSynchronizer`] owns the renderer channel and a map from host layer
//! ids to what the renderer was last told about each layer. Host
//! notifications arrive one at a time, either through the `on_*` handlers or
//! as [`HostEvent`] values passed to [`SceneSynchronizer::handle`], and are
//! translated into renderer commands.
//!
//! Every operation runs to completion on the caller's thread. The only
//! blocking point is the renderer round trip, which has no timeout.


use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use canvas3d_protocol::{Command, ViewerChannel};
use tracing::{debug, info, warn};

use crate::commands::{self, ElevationLoad, SET_SYMBOLOGY, VectorLoad};
use crate::descriptor::{DatabaseSource, FileSource};
use crate::error::{SessionError, SyncError};
use crate::geometry::GeometryClass;
use crate::host::{HostEvent, HostRegistry};
use crate::layer::{Extent, Layer, LayerId, LayerKind, RasterInfo};
use crate::placement::{self, Stratum, ZStack};
use crate::reporter::{SkipReason, SyncReporter};
use crate::settings::SceneSettings;
use crate::symbology::{self, FILL_COLOR_DIFFUSE};

const SYNC_TARGET: &str = "canvas3d_sync::synchronizer";

/// Provider name of database vector layers.
pub const POSTGRES_PROVIDER: &str = "postgres";
/// Provider name of file raster layers.
pub const GDAL_PROVIDER: &str = "gdal";

/// Visibility last requested from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Loaded, but neither shown nor hidden yet.
    Unknown,
    /// Last told to show.
    Shown,
    /// Last told to hide.
    Hidden,
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible { Self::Shown } else { Self::Hidden }
    }
}

/// What the synchronizer knows about one layer in the renderer's scene.
///
/// `visibility` tracks the intended state. It is updated when a show or hide
/// command is sent, whatever the renderer answers.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerObjectInfo {
    /// Renderer object id.
    pub object_id: String,
    /// Layer kind at placement time.
    pub kind: LayerKind,
    /// Height assigned at placement.
    pub z: f64,
    /// Last requested visibility.
    pub visibility: Visibility,
    /// Whether a load command was sent for the layer.
    pub loaded: bool,
}

#[derive(Debug, Clone)]
struct Terrain {
    layer: LayerId,
    file: PathBuf,
}

/// Translates host layer events into renderer commands.
#[derive(Debug)]
pub struct SceneSynchronizer<V, R> {
    channel: V,
    reporter: R,
    settings: SceneSettings,
    tracked: BTreeMap<LayerId, ViewerObjectInfo>,
    stack: ZStack,
    terrain: Option<Terrain>,
    full_extent: Option<Extent>,
    plane_loaded: bool,
    active: bool,
}

impl<V, R> SceneSynchronizer<V, R>
where
    V: ViewerChannel,
    R: SyncReporter,
{
    /// Builds a synchronizer with an idle renderer channel.
    #[must_use]
    pub fn new(channel: V, reporter: R, settings: SceneSettings) -> Self {
        Self {
            channel,
            reporter,
            settings,
            tracked: BTreeMap::new(),
            stack: ZStack::new(),
            terrain: None,
            full_extent: None,
            plane_loaded: false,
            active: false,
        }
    }

    /// Renderer channel.
    #[must_use]
    pub const fn channel(&self) -> &V {
        &self.channel
    }

    /// Mutable renderer channel.
    #[must_use]
    pub const fn channel_mut(&mut self) -> &mut V {
        &mut self.channel
    }

    /// Reporter receiving user-facing notices.
    #[must_use]
    pub const fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Settings the synchronizer was built with.
    #[must_use]
    pub const fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Renderer state of a tracked layer.
    #[must_use]
    pub fn tracked(&self, id: &LayerId) -> Option<&ViewerObjectInfo> {
        self.tracked.get(id)
    }

    /// Every tracked layer in id order.
    #[must_use]
    pub fn tracked_layers(&self) -> impl Iterator<Item = (&LayerId, &ViewerObjectInfo)> {
        self.tracked.iter()
    }

    /// Layer whose elevation model other layers drape onto.
    #[must_use]
    pub fn terrain_layer(&self) -> Option<&LayerId> {
        self.terrain.as_ref().map(|terrain| &terrain.layer)
    }

    /// Extent stored by the last [`set_extent`](Self::set_extent).
    #[must_use]
    pub const fn full_extent(&self) -> Option<&Extent> {
        self.full_extent.as_ref()
    }

    /// Whether a session started by [`run`](Self::run) is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Starts a renderer session and loads every visible layer.
    ///
    /// Frames the host's full extent, then adds and shows each visible layer
    /// from the bottom of the stack up. A layer that fails to load is
    /// reported and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyExtent`] before launching anything when
    /// the host has no extent, and [`SessionError::Launch`] when the renderer
    /// cannot be spawned.
    pub fn run<H>(&mut self, host: &H) -> Result<(), SessionError>
    where
        H: HostRegistry + ?Sized,
    {
        let extent = host.full_extent();
        if extent.is_empty() {
            return Err(SessionError::EmptyExtent);
        }

        self.reset();
        self.reporter
            .session_starting(&self.settings.launch.executable);
        self.channel.start(&self.settings.launch)?;
        self.active = true;
        self.set_extent(extent);

        let visible = host.visible_layer_ids();
        info!(
            target: SYNC_TARGET,
            layers = visible.len(),
            "loading visible layers"
        );
        for id in visible.iter().rev() {
            if let Err(error) = self.on_layer_added(host, id) {
                warn!(
                    target: SYNC_TARGET,
                    layer = %id,
                    error = %error,
                    "layer not loaded"
                );
            }
        }
        Ok(())
    }

    /// Ends the renderer session and forgets all renderer state.
    pub fn stop(&mut self) {
        self.channel.stop();
        self.reset();
        self.reporter.session_stopped();
    }

    /// Applies one host notification.
    ///
    /// Layer and camera events are ignored while no session is running.
    ///
    /// # Errors
    ///
    /// Returns the error of the operation the event maps to.
    pub fn handle<H>(&mut self, host: &H, event: &HostEvent) -> Result<(), SyncError>
    where
        H: HostRegistry + ?Sized,
    {
        if !self.active && !matches!(event, HostEvent::Run | HostEvent::Stop) {
            debug!(target: SYNC_TARGET, ?event, "no session, event ignored");
            return Ok(());
        }
        match event {
            HostEvent::LayerAdded(id) => self.on_layer_added(host, id)?,
            HostEvent::LayerRemoved(id) => self.on_layer_removed(id),
            HostEvent::LayersChanged => self.on_layers_changed(host),
            HostEvent::PropertiesChanged(id) => {
                let layer = host
                    .layer(id)
                    .ok_or_else(|| SyncError::LayerNotFound { layer: id.clone() })?;
                self.on_properties_changed(layer);
            }
            HostEvent::ExtentChanged => self.on_extent_changed(host),
            HostEvent::Run => self.run(host)?,
            HostEvent::Stop => self.stop(),
        }
        Ok(())
    }

    /// Adds a layer the host just registered and shows it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LayerNotFound`] when the host does not know `id`
    /// and any error raised by [`add_layer`](Self::add_layer).
    pub fn on_layer_added<H>(&mut self, host: &H, id: &LayerId) -> Result<(), SyncError>
    where
        H: HostRegistry + ?Sized,
    {
        let layer = host
            .layer(id)
            .ok_or_else(|| SyncError::LayerNotFound { layer: id.clone() })?;
        self.add_layer(host, layer)?;
        self.set_layer_visibility(id, true);
        Ok(())
    }

    /// Drops a layer the host is removing.
    pub fn on_layer_removed(&mut self, id: &LayerId) {
        self.remove_layer(id);
    }

    /// Converges renderer visibility on the host's drawn layers.
    pub fn on_layers_changed<H>(&mut self, host: &H)
    where
        H: HostRegistry + ?Sized,
    {
        let visible: BTreeSet<LayerId> = host.visible_layer_ids().into_iter().collect();
        self.reconcile_visibility(&visible);
    }

    /// Follows the canvas with the camera.
    pub fn on_extent_changed<H>(&mut self, host: &H)
    where
        H: HostRegistry + ?Sized,
    {
        self.update_camera(host);
    }

    /// Loads `layer` into the renderer unless it is already tracked.
    ///
    /// PostGIS vector layers and GDAL rasters are supported. Elevation
    /// rasters are loaded as terrain; other rasters are tracked without a
    /// load command. Layers from any other provider are reported and not
    /// tracked. A layer is tracked even when its load command fails at the
    /// transport level.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedSourceDescriptor`] when a database
    /// layer's source does not parse. Nothing is sent and the layer is not
    /// tracked.
    pub fn add_layer<H>(&mut self, host: &H, layer: &Layer) -> Result<(), SyncError>
    where
        H: HostRegistry + ?Sized,
    {
        if self.tracked.contains_key(&layer.id) {
            debug!(target: SYNC_TARGET, layer = %layer.id, "layer already tracked");
            return Ok(());
        }

        let loaded = match (layer.kind, layer.provider.as_str()) {
            (LayerKind::Vector, POSTGRES_PROVIDER) => {
                self.add_vector(host, layer)?;
                true
            }
            (LayerKind::Raster, GDAL_PROVIDER) => self.add_raster(host, layer),
            _ => {
                let reason = SkipReason::UnsupportedProvider {
                    provider: layer.provider.clone(),
                };
                self.reporter.layer_skipped(&layer.id, &reason);
                return Ok(());
            }
        };

        if loaded {
            self.sync_symbology(layer);
        }
        Ok(())
    }

    /// Unloads a tracked layer and forgets it, whatever the renderer answers.
    ///
    /// Imagery rasters were never loaded, so they are forgotten without an
    /// `unloadLayer`.
    pub fn remove_layer(&mut self, id: &LayerId) {
        let Some(info) = self.tracked.remove(id) else {
            return;
        };
        if self.terrain.as_ref().is_some_and(|terrain| &terrain.layer == id) {
            self.terrain = None;
        }
        if info.loaded {
            self.send(&commands::unload_layer(&info.object_id));
        }
        debug!(target: SYNC_TARGET, layer = %id, "layer removed");
    }

    /// Shows or hides a tracked layer.
    ///
    /// The tracked visibility changes even if the renderer rejects the
    /// command. Imagery rasters are tracked without a renderer object, so
    /// only their flag changes and no `showLayer`/`hideLayer` is sent.
    pub fn set_layer_visibility(&mut self, id: &LayerId, visible: bool) {
        let command = {
            let Some(info) = self.tracked.get_mut(id) else {
                return;
            };
            info.visibility = Visibility::from(visible);
            if !info.loaded {
                return;
            }
            commands::set_visibility(&info.object_id, visible)
        };
        self.send(&command);
    }

    /// Shows tracked layers in `visible` that are not shown and hides shown
    /// layers outside it. A second call with the same set sends nothing.
    pub fn reconcile_visibility(&mut self, visible: &BTreeSet<LayerId>) {
        let changes: Vec<(LayerId, bool)> = self
            .tracked
            .iter()
            .filter_map(|(id, info)| {
                let wanted = visible.contains(id);
                let shown = info.visibility == Visibility::Shown;
                (wanted != shown).then(|| (id.clone(), wanted))
            })
            .collect();
        for (id, wanted) in changes {
            self.set_layer_visibility(&id, wanted);
        }
    }

    /// Re-sends a tracked layer's symbology after its style changed.
    pub fn on_properties_changed(&mut self, layer: &Layer) {
        self.sync_symbology(layer);
    }

    /// Points the camera at the host's current view.
    pub fn update_camera<H>(&mut self, host: &H)
    where
        H: HostRegistry + ?Sized,
    {
        let origin = placement::origin(&self.scene_extent(host), 0.0);
        self.send(&commands::look_at(&origin, &host.view_extent()));
    }

    /// Declares the scene extent and lays a ground plane across it.
    ///
    /// A ground plane from an earlier call is unloaded first.
    pub fn set_extent(&mut self, extent: Extent) {
        let plane_id = self.settings.ground_plane_id.clone();
        if self.plane_loaded {
            self.send(&commands::unload_layer(&plane_id));
        }
        self.full_extent = Some(extent);
        self.send(&commands::set_full_extent(&extent));

        let origin = placement::origin(&extent, 0.0);
        self.send(&commands::add_plane(&plane_id, &extent, &origin));
        let color = Command::new(SET_SYMBOLOGY)
            .arg("id", &plane_id)
            .arg(FILL_COLOR_DIFFUSE, &self.settings.ground_color);
        self.send(&color);
        self.plane_loaded = true;
    }

    fn add_vector<H>(&mut self, host: &H, layer: &Layer) -> Result<(), SyncError>
    where
        H: HostRegistry + ?Sized,
    {
        let source = DatabaseSource::parse(&layer.source).map_err(|source| {
            self.reporter.layer_skipped(
                &layer.id,
                &SkipReason::MalformedSourceDescriptor(source.clone()),
            );
            SyncError::MalformedSourceDescriptor {
                layer: layer.id.clone(),
                source,
            }
        })?;

        let geometry = host
            .first_feature_geometry(&layer.id)
            .map(GeometryClass::from_code);
        let z = self.place(Stratum::Overlay);
        let origin = placement::origin(&self.scene_extent(host), z);
        let drape = self.drape_target(geometry);
        debug!(
            target: SYNC_TARGET,
            layer = %layer.id,
            z,
            is_3d = geometry.is_some_and(GeometryClass::is_3d),
            draped = drape.is_some(),
            "loading vector layer"
        );

        let command = VectorLoad {
            id: layer.id.as_str(),
            conn_info: source.conn_info(),
            extent: &layer.extent,
            origin,
            lod: placement::lod(layer.scale_range.as_ref(), self.settings.default_lod_distance),
            tile_size: self.settings.tile_size,
            query: source.query(),
            geocolumn: source.geocolumn(),
            elevation: drape.as_deref(),
        }
        .into_command();
        self.send(&command);
        self.track(layer, z, true);
        Ok(())
    }

    /// Returns whether a load command was sent.
    fn add_raster<H>(&mut self, host: &H, layer: &Layer) -> bool
    where
        H: HostRegistry + ?Sized,
    {
        if !layer.raster.is_some_and(|info| RasterInfo::is_elevation(&info)) {
            let z = self.place(Stratum::Overlay);
            self.track(layer, z, false);
            self.reporter
                .layer_skipped(&layer.id, &SkipReason::ImageryNotLoaded);
            return false;
        }

        let z = self.place(Stratum::Terrain);
        let file = FileSource::locate(&layer.source, &self.settings.mesh_cache_extension);
        let origin = placement::origin(&self.scene_extent(host), z);
        debug!(
            target: SYNC_TARGET,
            layer = %layer.id,
            z,
            file = %file.load_path().display(),
            "loading elevation layer"
        );
        let command = ElevationLoad {
            id: layer.id.as_str(),
            file: file.load_path(),
            extent: &layer.extent,
            origin,
            mesh_size: self.settings.elevation_mesh_size,
            lod: placement::lod(layer.scale_range.as_ref(), self.settings.default_lod_distance),
            tile_size: self.settings.tile_size,
        }
        .into_command();
        self.send(&command);

        if self.terrain.is_none() {
            self.terrain = Some(Terrain {
                layer: layer.id.clone(),
                file: file.path().to_path_buf(),
            });
        }
        self.track(layer, z, true);
        true
    }

    fn sync_symbology(&mut self, layer: &Layer) {
        let command = match self.tracked.get(&layer.id) {
            Some(info) if info.loaded => {
                symbology::symbology_command(&info.object_id, layer.style.as_ref())
            }
            _ => None,
        };
        if let Some(command) = command {
            self.send(&command);
        }
    }

    fn place(&mut self, stratum: Stratum) -> f64 {
        self.stack.place(
            stratum,
            self.settings.vector_z_gap,
            self.settings.terrain_z_gap,
        )
    }

    fn track(&mut self, layer: &Layer, z: f64, loaded: bool) {
        self.tracked.insert(
            layer.id.clone(),
            ViewerObjectInfo {
                object_id: layer.id.as_str().to_owned(),
                kind: layer.kind,
                z,
                visibility: Visibility::Unknown,
                loaded,
            },
        );
    }

    fn drape_target(&self, geometry: Option<GeometryClass>) -> Option<PathBuf> {
        if !self.settings.drape_enabled || !geometry.is_some_and(GeometryClass::is_drapeable) {
            return None;
        }
        self.terrain.as_ref().map(|terrain| terrain.file.clone())
    }

    fn scene_extent<H>(&self, host: &H) -> Extent
    where
        H: HostRegistry + ?Sized,
    {
        self.full_extent.unwrap_or_else(|| host.full_extent())
    }

    fn send(&mut self, command: &Command) {
        let response = self.channel.evaluate(command);
        if response.is_ok() {
            debug!(
                target: SYNC_TARGET,
                command = command.name(),
                status = %response.status(),
                "renderer acknowledged"
            );
        } else {
            self.reporter.command_failed(command, &response);
        }
    }

    fn reset(&mut self) {
        self.tracked.clear();
        self.stack = ZStack::new();
        self.terrain = None;
        self.full_extent = None;
        self.plane_loaded = false;
        self.active = false;
    }
}
