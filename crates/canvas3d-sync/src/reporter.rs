//! User-facing notices raised while synchronizing.

use std::path::Path;
use std::sync::Arc;

use canvas3d_protocol::{Command, Response, Status};

use crate::descriptor::DescriptorError;
use crate::layer::LayerId;

const REPORTER_TARGET: &str = "canvas3d_sync::reporter";

/// Why a layer was left out of the scene, or only partly loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The layer's provider is neither `postgres` nor `gdal`.
    UnsupportedProvider {
        /// Provider name the host reported.
        provider: String,
    },
    /// A raster that is not an elevation model; tracked but not drawn.
    ImageryNotLoaded,
    /// The database descriptor did not parse.
    MalformedSourceDescriptor(DescriptorError),
}

/// Observer for conditions the user should hear about.
pub trait SyncReporter {
    /// A renderer session is starting.
    fn session_starting(&self, executable: &Path);

    /// The renderer session ended.
    fn session_stopped(&self);

    /// A command came back with anything other than `ok`.
    fn command_failed(&self, command: &Command, response: &Response);

    /// A layer was skipped or only partly loaded.
    fn layer_skipped(&self, layer: &LayerId, reason: &SkipReason);
}

impl<T> SyncReporter for Arc<T>
where
    T: SyncReporter + ?Sized,
{
    fn session_starting(&self, executable: &Path) {
        (**self).session_starting(executable);
    }

    fn session_stopped(&self) {
        (**self).session_stopped();
    }

    fn command_failed(&self, command: &Command, response: &Response) {
        (**self).command_failed(command, response);
    }

    fn layer_skipped(&self, layer: &LayerId, reason: &SkipReason) {
        (**self).layer_skipped(layer, reason);
    }
}

/// Default reporter that records notices using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredSyncReporter;

impl StructuredSyncReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SyncReporter for StructuredSyncReporter {
    fn session_starting(&self, executable: &Path) {
        tracing::info!(
            target: REPORTER_TARGET,
            event = "session_starting",
            executable = %executable.display(),
            "starting 3D renderer"
        );
    }

    fn session_stopped(&self) {
        tracing::info!(
            target: REPORTER_TARGET,
            event = "session_stopped",
            "3D renderer stopped"
        );
    }

    fn command_failed(&self, command: &Command, response: &Response) {
        let reason = response.message().unwrap_or_default();
        if response.status() == &Status::BrokenPipe {
            tracing::warn!(
                target: REPORTER_TARGET,
                event = "broken_pipe",
                command = command.name(),
                reason,
                "renderer is not reachable"
            );
        } else {
            tracing::error!(
                target: REPORTER_TARGET,
                event = "command_failed",
                command = command.name(),
                status = %response.status(),
                reason,
                "renderer rejected command"
            );
        }
    }

    fn layer_skipped(&self, layer: &LayerId, reason: &SkipReason) {
        match reason {
            SkipReason::UnsupportedProvider { provider } => tracing::warn!(
                target: REPORTER_TARGET,
                event = "unsupported_provider",
                %layer,
                provider = %provider,
                "layer provider is not supported in 3D"
            ),
            SkipReason::ImageryNotLoaded => tracing::info!(
                target: REPORTER_TARGET,
                event = "imagery_not_loaded",
                %layer,
                "imagery rasters are not drawn in 3D"
            ),
            SkipReason::MalformedSourceDescriptor(error) => tracing::error!(
                target: REPORTER_TARGET,
                event = "malformed_source_descriptor",
                %layer,
                error = %error,
                "layer source could not be parsed"
            ),
        }
    }
}
