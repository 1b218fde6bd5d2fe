//! Error types for scene synchronization.

use canvas3d_protocol::LaunchError;
use thiserror::Error;

use crate::descriptor::DescriptorError;
use crate::layer::LayerId;

/// Errors that stop a renderer session from starting.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The host reports no layers with an extent, so there is nothing to frame.
    #[error("no layer loaded, no extent defined")]
    EmptyExtent,
    /// The renderer process could not be spawned.
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Errors raised by a single synchronizer operation.
///
/// Transport failures are not errors: they reach the
/// [`SyncReporter`](crate::SyncReporter) and the session continues.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// A database layer's source string does not parse; the layer is skipped.
    #[error("layer '{layer}' has a malformed source descriptor: {source}")]
    MalformedSourceDescriptor {
        /// Layer that was skipped.
        layer: LayerId,
        /// Parser failure.
        #[source]
        source: DescriptorError,
    },
    /// The host announced a layer its registry does not hold.
    #[error("layer '{layer}' is not in the host registry")]
    LayerNotFound {
        /// Missing layer.
        layer: LayerId,
    },
    /// Starting the renderer session failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
