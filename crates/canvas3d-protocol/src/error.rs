//! Errors raised while launching or talking to the renderer process.
//!
//! Only [`LaunchError`] crosses the public API of [`ViewerPipe`]: transport
//! failures during a request are folded into a broken-pipe
//! [`Response`](crate::Response) instead. I/O errors are wrapped in `Arc` so
//! the errors stay `Clone`.
//!
//! [`ViewerPipe`]: crate::ViewerPipe

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised when the renderer executable cannot be started.
#[derive(Debug, Clone, Error)]
pub enum LaunchError {
    /// The executable does not exist or is not on `PATH`.
    #[error("renderer executable not found: {}", executable.display())]
    ExecutableNotFound {
        /// Executable that was requested.
        executable: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The process could not be spawned for another reason.
    #[error("failed to start renderer {}: {message}", executable.display())]
    SpawnFailed {
        /// Executable that was requested.
        executable: PathBuf,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying I/O error.
        #[source]
        source: Option<Arc<io::Error>>,
    },
}

/// Errors raised by the line transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The input stream of the peer has been closed on our side.
    #[error("renderer input stream is closed")]
    InputClosed,

    /// The peer closed its output stream.
    #[error("renderer closed its output stream")]
    EndOfStream,

    /// The peer answered with a line that is not UTF-8.
    #[error("renderer reply is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Reading or writing failed.
    #[error("I/O error talking to renderer: {0}")]
    Io(#[from] io::Error),
}
