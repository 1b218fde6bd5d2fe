//! Seam between the scene synchronizer and the renderer process.
//!
//! [`ViewerChannel`] abstracts the renderer session so the synchronizer can
//! be exercised against recording doubles. [`ViewerPipe`](crate::ViewerPipe)
//! is the production implementation.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::command::Command;
use crate::error::LaunchError;
use crate::response::Response;

/// How to launch the renderer process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerLaunch {
    /// Executable path or command name resolved through `PATH`.
    pub executable: PathBuf,
    /// Arguments passed to the executable.
    pub args: Vec<OsString>,
}

impl ViewerLaunch {
    /// Launches `executable` without arguments.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// A synchronous command channel to a renderer session.
///
/// # Example
///
/// ```
/// use canvas3d_protocol::{Command, LaunchError, Response, ViewerChannel, ViewerLaunch};
///
/// struct AlwaysOk;
///
/// impl ViewerChannel for AlwaysOk {
///     fn start(&mut self, _launch: &ViewerLaunch) -> Result<(), LaunchError> {
///         Ok(())
///     }
///
///     fn stop(&mut self) {}
///
///     fn evaluate(&mut self, _command: &Command) -> Response {
///         Response::ok()
///     }
/// }
///
/// let mut channel = AlwaysOk;
/// assert!(channel.evaluate(&Command::new("lookAt")).is_ok());
/// ```
pub trait ViewerChannel {
    /// Starts a fresh renderer session, replacing any running one.
    ///
    /// # Errors
    ///
    /// Returns a [`LaunchError`] when the renderer cannot be started.
    fn start(&mut self, launch: &ViewerLaunch) -> Result<(), LaunchError>;

    /// Stops the renderer session if one is running.
    fn stop(&mut self);

    /// Sends one command and waits for its reply.
    fn evaluate(&mut self, command: &Command) -> Response;
}

impl<T: ViewerChannel + ?Sized> ViewerChannel for &mut T {
    fn start(&mut self, launch: &ViewerLaunch) -> Result<(), LaunchError> {
        (**self).start(launch)
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn evaluate(&mut self, command: &Command) -> Response {
        (**self).evaluate(command)
    }
}
