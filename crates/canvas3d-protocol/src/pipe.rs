//! Renderer subprocess ownership and the blocking request/reply exchange.

use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command as ProcessCommand, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::channel::{ViewerChannel, ViewerLaunch};
use crate::command::Command;
use crate::error::{LaunchError, TransportError};
use crate::response::Response;
use crate::transport::LineTransport;

/// Log target for renderer process operations.
const PIPE_TARGET: &str = "canvas3d_protocol::pipe";

/// Grace period used when none is configured.
const DEFAULT_GRACE: Duration = Duration::from_millis(200);

/// Interval between exit checks while waiting for the renderer.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Message returned when no renderer process is running.
const PROCESS_ENDED: &str = "Viewer process has ended";

type StdioTransport = LineTransport<ChildStdout, ChildStdin>;

enum PipeState {
    NotStarted,
    Running {
        child: Child,
        transport: StdioTransport,
    },
    Stopped,
}

/// Owns the renderer process and exchanges one line per command with it.
///
/// The process is spawned by [`start`](Self::start), terminated by
/// [`stop`](Self::stop) or by the next `start`, and always terminated when
/// the pipe is dropped.
pub struct ViewerPipe {
    state: PipeState,
    grace: Duration,
}

impl ViewerPipe {
    /// Creates a pipe with no process attached.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_grace_period(DEFAULT_GRACE)
    }

    /// Creates a pipe that waits `grace` for the renderer to exit on its own
    /// after its input closes, before killing it.
    #[must_use]
    pub const fn with_grace_period(grace: Duration) -> Self {
        Self {
            state: PipeState::NotStarted,
            grace,
        }
    }

    /// Starts `executable` with no arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`LaunchError`] when the executable cannot be spawned.
    pub fn start(&mut self, executable: impl AsRef<Path>) -> Result<(), LaunchError> {
        self.start_with_args(executable, std::iter::empty::<&OsStr>())
    }

    /// Stops any running renderer, then spawns `executable` with `args` and
    /// piped standard input and output.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::ExecutableNotFound`] when the executable does
    /// not exist and [`LaunchError::SpawnFailed`] for any other failure.
    pub fn start_with_args<I, S>(
        &mut self,
        program: impl AsRef<Path>,
        args: I,
    ) -> Result<(), LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.stop();
        let executable = program.as_ref();

        debug!(
            target: PIPE_TARGET,
            executable = %executable.display(),
            "spawning renderer process"
        );

        let mut child = ProcessCommand::new(executable)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|error| spawn_error(executable, error))?;

        let streams = child.stdin.take().zip(child.stdout.take());
        let Some((stdin, stdout)) = streams else {
            drop(child.kill());
            drop(child.wait());
            return Err(LaunchError::SpawnFailed {
                executable: executable.to_path_buf(),
                message: String::from("failed to capture renderer stdio"),
                source: None,
            });
        };

        debug!(
            target: PIPE_TARGET,
            executable = %executable.display(),
            pid = child.id(),
            "renderer process spawned"
        );

        self.state = PipeState::Running {
            child,
            transport: LineTransport::new(stdout, stdin),
        };
        Ok(())
    }

    /// Terminates the renderer if it is running. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if !matches!(self.state, PipeState::Running { .. }) {
            return;
        }
        if let PipeState::Running {
            mut child,
            mut transport,
        } = std::mem::replace(&mut self.state, PipeState::Stopped)
        {
            transport.close_input();
            drop(transport);
            terminate_child(&mut child, self.grace);
        }
    }

    /// Closes the renderer's input stream while keeping the process handle.
    ///
    /// Later requests return a broken-pipe response without writing.
    pub fn close_input(&mut self) {
        if let PipeState::Running { transport, .. } = &mut self.state {
            transport.close_input();
        }
    }

    /// Whether a renderer process is alive.
    pub fn is_running(&mut self) -> bool {
        self.refresh_state();
        matches!(self.state, PipeState::Running { .. })
    }

    /// Sends `command` and blocks until the renderer replies.
    ///
    /// Never fails: a missing process, a closed input stream, a write error
    /// or end-of-stream all produce a broken-pipe response, and an
    /// unparseable reply produces an error response with `msg="parse error"`.
    /// There is no timeout; a renderer that never answers blocks the caller.
    pub fn evaluate(&mut self, command: &Command) -> Response {
        let line = match command.encode() {
            Ok(line) => line,
            Err(error) => return Response::error(error.to_string()),
        };

        self.refresh_state();
        let PipeState::Running { transport, .. } = &mut self.state else {
            return Response::broken_pipe(PROCESS_ENDED);
        };
        if !transport.is_input_open() {
            return Response::broken_pipe(TransportError::InputClosed.to_string());
        }

        debug!(target: PIPE_TARGET, command = command.name(), %line, "sending command");

        if let Err(error) = transport.send_line(&line) {
            warn!(
                target: PIPE_TARGET,
                command = command.name(),
                error = %error,
                "failed to write command"
            );
            return Response::broken_pipe(error.to_string());
        }

        match transport.receive_line() {
            Ok(reply) => Response::parse(&reply).unwrap_or_else(|error| {
                warn!(
                    target: PIPE_TARGET,
                    command = command.name(),
                    %reply,
                    error = %error,
                    "renderer reply is malformed"
                );
                Response::parse_error()
            }),
            Err(TransportError::InvalidUtf8(error)) => {
                warn!(
                    target: PIPE_TARGET,
                    command = command.name(),
                    error = %error,
                    "renderer reply is malformed"
                );
                Response::parse_error()
            }
            Err(error) => {
                warn!(
                    target: PIPE_TARGET,
                    command = command.name(),
                    error = %error,
                    "renderer did not reply"
                );
                Response::broken_pipe(error.to_string())
            }
        }
    }

    /// Moves to `Stopped` when the child has exited on its own.
    fn refresh_state(&mut self) {
        let exited = match &mut self.state {
            PipeState::Running { child, .. } => match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(target: PIPE_TARGET, ?status, "renderer process exited");
                    true
                }
                Ok(None) => false,
                Err(error) => {
                    warn!(
                        target: PIPE_TARGET,
                        error = %error,
                        "failed to poll renderer process"
                    );
                    false
                }
            },
            PipeState::NotStarted | PipeState::Stopped => false,
        };
        if exited {
            self.state = PipeState::Stopped;
        }
    }
}

impl Default for ViewerPipe {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerChannel for ViewerPipe {
    fn start(&mut self, launch: &ViewerLaunch) -> Result<(), LaunchError> {
        self.start_with_args(&launch.executable, &launch.args)
    }

    fn stop(&mut self) {
        Self::stop(self);
    }

    fn evaluate(&mut self, command: &Command) -> Response {
        Self::evaluate(self, command)
    }
}

impl Drop for ViewerPipe {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for ViewerPipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            PipeState::NotStarted => String::from("not_started"),
            PipeState::Running { child, .. } => format!("running (pid: {})", child.id()),
            PipeState::Stopped => String::from("stopped"),
        };
        f.debug_struct("ViewerPipe")
            .field("state", &state)
            .field("grace", &self.grace)
            .finish()
    }
}

fn spawn_error(executable: &Path, error: io::Error) -> LaunchError {
    if error.kind() == io::ErrorKind::NotFound {
        LaunchError::ExecutableNotFound {
            executable: executable.to_path_buf(),
            source: Arc::new(error),
        }
    } else {
        LaunchError::SpawnFailed {
            executable: executable.to_path_buf(),
            message: error.to_string(),
            source: Some(Arc::new(error)),
        }
    }
}

/// Waits up to `grace` for the child to exit, then kills and reaps it.
fn terminate_child(child: &mut Child, grace: Duration) {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(target: PIPE_TARGET, ?status, "renderer exited after input closed");
                return;
            }
            Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL_INTERVAL),
            Ok(None) => break,
            Err(error) => {
                warn!(
                    target: PIPE_TARGET,
                    error = %error,
                    "failed to poll renderer process, killing it"
                );
                break;
            }
        }
    }

    if let Err(error) = child.kill() {
        warn!(
            target: PIPE_TARGET,
            error = %error,
            "failed to kill renderer process"
        );
    }
    drop(child.wait());
}
