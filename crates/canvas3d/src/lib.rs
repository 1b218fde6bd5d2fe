//! Headless host adapter for the canvas3d renderer bridge.
//!
//! The adapter stands in for a desktop map host. It reads host notifications
//! as JSON Lines (see [`HostMessage`]), folds them into a
//! [`SnapshotRegistry`], and forwards the matching
//! [`HostEvent`](canvas3d_sync::HostEvent) to a
//! [`SceneSynchronizer`] driving the renderer over its standard streams.
//!
//! Malformed lines are logged and skipped. End of input stops any running
//! session, which closes the renderer's input and gives it the configured
//! grace period to exit.

mod message;
mod registry;
pub mod telemetry;

#[cfg(test)]
mod tests;

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use canvas3d_config::Config;
use canvas3d_protocol::{ViewerChannel, ViewerPipe};
use canvas3d_sync::{SceneSettings, SceneSynchronizer, StructuredSyncReporter, SyncReporter};
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use self::message::HostMessage;
pub use self::registry::SnapshotRegistry;
pub use self::telemetry::{TelemetryError, TelemetryHandle};

const ADAPTER_TARGET: &str = "canvas3d::adapter";

/// Errors that end the adapter.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<OrthoError>),
    /// Telemetry could not be installed.
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    /// Standard input could not be read.
    #[error("failed to read host events: {0}")]
    ReadInput(Arc<std::io::Error>),
}

/// Runs the adapter until `input` ends.
///
/// Errors are written to `stderr` and turned into a failing exit code.
pub fn run<I, A, R, W>(args: I, input: R, stderr: &mut W) -> ExitCode
where
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
    R: BufRead,
    W: Write,
{
    match try_run(args, input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "canvas3d: {error}");
            ExitCode::FAILURE
        }
    }
}

fn try_run<I, A, R>(args: I, input: R) -> Result<(), AppError>
where
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
    R: BufRead,
{
    let config = Config::load_from_iter(args).map_err(AppError::LoadConfiguration)?;
    let _telemetry = telemetry::initialise(&config)?;
    let pipe = ViewerPipe::with_grace_period(config.shutdown_grace());
    let mut synchronizer = SceneSynchronizer::new(
        pipe,
        StructuredSyncReporter::new(),
        SceneSettings::from(&config),
    );
    let mut registry = SnapshotRegistry::new();
    drive(input, &mut registry, &mut synchronizer)
}

/// Applies every host message in `input` and stops the session at the end.
///
/// # Errors
///
/// Returns [`AppError::ReadInput`] when `input` cannot be read. The session
/// is stopped before returning.
pub fn drive<R, V, S>(
    input: R,
    registry: &mut SnapshotRegistry,
    synchronizer: &mut SceneSynchronizer<V, S>,
) -> Result<(), AppError>
where
    R: BufRead,
    V: ViewerChannel,
    S: SyncReporter,
{
    for (index, read) in input.lines().enumerate() {
        let line = match read {
            Ok(text) => text,
            Err(error) => {
                synchronizer.stop();
                return Err(AppError::ReadInput(Arc::new(error)));
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        apply_line(index.saturating_add(1), &line, registry, synchronizer);
    }
    info!(target: ADAPTER_TARGET, "host input ended");
    if synchronizer.is_active() {
        synchronizer.stop();
    }
    Ok(())
}

fn apply_line<V, S>(
    line_number: usize,
    line: &str,
    registry: &mut SnapshotRegistry,
    synchronizer: &mut SceneSynchronizer<V, S>,
) where
    V: ViewerChannel,
    S: SyncReporter,
{
    let message: HostMessage = match serde_json::from_str(line) {
        Ok(message) => message,
        Err(error) => {
            warn!(
                target: ADAPTER_TARGET,
                line = line_number,
                error = %error,
                "skipping malformed host message"
            );
            return;
        }
    };
    debug!(target: ADAPTER_TARGET, event = message.name(), line = line_number, "host message");
    let Some(event) = registry.apply(message) else {
        return;
    };
    if let Err(error) = synchronizer.handle(&*registry, &event) {
        warn!(
            target: ADAPTER_TARGET,
            ?event,
            error = %error,
            "host event not applied"
        );
    }
}
