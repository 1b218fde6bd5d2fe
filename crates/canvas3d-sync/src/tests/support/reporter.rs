//! Test double for [`SyncReporter`] that records notices for assertions.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use canvas3d_protocol::{Command, Response, Status};

use crate::layer::LayerId;
use crate::reporter::{SkipReason, SyncReporter};

/// Notices captured during a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReportEvent {
    SessionStarting(PathBuf),
    SessionStopped,
    CommandFailed { command: String, status: Status },
    LayerSkipped { layer: LayerId, reason: SkipReason },
}

/// Records notices for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    /// Captures a copy of the recorded events.
    pub(crate) fn events(&self) -> Vec<ReportEvent> {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: ReportEvent) {
        self.events
            .lock()
            .expect("reporter mutex poisoned")
            .push(event);
    }
}

impl SyncReporter for RecordingReporter {
    fn session_starting(&self, executable: &Path) {
        self.record(ReportEvent::SessionStarting(executable.to_path_buf()));
    }

    fn session_stopped(&self) {
        self.record(ReportEvent::SessionStopped);
    }

    fn command_failed(&self, command: &Command, response: &Response) {
        self.record(ReportEvent::CommandFailed {
            command: command.name().to_owned(),
            status: response.status().clone(),
        });
    }

    fn layer_skipped(&self, layer: &LayerId, reason: &SkipReason) {
        self.record(ReportEvent::LayerSkipped {
            layer: layer.clone(),
            reason: reason.clone(),
        });
    }
}
