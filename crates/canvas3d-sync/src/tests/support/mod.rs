//! Test doubles for the synchronizer's collaborators.

mod channel;
mod host;
mod reporter;

pub(crate) use channel::RecordingChannel;
pub(crate) use host::{FakeHost, dem_layer, imagery_layer, postgis_layer, shapefile_layer};
pub(crate) use reporter::{RecordingReporter, ReportEvent};

use crate::settings::SceneSettings;
use crate::synchronizer::SceneSynchronizer;

/// Synchronizer wired to recording doubles.
pub(crate) type TestSynchronizer = SceneSynchronizer<RecordingChannel, RecordingReporter>;

/// Builds a synchronizer with default settings and recording doubles.
pub(crate) fn synchronizer() -> TestSynchronizer {
    SceneSynchronizer::new(
        RecordingChannel::default(),
        RecordingReporter::default(),
        SceneSettings::default(),
    )
}
