//! Unit tests and behaviour scenarios for the host adapter.


use std::io::{self, BufRead, BufReader, Cursor, Read};

use canvas3d_protocol::{Command, LaunchError, Response, ViewerChannel, ViewerLaunch};
use canvas3d_sync::{
    Extent, HostEvent, HostRegistry, LayerId, SceneSettings, SceneSynchronizer,
    StructuredSyncReporter,
};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::{AppError, HostMessage, SnapshotRegistry, drive};

// ---------------------------------------------------------------------------
// Doubles and fixtures
// ---------------------------------------------------------------------------

/// Answers `<ok/>` to everything and remembers what it was sent.
#[derive(Debug, Default)]
pub(crate) struct RecordingChannel {
    pub(crate) names: Vec<String>,
    pub(crate) starts: usize,
    pub(crate) stops: usize,
}

impl ViewerChannel for RecordingChannel {
    fn start(&mut self, _launch: &ViewerLaunch) -> Result<(), LaunchError> {
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn evaluate(&mut self, command: &Command) -> Response {
        self.names.push(command.name().to_owned());
        Response::ok()
    }
}

pub(crate) type TestSynchronizer = SceneSynchronizer<RecordingChannel, StructuredSyncReporter>;

pub(crate) fn synchronizer() -> TestSynchronizer {
    SceneSynchronizer::new(
        RecordingChannel::default(),
        StructuredSyncReporter::new(),
        SceneSettings::default(),
    )
}

fn extent(x_max: f64, y_max: f64) -> Value {
    json!({"x_min": 0.0, "y_min": 0.0, "x_max": x_max, "y_max": y_max})
}

pub(crate) fn roads_layer() -> Value {
    json!({
        "id": "roads",
        "kind": "vector",
        "provider": "postgres",
        "source": "dbname='gis' table=\"public\".\"roads\" (geom) sql=",
        "extent": extent(500.0, 500.0),
    })
}

pub(crate) fn dem_layer() -> Value {
    json!({
        "id": "dem",
        "kind": "raster",
        "provider": "gdal",
        "source": "/data/dem.tif",
        "extent": extent(800.0, 600.0),
        "raster": {"band_count": 1, "data_type": "float32"},
    })
}

pub(crate) fn snapshot(visible: &[&str]) -> String {
    json!({
        "event": "registry_snapshot",
        "layers": [dem_layer(), roads_layer()],
        "visible": visible,
    })
    .to_string()
}

fn parse(line: &str) -> HostMessage {
    serde_json::from_str(line).expect("message should parse")
}

#[fixture]
fn registry() -> SnapshotRegistry {
    let mut registry = SnapshotRegistry::new();
    let event = registry.apply(parse(&snapshot(&["roads", "dem"])));
    assert!(event.is_none());
    registry
}

// ---------------------------------------------------------------------------
// Message decoding
// ---------------------------------------------------------------------------

#[rstest]
#[case(r#"{"event":"run"}"#, "run")]
#[case(r#"{"event":"stop"}"#, "stop")]
#[case(r#"{"event":"layers_changed","visible":["dem"]}"#, "layers_changed")]
#[case(r#"{"event":"layer_removed","id":"roads"}"#, "layer_removed")]
#[case(
    r#"{"event":"extent_changed","view_extent":{"x_min":1,"y_min":2,"x_max":3,"y_max":4}}"#,
    "extent_changed"
)]
fn decodes_tagged_messages(#[case] line: &str, #[case] expected: &str) {
    assert_eq!(parse(line).name(), expected);
}

#[test]
fn layer_added_carries_optional_geometry_code() {
    let line = json!({"event": "layer_added", "layer": roads_layer(), "geometry_type": 3})
        .to_string();
    let HostMessage::LayerAdded {
        layer,
        geometry_type,
    } = parse(&line)
    else {
        panic!("expected layer_added");
    };
    assert_eq!(layer.id.as_str(), "roads");
    assert_eq!(geometry_type, Some(3));
}

#[rstest]
#[case("not json")]
#[case(r#"{"event":"explode"}"#)]
#[case(r#"{"event":"layer_removed"}"#)]
fn rejects_unknown_or_incomplete_messages(#[case] line: &str) {
    assert!(serde_json::from_str::<HostMessage>(line).is_err());
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[rstest]
fn full_extent_defaults_to_union_of_layers(registry: SnapshotRegistry) {
    assert_eq!(registry.full_extent(), Extent::new(0.0, 0.0, 800.0, 600.0));
    assert_eq!(registry.view_extent(), registry.full_extent());
}

#[test]
fn empty_registry_has_empty_extent() {
    assert!(SnapshotRegistry::new().full_extent().is_empty());
}

#[rstest]
fn added_layer_goes_on_top_once(mut registry: SnapshotRegistry) {
    let line = json!({"event": "layer_added", "layer": roads_layer(), "geometry_type": 1003})
        .to_string();
    let event = registry.apply(parse(&line));
    assert_eq!(event, Some(HostEvent::LayerAdded(LayerId::new("roads"))));
    assert_eq!(
        registry.visible_layer_ids(),
        vec![LayerId::new("roads"), LayerId::new("dem")]
    );
    assert_eq!(registry.layers().len(), 2);
    assert_eq!(
        registry.first_feature_geometry(&LayerId::new("roads")),
        Some(1003)
    );
}

#[rstest]
fn removed_layer_leaves_registry(mut registry: SnapshotRegistry) {
    let event = registry.apply(parse(r#"{"event":"layer_removed","id":"roads"}"#));
    assert_eq!(event, Some(HostEvent::LayerRemoved(LayerId::new("roads"))));
    assert!(registry.layer(&LayerId::new("roads")).is_none());
    assert_eq!(registry.visible_layer_ids(), vec![LayerId::new("dem")]);
}

#[rstest]
fn visible_ids_skip_unknown_layers(mut registry: SnapshotRegistry) {
    registry.apply(parse(r#"{"event":"layers_changed","visible":["ghost","dem"]}"#));
    assert_eq!(registry.visible_layer_ids(), vec![LayerId::new("dem")]);
}

#[rstest]
fn properties_replace_the_stored_layer(mut registry: SnapshotRegistry) {
    let mut layer = roads_layer();
    layer["style"] = json!({"symbol": "line", "color": "#ff0000"});
    let line = json!({"event": "properties_changed", "layer": layer}).to_string();
    let event = registry.apply(parse(&line));
    assert_eq!(
        event,
        Some(HostEvent::PropertiesChanged(LayerId::new("roads")))
    );
    let stored = registry
        .layer(&LayerId::new("roads"))
        .expect("layer kept");
    assert!(stored.style.is_some());
}

#[rstest]
fn extent_change_moves_the_view(mut registry: SnapshotRegistry) {
    let line = json!({"event": "extent_changed", "view_extent": extent(10.0, 10.0)}).to_string();
    registry.apply(parse(&line));
    assert_eq!(registry.view_extent(), Extent::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(registry.full_extent(), Extent::new(0.0, 0.0, 800.0, 600.0));
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

fn input(lines: &[String]) -> Cursor<String> {
    Cursor::new(lines.join("\n"))
}

#[test]
fn run_loads_visible_layers_and_end_of_input_stops() {
    let lines = vec![snapshot(&["roads", "dem"]), r#"{"event":"run"}"#.to_owned()];
    let mut registry = SnapshotRegistry::new();
    let mut sync = synchronizer();

    drive(input(&lines), &mut registry, &mut sync).expect("input readable");

    let channel = sync.channel();
    assert_eq!(channel.starts, 1);
    assert_eq!(channel.stops, 1);
    assert_eq!(
        channel.names,
        vec![
            "setFullExtent",
            "addPlane",
            "setSymbology",
            "loadElevation",
            "showLayer",
            "loadVectorPostgis",
            "showLayer",
        ]
    );
    assert!(!sync.is_active());
}

#[test]
fn malformed_lines_are_skipped() {
    let lines = vec![
        snapshot(&["roads"]),
        "{not json".to_owned(),
        String::new(),
        r#"{"event":"run"}"#.to_owned(),
        r#"{"event":"layers_changed","visible":[]}"#.to_owned(),
    ];
    let mut registry = SnapshotRegistry::new();
    let mut sync = synchronizer();

    drive(input(&lines), &mut registry, &mut sync).expect("input readable");

    assert_eq!(sync.channel().names.last().map(String::as_str), Some("hideLayer"));
}

#[test]
fn events_before_run_are_ignored_and_nothing_stops() {
    let lines = vec![snapshot(&["roads"]), r#"{"event":"layers_changed","visible":[]}"#.to_owned()];
    let mut registry = SnapshotRegistry::new();
    let mut sync = synchronizer();

    drive(input(&lines), &mut registry, &mut sync).expect("input readable");

    assert!(sync.channel().names.is_empty());
    assert_eq!(sync.channel().stops, 0);
}

#[test]
fn run_without_layers_does_not_launch() {
    let lines = vec![r#"{"event":"run"}"#.to_owned()];
    let mut registry = SnapshotRegistry::new();
    let mut sync = synchronizer();

    drive(input(&lines), &mut registry, &mut sync).expect("input readable");

    assert_eq!(sync.channel().starts, 0);
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("stdin closed abruptly"))
    }
}

#[test]
fn read_failure_stops_session_and_surfaces() {
    let input: Box<dyn BufRead> = Box::new(BufReader::new(FailingReader));
    let mut registry = SnapshotRegistry::new();
    let mut sync = synchronizer();

    let error = drive(input, &mut registry, &mut sync).expect_err("read must fail");

    assert!(matches!(error, AppError::ReadInput(_)));
    assert_eq!(sync.channel().stops, 1);
}
