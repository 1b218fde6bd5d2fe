//! Crate-level tests that drive a real renderer stand-in.
//!
//! The stand-ins are small `sh` scripts so the exchange runs over genuine
//! process pipes.

use crate::channel::{ViewerChannel, ViewerLaunch};
use crate::command::Command;
use crate::pipe::ViewerPipe;
use crate::response::Status;


/// Replies `<ok/>` to every request line.
pub(crate) const OK_RESPONDER: &str = "while IFS= read -r line; do echo '<ok/>'; done";

/// Replies with a line that is not a self-closing element.
pub(crate) const GARBAGE_RESPONDER: &str = "while IFS= read -r line; do echo 'not-xml'; done";

/// Echoes the request arguments back as reply attributes.
pub(crate) const ECHO_RESPONDER: &str =
    "while IFS= read -r line; do printf '<ok %s/>\\n' \"${line#* }\"; done";

/// Reads one request, then exits before replying.
pub(crate) const ONE_SHOT_RESPONDER: &str = "IFS= read -r line; exit 0";

/// Answers the first request with a non-UTF-8 line, then `<ok/>`.
pub(crate) const BINARY_RESPONDER: &str = "IFS= read -r line; printf '<ok msg=\"\\377\"/>\\n'; \
     while IFS= read -r line; do echo '<ok/>'; done";

/// Exits without reading anything.
pub(crate) const EXITING_RESPONDER: &str = "exit 0";

/// Launch description for a shell script responder.
pub(crate) fn shell_launch(script: &str) -> ViewerLaunch {
    ViewerLaunch::new("sh").with_arg("-c").with_arg(script)
}

#[test]
fn pipe_through_channel_trait_round_trips_ok() {
    let mut pipe = ViewerPipe::new();
    let channel: &mut dyn ViewerChannel = &mut pipe;
    channel
        .start(&shell_launch(OK_RESPONDER))
        .expect("start responder");

    let response = channel.evaluate(&Command::new("showLayer").arg("id", "L1"));
    assert_eq!(response.status(), &Status::Ok);

    channel.stop();
    let after = channel.evaluate(&Command::new("showLayer").arg("id", "L1"));
    assert!(after.is_broken_pipe());
}

#[test]
fn echoed_arguments_survive_escaping() {
    let mut pipe = ViewerPipe::new();
    pipe.start_with_args("sh", ["-c", ECHO_RESPONDER])
        .expect("start responder");

    let response = pipe.evaluate(&Command::new("setSymbology").arg("name", "say \"hi\""));
    assert!(response.is_ok());
    assert_eq!(
        response.payload().get("name").map(String::as_str),
        Some("say \"hi\"")
    );
}

#[test]
fn encode_failure_is_reported_without_touching_the_process() {
    let mut pipe = ViewerPipe::new();
    pipe.start_with_args("sh", ["-c", OK_RESPONDER])
        .expect("start responder");

    let response = pipe.evaluate(&Command::new("addLayer").arg("id", "a\nb"));
    assert_eq!(response.status(), &Status::Error);

    let follow_up = pipe.evaluate(&Command::new("addLayer").arg("id", "ab"));
    assert!(follow_up.is_ok());
}

#[test]
fn debug_output_reports_state() {
    let mut pipe = ViewerPipe::new();
    assert!(format!("{pipe:?}").contains("not_started"));
    pipe.stop();
    assert!(format!("{pipe:?}").contains("not_started"));
    pipe.start_with_args("sh", ["-c", OK_RESPONDER])
        .expect("start responder");
    assert!(format!("{pipe:?}").contains("running"));
    pipe.stop();
    assert!(format!("{pipe:?}").contains("stopped"));
}
