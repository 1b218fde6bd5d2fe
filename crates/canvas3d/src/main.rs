//! Headless entrypoint: host events arrive as JSON Lines on standard input.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let stdin = io::stdin().lock();
    let mut stderr = io::stderr().lock();
    canvas3d::run(std::env::args_os(), stdin, &mut stderr)
}
