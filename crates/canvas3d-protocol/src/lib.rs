//! Line-oriented command protocol for driving an external 3D renderer.
//!
//! The renderer is a separate process that reads one command per line on its
//! standard input and answers each with exactly one line on its standard
//! output. Requests look like `showLayer id="L1"`; replies are a single
//! self-closing element such as `<ok/>` or `<error msg="reason"/>`, whose tag
//! is the status and whose attributes are the payload.
//!
//! The exchange is strictly synchronous: [`ViewerPipe::evaluate`] writes one
//! request and blocks until one reply line arrives. Transport failures never
//! surface as Rust errors from `evaluate`; they come back as a
//! [`Status::BrokenPipe`] response so callers can keep running in a degraded
//! state. Only launching the renderer is fallible ([`LaunchError`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use canvas3d_protocol::{Command, ViewerPipe};
//!
//! let mut pipe = ViewerPipe::new();
//! pipe.start("simpleViewer")?;
//! let response = pipe.evaluate(&Command::new("showLayer").arg("id", "L1"));
//! if !response.is_ok() {
//!     eprintln!("renderer refused: {}", response.message().unwrap_or_default());
//! }
//! # Ok::<(), canvas3d_protocol::LaunchError>(())
//! ```

pub mod channel;
pub mod command;
pub mod error;
pub mod pipe;
pub mod response;
pub mod transport;

#[cfg(all(test, unix))]
mod tests;

pub use self::channel::{ViewerChannel, ViewerLaunch};
pub use self::command::{Command, EncodeError, escape_value};
pub use self::error::{LaunchError, TransportError};
pub use self::pipe::ViewerPipe;
pub use self::response::{Response, ResponseParseError, Status};
pub use self::transport::LineTransport;
