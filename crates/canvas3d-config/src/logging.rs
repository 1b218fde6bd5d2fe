//! Log output formats selectable through `log_format`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the adapter renders log events on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event with fields flattened to the top level.
    #[default]
    Json,
    /// One terse text line per event, for watching a session live.
    Compact,
}

impl LogFormat {
    /// Whether events are emitted as machine-readable records.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Error returned for an unrecognised `log_format` value.
pub type LogFormatParseError = strum::ParseError;
