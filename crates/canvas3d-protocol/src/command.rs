//! Renderer commands and their single-line wire encoding.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Entity substituted for an embedded double quote.
const QUOTE_ENTITY: &str = "&quot;";

/// A named renderer command with string arguments.
///
/// Arguments are kept in a sorted map so the encoded line is stable for a
/// given set of arguments regardless of insertion order.
///
/// # Example
///
/// ```
/// use canvas3d_protocol::Command;
///
/// let command = Command::new("showLayer").arg("id", "L1");
/// assert_eq!(command.encode().unwrap(), "showLayer id=\"L1\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: BTreeMap<String, String>,
}

impl Command {
    /// Creates a command without arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: BTreeMap::new(),
        }
    }

    /// Adds an argument, replacing any previous value for `key`.
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts an argument in place, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.args.insert(key.into(), value.to_string());
    }

    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Argument map.
    #[must_use]
    pub const fn args(&self) -> &BTreeMap<String, String> {
        &self.args
    }

    /// Value of a single argument.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// Renders the command as one request line, without the terminator.
    ///
    /// The line is the command name, a single space, then each argument as
    /// `key="value"` separated by spaces.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::NewlineInValue`] when a value contains a line
    /// break, which the line framing cannot carry.
    pub fn encode(&self) -> Result<String, EncodeError> {
        let mut line = String::with_capacity(self.name.len() + 1 + self.args.len() * 16);
        line.push_str(&self.name);
        line.push(' ');
        for (index, (key, value)) in self.args.iter().enumerate() {
            if value.contains(['\n', '\r']) {
                return Err(EncodeError::NewlineInValue { key: key.clone() });
            }
            if index > 0 {
                line.push(' ');
            }
            line.push_str(key);
            line.push_str("=\"");
            line.push_str(&escape_value(value));
            line.push('"');
        }
        Ok(line)
    }
}

/// Escapes an argument value for the request line.
///
/// Only the double quote needs escaping; it becomes `&quot;`.
#[must_use]
pub fn escape_value(value: &str) -> Cow<'_, str> {
    if value.contains('"') {
        Cow::Owned(value.replace('"', QUOTE_ENTITY))
    } else {
        Cow::Borrowed(value)
    }
}

/// Errors raised while encoding a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// An argument value contains a line break.
    #[error("argument '{key}' contains a line break")]
    NewlineInValue {
        /// Offending argument key.
        key: String,
    },
}
