//! Renderer replies: a status tag plus an attribute payload.
//!
//! Each reply is one self-closing element on a single line, for example
//! `<ok/>` or `<error msg="cannot load layer"/>`. The element name becomes
//! the [`Status`] and the attributes become the payload.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

/// Message carried by the response produced for an unparseable reply.
pub const PARSE_ERROR_MESSAGE: &str = "parse error";

/// Outcome reported by the renderer, or synthesised by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// The command succeeded.
    Ok,
    /// The renderer rejected the command, or its reply could not be parsed.
    Error,
    /// The renderer process is absent, exited, or its streams are closed.
    BrokenPipe,
    /// Any other tag name, preserved verbatim.
    Other(String),
}

impl Status {
    /// Maps a reply tag name onto a status.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ok" => Self::Ok,
            "error" => Self::Error,
            "broken_pipe" => Self::BrokenPipe,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Tag name as it appears on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::BrokenPipe => "broken_pipe",
            Self::Other(tag) => tag.as_str(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status with its attribute payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: Status,
    payload: BTreeMap<String, String>,
}

impl Response {
    /// Creates a response from its parts.
    #[must_use]
    pub const fn new(status: Status, payload: BTreeMap<String, String>) -> Self {
        Self { status, payload }
    }

    /// A successful response without payload.
    #[must_use]
    pub const fn ok() -> Self {
        Self::new(Status::Ok, BTreeMap::new())
    }

    /// An error response carrying `msg`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_message(Status::Error, message)
    }

    /// A broken-pipe response carrying `msg`.
    #[must_use]
    pub fn broken_pipe(message: impl Into<String>) -> Self {
        Self::with_message(Status::BrokenPipe, message)
    }

    /// The response substituted for a malformed reply line.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::error(PARSE_ERROR_MESSAGE)
    }

    fn with_message(status: Status, message: impl Into<String>) -> Self {
        let mut payload = BTreeMap::new();
        payload.insert(String::from("msg"), message.into());
        Self::new(status, payload)
    }

    /// Parses one reply line.
    ///
    /// # Errors
    ///
    /// Returns a [`ResponseParseError`] when the line is not exactly one
    /// well-formed self-closing element.
    pub fn parse(line: &str) -> Result<Self, ResponseParseError> {
        ElementParser::new(line.trim()).parse()
    }

    /// Reply status.
    #[must_use]
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// Attribute payload.
    #[must_use]
    pub const fn payload(&self) -> &BTreeMap<String, String> {
        &self.payload
    }

    /// Human-readable `msg` attribute, when present.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.payload.get("msg").map(String::as_str)
    }

    /// Whether the status is [`Status::Ok`].
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Whether the status is [`Status::BrokenPipe`].
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        self.status == Status::BrokenPipe
    }
}

/// Reasons a reply line is not a well-formed self-closing element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseParseError {
    /// The line does not start with `<`.
    #[error("reply does not start with '<'")]
    MissingOpenTag,
    /// The element is not closed by `/>`.
    #[error("reply is not a self-closing element")]
    NotSelfClosing,
    /// The element name is missing or contains invalid characters.
    #[error("reply has an invalid element name")]
    InvalidName,
    /// An attribute name is not followed by `=`.
    #[error("attribute '{attribute}' is missing '='")]
    ExpectedEquals {
        /// Attribute being parsed.
        attribute: String,
    },
    /// An attribute value is not quoted.
    #[error("attribute '{attribute}' has an unquoted value")]
    UnquotedValue {
        /// Attribute being parsed.
        attribute: String,
    },
    /// An attribute value is missing its closing quote.
    #[error("attribute '{attribute}' has an unterminated value")]
    UnterminatedValue {
        /// Attribute being parsed.
        attribute: String,
    },
    /// An attribute appears twice.
    #[error("attribute '{attribute}' is repeated")]
    DuplicateAttribute {
        /// Repeated attribute name.
        attribute: String,
    },
    /// An entity reference is unknown or unterminated.
    #[error("unsupported entity reference '&{entity}'")]
    UnknownEntity {
        /// Text following the ampersand.
        entity: String,
    },
    /// Attributes are not separated by whitespace, or a raw `<` appears.
    #[error("unexpected character '{found}'")]
    UnexpectedCharacter {
        /// Character found.
        found: char,
    },
}

struct ElementParser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> ElementParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> Result<Response, ResponseParseError> {
        if self.bump() != Some('<') {
            return Err(ResponseParseError::MissingOpenTag);
        }
        let tag = self.name().ok_or(ResponseParseError::InvalidName)?;
        let mut payload = BTreeMap::new();

        loop {
            let had_space = self.skip_whitespace();
            match self.peek() {
                Some('/') => {
                    self.bump();
                    return self.finish(tag, payload);
                }
                Some(_) if had_space => {
                    let (key, value) = self.attribute()?;
                    if payload.contains_key(&key) {
                        return Err(ResponseParseError::DuplicateAttribute { attribute: key });
                    }
                    payload.insert(key, value);
                }
                Some(found) => return Err(ResponseParseError::UnexpectedCharacter { found }),
                None => return Err(ResponseParseError::NotSelfClosing),
            }
        }
    }

    fn finish(
        mut self,
        tag: String,
        payload: BTreeMap<String, String>,
    ) -> Result<Response, ResponseParseError> {
        if self.bump() != Some('>') || self.peek().is_some() {
            return Err(ResponseParseError::NotSelfClosing);
        }
        Ok(Response::new(Status::from_tag(&tag), payload))
    }

    fn attribute(&mut self) -> Result<(String, String), ResponseParseError> {
        let key = self.name().ok_or(ResponseParseError::InvalidName)?;
        self.skip_whitespace();
        if self.bump() != Some('=') {
            return Err(ResponseParseError::ExpectedEquals { attribute: key });
        }
        self.skip_whitespace();
        let quote = match self.bump() {
            Some(quote @ ('"' | '\'')) => quote,
            _ => return Err(ResponseParseError::UnquotedValue { attribute: key }),
        };

        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok((key, value)),
                Some('&') => value.push(self.entity()?),
                Some('<') => return Err(ResponseParseError::UnexpectedCharacter { found: '<' }),
                Some(c) => value.push(c),
                None => return Err(ResponseParseError::UnterminatedValue { attribute: key }),
            }
        }
    }

    fn entity(&mut self) -> Result<char, ResponseParseError> {
        let mut reference = String::new();
        loop {
            match self.bump() {
                Some(';') => break,
                Some(c) if reference.len() < 8 => reference.push(c),
                _ => return Err(ResponseParseError::UnknownEntity { entity: reference }),
            }
        }
        let decoded = match reference.as_str() {
            "quot" => Some('"'),
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "apos" => Some('\''),
            numeric => decode_numeric_reference(numeric),
        };
        decoded.ok_or(ResponseParseError::UnknownEntity { entity: reference })
    }

    fn name(&mut self) -> Option<String> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            let valid = if name.is_empty() {
                c.is_alphabetic() || c == '_'
            } else {
                c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
            };
            if !valid {
                break;
            }
            name.push(c);
            self.bump();
        }
        (!name.is_empty()).then_some(name)
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
            skipped = true;
        }
        skipped
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }
}

fn decode_numeric_reference(reference: &str) -> Option<char> {
    let digits = reference.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}
