//! Structured error events
//!
//! An [`ErrorEvent`] is the record every subsystem hands to the
//! [`Notifier`](crate::notifier::Notifier). It carries:
//! - a severity [`Level`]
//! - a numeric code (see [`Code`] for the well-known ones)
//! - a free-form message
//! - typed [`Attributes`] (integers, text, floats), kept in registration order
//!
//! Observers only ever receive `&ErrorEvent`, so an event cannot change
//! while it is being dispatched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an event, ordered by increasing urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Level {
    /// Never surfaced
    Ignore = 0,
    /// Diagnostic noise, surfaced only by a debuggable console
    Debug = 1,
    Warning = 2,
    Notice = 3,
    Error = 4,
    /// Assertion failures and other misuse; a breakpoint observer may abort on these
    Fatal = 5,
}

impl Level {
    pub fn name(&self) -> &'static str {
        match self {
            Level::Ignore => "Ignore",
            Level::Debug => "Debug",
            Level::Warning => "Warning",
            Level::Notice => "Notice",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Well-known event codes
///
/// Values follow the SQLite primary result codes so that events raised by
/// the SQL layer and by this crate share one numbering. Upstream callers may
/// put any other integer into [`ErrorEvent::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Code {
    Ok = 0,
    Error = 1,
    Internal = 2,
    Busy = 5,
    NoMemory = 7,
    IOError = 10,
    Corrupt = 11,
    Full = 13,
    Misuse = 21,
    Range = 25,
    Notice = 27,
    Warning = 28,
}

impl Code {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Code::Ok),
            1 => Some(Code::Error),
            2 => Some(Code::Internal),
            5 => Some(Code::Busy),
            7 => Some(Code::NoMemory),
            10 => Some(Code::IOError),
            11 => Some(Code::Corrupt),
            13 => Some(Code::Full),
            21 => Some(Code::Misuse),
            25 => Some(Code::Range),
            27 => Some(Code::Notice),
            28 => Some(Code::Warning),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Code::Ok => "OK",
            Code::Error => "Error",
            Code::Internal => "Internal",
            Code::Busy => "Busy",
            Code::NoMemory => "NoMemory",
            Code::IOError => "IOError",
            Code::Corrupt => "Corrupt",
            Code::Full => "Full",
            Code::Misuse => "Misuse",
            Code::Range => "Range",
            Code::Notice => "Notice",
            Code::Warning => "Warning",
        }
    }
}

impl From<Code> for i32 {
    fn from(code: Code) -> i32 {
        code as i32
    }
}

/// A single typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Text(String),
    Float(f64),
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Integer(value as i64)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Integer(value as i64)
    }
}

impl From<usize> for AttributeValue {
    fn from(value: usize) -> Self {
        AttributeValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

/// Typed key/value attributes bucketed by value type
///
/// Names are unique within a bucket. Writing a name twice replaces the value
/// but keeps its original position, so rendering order is the order in which
/// each name was first registered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    integers: Vec<(String, i64)>,
    strings: Vec<(String, String)>,
    floats: Vec<(String, f64)>,
}

fn upsert<T>(bucket: &mut Vec<(String, T)>, name: String, value: T) {
    match bucket.iter_mut().find(|(key, _)| *key == name) {
        Some(slot) => slot.1 = value,
        None => bucket.push((name, value)),
    }
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = name.into();
        match value.into() {
            AttributeValue::Integer(v) => upsert(&mut self.integers, name, v),
            AttributeValue::Text(v) => upsert(&mut self.strings, name, v),
            AttributeValue::Float(v) => upsert(&mut self.floats, name, v),
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.integers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, v)| *v)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.strings
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.floats
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, v)| *v)
    }

    pub fn integers(&self) -> &[(String, i64)] {
        &self.integers
    }

    pub fn strings(&self) -> &[(String, String)] {
        &self.strings
    }

    pub fn floats(&self) -> &[(String, f64)] {
        &self.floats
    }

    pub fn len(&self) -> usize {
        self.integers.len() + self.strings.len() + self.floats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One failure or diagnostic occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    level: Level,
    code: i32,
    message: String,
    attributes: Attributes,
}

impl ErrorEvent {
    pub fn new(level: Level, code: impl Into<i32>, message: impl Into<String>) -> Self {
        ErrorEvent {
            level,
            code: code.into(),
            message: message.into(),
            attributes: Attributes::new(),
        }
    }

    /// Event at `Error` level whose message is the code's name
    pub fn from_code(code: Code) -> Self {
        Self::new(Level::Error, code, code.name())
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.set(name, value);
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    /// The code as a well-known [`Code`], if it is one
    pub fn known_code(&self) -> Option<Code> {
        Code::from_i32(self.code)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Renders `[Level: code, message, name: value, ...]`
///
/// The message is skipped when empty. Attributes follow grouped by type:
/// integers, then non-empty text values, then floats.
impl fmt::Display for ErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}: {}", self.level, self.code)?;
        if !self.message.is_empty() {
            write!(f, ", {}", self.message)?;
        }
        for (name, value) in &self.attributes.integers {
            write!(f, ", {}: {}", name, value)?;
        }
        for (name, value) in &self.attributes.strings {
            if !value.is_empty() {
                write!(f, ", {}: {}", name, value)?;
            }
        }
        for (name, value) in &self.attributes.floats {
            write!(f, ", {}: {}", name, value)?;
        }
        f.write_str("]")
    }
}
