//! Enumerations shared by location, profile and effective profile records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An enum value could not be parsed from its text form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} '{value}'")]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
}

/// How a location's variables are to be interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationFormat {
    #[default]
    None,
    CivicAddress,
    Gml,
    Uri,
}

impl LocationFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationFormat::None => "<none>",
            LocationFormat::CivicAddress => "civicAddress",
            LocationFormat::Gml => "GML",
            LocationFormat::Uri => "URI",
        }
    }
}

impl fmt::Display for LocationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationFormat {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("civicAddress") {
            Ok(LocationFormat::CivicAddress)
        } else if s.eq_ignore_ascii_case("gml") {
            Ok(LocationFormat::Gml)
        } else if s.eq_ignore_ascii_case("uri") {
            Ok(LocationFormat::Uri)
        } else if s.is_empty() || s.eq_ignore_ascii_case("none") || s == "<none>" {
            Ok(LocationFormat::None)
        } else {
            Err(ParseKindError {
                kind: "location format",
                value: s.to_string(),
            })
        }
    }
}

/// The PIDF-LO element a location was taken from (or should be sent in).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PidfElement {
    #[default]
    None,
    Tuple,
    Device,
    Person,
}

impl PidfElement {
    /// Search order when a document carries several locations
    /// (RFC 5491 rule 8: device, then tuple, then person).
    pub const PRIORITY: [PidfElement; 3] =
        [PidfElement::Device, PidfElement::Tuple, PidfElement::Person];

    pub fn as_str(&self) -> &'static str {
        match self {
            PidfElement::None => "<none>",
            PidfElement::Tuple => "tuple",
            PidfElement::Device => "device",
            PidfElement::Person => "person",
        }
    }
}

impl fmt::Display for PidfElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PidfElement {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("tuple") {
            Ok(PidfElement::Tuple)
        } else if s.eq_ignore_ascii_case("device") {
            Ok(PidfElement::Device)
        } else if s.eq_ignore_ascii_case("person") {
            Ok(PidfElement::Person)
        } else if s.is_empty() || s.eq_ignore_ascii_case("none") || s == "<none>" {
            Ok(PidfElement::None)
        } else {
            Err(ParseKindError {
                kind: "pidf element",
                value: s.to_string(),
            })
        }
    }
}

/// How a configured location and a signaled location combine on a call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Ignore signaled locations; use only the configured profile.
    #[default]
    Discard,
    /// Signaled locations first, configured profile last.
    Append,
    /// Configured profile first, signaled locations after.
    Prepend,
    /// Signaled locations take the configured profile's place.
    Replace,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Discard => "discard",
            Disposition::Append => "append",
            Disposition::Prepend => "prepend",
            Disposition::Replace => "replace",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Disposition {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(Disposition::Discard),
            "append" => Ok(Disposition::Append),
            "prepend" => Ok(Disposition::Prepend),
            "replace" => Ok(Disposition::Replace),
            _ => Err(ParseKindError {
                kind: "location disposition",
                value: s.trim().to_string(),
            }),
        }
    }
}
