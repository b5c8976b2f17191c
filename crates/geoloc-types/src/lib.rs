//! # geoloc-types
//!
//! Core types for the geolocation engine:
//!
//! - **VariableList** : ordered `name=value` list with its text codec
//! - **LocationRecord** : a named location (format + location data)
//! - **ProfileRecord** : a named profile referencing a location, with
//!   refinements, usage rules and the received-location disposition
//! - **LocationFormat / PidfElement / Disposition** : the shared enums

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod kinds;
pub mod records;
pub mod variables;

pub use kinds::{Disposition, LocationFormat, ParseKindError, PidfElement};
pub use records::{LocationRecord, ProfileRecord};
pub use variables::{Variable, VariableList, VariableListError};
