//! # geoloc-registry
//!
//! Storage for the administratively configured geolocation records:
//!
//! - **GeolocRegistry**: typed lookup/publish interface used by the engine
//! - **InMemoryGeolocRegistry**: `DashMap`-backed implementation with
//!   configuration load and reload
//! - **schema**: the admission rules applied before a record is published
//! - **config**: the TOML configuration format
//!
//! A record that fails admission is reported and skipped; it never prevents
//! the rest of the configuration from loading.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod error;
pub mod memory;
pub mod registry;
pub mod schema;

pub use config::{GeolocationConfig, LocationConfig, ProfileConfig};
pub use error::{RegistryError, Result};
pub use memory::{InMemoryGeolocRegistry, LoadReport, RecordKind, Rejection};
pub use registry::GeolocRegistry;
pub use schema::{validate_location, validate_profile};
