//! Registry trait for location and profile records
//!
//! The engine only ever reads from a registry; records are published as
//! `Arc`s and never mutated afterwards, so a reader holds a consistent record
//! for as long as it keeps the reference.

use std::sync::Arc;

use geoloc_types::{LocationRecord, ProfileRecord};

use crate::error::Result;

/// Registry for named locations and profiles
pub trait GeolocRegistry: Send + Sync {
    /// Get a location by id
    fn get_location(&self, id: &str) -> Option<Arc<LocationRecord>>;

    /// Get a profile by id
    fn get_profile(&self, id: &str) -> Option<Arc<ProfileRecord>>;

    /// Validate and publish a location, replacing any record with the same id
    fn put_location(&self, location: LocationRecord) -> Result<()>;

    /// Validate and publish a profile, replacing any record with the same id
    fn put_profile(&self, profile: ProfileRecord) -> Result<()>;

    /// Ids of all published locations, sorted
    fn location_ids(&self) -> Vec<String>;

    /// Ids of all published profiles, sorted
    fn profile_ids(&self) -> Vec<String>;
}
